//! Shared HTTP response helpers for the backend client.
//!
//! Centralizes the status-code check so endpoint modules stay focused on
//! request construction and response mapping. Callers translate the neutral
//! [`ApiFailure`] into their own error enum (`AuthError` vs. `FetchError`).

/// A non-success response, with the body drained for the error message.
#[derive(Debug)]
pub(crate) struct ApiFailure {
    pub status: u16,
    pub message: String,
}

/// Check an HTTP response for a non-success status.
///
/// Returns the response unchanged on success; otherwise drains the body into
/// an [`ApiFailure`].
pub(crate) async fn check_response(
    resp: reqwest::Response,
) -> Result<reqwest::Response, ApiFailure> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let message = resp.text().await.unwrap_or_default();
    Err(ApiFailure { status, message })
}

impl ApiFailure {
    /// Best-effort extraction of the provider's error description.
    ///
    /// The identity endpoints wrap messages as `{"error_description": "..."}`
    /// or `{"msg": "..."}`; fall back to the raw body.
    pub(crate) fn description(&self) -> String {
        serde_json::from_str::<serde_json::Value>(&self.message)
            .ok()
            .and_then(|v| {
                v.get("error_description")
                    .or_else(|| v.get("msg"))
                    .or_else(|| v.get("message"))
                    .and_then(serde_json::Value::as_str)
                    .map(String::from)
            })
            .unwrap_or_else(|| self.message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_response(status: u16, body: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body.to_string())
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn success_passes_through() {
        let resp = mock_response(200, "{}");
        assert!(check_response(resp).await.is_ok());
    }

    #[tokio::test]
    async fn failure_drains_body() {
        let resp = mock_response(500, "boom");
        let failure = check_response(resp).await.unwrap_err();
        assert_eq!(failure.status, 500);
        assert_eq!(failure.message, "boom");
    }

    #[test]
    fn description_prefers_error_description() {
        let failure = ApiFailure {
            status: 400,
            message: r#"{"error_description":"Invalid login credentials"}"#.into(),
        };
        assert_eq!(failure.description(), "Invalid login credentials");
    }

    #[test]
    fn description_falls_back_to_msg_then_raw() {
        let failure = ApiFailure {
            status: 422,
            message: r#"{"msg":"Email not confirmed"}"#.into(),
        };
        assert_eq!(failure.description(), "Email not confirmed");

        let failure = ApiFailure {
            status: 502,
            message: "bad gateway".into(),
        };
        assert_eq!(failure.description(), "bad gateway");
    }
}
