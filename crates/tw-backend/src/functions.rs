//! Serverless function invocation (`/functions/v1`).

use serde::Serialize;

use crate::BackendClient;
use crate::error::FetchError;
use crate::http::check_response;

impl BackendClient {
    /// Invoke the serverless function `name` with a JSON payload.
    ///
    /// Used for outbound email notifications on lead submission.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the invocation fails or the response is not
    /// valid JSON.
    pub async fn invoke<T: Serialize + Sync>(
        &self,
        name: &str,
        payload: &T,
    ) -> Result<serde_json::Value, FetchError> {
        let url = format!("{}/functions/v1/{name}", self.base_url());
        let resp = self
            .request(reqwest::Method::POST, url)
            .json(payload)
            .send()
            .await?;
        let resp = check_response(resp)
            .await
            .map_err(|f| FetchError::ProviderError {
                status: f.status,
                message: f.description(),
            })?;
        let body = resp.text().await?;
        if body.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}
