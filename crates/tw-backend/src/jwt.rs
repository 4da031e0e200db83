//! Access-token expiry inspection.

use base64::Engine as _;

use crate::error::AuthError;

/// Decode the JWT `exp` claim without signature validation.
///
/// This is a best-effort check used to schedule token refresh — the provider
/// validates the signature on every call; we only need the timestamp.
///
/// # Errors
///
/// Returns [`AuthError::SessionStoreError`] if the JWT format is invalid or
/// the `exp` claim is missing or cannot be parsed.
pub fn decode_expiry(jwt: &str) -> Result<chrono::DateTime<chrono::Utc>, AuthError> {
    let parts: Vec<&str> = jwt.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::SessionStoreError("invalid JWT format".into()));
    }
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| AuthError::SessionStoreError(format!("base64 decode failed: {e}")))?;
    let value: serde_json::Value = serde_json::from_slice(&payload)
        .map_err(|e| AuthError::SessionStoreError(format!("JSON parse failed: {e}")))?;
    let exp = value["exp"]
        .as_i64()
        .ok_or_else(|| AuthError::SessionStoreError("missing exp claim".into()))?;
    chrono::DateTime::from_timestamp(exp, 0)
        .ok_or_else(|| AuthError::SessionStoreError("invalid exp timestamp".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_jwt_with_exp(exp: i64) -> String {
        let header = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#);
        let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(format!(r#"{{"sub":"u-1","exp":{exp}}}"#));
        let signature = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode("fake_sig");
        format!("{header}.{payload}.{signature}")
    }

    #[test]
    fn decode_expiry_valid_jwt() {
        let future_exp = chrono::Utc::now().timestamp() + 3600;
        let jwt = make_jwt_with_exp(future_exp);
        let dt = decode_expiry(&jwt).expect("should decode");
        assert_eq!(dt.timestamp(), future_exp);
    }

    #[test]
    fn decode_expiry_invalid_format() {
        let result = decode_expiry("not-a-jwt");
        assert!(result.is_err());
    }

    #[test]
    fn decode_expiry_missing_exp_claim() {
        let header = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#);
        let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(r#"{"sub":"u-1"}"#);
        let jwt = format!("{header}.{payload}.sig");
        let result = decode_expiry(&jwt);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("missing exp claim")
        );
    }
}
