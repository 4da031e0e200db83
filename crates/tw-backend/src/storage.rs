//! File storage (`/storage/v1`).

use crate::BackendClient;
use crate::error::FetchError;
use crate::http::check_response;

impl BackendClient {
    /// Upload `bytes` to `bucket` at `path`, returning the stored object path.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the upload is rejected.
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, FetchError> {
        let path = path.trim_start_matches('/');
        let url = format!("{}/storage/v1/object/{bucket}/{path}", self.base_url());
        let resp = self
            .request(reqwest::Method::POST, url)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;
        check_response(resp)
            .await
            .map_err(|f| FetchError::ProviderError {
                status: f.status,
                message: f.description(),
            })?;
        Ok(format!("{bucket}/{path}"))
    }
}
