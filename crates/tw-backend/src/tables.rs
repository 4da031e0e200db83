//! Relational table operations (`/rest/v1`).
//!
//! Thin passthrough to the hosted store's REST surface: filters compile to
//! query-string operators (`column=eq.value`), writes ask for the stored
//! representation back so callers get server-assigned ids and timestamps.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::BackendClient;
use crate::error::FetchError;
use crate::http::check_response;

/// Query filter compiled to REST query parameters.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    params: Vec<(String, String)>,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `column = value`.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.params
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    /// `column > value`.
    #[must_use]
    pub fn gt(mut self, column: &str, value: impl ToString) -> Self {
        self.params
            .push((column.to_string(), format!("gt.{}", value.to_string())));
        self
    }

    /// Sort by `column`.
    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let dir = if ascending { "asc" } else { "desc" };
        self.params
            .push(("order".to_string(), format!("{column}.{dir}")));
        self
    }

    /// Cap the number of returned rows.
    #[must_use]
    pub fn limit(mut self, n: usize) -> Self {
        self.params.push(("limit".to_string(), n.to_string()));
        self
    }

    /// The compiled query parameters.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

impl BackendClient {
    /// Insert one row, returning the stored representation.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the write is rejected or the response cannot
    /// be decoded.
    pub async fn insert<T, R>(&self, table: &str, row: &T) -> Result<R, FetchError>
    where
        T: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/rest/v1/{table}", self.base_url());
        let resp = self
            .request(reqwest::Method::POST, url)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;
        let rows: Vec<R> = decode(resp).await?;
        rows.into_iter().next().ok_or_else(|| {
            FetchError::Decode(format!("insert into {table} returned no representation"))
        })
    }

    /// Select rows matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the query fails or the rows cannot be decoded.
    pub async fn select<R>(&self, table: &str, filter: &Filter) -> Result<Vec<R>, FetchError>
    where
        R: DeserializeOwned,
    {
        let url = format!("{}/rest/v1/{table}", self.base_url());
        let resp = self
            .request(reqwest::Method::GET, url)
            .query(&[("select", "*")])
            .query(filter.params())
            .send()
            .await?;
        decode(resp).await
    }

    /// Select at most one row matching `filter`.
    ///
    /// Absence is not an error: `Ok(None)` means no row matched.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the query fails or the row cannot be decoded.
    pub async fn select_one<R>(&self, table: &str, filter: &Filter) -> Result<Option<R>, FetchError>
    where
        R: DeserializeOwned,
    {
        let limited = filter.clone().limit(1);
        let rows = self.select(table, &limited).await?;
        Ok(rows.into_iter().next())
    }

    /// Patch rows matching `filter`, returning the stored representations.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the write is rejected or the response cannot
    /// be decoded.
    pub async fn update<T, R>(
        &self,
        table: &str,
        filter: &Filter,
        patch: &T,
    ) -> Result<Vec<R>, FetchError>
    where
        T: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/rest/v1/{table}", self.base_url());
        let resp = self
            .request(reqwest::Method::PATCH, url)
            .header("Prefer", "return=representation")
            .query(filter.params())
            .json(patch)
            .send()
            .await?;
        decode(resp).await
    }

    /// Delete rows matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the delete is rejected.
    pub async fn delete(&self, table: &str, filter: &Filter) -> Result<(), FetchError> {
        let url = format!("{}/rest/v1/{table}", self.base_url());
        let resp = self
            .request(reqwest::Method::DELETE, url)
            .query(filter.params())
            .send()
            .await?;
        check_response(resp)
            .await
            .map_err(|f| FetchError::ProviderError {
                status: f.status,
                message: f.description(),
            })?;
        Ok(())
    }
}

async fn decode<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R, FetchError> {
    let resp = check_response(resp)
        .await
        .map_err(|f| FetchError::ProviderError {
            status: f.status,
            message: f.description(),
        })?;
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
}
