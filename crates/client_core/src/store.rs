use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{CinemaFields, CinemaId, CinemaRecord},
    protocol::CreateCinemaRequest,
};
use url::Url;

use crate::{
    config::{parse_api_url, ClientSettings},
    error::{StoreError, MAX_ERROR_BODY_CHARS},
};

/// Remote collection of cinema records. Only the store assigns identifiers.
#[async_trait]
pub trait CinemaStore: Send + Sync {
    async fn list(&self) -> Result<Vec<CinemaRecord>, StoreError>;
    async fn create(&self, fields: &CinemaFields) -> Result<(), StoreError>;
    async fn update(&self, id: &CinemaId, record: &CinemaRecord) -> Result<(), StoreError>;
    async fn delete(&self, id: &CinemaId) -> Result<(), StoreError>;
}

/// JSON-over-HTTP client for a `{base}` / `{base}/{id}` REST resource.
pub struct HttpCinemaStore {
    http: Client,
    base: Url,
}

impl HttpCinemaStore {
    pub fn new(base: Url, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build cinema http client")?;
        Ok(Self { http, base })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        let base = parse_api_url(&settings.api_url)?;
        Self::new(base, settings.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn record_url(&self, id: &CinemaId) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id.as_str());
        }
        url
    }
}

async fn check_status(
    method: &'static str,
    url: &Url,
    res: Response,
) -> Result<Response, StoreError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect();
    Err(StoreError::Status {
        method,
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

fn transport(method: &'static str, url: &Url) -> impl FnOnce(reqwest::Error) -> StoreError {
    let url = url.to_string();
    move |source| StoreError::Transport {
        method,
        url,
        source,
    }
}

#[async_trait]
impl CinemaStore for HttpCinemaStore {
    async fn list(&self) -> Result<Vec<CinemaRecord>, StoreError> {
        let url = &self.base;
        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(transport("GET", url))?;
        let res = check_status("GET", url, res).await?;
        res.json::<Vec<CinemaRecord>>()
            .await
            .map_err(|source| StoreError::Decode {
                method: "GET",
                url: url.to_string(),
                source,
            })
    }

    async fn create(&self, fields: &CinemaFields) -> Result<(), StoreError> {
        let url = &self.base;
        let body = CreateCinemaRequest::from(fields.clone());
        let res = self
            .http
            .post(url.clone())
            .json(&body)
            .send()
            .await
            .map_err(transport("POST", url))?;
        check_status("POST", url, res).await?;
        Ok(())
    }

    async fn update(&self, id: &CinemaId, record: &CinemaRecord) -> Result<(), StoreError> {
        let url = self.record_url(id);
        let res = self
            .http
            .put(url.clone())
            .json(record)
            .send()
            .await
            .map_err(transport("PUT", &url))?;
        check_status("PUT", &url, res).await?;
        Ok(())
    }

    async fn delete(&self, id: &CinemaId) -> Result<(), StoreError> {
        let url = self.record_url(id);
        let res = self
            .http
            .delete(url.clone())
            .send()
            .await
            .map_err(transport("DELETE", &url))?;
        check_status("DELETE", &url, res).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
