use std::time::Duration;

use recall_core::{IndexReceipt, PageRecord, RetrieveResponse};
use recall_logging::recall_debug;
use serde::Serialize;
use url::Url;

use crate::{FailureKind, ServiceError};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const BASE_URL_ENV: &str = "RECALL_SERVICE_URL";

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ServiceSettings {
    pub fn with_base_url(base_url: &str) -> Result<Self, ServiceError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ServiceError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::new(
                FailureKind::InvalidUrl,
                format!("{base_url} cannot be a base url"),
            ));
        }
        Ok(Self {
            base_url,
            ..Self::default()
        })
    }

    /// Defaults, with the base address taken from `RECALL_SERVICE_URL` when set.
    pub fn from_env() -> Result<Self, ServiceError> {
        match std::env::var(BASE_URL_ENV) {
            Ok(value) if !value.trim().is_empty() => Self::with_base_url(value.trim()),
            _ => Ok(Self::default()),
        }
    }
}

/// The external indexing and retrieval service.
#[async_trait::async_trait]
pub trait PageIndex: Send + Sync {
    async fn index_page(&self, url: &str, text: &str) -> Result<IndexReceipt, ServiceError>;

    /// Ordered page records for `query`, best match first.
    async fn retrieve(&self, query: &str) -> Result<Vec<PageRecord>, ServiceError>;

    /// Full stored record for an id previously returned by `index_page`.
    async fn report(&self, id: u64) -> Result<PageRecord, ServiceError>;
}

#[derive(Serialize)]
struct IndexRequest<'a> {
    url: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

/// [`PageIndex`] over the service's JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpPageIndex {
    settings: ServiceSettings,
    client: reqwest::Client,
}

impl HttpPageIndex {
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ServiceError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.settings.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ServiceError::new(
                    FailureKind::InvalidUrl,
                    format!("{} cannot be a base url", self.settings.base_url),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl PageIndex for HttpPageIndex {
    async fn index_page(&self, url: &str, text: &str) -> Result<IndexReceipt, ServiceError> {
        let endpoint = self.endpoint(&["index"])?;
        recall_debug!("POST {} url={} text_len={}", endpoint, url, text.len());
        let response = self
            .client
            .post(endpoint)
            .json(&IndexRequest { url, text })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode_json(response).await
    }

    async fn retrieve(&self, query: &str) -> Result<Vec<PageRecord>, ServiceError> {
        let endpoint = self.endpoint(&["query"])?;
        recall_debug!("POST {} query={:?}", endpoint, query);
        let response = self
            .client
            .post(endpoint)
            .json(&QueryRequest { query })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: RetrieveResponse = decode_json(response).await?;
        Ok(body.results)
    }

    async fn report(&self, id: u64) -> Result<PageRecord, ServiceError> {
        let id = id.to_string();
        let endpoint = self.endpoint(&["report", &id])?;
        recall_debug!("GET {}", endpoint);
        let response = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode_json(response).await
    }
}

async fn decode_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ServiceError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ));
    }
    response
        .json::<T>()
        .await
        .map_err(map_reqwest_error)
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ServiceError::new(FailureKind::Decode, err.to_string());
    }
    ServiceError::new(FailureKind::Network, err.to_string())
}
