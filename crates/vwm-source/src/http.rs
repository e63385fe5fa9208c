//! HTTP implementation of the remote sources.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde_json::Value;

use vwm_model::{Amount, EntityId, Epoch, Identity};

use crate::config::SourceSettings;
use crate::error::{Result, SourceError};
use crate::traits::{ExchangeRateSource, RemoteDataSource};
use crate::wire;

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("validator-withdrawals-monitor/", env!("CARGO_PKG_VERSION"));

/// Client for the platform explorer and the exchange-rate ticker.
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    client: reqwest::Client,
    base_url: Url,
    rate_url: Url,
}

impl HttpDataSource {
    /// Creates a client from the `[source]` settings.
    pub fn new(settings: &SourceSettings) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| SourceError::InvalidUrl(format!("{}: {e}", settings.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(SourceError::InvalidUrl(settings.base_url.clone()));
        }
        let rate_url = Url::parse(&settings.rate_url)
            .map_err(|e| SourceError::InvalidUrl(format!("{}: {e}", settings.rate_url)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()
            .map_err(|e| SourceError::Connection(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            rate_url,
        })
    }

    /// Build `<base>/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SourceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn validator_url(&self, entity: &EntityId) -> Result<Url> {
        self.endpoint(&["validator", entity.as_str()])
    }

    pub(crate) fn withdrawals_url(&self, entity: &EntityId, epoch: Epoch) -> Result<Url> {
        let mut url = self.endpoint(&["validator", entity.as_str(), "withdrawals"])?;
        url.query_pairs_mut()
            .append_pair("epoch", &epoch.to_string());
        Ok(url)
    }

    pub(crate) fn status_url(&self) -> Result<Url> {
        self.endpoint(&["status"])
    }

    /// GET a JSON document. `Ok(None)` on 404.
    async fn get_json(&self, url: Url) -> Result<Option<Value>> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let value = serde_json::from_str(&body)?;
        Ok(Some(value))
    }
}

impl RemoteDataSource for HttpDataSource {
    async fn fetch_identity(&self, entity: &EntityId) -> Result<Option<Identity>> {
        let url = self.validator_url(entity)?;
        match self.get_json(url).await? {
            Some(body) => wire::parse_identity(&body),
            None => Ok(None),
        }
    }

    async fn fetch_withdrawal(&self, entity: &EntityId, epoch: Epoch) -> Result<Amount> {
        let url = self.withdrawals_url(entity, epoch)?;
        match self.get_json(url).await? {
            Some(body) => wire::parse_withdrawals(&body),
            None => Ok(Amount::ZERO),
        }
    }

    async fn fetch_current_epoch(&self) -> Result<Epoch> {
        let url = self.status_url()?;
        match self.get_json(url).await? {
            Some(body) => wire::parse_current_epoch(&body),
            None => Err(SourceError::Status {
                status: StatusCode::NOT_FOUND.as_u16(),
                body: String::new(),
            }),
        }
    }
}

impl ExchangeRateSource for HttpDataSource {
    async fn fetch_usd_rate(&self) -> Result<f64> {
        tracing::debug!("GET {}", self.rate_url);

        let response = self.client.get(self.rate_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let body = response.text().await?;
        wire::parse_usd_rate(&body)
    }
}
