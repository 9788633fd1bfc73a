use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use servdash_types::Collection;
use tracing::{debug, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::traits::{Gateway, WriteAck};

/// Path of the data endpoint, relative to the server root.
pub const DATA_PATH: &str = "api/data";

/// Settings for the HTTP client behind [`HttpGateway`].
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("servdash/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Gateway that reads and writes the collection over `GET`/`PUT /api/data`.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpGateway {
    /// Build a gateway with its own `reqwest::Client`.
    ///
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8788`.
    pub fn new(base_url: &str, config: &GatewayConfig) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Self::from_reqwest(base_url, http)
    }

    /// Build a gateway around a pre-built `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> GatewayResult<Self> {
        Ok(Self {
            http,
            endpoint: data_endpoint(base_url)?,
        })
    }

    /// Full URL of the data endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn data_endpoint(base_url: &str) -> GatewayResult<Url> {
    let invalid = |reason: String| GatewayError::InvalidUrl {
        url: base_url.to_string(),
        reason,
    };
    // Without a trailing slash `join` would replace the last path segment.
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    let base = Url::parse(&base).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(invalid("not a base URL".into()));
    }
    base.join(DATA_PATH).map_err(|e| invalid(e.to_string()))
}

/// Decode a `GET /api/data` body.
///
/// Valid JSON that is not an array is treated as "nothing stored" rather
/// than as an error, so a stray value never yields a partial collection.
pub(crate) fn decode_collection(body: &str) -> GatewayResult<Collection> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| GatewayError::Decode(e.to_string()))?;
    if !value.is_array() {
        warn!("data endpoint returned a non-array payload; using an empty collection");
        return Ok(Collection::new());
    }
    serde_json::from_value(value).map_err(|e| GatewayError::Decode(e.to_string()))
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn read(&self) -> GatewayResult<Collection> {
        let response = self.http.get(self.endpoint.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let collection = decode_collection(&body)?;
        debug!(items = collection.len(), endpoint = %self.endpoint, "collection read");
        Ok(collection)
    }

    async fn write(&self, collection: &Collection) -> GatewayResult<WriteAck> {
        let response = self
            .http
            .put(self.endpoint.clone())
            .json(collection)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let ack = serde_json::from_str::<WriteAck>(&body).unwrap_or_else(|_| WriteAck::ok(""));
        if !ack.success {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: ack.message,
            });
        }
        debug!(items = collection.len(), message = %ack.message, "collection written");
        Ok(ack)
    }
}
