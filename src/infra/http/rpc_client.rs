use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::config::AppConfig;
use crate::usecase::ports::transport::{QueryTransport, RawResponse, TransportError};

pub const ISSUE_SEARCH_PATH: &str = "rpc/issue/?method=ISSUE_SEARCH";

/// Form-encoded POST client for the issue search RPC.
pub struct RpcClient {
    endpoint: Url,
    http: reqwest::Client,
}

impl RpcClient {
    pub fn new(base_url: &Url, http: reqwest::Client) -> Result<Self, TransportError> {
        Ok(Self {
            endpoint: issue_search_url(base_url)?,
            http,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("failed to build http client")?;
        let base_url = config.base_url()?;
        Self::new(&base_url, http).context("failed to resolve issue search endpoint")
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Resolves the search endpoint under `base_url`, treating the base as a directory.
pub fn issue_search_url(base_url: &Url) -> Result<Url, TransportError> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(ISSUE_SEARCH_PATH)
        .map_err(|err| TransportError::InvalidUrl(err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}

#[async_trait]
impl QueryTransport for RpcClient {
    async fn post_criteria(&self, criteria_json: String) -> Result<RawResponse, TransportError> {
        debug!(url = %self.endpoint, bytes = criteria_json.len(), "posting criteria");

        let response = self
            .http
            .post(self.endpoint.clone())
            .form(&[("criteria", criteria_json)])
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_resolved_under_base_path() {
        let root = Url::parse("https://app.example.com/").expect("valid url");
        assert_eq!(
            issue_search_url(&root).expect("join should work").as_str(),
            "https://app.example.com/rpc/issue/?method=ISSUE_SEARCH"
        );

        let nested = Url::parse("https://app.example.com/portal").expect("valid url");
        assert_eq!(
            issue_search_url(&nested).expect("join should work").as_str(),
            "https://app.example.com/portal/rpc/issue/?method=ISSUE_SEARCH"
        );
    }

    #[test]
    fn from_config_uses_configured_base() {
        let config = AppConfig {
            api_base_url: "http://127.0.0.1:9000/".to_string(),
            ..AppConfig::default()
        };

        let client = RpcClient::from_config(&config).expect("client should build");

        assert_eq!(
            client.endpoint().as_str(),
            "http://127.0.0.1:9000/rpc/issue/?method=ISSUE_SEARCH"
        );
    }
}
