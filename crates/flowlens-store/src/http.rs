//! Authenticated HTTP client for the FlowLens platform

use async_trait::async_trait;
use flowlens_normalizer::{RawFlow, RawFlowPage};
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::info;
use url::Url;

use crate::config::RemoteConfig;
use crate::credential::SessionCredential;
use crate::error::{Error, Result};
use crate::source::FlowSource;

pub fn user_agent() -> String {
    format!("flowlens-mcp/{}", env!("CARGO_PKG_VERSION"))
}

/// [`FlowSource`] backed by the platform REST API.
pub struct HttpFlowSource {
    client: Client,
    base_url: Url,
    credential: SessionCredential,
}

impl HttpFlowSource {
    pub fn new(remote: &RemoteConfig, credential: SessionCredential) -> Result<Self> {
        let base_url = Url::parse(&remote.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "remote.base_url cannot be used as a base: {}",
                remote.base_url
            )));
        }

        // The per-attempt deadline is enforced by RetryPolicy; this one only
        // guards against a runaway body download.
        let client = ClientBuilder::new()
            .user_agent(user_agent())
            .connect_timeout(Duration::from_secs(remote.connect_timeout_secs))
            .timeout(Duration::from_secs(remote.request_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            credential,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, subject: &str) -> Result<T> {
        info!(url = %url, "requesting {}", subject);
        let response = self
            .client
            .get(url)
            .bearer_auth(self.credential.expose())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await?;

        let response = check_status(response, subject)?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| Error::Decode(format!("{} has an unexpected shape: {}", subject, e)))
    }
}

fn check_status(response: Response, subject: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized,
        StatusCode::NOT_FOUND => Error::NotFound(subject.to_string()),
        StatusCode::TOO_MANY_REQUESTS => Error::Transient(format!("{} rate limited", subject)),
        s if s.is_server_error() => Error::Transient(format!("{} returned {}", subject, s)),
        s => Error::Remote(format!("{} returned {}", subject, s)),
    })
}

#[async_trait]
impl FlowSource for HttpFlowSource {
    async fn fetch_flow(&self, flow_id: &str) -> Result<RawFlow> {
        let url = self.endpoint(&["flow", flow_id])?;
        match self.get_json::<RawFlow>(url, &format!("flow {}", flow_id)).await {
            Err(Error::NotFound(_)) => Err(Error::NotFound(flow_id.to_string())),
            other => other,
        }
    }

    async fn fetch_flow_page(&self, page: u32) -> Result<RawFlowPage> {
        let mut url = self.endpoint(&["flows"])?;
        url.query_pairs_mut().append_pair("page", &page.to_string());
        self.get_json(url, &format!("flow listing page {}", page))
            .await
    }
}
