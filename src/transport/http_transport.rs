use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, RequestBuilder, Url};
use tracing::{debug, warn};

use super::stats::{TransportSnapshot, TransportStats};
use super::traits::{PortalResponse, Transport};
use crate::config::PortalConfig;
use crate::error::TransportError;

/// reqwest-backed transport. Clones share the client, the cookie jar and the counters.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    jar: Arc<Jar>,
    stats: Arc<TransportStats>,
}

impl HttpTransport {
    pub fn new(config: &PortalConfig) -> Result<Self, TransportError> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(jar.clone())
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;
        Ok(Self {
            client,
            jar,
            stats: Arc::new(TransportStats::new()),
        })
    }

    async fn execute(&self, url: &str, req: RequestBuilder) -> Result<PortalResponse, TransportError> {
        let _in_flight = self.stats.begin();
        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                self.stats.record_failure();
                warn!("portal request failed url={} err={}", url, e);
                return Err(map_reqwest_error(url, e));
            }
        };

        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let set_cookies = resp
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect::<Vec<_>>();
        let body = resp.bytes().await.map_err(|e| {
            self.stats.record_failure();
            TransportError::Body {
                url: url.to_string(),
                detail: e.to_string(),
            }
        })?;
        self.stats.record_received(body.len() as u64);
        debug!(
            "portal response status={} url={} bytes={}",
            status,
            final_url,
            body.len()
        );

        Ok(PortalResponse {
            status,
            url: final_url,
            set_cookies,
            body,
        })
    }
}

fn map_reqwest_error(url: &str, e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout { url: url.to_string() }
    } else if e.is_builder() {
        TransportError::InvalidUrl(url.to_string())
    } else {
        TransportError::Connect {
            url: url.to_string(),
            detail: e.to_string(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<PortalResponse, TransportError> {
        self.execute(url, self.client.get(url)).await
    }

    async fn get_with_query(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<PortalResponse, TransportError> {
        self.execute(url, self.client.get(url).query(query)).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<PortalResponse, TransportError> {
        let req = self
            .client
            .post(url)
            .header("Accept", "*/*")
            .form(form);
        self.execute(url, req).await
    }

    fn cookie(&self, url: &str, name: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        let header = self.jar.cookies(&parsed)?;
        let header = header.to_str().ok()?;
        header.split(';').find_map(|pair| {
            let (n, v) = pair.trim().split_once('=')?;
            (n == name).then(|| v.to_string())
        })
    }

    fn stats(&self) -> TransportSnapshot {
        self.stats.snapshot()
    }
}
