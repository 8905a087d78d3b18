use std::borrow::Cow;

use async_trait::async_trait;
use bytes::Bytes;

use super::stats::TransportSnapshot;
use crate::error::TransportError;

/// A fully read portal response.
#[derive(Debug, Clone)]
pub struct PortalResponse {
    pub status: u16,
    /// Final URL after redirects.
    pub url: String,
    /// Cookies set by the final response, as `(name, value)`.
    pub set_cookies: Vec<(String, String)>,
    pub body: Bytes,
}

impl PortalResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn set_cookie(&self, name: &str) -> Option<&str> {
        self.set_cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP access with a persistent cookie jar shared by every request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<PortalResponse, TransportError>;

    async fn get_with_query(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<PortalResponse, TransportError>;

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<PortalResponse, TransportError>;

    /// Value of a cookie the jar would send to `url`.
    fn cookie(&self, url: &str, name: &str) -> Option<String>;

    fn stats(&self) -> TransportSnapshot {
        TransportSnapshot::default()
    }
}
