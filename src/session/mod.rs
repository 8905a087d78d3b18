// Portal session: authentication state plus the cookie jar every module binding shares.

mod login;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::PortalConfig;
use crate::error::SessionError;
use crate::transport::{HttpTransport, Transport, TransportSnapshot};

static NEXT_FRESHNESS: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AuthStatus {
    Anonymous,
    Authenticated { identity: String },
}

/// Identity and secret for the SSO login. The secret never appears in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    pub identity: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(identity: &str, secret: &str) -> Self {
        Self {
            identity: identity.to_string(),
            secret: secret.to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

struct SessionInner {
    config: PortalConfig,
    transport: Arc<dyn Transport>,
    status: AuthStatus,
    freshness: u64,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        debug!("session released freshness={}", self.freshness);
    }
}

/// Handle to an anonymous or authenticated portal context.
///
/// Cloning is cheap and every clone refers to the same cookie jar. The
/// authentication status is fixed at construction; logging in again means
/// creating a new `Session`.
#[derive(Clone)]
pub struct Session(Arc<SessionInner>);

impl Session {
    pub async fn create(
        config: PortalConfig,
        credentials: Option<Credentials>,
    ) -> Result<Self, SessionError> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config)?);
        Self::create_with_transport(config, transport, credentials).await
    }

    /// Like [`create`](Self::create) over a caller-supplied transport.
    pub async fn create_with_transport(
        config: PortalConfig,
        transport: Arc<dyn Transport>,
        credentials: Option<Credentials>,
    ) -> Result<Self, SessionError> {
        let status = match credentials {
            None => {
                login::handshake(transport.as_ref(), &config).await?;
                AuthStatus::Anonymous
            }
            Some(credentials) => {
                login::login(transport.as_ref(), &config, &credentials).await?;
                AuthStatus::Authenticated {
                    identity: credentials.identity,
                }
            }
        };

        let freshness = NEXT_FRESHNESS.fetch_add(1, Ordering::Relaxed);
        info!("session established status={:?} freshness={}", status, freshness);
        Ok(Self(Arc::new(SessionInner {
            config,
            transport,
            status,
            freshness,
        })))
    }

    /// Anonymous context; fails only when the portal cannot be reached.
    pub async fn anonymous(config: PortalConfig) -> Result<Self, SessionError> {
        Self::create(config, None).await
    }

    pub async fn with_credentials(
        config: PortalConfig,
        identity: &str,
        secret: &str,
    ) -> Result<Self, SessionError> {
        Self::create(config, Some(Credentials::new(identity, secret))).await
    }

    pub fn status(&self) -> &AuthStatus {
        &self.0.status
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.0.status, AuthStatus::Authenticated { .. })
    }

    pub fn identity(&self) -> Option<&str> {
        match &self.0.status {
            AuthStatus::Authenticated { identity } => Some(identity),
            AuthStatus::Anonymous => None,
        }
    }

    /// Strictly larger for every session created later in this process.
    pub fn freshness(&self) -> u64 {
        self.0.freshness
    }

    pub fn config(&self) -> &PortalConfig {
        &self.0.config
    }

    pub fn stats(&self) -> TransportSnapshot {
        self.0.transport.stats()
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.0.transport.as_ref()
    }

    /// Number of live handles, bound applications included.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("status", &self.0.status)
            .field("freshness", &self.0.freshness)
            .finish()
    }
}
