use std::path::Path;

use serde::Serialize;

use crate::config::PortalConfig;
use crate::session::Session;
use crate::transport::TransportSnapshot;

/// Host-visible summary of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub identity: Option<String>,
    pub authenticated: bool,
    pub freshness: u64,
    /// Live handles, bound applications included.
    pub handles: usize,
}

pub fn session_info(session: &Session) -> SessionInfo {
    SessionInfo {
        identity: session.identity().map(str::to_string),
        authenticated: session.is_authenticated(),
        freshness: session.freshness(),
        handles: session.handle_count(),
    }
}

/// Return a snapshot of the session's request statistics.
pub fn watch_stats(session: &Session) -> TransportSnapshot {
    session.stats()
}

/// Portal settings from a TOML file, or the built-in defaults without one.
pub fn load_config(path: Option<&Path>) -> std::io::Result<PortalConfig> {
    match path {
        Some(path) => PortalConfig::from_file(path),
        None => Ok(PortalConfig::default()),
    }
}
