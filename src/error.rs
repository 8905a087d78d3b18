// Typed errors for each operation family and the conversions between them.

use thiserror::Error;

/// Failure below the HTTP semantics of the portal: connection, TLS, timeout,
/// unreadable bodies and server-side faults.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("cannot reach {url}: {detail}")]
    Connect { url: String, detail: String },
    #[error("reading response from {url} failed: {detail}")]
    Body { url: String, detail: String },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http client setup failed: {0}")]
    Setup(String),
}

/// Errors from Web Dynpro navigation: page loads and event round trips.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("portal answered with its logon page")]
    SessionExpired,
    #[error("portal refused the request with HTTP {status}")]
    Rejected { status: u16 },
    #[error("application {app} does not exist on the portal")]
    NotFound { app: String },
    #[error("element {id} not found on page")]
    ElementMissing { id: String },
    #[error("{control} does not offer {value:?}")]
    NotOffered { control: String, value: String },
    #[error("unexpected portal response: {0}")]
    Protocol(String),
}

/// Errors from [`Session`](crate::session::Session) construction.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("authentication failed: {reason}")]
    AuthenticationFailed { reason: String },
    #[error("transport unavailable: {0}")]
    TransportUnavailable(#[source] TransportError),
    #[error("portal protocol changed: {0}")]
    PortalProtocolChanged(String),
}

impl SessionError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportUnavailable(_))
    }

    pub fn signals_stale_contract(&self) -> bool {
        matches!(self, Self::PortalProtocolChanged(_))
    }
}

impl From<TransportError> for SessionError {
    fn from(e: TransportError) -> Self {
        Self::TransportUnavailable(e)
    }
}

/// Errors from binding a module to a session.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("session expired on the portal")]
    SessionExpired,
    #[error("module {module} unavailable: {reason}")]
    ModuleUnavailable { module: &'static str, reason: String },
    #[error("transport unavailable: {0}")]
    TransportUnavailable(#[source] TransportError),
    #[error("portal protocol changed: {0}")]
    PortalProtocolChanged(String),
}

impl BindError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportUnavailable(_))
    }

    pub fn signals_stale_contract(&self) -> bool {
        matches!(self, Self::PortalProtocolChanged(_))
    }
}

impl From<NavigationError> for BindError {
    fn from(e: NavigationError) -> Self {
        match e {
            NavigationError::Transport(t) => Self::TransportUnavailable(t),
            NavigationError::SessionExpired | NavigationError::Rejected { .. } => {
                Self::SessionExpired
            }
            other => Self::PortalProtocolChanged(other.to_string()),
        }
    }
}

/// Errors from building or running a query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("incomplete selection: {missing} is required")]
    IncompleteSelection { missing: &'static str },
    #[error("invalid {dimension}: {value:?}")]
    InvalidSelection { dimension: &'static str, value: String },
    #[error("{control} does not offer {value:?}")]
    SelectionNotOffered { control: String, value: String },
    #[error("session expired on the portal")]
    SessionExpired,
    #[error("{}", describe_parse_failure(.record_index, .field, .detail))]
    ParseFailure {
        record_index: Option<usize>,
        field: String,
        detail: String,
    },
    #[error("transport unavailable: {0}")]
    TransportUnavailable(#[source] TransportError),
    #[error("portal protocol changed: {0}")]
    PortalProtocolChanged(String),
}

fn describe_parse_failure(record_index: &Option<usize>, field: &str, detail: &str) -> String {
    match record_index {
        Some(index) => format!("cannot parse {field} of record {index}: {detail}"),
        None => format!("cannot parse {field}: {detail}"),
    }
}

impl QueryError {
    /// True only for transport failures; every other kind needs a changed
    /// input or a new session.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportUnavailable(_))
    }

    pub fn signals_stale_contract(&self) -> bool {
        matches!(
            self,
            Self::ParseFailure { .. } | Self::PortalProtocolChanged(_)
        )
    }

    /// Builder-side errors are raised before any request is made.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::IncompleteSelection { .. } | Self::InvalidSelection { .. }
        )
    }
}

impl From<NavigationError> for QueryError {
    fn from(e: NavigationError) -> Self {
        match e {
            NavigationError::Transport(t) => Self::TransportUnavailable(t),
            NavigationError::SessionExpired | NavigationError::Rejected { .. } => {
                Self::SessionExpired
            }
            NavigationError::NotOffered { control, value } => {
                Self::SelectionNotOffered { control, value }
            }
            other => Self::PortalProtocolChanged(other.to_string()),
        }
    }
}

impl From<BindError> for QueryError {
    fn from(e: BindError) -> Self {
        match e {
            BindError::SessionExpired => Self::SessionExpired,
            BindError::TransportUnavailable(t) => Self::TransportUnavailable(t),
            BindError::ModuleUnavailable { module, reason } => {
                Self::PortalProtocolChanged(format!("{module} became unavailable: {reason}"))
            }
            BindError::PortalProtocolChanged(detail) => Self::PortalProtocolChanged(detail),
        }
    }
}
