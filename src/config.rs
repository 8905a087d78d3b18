use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Number of rows requested per page when a module supports row-count selection.
pub const TABLE_PAGE_ROWS: u32 = 500;

/// Popups dismissed at most this many times before giving up on a screen.
pub const MAX_POPUP_CLOSE_ATTEMPTS: usize = 10;

/// Earliest and latest years accepted by query builders.
pub const MIN_YEAR: u32 = 1990;
pub const MAX_YEAR: u32 = 2100;

/// Id of the hidden form every Web Dynpro page carries.
pub const SSR_FORM_ID: &str = "sap.client.SsrClient.form";

/// Cookie set by the SSO login endpoint on a correct password.
pub const SSO_TOKEN_COOKIE: &str = "sToken";

/// Cookie the portal issues once the SSO token has been exchanged.
pub const PORTAL_SESSION_COOKIE: &str = "MYSAPSSO2";

/// Substrings that identify the portal's logon or timeout page.
pub const SESSION_EXPIRED_MARKERS: &[&str] = &[
    "sap-system-login",
    "logon_ui_resources",
    "LOGIN_PAGE",
    "세션이 만료",
    "session has expired",
];

/// Cell text the portal renders in an empty table.
pub const NO_DATA_MARKERS: &[&str] = &["데이터가 없습니다", "No data", "No Data"];

/// Portal endpoints and client settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Landing page that issues the load-balancer cookies.
    pub portal_url: String,
    /// SSO login form.
    pub sso_login_url: String,
    /// Target of the SSO login form.
    pub sso_login_submit_url: String,
    /// Exchanges the SSO token for a portal session.
    pub sso_session_url: String,
    /// Prefix under which Web Dynpro applications are served.
    pub webdynpro_base_url: String,
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            portal_url: "https://saint.ssu.ac.kr/irj/portal".into(),
            sso_login_url: "https://smartid.ssu.ac.kr/Symtra_sso/smln.asp".into(),
            sso_login_submit_url: "https://smartid.ssu.ac.kr/Symtra_sso/smln_pcs.asp".into(),
            sso_session_url: "https://saint.ssu.ac.kr/webSSO/sso.jsp".into(),
            webdynpro_base_url: "https://ecc.ssu.ac.kr/sap/bc/webdynpro/SAP".into(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36".into(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl PortalConfig {
    /// Configuration with every endpoint served from `base` (no trailing slash).
    pub fn for_host(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            portal_url: format!("{base}/irj/portal"),
            sso_login_url: format!("{base}/Symtra_sso/smln.asp"),
            sso_login_submit_url: format!("{base}/Symtra_sso/smln_pcs.asp"),
            sso_session_url: format!("{base}/webSSO/sso.jsp"),
            webdynpro_base_url: format!("{base}/sap/bc/webdynpro/SAP"),
            ..Self::default()
        }
    }

    /// Parse overrides from TOML; absent keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// URL of a Web Dynpro application with stable element ids enabled.
    pub fn application_url(&self, app_name: &str) -> String {
        format!(
            "{}/{}?sap-wd-stableids=X",
            self.webdynpro_base_url.trim_end_matches('/'),
            app_name
        )
    }
}
