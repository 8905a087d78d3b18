// SSO login exchange: login form, credential submit, token hand-off to the portal.

use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use super::Credentials;
use crate::config::{PortalConfig, PORTAL_SESSION_COOKIE, SSO_TOKEN_COOKIE};
use crate::error::{SessionError, TransportError};
use crate::transport::{PortalResponse, Transport};

/// Hidden inputs the login form expects back with the credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoginForm {
    pub in_tp_bit: String,
    pub rqst_caus_cd: String,
}

pub(crate) fn parse_login_form(html: &str) -> Result<LoginForm, SessionError> {
    let doc = Html::parse_document(html);
    let hidden = |name: &str| -> Result<String, SessionError> {
        let sel = Selector::parse(&format!("input[name=\"{name}\"]"))
            .map_err(|e| SessionError::PortalProtocolChanged(e.to_string()))?;
        doc.select(&sel)
            .next()
            .and_then(|el| el.value().attr("value"))
            .map(str::to_string)
            .ok_or_else(|| {
                SessionError::PortalProtocolChanged(format!("login form lacks {name}"))
            })
    };
    Ok(LoginForm {
        in_tp_bit: hidden("in_tp_bit")?,
        rqst_caus_cd: hidden("rqst_caus_cd")?,
    })
}

/// Message of the first `alert("...")` call in a page, if any.
pub(crate) fn alert_message(html: &str) -> Option<String> {
    let start = html.find("alert(")? + "alert(".len();
    let rest = html[start..].trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let body = &rest[1..];
    let end = body.find(quote)?;
    let message = body[..end].trim();
    (!message.is_empty()).then(|| message.to_string())
}

fn ensure_success(resp: &PortalResponse) -> Result<(), SessionError> {
    if resp.is_success() {
        Ok(())
    } else {
        Err(TransportError::Status {
            url: resp.url.clone(),
            status: resp.status,
        }
        .into())
    }
}

/// Loads the portal landing page so the load balancer cookies land in the jar.
pub(crate) async fn handshake(
    transport: &dyn Transport,
    config: &PortalConfig,
) -> Result<(), SessionError> {
    let resp = transport.get(&config.portal_url).await?;
    ensure_success(&resp)?;
    debug!("portal handshake status={} url={}", resp.status, resp.url);
    Ok(())
}

pub(crate) async fn login(
    transport: &dyn Transport,
    config: &PortalConfig,
    credentials: &Credentials,
) -> Result<(), SessionError> {
    let page = transport.get(&config.sso_login_url).await?;
    ensure_success(&page)?;
    let form = parse_login_form(&page.text())?;

    let fields = [
        ("in_tp_bit", form.in_tp_bit.as_str()),
        ("rqst_caus_cd", form.rqst_caus_cd.as_str()),
        ("userid", credentials.identity.as_str()),
        ("pwd", credentials.secret.as_str()),
    ];
    let resp = transport
        .post_form(&config.sso_login_submit_url, &fields)
        .await?;
    ensure_success(&resp)?;

    let token = resp
        .set_cookie(SSO_TOKEN_COOKIE)
        .map(str::to_string)
        .or_else(|| transport.cookie(&config.sso_login_submit_url, SSO_TOKEN_COOKIE))
        .filter(|t| !t.is_empty());
    let Some(token) = token else {
        let reason = alert_message(&resp.text())
            .unwrap_or_else(|| "portal did not issue an SSO token".to_string());
        warn!("sso login rejected identity={} reason={}", credentials.identity, reason);
        return Err(SessionError::AuthenticationFailed { reason });
    };

    handshake(transport, config).await?;

    let query = [
        ("sToken", token.as_str()),
        ("sIdno", credentials.identity.as_str()),
    ];
    let resp = transport
        .get_with_query(&config.sso_session_url, &query)
        .await?;
    ensure_success(&resp)?;

    let has_session = resp.set_cookie(PORTAL_SESSION_COOKIE).is_some()
        || transport
            .cookie(&config.webdynpro_base_url, PORTAL_SESSION_COOKIE)
            .is_some()
        || transport
            .cookie(&config.sso_session_url, PORTAL_SESSION_COOKIE)
            .is_some();
    if !has_session {
        warn!("sso token exchange did not yield a portal session identity={}", credentials.identity);
        return Err(SessionError::AuthenticationFailed {
            reason: "portal did not accept the SSO token".to_string(),
        });
    }
    info!("sso login completed identity={}", credentials.identity);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_form() {
        let html = r#"<form><input type="hidden" name="in_tp_bit" value="0"><input type="hidden" name="rqst_caus_cd" value="03"></form>"#;
        let form = parse_login_form(html).unwrap();
        assert_eq!(form.in_tp_bit, "0");
        assert_eq!(form.rqst_caus_cd, "03");
        assert!(matches!(
            parse_login_form("<form></form>"),
            Err(SessionError::PortalProtocolChanged(_))
        ));
    }

    #[test]
    fn test_alert_message() {
        assert_eq!(
            alert_message(r#"<script>alert("비밀번호가 일치하지 않습니다."); history.back();</script>"#).as_deref(),
            Some("비밀번호가 일치하지 않습니다.")
        );
        assert_eq!(alert_message("<html></html>"), None);
    }
}
