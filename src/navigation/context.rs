// Per-module navigation state: the SSR form, the current page and event round trips.

use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

use super::event::{serialize_queue, Event};
use super::page::Page;
use super::update::parse_update;
use crate::config::{PortalConfig, SESSION_EXPIRED_MARKERS, SSR_FORM_ID};
use crate::error::{NavigationError, TransportError};
use crate::parser::document::selector;
use crate::transport::{PortalResponse, Transport};

const CLIENT_INSPECTOR_WD01: &str = "WD01";
const CLIENT_INSPECTOR_WD02: &str = "WD02";
const LOADING_PLACEHOLDER: &str = "_loadingPlaceholder_";
const INITIAL_CLIENT_DATA_WD01: &str = "ClientWidth:1920px;ClientHeight:1000px;ScreenWidth:1920px;ScreenHeight:1080px;ScreenOrientation:landscape;ThemedTableRowHeight:33px;ThemedFormLayoutRowHeight:32px;ThemeTags:Fiori_3,Touch;ThemeID:sap_fiori_3;SapThemeID:sap_fiori_3;DeviceType:DESKTOP";
const INITIAL_CLIENT_DATA_WD02: &str = "ThemedTableRowHeight:25px";

/// Hidden form fields every event submission must echo back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsrForm {
    /// Absolute URL events are posted to.
    pub action: String,
    pub charset: String,
    pub secure_id: String,
    pub app_name: String,
    pub use_beacon: bool,
}

impl SsrForm {
    pub fn parse(html: &str, page_url: &str) -> Result<Self, NavigationError> {
        let doc = Html::parse_document(html);
        let form_sel = selector(&format!("form[id=\"{SSR_FORM_ID}\"]"))?;
        let form = doc
            .select(&form_sel)
            .next()
            .ok_or_else(|| NavigationError::Protocol("page has no SSR client form".into()))?;

        let action = form
            .value()
            .attr("action")
            .ok_or_else(|| NavigationError::Protocol("SSR form without action".into()))?;
        let action = Url::parse(page_url)
            .and_then(|base| base.join(action))
            .map_err(|e| NavigationError::Protocol(format!("bad form action {action:?}: {e}")))?;

        let input = |name: &str| -> Result<String, NavigationError> {
            let sel = selector(&format!("input[name=\"{name}\"]"))?;
            form.select(&sel)
                .next()
                .and_then(|el| el.value().attr("value"))
                .map(str::to_string)
                .ok_or_else(|| NavigationError::Protocol(format!("SSR form lacks {name}")))
        };

        Ok(Self {
            action: action.to_string(),
            charset: input("sap-charset")?,
            secure_id: input("sap-wd-secure-id")?,
            app_name: input("fesrAppName")?,
            use_beacon: input("fesrUseBeacon")
                .map(|v| v == "true")
                .unwrap_or(false),
        })
    }
}

/// Maps HTTP status and logon-page markers to navigation errors.
pub(crate) fn check_response(resp: &PortalResponse, app_name: &str) -> Result<(), NavigationError> {
    match resp.status {
        404 => {
            return Err(NavigationError::NotFound {
                app: app_name.to_string(),
            })
        }
        401 | 403 => return Err(NavigationError::Rejected { status: resp.status }),
        s if !(200..300).contains(&s) => {
            return Err(TransportError::Status {
                url: resp.url.clone(),
                status: s,
            }
            .into())
        }
        _ => {}
    }
    if is_logon_page(&resp.text()) {
        return Err(NavigationError::SessionExpired);
    }
    Ok(())
}

pub fn is_logon_page(body: &str) -> bool {
    SESSION_EXPIRED_MARKERS.iter().any(|m| body.contains(m))
}

/// Server-side state of one bound module as the client sees it.
#[derive(Debug)]
pub struct ModuleContext {
    app_name: String,
    client_url: String,
    form: SsrForm,
    page: Page,
    round_trips: u64,
    stale: bool,
}

impl ModuleContext {
    /// Opens the application page and parses its SSR form. No events are sent.
    pub async fn load(
        transport: &dyn Transport,
        config: &PortalConfig,
        app_name: &str,
    ) -> Result<Self, NavigationError> {
        let url = config.application_url(app_name);
        debug!("navigating to module app={} url={}", app_name, url);
        let resp = transport.get(&url).await?;
        check_response(&resp, app_name)?;

        let html = resp.text().into_owned();
        let form = SsrForm::parse(&html, &resp.url)?;
        if form.app_name != app_name {
            warn!(
                "module app name mismatch expected={} got={}",
                app_name, form.app_name
            );
            return Err(NavigationError::Protocol(format!(
                "expected application {app_name}, portal served {}",
                form.app_name
            )));
        }
        info!(
            "module page loaded app={} secure_id={}",
            app_name, form.secure_id
        );

        Ok(Self {
            app_name: app_name.to_string(),
            client_url: format!("{url}#"),
            form,
            page: Page::new(html),
            round_trips: 0,
            stale: false,
        })
    }

    /// Sends the client capability notifications and loads the placeholder
    /// content, as a browser does right after the page arrives.
    pub async fn initialize(&mut self, transport: &dyn Transport) -> Result<(), NavigationError> {
        let domain = Url::parse(&self.form.action)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();
        let events = vec![
            Event::client_inspector_notify(CLIENT_INSPECTOR_WD01, INITIAL_CLIENT_DATA_WD01),
            Event::client_inspector_notify(CLIENT_INSPECTOR_WD02, INITIAL_CLIENT_DATA_WD02),
            Event::client_infos(CLIENT_INSPECTOR_WD01, &self.client_url, &domain),
            Event::loading_placeholder_load(LOADING_PLACEHOLDER),
        ];
        self.submit(transport, &events).await
    }

    /// Posts `events` plus the trailing form request and applies the returned update.
    pub async fn submit(
        &mut self,
        transport: &dyn Transport,
        events: &[Event],
    ) -> Result<(), NavigationError> {
        let queue = serialize_queue(events);
        let beacon = if self.form.use_beacon { "true" } else { "false" };
        let form = [
            ("sap-charset", self.form.charset.as_str()),
            ("sap-wd-secure-id", self.form.secure_id.as_str()),
            ("fesrAppName", self.form.app_name.as_str()),
            ("fesrUseBeacon", beacon),
            ("SAPEVENTQUEUE", queue.as_str()),
        ];
        let kinds = events.iter().map(Event::kind).collect::<Vec<_>>().join(",");
        debug!("submitting events app={} events=[{}]", self.app_name, kinds);

        let resp = transport.post_form(&self.form.action, &form).await?;
        check_response(&resp, &self.app_name)?;
        let update = parse_update(&resp.text())?;
        self.page.apply(update)?;
        self.round_trips += 1;
        Ok(())
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn form(&self) -> &SsrForm {
        &self.form
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn round_trips(&self) -> u64 {
        self.round_trips
    }

    /// A query has started modifying server state and has not finished.
    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    pub fn mark_clean(&mut self) {
        self.stale = false;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }
}
