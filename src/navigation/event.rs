// Web Dynpro client events and the SAPEVENTQUEUE wire encoding.

use crate::config::SSR_FORM_ID;
use crate::error::NavigationError;

pub const EVENT_SEPARATOR: &str = "~E001";
pub const DATA_START: &str = "~E002";
pub const DATA_END: &str = "~E003";
pub const DATA_COLON: &str = "~E004";
pub const DATA_COMMA: &str = "~E005";

/// Escapes everything outside `[0-9A-Za-z._-]` as `~XXXX` UTF-16 code units.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_') {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("~{:04X}", unit));
            }
        }
    }
    out
}

pub fn unescape(text: &str) -> Result<String, NavigationError> {
    let mut units: Vec<u16> = Vec::with_capacity(text.len());
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if c == '~' {
            let hex = rest
                .get(1..5)
                .ok_or_else(|| NavigationError::Protocol(format!("truncated escape in {text:?}")))?;
            let unit = u16::from_str_radix(hex, 16)
                .map_err(|_| NavigationError::Protocol(format!("bad escape ~{hex}")))?;
            units.push(unit);
            rest = &rest[5..];
        } else {
            let mut buf = [0u16; 2];
            units.extend_from_slice(c.encode_utf16(&mut buf));
            rest = &rest[c.len_utf8()..];
        }
    }
    String::from_utf16(&units).map_err(|e| NavigationError::Protocol(e.to_string()))
}

/// Whether the client sends the queue right away or holds the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAction {
    Submit,
    Enqueue,
}

impl ClientAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Enqueue => "enqueue",
        }
    }
}

/// One UI event, e.g. `ComboBox_Select` on a given control id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    control: String,
    name: String,
    parameters: Vec<(String, String)>,
    action: Option<ClientAction>,
    delta_response: bool,
}

impl Event {
    pub fn new(control: &str, name: &str) -> Self {
        Self {
            control: control.to_string(),
            name: name.to_string(),
            parameters: Vec::new(),
            action: Some(ClientAction::Submit),
            delta_response: true,
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.parameters.push((key.to_string(), value.into()));
        self
    }

    pub fn action(mut self, action: Option<ClientAction>) -> Self {
        self.action = action;
        self
    }

    pub fn full_response(mut self) -> Self {
        self.delta_response = false;
        self
    }

    pub fn kind(&self) -> String {
        format!("{}_{}", self.control, self.name)
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_submit(&self) -> bool {
        self.action == Some(ClientAction::Submit)
    }

    pub fn serialize(&self) -> String {
        let mut out = self.kind();
        out.push_str(DATA_START);
        push_pairs(
            &mut out,
            self.parameters.iter().map(|(k, v)| (k.as_str(), escape(v))),
        );
        out.push_str(DATA_END);

        out.push_str(DATA_START);
        let mut ucf: Vec<(&str, String)> = Vec::with_capacity(2);
        if let Some(action) = self.action {
            ucf.push(("ClientAction", action.as_str().to_string()));
        }
        if self.delta_response {
            ucf.push(("ResponseData", "delta".to_string()));
        }
        push_pairs(&mut out, ucf.into_iter());
        out.push_str(DATA_END);

        // custom parameters are never used by the screens this crate drives
        out.push_str(DATA_START);
        out.push_str(DATA_END);
        out
    }

    pub fn combo_box_select(id: &str, key: &str) -> Self {
        Self::new("ComboBox", "Select")
            .param("Id", id)
            .param("Key", key)
            .param("ByEnter", "false")
    }

    pub fn combo_box_change(id: &str, value: &str) -> Self {
        Self::new("ComboBox", "Change")
            .param("Id", id)
            .param("Value", value)
            .action(Some(ClientAction::Enqueue))
    }

    pub fn input_field_change(id: &str, value: &str) -> Self {
        Self::new("InputField", "Change")
            .param("Id", id)
            .param("Value", value)
            .action(Some(ClientAction::Enqueue))
    }

    pub fn tab_select(id: &str, item_id: &str, index: u32) -> Self {
        Self::new("TabStrip", "TabSelect")
            .param("Id", id)
            .param("ItemId", item_id)
            .param("ItemIndex", index.to_string())
            .param("FirstVisibleItemIndex", "0")
    }

    pub fn button_press(id: &str) -> Self {
        Self::new("Button", "Press").param("Id", id)
    }

    /// Scrolls a table so that row `first_visible` (0-based) is at the top.
    pub fn sap_table_vertical_scroll(id: &str, first_visible: usize) -> Self {
        Self::new("SapTable", "VerticalScroll")
            .param("Id", id)
            .param("FirstVisibleItemIndex", first_visible.to_string())
            .param("CellId", "")
            .param("AccessType", "SCROLLBAR")
            .param("SelectionFollowFocus", "false")
            .param("Shift", "false")
            .param("Ctrl", "false")
            .param("Alt", "false")
    }

    pub fn popup_close(id: &str) -> Self {
        Self::new("PopupWindow", "Close").param("Id", id)
    }

    pub fn client_inspector_notify(id: &str, data: &str) -> Self {
        Self::new("ClientInspector", "Notify")
            .param("Id", id)
            .param("Data", data)
            .action(Some(ClientAction::Enqueue))
    }

    pub fn client_infos(id: &str, client_url: &str, document_domain: &str) -> Self {
        Self::new("Custom", "ClientInfos")
            .param("Id", id)
            .param("WindowOpenerExists", "false")
            .param("ClientURL", client_url)
            .param("ClientWidth", "1920")
            .param("ClientHeight", "1000")
            .param("DocumentDomain", document_domain)
            .action(Some(ClientAction::Enqueue))
    }

    pub fn loading_placeholder_load(id: &str) -> Self {
        Self::new("LoadingPlaceHolder", "Load")
            .param("Id", id)
            .full_response()
    }

    /// Trailing event of every queue; tells the server which control had focus.
    pub fn form_request(focused_id: Option<&str>) -> Self {
        let focus = focused_id
            .map(|id| format!("@{{\"sFocussedId\":\"{id}\"}}"))
            .unwrap_or_default();
        Self::new("Form", "Request")
            .param("Id", SSR_FORM_ID)
            .param("Async", "false")
            .param("FocusInfo", focus)
            .param("Hash", "")
            .param("DomChanged", "false")
            .param("IsDirty", "false")
            .action(None)
    }
}

fn push_pairs<'a>(out: &mut String, pairs: impl Iterator<Item = (&'a str, String)>) {
    let mut first = true;
    for (key, value) in pairs {
        if !first {
            out.push_str(DATA_COMMA);
        }
        first = false;
        out.push_str(key);
        out.push_str(DATA_COLON);
        out.push_str(&value);
    }
}

/// Serializes `events` followed by a form request focused on the last control.
pub fn serialize_queue(events: &[Event]) -> String {
    let focused = events.last().and_then(|e| e.parameter("Id"));
    let form = Event::form_request(focused);
    events
        .iter()
        .chain(std::iter::once(&form))
        .map(Event::serialize)
        .collect::<Vec<_>>()
        .join(EVENT_SEPARATOR)
}

/// Decoded form of one queued event, used to inspect queues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedEvent {
    pub kind: String,
    pub parameters: Vec<(String, String)>,
}

impl QueuedEvent {
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Splits a SAPEVENTQUEUE value back into events. Only the first
/// parameter group of each event is decoded.
pub fn parse_queue(queue: &str) -> Result<Vec<QueuedEvent>, NavigationError> {
    queue
        .split(EVENT_SEPARATOR)
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            let (kind, rest) = raw
                .split_once(DATA_START)
                .ok_or_else(|| NavigationError::Protocol(format!("event without data: {raw}")))?;
            let (params, _) = rest
                .split_once(DATA_END)
                .ok_or_else(|| NavigationError::Protocol(format!("unterminated event: {raw}")))?;
            let mut parameters = Vec::new();
            for pair in params.split(DATA_COMMA).filter(|p| !p.is_empty()) {
                let (k, v) = pair.split_once(DATA_COLON).unwrap_or((pair, ""));
                parameters.push((k.to_string(), unescape(v)?));
            }
            Ok(QueuedEvent {
                kind: kind.to_string(),
                parameters,
            })
        })
        .collect()
}
