// Parsing of the XML page updates returned for submitted event queues.

use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;
use tracing::debug;

use crate::error::NavigationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageUpdate {
    /// Replaces the inner content of the element `content_id`.
    Full {
        window_id: String,
        content_id: String,
        html: String,
    },
    /// Replaces each listed control, `(control_id, html)`, in document order.
    Delta {
        window_id: String,
        controls: Vec<(String, String)>,
    },
}

#[derive(PartialEq, Eq)]
enum Capture {
    None,
    FullContent,
    ControlContent,
}

fn attr(e: &quick_xml::events::BytesStart<'_>, name: &str) -> Result<Option<String>, NavigationError> {
    let found = e
        .try_get_attribute(name)
        .map_err(|err| NavigationError::Protocol(format!("bad attribute {name}: {err}")))?;
    found
        .map(|a| {
            a.unescape_value()
                .map(|v| v.into_owned())
                .map_err(|err| NavigationError::Protocol(format!("bad attribute {name}: {err}")))
        })
        .transpose()
}

fn required_attr(
    e: &quick_xml::events::BytesStart<'_>,
    node: &str,
    name: &str,
) -> Result<String, NavigationError> {
    attr(e, name)?.ok_or_else(|| NavigationError::Protocol(format!("<{node}> without {name}")))
}

fn resolve_entity(name: &str) -> Option<String> {
    let resolved = match name {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)?
        }
    };
    Some(resolved.to_string())
}

pub fn parse_update(xml: &str) -> Result<PageUpdate, NavigationError> {
    let mut reader = Reader::from_str(xml);

    let mut update: Option<PageUpdate> = None;
    let mut capture = Capture::None;
    let mut control_id: Option<String> = None;
    let mut buffer = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| NavigationError::Protocol(format!("malformed update xml: {e}")))?;
        match event {
            XmlEvent::Start(e) => match e.name().as_ref() {
                b"full-update" => {
                    update = Some(PageUpdate::Full {
                        window_id: required_attr(&e, "full-update", "windowid")?,
                        content_id: String::new(),
                        html: String::new(),
                    });
                }
                b"delta-update" => {
                    update = Some(PageUpdate::Delta {
                        window_id: required_attr(&e, "delta-update", "windowid")?,
                        controls: Vec::new(),
                    });
                }
                b"content-update" => {
                    let id = required_attr(&e, "content-update", "id")?;
                    match update.as_mut() {
                        Some(PageUpdate::Full { content_id, .. }) => *content_id = id,
                        _ => {
                            return Err(NavigationError::Protocol(
                                "<content-update> outside <full-update>".into(),
                            ))
                        }
                    }
                    capture = Capture::FullContent;
                    buffer.clear();
                }
                b"control-update" => {
                    control_id = Some(required_attr(&e, "control-update", "id")?);
                }
                b"content" if control_id.is_some() => {
                    capture = Capture::ControlContent;
                    buffer.clear();
                }
                other => {
                    if capture == Capture::None && other != b"updates" {
                        debug!(
                            "ignoring page update element {}",
                            String::from_utf8_lossy(other)
                        );
                    }
                }
            },
            XmlEvent::Text(t) if capture != Capture::None => {
                buffer.push_str(&String::from_utf8_lossy(&t));
            }
            XmlEvent::CData(c) if capture != Capture::None => {
                buffer.push_str(&String::from_utf8_lossy(&c));
            }
            XmlEvent::GeneralRef(r) if capture != Capture::None => {
                let name = String::from_utf8_lossy(&r).into_owned();
                let resolved = resolve_entity(&name)
                    .ok_or_else(|| NavigationError::Protocol(format!("unknown entity &{name};")))?;
                buffer.push_str(&resolved);
            }
            XmlEvent::End(e) => match e.name().as_ref() {
                b"content-update" if capture == Capture::FullContent => {
                    if let Some(PageUpdate::Full { html, .. }) = update.as_mut() {
                        *html = std::mem::take(&mut buffer);
                    }
                    capture = Capture::None;
                }
                b"content" if capture == Capture::ControlContent => {
                    capture = Capture::None;
                    if let (Some(PageUpdate::Delta { controls, .. }), Some(id)) =
                        (update.as_mut(), control_id.clone())
                    {
                        controls.push((id, std::mem::take(&mut buffer)));
                    }
                }
                b"control-update" => control_id = None,
                _ => {}
            },
            XmlEvent::Eof => break,
            _ => {}
        }
    }

    update.ok_or_else(|| NavigationError::Protocol("response carries no page update".into()))
}
