// Current HTML of a module screen and in-place application of page updates.

use std::borrow::Cow;
use std::cell::Cell;

use lol_html::html_content::ContentType;
use lol_html::{rewrite_str, ElementContentHandlers, RewriteStrSettings, Selector};
use tracing::warn;

use super::update::PageUpdate;
use crate::error::NavigationError;

/// Raw HTML of the screen as the portal currently renders it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    html: String,
}

fn id_selector(ids: &[&str]) -> Result<Selector, NavigationError> {
    let css = ids
        .iter()
        .map(|id| format!(r#"[id="{}"]"#, id.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect::<Vec<_>>()
        .join(" ");
    css.parse()
        .map_err(|e| NavigationError::Protocol(format!("unusable element id in {css}: {e}")))
}

impl Page {
    pub fn new(html: String) -> Self {
        Self { html }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Splices `update` into the page. Full updates replace the inner content
    /// of the content element; delta updates replace each control found under
    /// the window root. Targets the page lacks are skipped.
    pub fn apply(&mut self, update: PageUpdate) -> Result<(), NavigationError> {
        let output = match update {
            PageUpdate::Full {
                content_id, html, ..
            } => {
                let hit = Cell::new(false);
                let handlers = vec![(
                    Cow::Owned(id_selector(&[&content_id])?),
                    ElementContentHandlers::default().element(|el| {
                        el.set_inner_content(&html, ContentType::Html);
                        hit.set(true);
                        Ok(())
                    }),
                )];
                let output = rewrite(&self.html, handlers)?;
                if !hit.get() {
                    warn!("full update target missing id={}", content_id);
                    return Ok(());
                }
                output
            }
            PageUpdate::Delta {
                window_id,
                controls,
            } => {
                let root = format!("{window_id}_root_");
                let hits = vec![Cell::new(false); controls.len()];
                let mut handlers = Vec::with_capacity(controls.len());
                for ((id, html), hit) in controls.iter().zip(&hits) {
                    handlers.push((
                        Cow::Owned(id_selector(&[&root, id])?),
                        ElementContentHandlers::default().element(move |el| {
                            el.replace(html, ContentType::Html);
                            hit.set(true);
                            Ok(())
                        }),
                    ));
                }
                let output = rewrite(&self.html, handlers)?;
                for ((id, _), hit) in controls.iter().zip(&hits) {
                    if !hit.get() {
                        warn!("delta update for unknown control id={} root={}", id, root);
                    }
                }
                output
            }
        };
        self.html = output;
        Ok(())
    }
}

fn rewrite<'h>(
    html: &str,
    element_content_handlers: Vec<(Cow<'h, Selector>, ElementContentHandlers<'h>)>,
) -> Result<String, NavigationError> {
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers,
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| NavigationError::Protocol(format!("page update failed: {e}")))
}
