// Typed lookups of Web Dynpro controls in a rendered page.

use scraper::{ElementRef, Html, Selector};

use super::table::Table;
use super::ParseError;
use crate::error::NavigationError;

/// Parsed snapshot of a page. Build one per screen state and drop it
/// before the next round trip.
pub struct Document {
    html: Html,
}

/// An entry of a combo box's item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub key: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboBox {
    pub id: String,
    /// Text currently shown in the field.
    pub value: Option<String>,
    pub items: Vec<ListItem>,
}

impl ComboBox {
    pub fn key_for_text(&self, text: &str) -> Option<&str> {
        let wanted = normalize_text(text);
        self.items
            .iter()
            .find(|item| normalize_text(&item.text) == wanted)
            .map(|item| item.key.as_str())
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.items.iter().any(|item| item.key == key)
    }

    /// Key of the item whose text is currently shown.
    pub fn selected_key(&self) -> Option<&str> {
        self.value.as_deref().and_then(|v| self.key_for_text(v))
    }

    /// Display texts in list order, blank placeholder entries excluded.
    pub fn texts(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|item| !item.text.is_empty())
            .map(|item| item.text.clone())
            .collect()
    }
}

pub(crate) fn selector(css: &str) -> Result<Selector, NavigationError> {
    Selector::parse(css).map_err(|e| NavigationError::Protocol(format!("selector {css}: {e}")))
}

/// Collapses runs of whitespace into one space and trims the ends.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    normalize_text(&el.text().collect::<String>())
}

/// Reads key `key` out of an `lsdata` attribute such as `{3:'LB_ID',4:'090'}`.
pub fn lsdata_value(lsdata: &str, key: &str) -> Option<String> {
    let body = lsdata.trim().strip_prefix('{')?.strip_suffix('}')?;
    let mut rest = body;
    while !rest.is_empty() {
        let (k, after_key) = rest.split_once(':')?;
        let after_key = after_key.trim_start();
        let (value, remaining) = if let Some(quoted) = after_key.strip_prefix('\'') {
            let mut out = String::new();
            let mut chars = quoted.char_indices();
            let mut end = None;
            while let Some((i, c)) = chars.next() {
                match c {
                    '\\' => {
                        if let Some((_, escaped)) = chars.next() {
                            out.push(escaped);
                        }
                    }
                    '\'' => {
                        end = Some(i + 1);
                        break;
                    }
                    other => out.push(other),
                }
            }
            let end = end?;
            (out, &quoted[end..])
        } else {
            let mut depth = 0i32;
            let mut cut = after_key.len();
            for (i, c) in after_key.char_indices() {
                match c {
                    '{' | '[' => depth += 1,
                    '}' | ']' => depth -= 1,
                    ',' if depth == 0 => {
                        cut = i;
                        break;
                    }
                    _ => {}
                }
            }
            (after_key[..cut].trim().to_string(), &after_key[cut..])
        };
        if k.trim() == key {
            return Some(value);
        }
        rest = remaining.trim_start().strip_prefix(',').unwrap_or("").trim_start();
    }
    None
}

impl Document {
    pub fn parse(page: &str) -> Self {
        Self {
            html: Html::parse_document(page),
        }
    }

    pub(crate) fn by_id(&self, id: &str) -> Result<Option<ElementRef<'_>>, NavigationError> {
        let sel = selector(&format!("[id=\"{id}\"]"))?;
        Ok(self.html.select(&sel).next())
    }

    fn require(&self, id: &str) -> Result<ElementRef<'_>, NavigationError> {
        self.by_id(id)?
            .ok_or_else(|| NavigationError::ElementMissing { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        matches!(self.by_id(id), Ok(Some(_)))
    }

    pub fn combo_box(&self, id: &str) -> Result<ComboBox, NavigationError> {
        let el = self.require(id)?;
        if el.value().attr("ct") != Some("CB") {
            return Err(NavigationError::Protocol(format!("{id} is not a combo box")));
        }
        let lsdata = el.value().attr("lsdata").unwrap_or("{}");
        let list_id = lsdata_value(lsdata, "3")
            .ok_or_else(|| NavigationError::Protocol(format!("combo box {id} has no item list")))?;
        let value = el
            .value()
            .attr("value")
            .map(normalize_text)
            .filter(|v| !v.is_empty());

        let item_sel = selector("[ct=\"LIB_I\"]")?;
        let items = match self.by_id(&list_id)? {
            Some(list) => list
                .select(&item_sel)
                .filter_map(|item| {
                    let key = item.value().attr("data-itemkey")?;
                    let text = item
                        .value()
                        .attr("data-itemvalue1")
                        .map(normalize_text)
                        .unwrap_or_else(|| element_text(item));
                    Some(ListItem {
                        key: key.to_string(),
                        text,
                    })
                })
                .collect(),
            None => Vec::new(),
        };

        Ok(ComboBox {
            id: id.to_string(),
            value,
            items,
        })
    }

    /// Value of an input field; `None` when the field is blank.
    pub fn input_value(&self, id: &str) -> Result<Option<String>, NavigationError> {
        let el = self.require(id)?;
        Ok(el
            .value()
            .attr("value")
            .map(normalize_text)
            .filter(|v| !v.is_empty()))
    }

    /// Ids of open popup windows, outermost first.
    pub fn popup_ids(&self) -> Result<Vec<String>, NavigationError> {
        let sel = selector("[ct=\"PW\"]")?;
        Ok(self
            .html
            .select(&sel)
            .filter_map(|el| el.value().attr("id").map(str::to_string))
            .collect())
    }

    pub fn table(&self, id: &str) -> Result<Table, ParseError> {
        let sel = selector(&format!("[ct=\"ST\"][id=\"{id}\"]")).map_err(ParseError::from)?;
        let el = self
            .html
            .select(&sel)
            .next()
            .ok_or_else(|| ParseError::table(id, "table not found on page"))?;
        Table::from_element(id, el)
    }

    /// First table rendered inside an open popup window.
    pub fn popup_table(&self) -> Result<Table, ParseError> {
        let sel = selector("[ct=\"PW\"] [ct=\"ST\"]").map_err(ParseError::from)?;
        let el = self
            .html
            .select(&sel)
            .next()
            .ok_or_else(|| ParseError::table("popup", "no table in an open popup"))?;
        let id = el
            .value()
            .attr("id")
            .ok_or_else(|| ParseError::table("popup", "popup table without id"))?;
        Table::from_element(id, el)
    }
}
