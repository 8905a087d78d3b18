use scraper::ElementRef;

use super::document::{element_text, lsdata_value, normalize_text, selector};
use super::ParseError;
use crate::config::NO_DATA_MARKERS;

const ROW_TYPE_HEADER: &str = "2";
const LSDATA_ROW_COUNT: &str = "2";

/// Header labels and cell texts of one rendered table, rows in page order.
///
/// Long tables are rendered a window at a time; `row_count` is the size of
/// the whole table as the portal reports it, `rows` only what is on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub id: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub row_count: Option<usize>,
    /// Id of the first button in each row, parallel to `rows`.
    buttons: Vec<Option<String>>,
}

fn cell_texts(row: ElementRef<'_>) -> Result<Vec<String>, ParseError> {
    let sel = selector("[subct]").map_err(ParseError::from)?;
    let mut cells = Vec::new();
    for cell in row.select(&sel) {
        let text = element_text(cell);
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);
        for _ in 0..span {
            cells.push(text.clone());
        }
    }
    Ok(cells)
}

fn row_button(row: ElementRef<'_>) -> Result<Option<String>, ParseError> {
    let sel = selector("[ct=\"B\"]").map_err(ParseError::from)?;
    Ok(row
        .select(&sel)
        .next()
        .and_then(|b| b.value().attr("id"))
        .map(str::to_string))
}

fn is_header_row(row: ElementRef<'_>) -> Result<bool, ParseError> {
    let sel = selector("[subct=\"STHC\"]").map_err(ParseError::from)?;
    Ok(row.select(&sel).next().is_some())
}

impl Table {
    pub(crate) fn from_element(id: &str, el: ElementRef<'_>) -> Result<Self, ParseError> {
        let body_sel = selector(&format!("[id=\"{id}-contentTBody\"]")).map_err(ParseError::from)?;
        let body = el
            .select(&body_sel)
            .next()
            .ok_or_else(|| ParseError::table(id, "table has no content body"))?;

        let row_count = el
            .value()
            .attr("lsdata")
            .and_then(|lsdata| lsdata_value(lsdata, LSDATA_ROW_COUNT))
            .map(|raw| {
                raw.parse::<usize>()
                    .map_err(|_| ParseError::table(id, format!("bad row count {raw:?}")))
            })
            .transpose()?;

        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        let mut buttons = Vec::new();
        for row in body.children().filter_map(ElementRef::wrap) {
            if row.value().name() != "tr" {
                continue;
            }
            if row.value().attr("rt") == Some(ROW_TYPE_HEADER) || is_header_row(row)? {
                if headers.is_some() {
                    return Err(ParseError::table(id, "multiple header rows"));
                }
                headers = Some(cell_texts(row)?);
                continue;
            }
            // rr="0" marks the first padding row below the data
            if row.value().attr("rr") == Some("0") {
                break;
            }
            let cells = cell_texts(row)?;
            if cells.iter().all(|c| c.is_empty() || is_no_data(c)) {
                continue;
            }
            buttons.push(row_button(row)?);
            rows.push(cells);
        }

        let headers = headers.ok_or_else(|| ParseError::table(id, "table has no header row"))?;
        Ok(Self {
            id: id.to_string(),
            headers,
            rows,
            row_count,
            buttons,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, label: &str) -> Option<usize> {
        let wanted: String = label.chars().filter(|c| !c.is_whitespace()).collect();
        self.headers.iter().position(|h| {
            h.chars().filter(|c| !c.is_whitespace()).collect::<String>() == wanted
        })
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            table: self,
            index,
            cells,
            button: self.buttons.get(index).and_then(Option::as_deref),
        })
    }

    /// Whether rows beyond the rendered window exist.
    pub fn is_partial(&self) -> bool {
        self.row_count.is_some_and(|total| total > self.rows.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.rows.len()).filter_map(|i| self.row(i))
    }
}

fn is_no_data(text: &str) -> bool {
    let text = normalize_text(text);
    NO_DATA_MARKERS.iter().any(|m| text.contains(m))
}

/// One data row with label-based access to its cells.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    pub index: usize,
    cells: &'a [String],
    button: Option<&'a str>,
}

impl<'a> Row<'a> {
    /// Cell under `label`; `None` when the column is absent or the cell is blank.
    pub fn get(&self, label: &str) -> Option<&'a str> {
        let col = self.table.column(label)?;
        self.cells
            .get(col)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn required(&self, label: &str) -> Result<&'a str, ParseError> {
        match self.table.column(label) {
            None => Err(ParseError::field(self.index, label, "column missing")),
            Some(col) => self
                .cells
                .get(col)
                .map(String::as_str)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ParseError::field(self.index, label, "value missing")),
        }
    }

    /// Id of the row's button, such as a detail link.
    pub fn button(&self) -> Option<&'a str> {
        self.button
    }

    pub fn text(&self, label: &str) -> Option<String> {
        self.get(label).map(str::to_string)
    }

    pub fn number<T: std::str::FromStr>(&self, label: &str) -> Result<Option<T>, ParseError> {
        match self.get(label) {
            None => Ok(None),
            Some(raw) => parse_number(raw)
                .map(Some)
                .ok_or_else(|| ParseError::field(self.index, label, format!("not a number: {raw:?}"))),
        }
    }

    pub fn required_number<T: std::str::FromStr>(&self, label: &str) -> Result<T, ParseError> {
        let raw = self.required(label)?;
        parse_number(raw)
            .ok_or_else(|| ParseError::field(self.index, label, format!("not a number: {raw:?}")))
    }
}

pub(crate) fn parse_number<T: std::str::FromStr>(raw: &str) -> Option<T> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    cleaned.parse().ok()
}
