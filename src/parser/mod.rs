pub mod document;
pub mod records;
pub mod table;

use thiserror::Error;

use crate::error::{NavigationError, QueryError};

pub use document::{ComboBox, Document, ListItem};
pub use records::{
    parse_class_grades, parse_lectures, parse_records, parse_score_components,
    parse_semester_grades, parse_summary, FromRow, SummaryKind, Term,
};
pub use table::{Row, Table};

/// A page did not have the shape a record mapping expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse {field} (record {record_index:?}): {detail}")]
pub struct ParseError {
    pub record_index: Option<usize>,
    pub field: String,
    pub detail: String,
}

impl ParseError {
    pub fn field(record_index: usize, field: &str, detail: impl Into<String>) -> Self {
        Self {
            record_index: Some(record_index),
            field: field.to_string(),
            detail: detail.into(),
        }
    }

    pub fn table(id: &str, detail: impl Into<String>) -> Self {
        Self {
            record_index: None,
            field: id.to_string(),
            detail: detail.into(),
        }
    }
}

impl From<NavigationError> for ParseError {
    fn from(e: NavigationError) -> Self {
        let field = match &e {
            NavigationError::ElementMissing { id } => id.clone(),
            _ => "page".to_string(),
        };
        Self {
            record_index: None,
            field,
            detail: e.to_string(),
        }
    }
}

impl From<ParseError> for QueryError {
    fn from(e: ParseError) -> Self {
        QueryError::ParseFailure {
            record_index: e.record_index,
            field: e.field,
            detail: e.detail,
        }
    }
}
