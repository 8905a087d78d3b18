// Domain records and the closed selector enums shared by queries and parsers.

pub mod grades;
pub mod lecture;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::QueryError;

pub use grades::{ClassGrade, GradeSummary, ScoreComponent, SemesterGrade};
pub use lecture::Lecture;

/// Term slot within an academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SemesterType {
    One,
    Summer,
    Two,
    Winter,
}

impl SemesterType {
    pub const ALL: [SemesterType; 4] = [Self::One, Self::Summer, Self::Two, Self::Winter];

    /// Key the portal uses for this term in its period combo box.
    pub fn key(self) -> &'static str {
        match self {
            Self::One => "090",
            Self::Summer => "091",
            Self::Two => "092",
            Self::Winter => "093",
        }
    }

    /// Label shown in grade tables.
    pub fn label(self) -> &'static str {
        match self {
            Self::One => "1 학기",
            Self::Summer => "여름학기",
            Self::Two => "2 학기",
            Self::Winter => "겨울학기",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key.trim())
    }

    /// Maps a term cell from the grades table. Accepts both the label and the key.
    pub fn from_label(text: &str) -> Option<Self> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        match compact.as_str() {
            "1학기" | "090" => Some(Self::One),
            "여름학기" | "091" => Some(Self::Summer),
            "2학기" | "092" => Some(Self::Two),
            "겨울학기" | "093" => Some(Self::Winter),
            _ => None,
        }
    }
}

impl fmt::Display for SemesterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SemesterType {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s)
            .or_else(|| Self::from_label(s))
            .ok_or_else(|| QueryError::InvalidSelection {
                dimension: "semester",
                value: s.to_string(),
            })
    }
}

/// Degree program a grade record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CourseType {
    Phd,
    Master,
    PhdIntegrated,
    Research,
    Bachelor,
}

impl CourseType {
    pub const ALL: [CourseType; 5] = [
        Self::Phd,
        Self::Master,
        Self::PhdIntegrated,
        Self::Research,
        Self::Bachelor,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Phd => "DR",
            Self::Master => "MA",
            Self::PhdIntegrated => "MP",
            Self::Research => "RE",
            Self::Bachelor => "UG",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key.trim())
    }
}

impl fmt::Display for CourseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CourseType {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| QueryError::InvalidSelection {
            dimension: "course_type",
            value: s.to_string(),
        })
    }
}
