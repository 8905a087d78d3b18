use serde::Serialize;

use super::category::LectureCategory;
use crate::config::{MAX_YEAR, MIN_YEAR};
use crate::error::QueryError;
use crate::model::{CourseType, SemesterType};

fn check_year(year: u32) -> Result<u32, QueryError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(QueryError::InvalidSelection {
            dimension: "year",
            value: year.to_string(),
        })
    }
}

fn semester_from_key(key: &str) -> Result<SemesterType, QueryError> {
    SemesterType::from_key(key).ok_or_else(|| QueryError::InvalidSelection {
        dimension: "semester",
        value: key.to_string(),
    })
}

/// Lecture search for one term and category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleQuery {
    year: u32,
    semester: SemesterType,
    category: LectureCategory,
}

impl ScheduleQuery {
    pub fn builder() -> ScheduleQueryBuilder {
        ScheduleQueryBuilder::default()
    }

    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn semester(&self) -> SemesterType {
        self.semester
    }

    pub fn category(&self) -> &LectureCategory {
        &self.category
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleQueryBuilder {
    year: Option<u32>,
    semester: Option<SemesterType>,
    category: Option<LectureCategory>,
}

impl ScheduleQueryBuilder {
    pub fn year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn semester(mut self, semester: SemesterType) -> Self {
        self.semester = Some(semester);
        self
    }

    /// Sets the term from its portal key (`"090"`..`"093"`); any other key is rejected here.
    pub fn semester_key(mut self, key: &str) -> Result<Self, QueryError> {
        self.semester = Some(semester_from_key(key)?);
        Ok(self)
    }

    pub fn category(mut self, category: LectureCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn build(self) -> Result<ScheduleQuery, QueryError> {
        let year = self
            .year
            .ok_or(QueryError::IncompleteSelection { missing: "year" })?;
        let semester = self
            .semester
            .ok_or(QueryError::IncompleteSelection { missing: "semester" })?;
        let category = self
            .category
            .ok_or(QueryError::IncompleteSelection { missing: "category" })?;
        category.validate()?;
        Ok(ScheduleQuery {
            year: check_year(year)?,
            semester,
            category,
        })
    }
}

/// Grade lookup for a degree program, optionally narrowed to one term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradesQuery {
    course_type: CourseType,
    term: Option<(u32, SemesterType)>,
}

impl GradesQuery {
    pub fn builder() -> GradesQueryBuilder {
        GradesQueryBuilder::default()
    }

    pub fn course_type(&self) -> CourseType {
        self.course_type
    }

    pub fn term(&self) -> Option<(u32, SemesterType)> {
        self.term
    }
}

#[derive(Debug, Clone, Default)]
pub struct GradesQueryBuilder {
    course_type: Option<CourseType>,
    year: Option<u32>,
    semester: Option<SemesterType>,
}

impl GradesQueryBuilder {
    pub fn course_type(mut self, course_type: CourseType) -> Self {
        self.course_type = Some(course_type);
        self
    }

    /// Sets the program from its portal key (`"UG"`, `"MA"`, ...).
    pub fn course_type_key(mut self, key: &str) -> Result<Self, QueryError> {
        let course_type = CourseType::from_key(key).ok_or_else(|| QueryError::InvalidSelection {
            dimension: "course_type",
            value: key.to_string(),
        })?;
        self.course_type = Some(course_type);
        Ok(self)
    }

    pub fn year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    /// Requires [`year`](Self::year).
    pub fn semester(mut self, semester: SemesterType) -> Self {
        self.semester = Some(semester);
        self
    }

    pub fn semester_key(mut self, key: &str) -> Result<Self, QueryError> {
        self.semester = Some(semester_from_key(key)?);
        Ok(self)
    }

    pub fn build(self) -> Result<GradesQuery, QueryError> {
        let term = match (self.year, self.semester) {
            (Some(year), Some(semester)) => Some((check_year(year)?, semester)),
            (None, Some(_)) => return Err(QueryError::IncompleteSelection { missing: "year" }),
            (Some(_), None) => {
                return Err(QueryError::IncompleteSelection {
                    missing: "semester",
                })
            }
            (None, None) => None,
        };
        let course_type = self
            .course_type
            .ok_or(QueryError::IncompleteSelection {
                missing: "course_type",
            })?;
        Ok(GradesQuery { course_type, term })
    }
}
