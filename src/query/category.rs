// Lecture categories of the schedule screen and their validating builder.

use serde::Serialize;

use crate::error::QueryError;

/// Which tab of the schedule screen a category searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CategoryKind {
    Major,
    RequiredElective,
    OptionalElective,
    Chapel,
    Education,
    Graduated,
    ConnectedMajor,
    UnitedMajor,
    FindByProfessor,
    FindByLecture,
    RecognizedOtherMajor,
    Cyber,
}

/// A category selection. Queries only accept categories that pass
/// [`validate`](Self::validate).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum LectureCategory {
    Major {
        college: String,
        department: String,
        major: Option<String>,
    },
    RequiredElective {
        lecture_name: String,
    },
    OptionalElective {
        field: String,
    },
    Chapel {
        lecture_name: String,
    },
    Education,
    Graduated {
        college: String,
        department: String,
    },
    ConnectedMajor {
        program: String,
    },
    UnitedMajor {
        program: String,
    },
    FindByProfessor {
        keyword: String,
    },
    FindByLecture {
        keyword: String,
    },
    RecognizedOtherMajor {
        college: String,
        department: String,
        major: Option<String>,
    },
    Cyber,
}

impl LectureCategory {
    pub fn major(college: &str, department: &str, major: Option<&str>) -> Self {
        Self::Major {
            college: college.to_string(),
            department: department.to_string(),
            major: major.map(str::to_string),
        }
    }

    pub fn required_elective(lecture_name: &str) -> Self {
        Self::RequiredElective {
            lecture_name: lecture_name.to_string(),
        }
    }

    pub fn optional_elective(field: &str) -> Self {
        Self::OptionalElective {
            field: field.to_string(),
        }
    }

    pub fn chapel(lecture_name: &str) -> Self {
        Self::Chapel {
            lecture_name: lecture_name.to_string(),
        }
    }

    pub fn education() -> Self {
        Self::Education
    }

    pub fn graduated(college: &str, department: &str) -> Self {
        Self::Graduated {
            college: college.to_string(),
            department: department.to_string(),
        }
    }

    pub fn connected_major(program: &str) -> Self {
        Self::ConnectedMajor {
            program: program.to_string(),
        }
    }

    pub fn united_major(program: &str) -> Self {
        Self::UnitedMajor {
            program: program.to_string(),
        }
    }

    pub fn find_by_professor(keyword: &str) -> Self {
        Self::FindByProfessor {
            keyword: keyword.to_string(),
        }
    }

    pub fn find_by_lecture(keyword: &str) -> Self {
        Self::FindByLecture {
            keyword: keyword.to_string(),
        }
    }

    pub fn recognized_other_major(college: &str, department: &str, major: Option<&str>) -> Self {
        Self::RecognizedOtherMajor {
            college: college.to_string(),
            department: department.to_string(),
            major: major.map(str::to_string),
        }
    }

    pub fn cyber() -> Self {
        Self::Cyber
    }

    pub fn kind(&self) -> CategoryKind {
        match self {
            Self::Major { .. } => CategoryKind::Major,
            Self::RequiredElective { .. } => CategoryKind::RequiredElective,
            Self::OptionalElective { .. } => CategoryKind::OptionalElective,
            Self::Chapel { .. } => CategoryKind::Chapel,
            Self::Education => CategoryKind::Education,
            Self::Graduated { .. } => CategoryKind::Graduated,
            Self::ConnectedMajor { .. } => CategoryKind::ConnectedMajor,
            Self::UnitedMajor { .. } => CategoryKind::UnitedMajor,
            Self::FindByProfessor { .. } => CategoryKind::FindByProfessor,
            Self::FindByLecture { .. } => CategoryKind::FindByLecture,
            Self::RecognizedOtherMajor { .. } => CategoryKind::RecognizedOtherMajor,
            Self::Cyber => CategoryKind::Cyber,
        }
    }

    pub fn builder() -> LectureCategoryBuilder {
        LectureCategoryBuilder::default()
    }

    /// Text selections carried by this category, by dimension.
    fn selections(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Major {
                college,
                department,
                major,
            }
            | Self::RecognizedOtherMajor {
                college,
                department,
                major,
            } => {
                let mut out = vec![
                    ("college", college.as_str()),
                    ("department", department.as_str()),
                ];
                out.extend(major.as_deref().map(|m| ("major", m)));
                out
            }
            Self::Graduated {
                college,
                department,
            } => vec![("college", college.as_str()), ("department", department.as_str())],
            Self::RequiredElective { lecture_name } | Self::Chapel { lecture_name } => {
                vec![("lecture_name", lecture_name.as_str())]
            }
            Self::OptionalElective { field } => vec![("field", field.as_str())],
            Self::ConnectedMajor { program } | Self::UnitedMajor { program } => {
                vec![("program", program.as_str())]
            }
            Self::FindByProfessor { keyword } | Self::FindByLecture { keyword } => {
                vec![("keyword", keyword.as_str())]
            }
            Self::Education | Self::Cyber => Vec::new(),
        }
    }

    /// Rejects blank selections. Categories built through the constructors
    /// or variants directly are checked here before a query accepts them.
    pub fn validate(&self) -> Result<(), QueryError> {
        match self.selections().into_iter().find(|(_, v)| v.trim().is_empty()) {
            Some((dimension, value)) => Err(QueryError::InvalidSelection {
                dimension,
                value: value.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Accumulates category selections; nothing is checked until [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct LectureCategoryBuilder {
    kind: Option<CategoryKind>,
    college: Option<String>,
    department: Option<String>,
    major: Option<String>,
    lecture_name: Option<String>,
    field: Option<String>,
    program: Option<String>,
    keyword: Option<String>,
}

impl LectureCategoryBuilder {
    pub fn kind(mut self, kind: CategoryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn college(mut self, college: &str) -> Self {
        self.college = Some(college.to_string());
        self
    }

    /// Requires [`college`](Self::college).
    pub fn department(mut self, department: &str) -> Self {
        self.department = Some(department.to_string());
        self
    }

    /// Requires [`department`](Self::department).
    pub fn major(mut self, major: &str) -> Self {
        self.major = Some(major.to_string());
        self
    }

    pub fn lecture_name(mut self, name: &str) -> Self {
        self.lecture_name = Some(name.to_string());
        self
    }

    pub fn field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    /// Connected or united major program name.
    pub fn program(mut self, program: &str) -> Self {
        self.program = Some(program.to_string());
        self
    }

    pub fn keyword(mut self, keyword: &str) -> Self {
        self.keyword = Some(keyword.to_string());
        self
    }

    pub fn build(self) -> Result<LectureCategory, QueryError> {
        // parent checks come first so the outcome does not depend on which
        // other fields were set
        if self.major.is_some() && self.department.is_none() {
            return Err(QueryError::IncompleteSelection {
                missing: "department",
            });
        }
        if self.department.is_some() && self.college.is_none() {
            return Err(QueryError::IncompleteSelection { missing: "college" });
        }
        let kind = self
            .kind
            .ok_or(QueryError::IncompleteSelection { missing: "kind" })?;

        let Self {
            college,
            department,
            major,
            lecture_name,
            field,
            program,
            keyword,
            ..
        } = self;

        let allowed: &[&str] = match kind {
            CategoryKind::Major | CategoryKind::RecognizedOtherMajor => {
                &["college", "department", "major"]
            }
            CategoryKind::Graduated => &["college", "department"],
            CategoryKind::RequiredElective | CategoryKind::Chapel => &["lecture_name"],
            CategoryKind::OptionalElective => &["field"],
            CategoryKind::ConnectedMajor | CategoryKind::UnitedMajor => &["program"],
            CategoryKind::FindByProfessor | CategoryKind::FindByLecture => &["keyword"],
            CategoryKind::Education | CategoryKind::Cyber => &[],
        };
        let supplied = [
            ("college", &college),
            ("department", &department),
            ("major", &major),
            ("lecture_name", &lecture_name),
            ("field", &field),
            ("program", &program),
            ("keyword", &keyword),
        ];
        for (dimension, value) in supplied {
            if let Some(value) = value {
                if !allowed.contains(&dimension) {
                    return Err(QueryError::InvalidSelection {
                        dimension,
                        value: value.clone(),
                    });
                }
                if value.trim().is_empty() {
                    return Err(QueryError::InvalidSelection {
                        dimension,
                        value: value.clone(),
                    });
                }
            }
        }

        let need = |value: Option<String>, missing: &'static str| {
            value.ok_or(QueryError::IncompleteSelection { missing })
        };

        Ok(match kind {
            CategoryKind::Major => LectureCategory::Major {
                college: need(college, "college")?,
                department: need(department, "department")?,
                major,
            },
            CategoryKind::RecognizedOtherMajor => LectureCategory::RecognizedOtherMajor {
                college: need(college, "college")?,
                department: need(department, "department")?,
                major,
            },
            CategoryKind::Graduated => LectureCategory::Graduated {
                college: need(college, "college")?,
                department: need(department, "department")?,
            },
            CategoryKind::RequiredElective => LectureCategory::RequiredElective {
                lecture_name: need(lecture_name, "lecture_name")?,
            },
            CategoryKind::Chapel => LectureCategory::Chapel {
                lecture_name: need(lecture_name, "lecture_name")?,
            },
            CategoryKind::OptionalElective => LectureCategory::OptionalElective {
                field: need(field, "field")?,
            },
            CategoryKind::ConnectedMajor => LectureCategory::ConnectedMajor {
                program: need(program, "program")?,
            },
            CategoryKind::UnitedMajor => LectureCategory::UnitedMajor {
                program: need(program, "program")?,
            },
            CategoryKind::FindByProfessor => LectureCategory::FindByProfessor {
                keyword: need(keyword, "keyword")?,
            },
            CategoryKind::FindByLecture => LectureCategory::FindByLecture {
                keyword: need(keyword, "keyword")?,
            },
            CategoryKind::Education => LectureCategory::Education,
            CategoryKind::Cyber => LectureCategory::Cyber,
        })
    }
}
