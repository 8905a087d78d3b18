use serde::Serialize;

use super::SemesterType;

/// Credit and GPA totals shown at the top of the grades screen.
///
/// The portal renders two variants: grades recorded in the student's
/// academic record, and grades as they appear on issued certificates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeSummary {
    pub attempted_credits: Option<f32>,
    pub earned_credits: Option<f32>,
    pub pf_earned_credits: Option<f32>,
    pub grade_points_sum: Option<f32>,
    pub grade_points_average: Option<f32>,
    pub arithmetic_mean: Option<f32>,
}

/// Per-term totals, one row of the semester table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemesterGrade {
    pub year: u32,
    pub semester: SemesterType,
    pub attempted_credits: Option<f32>,
    pub earned_credits: Option<f32>,
    pub pf_earned_credits: Option<f32>,
    pub grade_points_average: Option<f32>,
    pub grade_points_sum: Option<f32>,
    pub arithmetic_mean: Option<f32>,
    /// Rank within the term as `(rank, of)`.
    pub semester_rank: Option<(u32, u32)>,
    pub general_rank: Option<(u32, u32)>,
    pub academic_probation: bool,
    pub consult: bool,
    pub flunked: bool,
}

/// One class in a term's grade listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassGrade {
    pub year: u32,
    pub semester: SemesterType,
    pub code: String,
    pub class_name: String,
    pub grade_points: Option<f32>,
    /// Numeric score, or `None` for pass/fail classes and unreleased grades.
    pub score: Option<f32>,
    /// Letter rank such as `A+` or `P`.
    pub rank: Option<String>,
    pub professor: Option<String>,
}

/// One graded component of a class, such as an exam, from the detail popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    /// Component name with its weight, e.g. `중간고사(30.000)`.
    pub label: String,
    /// `None` while the component is not graded.
    pub score: Option<f32>,
}
