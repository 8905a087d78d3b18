// Mapping of table rows and summary fields into domain records.

use super::document::{normalize_text, Document};
use super::table::{parse_number, Row, Table};
use super::ParseError;
use crate::model::{
    ClassGrade, GradeSummary, Lecture, ScoreComponent, SemesterGrade, SemesterType,
};

/// Builds one record from a labelled table row.
pub trait FromRow: Sized {
    type Context;

    fn from_row(row: Row<'_>, ctx: &Self::Context) -> Result<Self, ParseError>;
}

/// Term a listing was requested for; the rows themselves do not repeat it.
#[derive(Debug, Clone, Copy)]
pub struct Term {
    pub year: u32,
    pub semester: SemesterType,
}

pub fn parse_records<T: FromRow>(table: &Table, ctx: &T::Context) -> Result<Vec<T>, ParseError> {
    table.iter().map(|row| T::from_row(row, ctx)).collect()
}

impl FromRow for Lecture {
    type Context = Term;

    fn from_row(row: Row<'_>, term: &Term) -> Result<Self, ParseError> {
        Ok(Lecture {
            year: term.year,
            semester: term.semester,
            code: row.required("과목번호")?.to_string(),
            name: row.required("과목명")?.to_string(),
            category: row.text("이수구분(주전공)"),
            sub_category: row.text("이수구분(다전공)"),
            syllabus: row.text("계획"),
            abeek_info: row.text("공학인증"),
            field: row.text("교과영역"),
            division: row.text("분반"),
            professor: row.text("교수명"),
            department: row.text("개설학과"),
            time_points: row.text("시간/학점(설계)"),
            personnel: row.number("수강인원")?,
            remaining_seats: row.number("여석")?,
            schedule_room: row.text("강의시간(강의실)"),
            target: row.text("수강대상"),
        })
    }
}

fn rank(row: &Row<'_>, label: &str) -> Result<Option<(u32, u32)>, ParseError> {
    let Some(raw) = row.get(label) else {
        return Ok(None);
    };
    let parsed = raw
        .split_once('/')
        .and_then(|(a, b)| Some((parse_number(a)?, parse_number(b)?)));
    parsed
        .map(Some)
        .ok_or_else(|| ParseError::field(row.index, label, format!("not a rank: {raw:?}")))
}

impl FromRow for SemesterGrade {
    type Context = ();

    fn from_row(row: Row<'_>, _: &()) -> Result<Self, ParseError> {
        let semester_text = row.required("학기")?;
        let semester = SemesterType::from_label(semester_text).ok_or_else(|| {
            ParseError::field(row.index, "학기", format!("unknown term {semester_text:?}"))
        })?;
        Ok(SemesterGrade {
            year: row.required_number("학년도")?,
            semester,
            attempted_credits: row.number("신청학점")?,
            earned_credits: row.number("취득학점")?,
            pf_earned_credits: row.number("P/F학점")?,
            grade_points_average: row.number("평점평균")?,
            grade_points_sum: row.number("평점계")?,
            arithmetic_mean: row.number("산술평균")?,
            semester_rank: rank(&row, "학기별석차")?,
            general_rank: rank(&row, "전체석차")?,
            academic_probation: row.get("학사경고").is_some(),
            consult: row.get("상담여부").is_some(),
            flunked: row.get("유급").is_some(),
        })
    }
}

impl FromRow for ClassGrade {
    type Context = Term;

    fn from_row(row: Row<'_>, term: &Term) -> Result<Self, ParseError> {
        // pass/fail classes carry a letter in the score column
        let score = match row.get("성적") {
            Some(raw) if raw.chars().all(|c| c.is_alphabetic()) => None,
            _ => row.number("성적")?,
        };
        Ok(ClassGrade {
            year: term.year,
            semester: term.semester,
            code: row.required("과목코드")?.to_string(),
            class_name: row.required("과목명")?.to_string(),
            grade_points: row.number("과목학점")?,
            score,
            rank: row.text("등급"),
            professor: row.text("교수명"),
        })
    }
}

pub fn parse_lectures(page: &str, table_id: &str, term: Term) -> Result<Vec<Lecture>, ParseError> {
    let table = Document::parse(page).table(table_id)?;
    parse_records(&table, &term)
}

pub fn parse_semester_grades(page: &str, table_id: &str) -> Result<Vec<SemesterGrade>, ParseError> {
    let table = Document::parse(page).table(table_id)?;
    parse_records(&table, &())
}

pub fn parse_class_grades(
    page: &str,
    table_id: &str,
    term: Term,
) -> Result<Vec<ClassGrade>, ParseError> {
    let table = Document::parse(page).table(table_id)?;
    parse_records(&table, &term)
}

// year, term, code and name precede the graded components
const DETAIL_IDENTITY_COLUMNS: usize = 4;

/// Score breakdown from a class detail table: every column after the class
/// identity, read from the single data row.
pub fn parse_score_components(table: &Table) -> Result<Vec<ScoreComponent>, ParseError> {
    let row = table
        .row(0)
        .ok_or_else(|| ParseError::table(&table.id, "detail table has no row"))?;
    table
        .headers
        .iter()
        .skip(DETAIL_IDENTITY_COLUMNS)
        .map(|label| {
            Ok(ScoreComponent {
                label: label.clone(),
                score: row.number(label)?,
            })
        })
        .collect()
}

/// Input field ids holding one variant of the grade summary.
#[derive(Debug, Clone, Copy)]
pub struct SummaryKind {
    pub attempted_credits: &'static str,
    pub earned_credits: &'static str,
    pub grade_points_sum: &'static str,
    pub grade_points_average: &'static str,
    pub arithmetic_mean: &'static str,
    pub pf_earned_credits: &'static str,
}

pub fn parse_summary(page: &str, kind: &SummaryKind) -> Result<GradeSummary, ParseError> {
    let doc = Document::parse(page);
    let field = |id: &str| -> Result<Option<f32>, ParseError> {
        match doc.input_value(id)? {
            None => Ok(None),
            Some(raw) => parse_number(&raw).map(Some).ok_or_else(|| ParseError {
                record_index: None,
                field: id.to_string(),
                detail: format!("not a number: {:?}", normalize_text(&raw)),
            }),
        }
    };
    Ok(GradeSummary {
        attempted_credits: field(kind.attempted_credits)?,
        earned_credits: field(kind.earned_credits)?,
        pf_earned_credits: field(kind.pf_earned_credits)?,
        grade_points_sum: field(kind.grade_points_sum)?,
        grade_points_average: field(kind.grade_points_average)?,
        arithmetic_mean: field(kind.arithmetic_mean)?,
    })
}
