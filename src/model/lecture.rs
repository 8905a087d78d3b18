use serde::Serialize;

use super::SemesterType;

/// One row of the course schedule listing.
///
/// `year` and `semester` come from the query that produced the row; every
/// other field is read from the portal. Columns the portal left blank or did
/// not render are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lecture {
    pub year: u32,
    pub semester: SemesterType,
    /// Course number (과목번호).
    pub code: String,
    /// Course title (과목명).
    pub name: String,
    /// Completion category for the primary major (이수구분(주전공)).
    pub category: Option<String>,
    /// Completion category for secondary majors (이수구분(다전공)).
    pub sub_category: Option<String>,
    /// Syllabus marker (계획).
    pub syllabus: Option<String>,
    /// Engineering accreditation (공학인증).
    pub abeek_info: Option<String>,
    /// Liberal arts field (교과영역).
    pub field: Option<String>,
    /// Class division (분반).
    pub division: Option<String>,
    pub professor: Option<String>,
    /// Offering department (개설학과).
    pub department: Option<String>,
    /// Hours and credits, design credits in parentheses (시간/학점(설계)).
    pub time_points: Option<String>,
    /// Enrolled students (수강인원).
    pub personnel: Option<u32>,
    /// Remaining seats (여석).
    pub remaining_seats: Option<u32>,
    /// Meeting times and rooms (강의시간(강의실)).
    pub schedule_room: Option<String>,
    /// Eligible students (수강대상).
    pub target: Option<String>,
}
