// Grade history screen (ZCMB3W0017). Requires an authenticated session.

use async_trait::async_trait;
use tracing::info;

use super::{Application, ModuleKind, PortalModule, Screen};
use crate::error::{BindError, QueryError};
use crate::model::{
    ClassGrade, CourseType, GradeSummary, ScoreComponent, SemesterGrade, SemesterType,
};
use crate::navigation::Event;
use crate::parser::{parse_score_components, parse_summary, Document, SummaryKind, Term};
use crate::query::GradesQuery;
use crate::session::Session;

const SEMESTER_TABLE: &str = "ZCMB3W0017.ID_0001:VIW_MAIN.TABLE";
const CLASS_TABLE: &str = "ZCMB3W0017.ID_0001:VIW_MAIN.TABLE_1";
const COURSE_TYPE: &str = "ZCMB3W0017.ID_0001:VIW_MAIN.PROGC_VAR";
const PERIOD_YEAR: &str = "ZCMW_PERIOD_RE.ID_0DC742680F42DA9747594D1AE51A0C69:VIW_MAIN.PERYR";
const PERIOD_SEMESTER: &str = "ZCMW_PERIOD_RE.ID_0DC742680F42DA9747594D1AE51A0C69:VIW_MAIN.PERID";

/// Totals as recorded in the student's academic record (학적부).
const RECORDED: SummaryKind = SummaryKind {
    attempted_credits: "ZCMB3W0017.ID_0001:VIW_MAIN.ATTM_CRD1",
    earned_credits: "ZCMB3W0017.ID_0001:VIW_MAIN.EARN_CRD1",
    grade_points_sum: "ZCMB3W0017.ID_0001:VIW_MAIN.GT_GPA1",
    grade_points_average: "ZCMB3W0017.ID_0001:VIW_MAIN.CGPA1",
    arithmetic_mean: "ZCMB3W0017.ID_0001:VIW_MAIN.AVG1",
    pf_earned_credits: "ZCMB3W0017.ID_0001:VIW_MAIN.PF_EARN_CRD",
};

/// Totals as printed on grade certificates (증명).
const CERTIFICATED: SummaryKind = SummaryKind {
    attempted_credits: "ZCMB3W0017.ID_0001:VIW_MAIN.ATTM_CRD2",
    earned_credits: "ZCMB3W0017.ID_0001:VIW_MAIN.EARN_CRD2",
    grade_points_sum: "ZCMB3W0017.ID_0001:VIW_MAIN.GT_GPA2",
    grade_points_average: "ZCMB3W0017.ID_0001:VIW_MAIN.CGPA2",
    arithmetic_mean: "ZCMB3W0017.ID_0001:VIW_MAIN.AVG2",
    pf_earned_credits: "ZCMB3W0017.ID_0001:VIW_MAIN.T_PF_ERN_CRD1",
};

async fn prepare(screen: &mut Screen<'_>, course_type: CourseType) -> Result<(), QueryError> {
    screen.close_popups().await?;
    screen.select_key(COURSE_TYPE, course_type.key()).await
}

/// Shows the class table of `query`'s term, which must be set.
async fn prepare_term(
    screen: &mut Screen<'_>,
    query: &GradesQuery,
    year: u32,
    semester: SemesterType,
) -> Result<(), QueryError> {
    prepare(screen, query.course_type()).await?;
    screen.select_key(PERIOD_YEAR, &year.to_string()).await?;
    screen.select_key(PERIOD_SEMESTER, semester.key()).await
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CourseGradesApplicationBuilder;

impl CourseGradesApplicationBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Binds the grades screen; anonymous sessions get `ModuleUnavailable`.
    pub async fn build(self, session: &Session) -> Result<CourseGradesApplication, BindError> {
        let app = Application::bind(session, ModuleKind::CourseGrades).await?;
        Ok(CourseGradesApplication { app })
    }
}

/// Grade history (학기별 성적 조회) screen.
pub struct CourseGradesApplication {
    app: Application,
}

impl CourseGradesApplication {
    pub fn application(&self) -> &Application {
        &self.app
    }

    /// Per-semester grade rows for one course type.
    pub async fn semesters(&self, course_type: CourseType) -> Result<Vec<SemesterGrade>, QueryError> {
        let mut screen = self.app.screen().await?;
        prepare(&mut screen, course_type).await?;
        let read = screen.read_table::<SemesterGrade>(SEMESTER_TABLE, &()).await;
        let semesters = screen.settle(read)?;
        info!(
            "semester grades fetched course_type={} count={}",
            course_type.key(),
            semesters.len()
        );
        Ok(semesters)
    }

    pub async fn recorded_summary(&self, course_type: CourseType) -> Result<GradeSummary, QueryError> {
        self.summary(course_type, &RECORDED).await
    }

    pub async fn certificated_summary(
        &self,
        course_type: CourseType,
    ) -> Result<GradeSummary, QueryError> {
        self.summary(course_type, &CERTIFICATED).await
    }

    async fn summary(
        &self,
        course_type: CourseType,
        kind: &SummaryKind,
    ) -> Result<GradeSummary, QueryError> {
        let mut screen = self.app.screen().await?;
        prepare(&mut screen, course_type).await?;
        let parsed = parse_summary(screen.html(), kind);
        screen.finish();
        Ok(parsed?)
    }

    /// Class grades of the query's term. The query must name a term.
    pub async fn classes(&self, query: &GradesQuery) -> Result<Vec<ClassGrade>, QueryError> {
        let Some((year, semester)) = query.term() else {
            return Err(QueryError::IncompleteSelection { missing: "term" });
        };

        let mut screen = self.app.screen().await?;
        prepare_term(&mut screen, query, year, semester).await?;
        let read = screen
            .read_table::<ClassGrade>(CLASS_TABLE, &Term { year, semester })
            .await;
        let classes = screen.settle(read)?;
        info!(
            "class grades fetched year={} semester={} count={}",
            year,
            semester.key(),
            classes.len()
        );
        Ok(classes)
    }

    /// Score breakdown of class `code` in the query's term, read from the
    /// class's detail popup. The popup is closed again before returning.
    pub async fn class_detail(
        &self,
        query: &GradesQuery,
        code: &str,
    ) -> Result<Vec<ScoreComponent>, QueryError> {
        let Some((year, semester)) = query.term() else {
            return Err(QueryError::IncompleteSelection { missing: "term" });
        };

        let mut screen = self.app.screen().await?;
        prepare_term(&mut screen, query, year, semester).await?;
        let button = screen.table(CLASS_TABLE).and_then(|table| {
            table
                .iter()
                .find(|row| row.get("과목코드") == Some(code))
                .and_then(|row| row.button().map(str::to_string))
                .ok_or_else(|| QueryError::SelectionNotOffered {
                    control: CLASS_TABLE.to_string(),
                    value: code.to_string(),
                })
        });
        let button = match button {
            Ok(button) => button,
            Err(e) => return screen.settle(Err(e)),
        };
        screen.submit(&[Event::button_press(&button)]).await?;

        let parsed = Document::parse(screen.html())
            .popup_table()
            .and_then(|table| parse_score_components(&table));
        screen.close_popups().await?;
        let components = screen.settle(parsed.map_err(QueryError::from))?;
        info!(
            "class detail fetched year={} semester={} code={} components={}",
            year,
            semester.key(),
            code,
            components.len()
        );
        Ok(components)
    }

    /// Year and term the period combo boxes currently show.
    pub async fn selected_term(&self) -> Result<(u32, SemesterType), QueryError> {
        let screen = self.app.screen().await?;
        let term = screen.selected_term(PERIOD_YEAR, PERIOD_SEMESTER);
        screen.finish();
        term
    }
}

#[async_trait]
impl PortalModule for CourseGradesApplication {
    type Query = GradesQuery;
    type Record = ClassGrade;

    async fn query(&self, query: &GradesQuery) -> Result<Vec<ClassGrade>, QueryError> {
        self.classes(query).await
    }
}
