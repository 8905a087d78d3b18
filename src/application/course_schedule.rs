// Lecture search on the course schedule screen (ZCMW2100).

use async_trait::async_trait;
use tracing::info;

use super::{Application, ModuleKind, PortalModule, Screen};
use crate::config::TABLE_PAGE_ROWS;
use crate::error::{BindError, QueryError};
use crate::model::{Lecture, SemesterType};
use crate::navigation::Event;
use crate::parser::Term;
use crate::query::{LectureCategory, ScheduleQuery};
use crate::session::Session;

const PERIOD_YEAR: &str = "ZCMW_PERIOD_RE.ID_A61C4ED604A2BFC2A8F6C6038DE6AF18:VIW_MAIN.PERYR";
const PERIOD_SEMESTER: &str = "ZCMW_PERIOD_RE.ID_A61C4ED604A2BFC2A8F6C6038DE6AF18:VIW_MAIN.PERID";
const TABLE_ROWS: &str = "ZCMW2100.ID_0001:VIW_MODULES.ROWS";
const TABSTRIP: &str = "ZCMW2100.ID_0001:VIW_MAIN.MODULE_TABSTRIP";
const MAIN_TABLE: &str =
    "SALV_WD_TABLE.ID_DE0D9128A4327646C94670E2A892C99C:VIEW_TABLE.SALV_WD_UIE_TABLE";

const MAJOR_LEVELS: [&str; 3] = [
    "ZCMW2100.ID_0001:VIW_TAB_OTHERS.DDK_LV3",
    "ZCMW2100.ID_0001:VIW_TAB_OTHERS.DDK_LV4",
    "ZCMW2100.ID_0001:VIW_TAB_OTHERS.DDK_LV5",
];
const GRADUATE_LEVELS: [&str; 2] = [
    "ZCMW2100.ID_0001:VIW_TAB_GRADUATE.DDK_LV3",
    "ZCMW2100.ID_0001:VIW_TAB_GRADUATE.DDK_LV4",
];
const REQUIRED_ELECTIVE_NAME: &str = "ZCMW2100.ID_0001:VIW_TAB_GENERAL_REQ.SM_OBJID";
const OPTIONAL_ELECTIVE_FIELD: &str = "ZCMW2100.ID_0001:VIW_TAB_GENERAL_OPT.DISCIPLINES";
const CHAPEL_NAME: &str = "ZCMW2100.ID_0001:VIW_TAB_CHAPEL_REQ.SM_OBJID";
const CONNECTED_MAJOR_PROGRAM: &str = "ZCMW2100.ID_0001:VIW_TAB_YOMA.CONNECT_MAJO";
const UNITED_MAJOR_PROGRAM: &str = "ZCMW2100.ID_0001:VIW_TAB_UNMA.CG_OBJID";
const PROFESSOR_KEYWORD: &str = "ZCMW2100.ID_0001:VIW_TAB_PROFESSOR.PROFESSOR";
const LECTURE_KEYWORD: &str = "ZCMW2100.ID_0001:VIW_TAB_SEARCH.SEARCH_TEXT";
const OTHER_GC_LEVELS: [&str; 3] = [
    "ZCMW2100.ID_0001:VIW_TAB_OTHER_GC.DDK_LV3",
    "ZCMW2100.ID_0001:VIW_TAB_OTHER_GC.DDK_LV4",
    "ZCMW2100.ID_0001:VIW_TAB_OTHER_GC.DDK_LV5",
];

/// One tab of the category tabstrip and the button that runs its search.
#[derive(Debug, Clone, Copy)]
struct Tab {
    item: &'static str,
    index: u32,
    search: &'static str,
}

const TAB_MAJOR: Tab = Tab {
    item: "ZCMW2100.ID_0001:VIW_MAIN.TAB_OTHERS",
    index: 0,
    search: "ZCMW2100.ID_0001:VIW_TAB_OTHERS.BUTTON",
};
const TAB_REQUIRED_ELECTIVE: Tab = Tab {
    item: "ZCMW2100.ID_0001:VIW_MAIN.TAB_GENERAL_REQ",
    index: 1,
    search: "ZCMW2100.ID_0001:VIW_TAB_GENERAL_REQ.BUTTON_SEARCH",
};
const TAB_OPTIONAL_ELECTIVE: Tab = Tab {
    item: "ZCMW2100.ID_0001:VIW_MAIN.TAB_GENERAL_OPT",
    index: 2,
    search: "ZCMW2100.ID_0001:VIW_TAB_GENERAL_OPT.BUTTON_SEARCH",
};
const TAB_CHAPEL: Tab = Tab {
    item: "ZCMW2100.ID_0001:VIW_MAIN.TAB_CHAPEL_REQ",
    index: 3,
    search: "ZCMW2100.ID_0001:VIW_TAB_CHAPEL_REQ.BUTTON_SEARCH",
};
const TAB_EDUCATION: Tab = Tab {
    item: "ZCMW2100.ID_0001:VIW_MAIN.TAB_EDU",
    index: 4,
    search: "ZCMW2100.ID_0001:VIW_MAIN.BUTTON_EDU",
};
const TAB_GRADUATED: Tab = Tab {
    item: "ZCMW2100.ID_0001:VIW_MAIN.TAB_GRADUATE",
    index: 7,
    search: "ZCMW2100.ID_0001:VIW_TAB_GRADUATE.BUTTON",
};
const TAB_CONNECTED_MAJOR: Tab = Tab {
    item: "ZCMW2100.ID_0001:VIW_MAIN.TAB_YOMA",
    index: 8,
    search: "ZCMW2100.ID_0001:VIW_TAB_YOMA.BUTTON_SEARCH",
};
const TAB_UNITED_MAJOR: Tab = Tab {
    item: "ZCMW2100.ID_0001:VIW_MAIN.TAB_UNMA",
    index: 9,
    search: "ZCMW2100.ID_0001:VIW_TAB_UNMA.BUTTON_SEARCH",
};
const TAB_PROFESSOR: Tab = Tab {
    item: "ZCMW2100.ID_0001:VIW_MAIN.TAB_PROFESSOR",
    index: 10,
    search: "ZCMW2100.ID_0001:VIW_TAB_PROFESSOR.BUTTON_SEARCH",
};
const TAB_LECTURE_SEARCH: Tab = Tab {
    item: "ZCMW2100.ID_0001:VIW_MAIN.TAB_SEARCH",
    index: 11,
    search: "ZCMW2100.ID_0001:VIW_TAB_SEARCH.BUTTON_SEARCH",
};
const TAB_RECOGNIZED_OTHER_MAJOR: Tab = Tab {
    item: "ZCMW2100.ID_0001:VIW_MAIN.TAB_OTHER_GC",
    index: 12,
    search: "ZCMW2100.ID_0001:VIW_TAB_OTHER_GC.BTN_OTHER_GC",
};
const TAB_CYBER: Tab = Tab {
    item: "ZCMW2100.ID_0001:VIW_MAIN.TAB_CYBER",
    index: 14,
    search: "ZCMW2100.ID_0001:VIW_MAIN.BTN_CYBER",
};

/// Input applied on a tab before its search button is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step<'q> {
    /// Pick the combo box item shown as the given text.
    Select(&'static str, &'q str),
    /// Type free text into a combo box.
    Type(&'static str, &'q str),
}

fn hierarchy<'q>(levels: &[&'static str], values: &[Option<&'q str>]) -> Vec<Step<'q>> {
    levels
        .iter()
        .zip(values)
        .filter_map(|(id, value)| value.map(|v| Step::Select(*id, v)))
        .collect()
}

fn plan(category: &LectureCategory) -> (Tab, Vec<Step<'_>>) {
    match category {
        LectureCategory::Major {
            college,
            department,
            major,
        } => (
            TAB_MAJOR,
            hierarchy(
                &MAJOR_LEVELS,
                &[Some(college.as_str()), Some(department.as_str()), major.as_deref()],
            ),
        ),
        LectureCategory::RequiredElective { lecture_name } => (
            TAB_REQUIRED_ELECTIVE,
            vec![Step::Select(REQUIRED_ELECTIVE_NAME, lecture_name)],
        ),
        LectureCategory::OptionalElective { field } => (
            TAB_OPTIONAL_ELECTIVE,
            vec![Step::Select(OPTIONAL_ELECTIVE_FIELD, field)],
        ),
        LectureCategory::Chapel { lecture_name } => {
            (TAB_CHAPEL, vec![Step::Select(CHAPEL_NAME, lecture_name)])
        }
        LectureCategory::Education => (TAB_EDUCATION, Vec::new()),
        LectureCategory::Graduated {
            college,
            department,
        } => (
            TAB_GRADUATED,
            hierarchy(&GRADUATE_LEVELS, &[Some(college.as_str()), Some(department.as_str())]),
        ),
        LectureCategory::ConnectedMajor { program } => (
            TAB_CONNECTED_MAJOR,
            vec![Step::Select(CONNECTED_MAJOR_PROGRAM, program)],
        ),
        LectureCategory::UnitedMajor { program } => (
            TAB_UNITED_MAJOR,
            vec![Step::Select(UNITED_MAJOR_PROGRAM, program)],
        ),
        LectureCategory::FindByProfessor { keyword } => {
            (TAB_PROFESSOR, vec![Step::Type(PROFESSOR_KEYWORD, keyword)])
        }
        LectureCategory::FindByLecture { keyword } => {
            (TAB_LECTURE_SEARCH, vec![Step::Type(LECTURE_KEYWORD, keyword)])
        }
        LectureCategory::RecognizedOtherMajor {
            college,
            department,
            major,
        } => (
            TAB_RECOGNIZED_OTHER_MAJOR,
            hierarchy(
                &OTHER_GC_LEVELS,
                &[Some(college.as_str()), Some(department.as_str()), major.as_deref()],
            ),
        ),
        LectureCategory::Cyber => (TAB_CYBER, Vec::new()),
    }
}

async fn select_period(
    screen: &mut Screen<'_>,
    year: u32,
    semester: SemesterType,
) -> Result<(), QueryError> {
    screen.select_key(PERIOD_YEAR, &year.to_string()).await?;
    screen.select_key(PERIOD_SEMESTER, semester.key()).await
}

async fn select_tab(screen: &mut Screen<'_>, tab: Tab) -> Result<(), QueryError> {
    screen
        .submit(&[Event::tab_select(TABSTRIP, tab.item, tab.index)])
        .await
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CourseScheduleApplicationBuilder;

impl CourseScheduleApplicationBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Binds the schedule screen. Anonymous sessions are accepted.
    pub async fn build(self, session: &Session) -> Result<CourseScheduleApplication, BindError> {
        let app = Application::bind(session, ModuleKind::CourseSchedule).await?;
        Ok(CourseScheduleApplication { app })
    }
}

/// Course schedule (강의시간표) screen.
pub struct CourseScheduleApplication {
    app: Application,
}

impl CourseScheduleApplication {
    pub fn application(&self) -> &Application {
        &self.app
    }

    /// Lectures of the query's term and category, in the order the portal
    /// lists them. Tables longer than one rendered window are scrolled.
    pub async fn find_lectures(&self, query: &ScheduleQuery) -> Result<Vec<Lecture>, QueryError> {
        let mut screen = self.app.screen().await?;
        select_period(&mut screen, query.year(), query.semester()).await?;
        screen
            .select_key(TABLE_ROWS, &TABLE_PAGE_ROWS.to_string())
            .await?;

        let (tab, steps) = plan(query.category());
        select_tab(&mut screen, tab).await?;
        for step in steps {
            match step {
                Step::Select(id, text) => screen.select_text(id, text).await?,
                Step::Type(id, text) => {
                    screen.submit(&[Event::combo_box_change(id, text)]).await?
                }
            }
        }
        screen.submit(&[Event::button_press(tab.search)]).await?;

        let term = Term {
            year: query.year(),
            semester: query.semester(),
        };
        let read = screen.read_table::<Lecture>(MAIN_TABLE, &term).await;
        let lectures = screen.settle(read)?;
        info!(
            "lectures fetched year={} semester={} category={:?} count={}",
            query.year(),
            query.semester().key(),
            query.category().kind(),
            lectures.len()
        );
        Ok(lectures)
    }

    /// Year and term the screen currently shows. After a query this is the
    /// query's term, not necessarily the current one.
    pub async fn selected_term(&self) -> Result<(u32, SemesterType), QueryError> {
        let screen = self.app.screen().await?;
        let term = screen.selected_term(PERIOD_YEAR, PERIOD_SEMESTER);
        screen.finish();
        term
    }

    /// Colleges offering major lectures in the given term.
    pub async fn colleges(
        &self,
        year: u32,
        semester: SemesterType,
    ) -> Result<Vec<String>, QueryError> {
        self.tab_items(year, semester, TAB_MAJOR, &MAJOR_LEVELS, &[])
            .await
    }

    pub async fn departments(
        &self,
        year: u32,
        semester: SemesterType,
        college: &str,
    ) -> Result<Vec<String>, QueryError> {
        self.tab_items(year, semester, TAB_MAJOR, &MAJOR_LEVELS, &[college])
            .await
    }

    /// Majors of a department; empty when the department has no major split.
    pub async fn majors(
        &self,
        year: u32,
        semester: SemesterType,
        college: &str,
        department: &str,
    ) -> Result<Vec<String>, QueryError> {
        self.tab_items(year, semester, TAB_MAJOR, &MAJOR_LEVELS, &[college, department])
            .await
    }

    /// Names accepted by [`LectureCategory::required_elective`].
    pub async fn required_electives(
        &self,
        year: u32,
        semester: SemesterType,
    ) -> Result<Vec<String>, QueryError> {
        self.tab_items(year, semester, TAB_REQUIRED_ELECTIVE, &[REQUIRED_ELECTIVE_NAME], &[])
            .await
    }

    /// Fields accepted by [`LectureCategory::optional_elective`].
    pub async fn optional_elective_fields(
        &self,
        year: u32,
        semester: SemesterType,
    ) -> Result<Vec<String>, QueryError> {
        self.tab_items(year, semester, TAB_OPTIONAL_ELECTIVE, &[OPTIONAL_ELECTIVE_FIELD], &[])
            .await
    }

    pub async fn chapel_names(
        &self,
        year: u32,
        semester: SemesterType,
    ) -> Result<Vec<String>, QueryError> {
        self.tab_items(year, semester, TAB_CHAPEL, &[CHAPEL_NAME], &[])
            .await
    }

    /// Graduate school colleges.
    pub async fn graduated_colleges(
        &self,
        year: u32,
        semester: SemesterType,
    ) -> Result<Vec<String>, QueryError> {
        self.tab_items(year, semester, TAB_GRADUATED, &GRADUATE_LEVELS, &[])
            .await
    }

    pub async fn graduated_departments(
        &self,
        year: u32,
        semester: SemesterType,
        college: &str,
    ) -> Result<Vec<String>, QueryError> {
        self.tab_items(year, semester, TAB_GRADUATED, &GRADUATE_LEVELS, &[college])
            .await
    }

    pub async fn connected_majors(
        &self,
        year: u32,
        semester: SemesterType,
    ) -> Result<Vec<String>, QueryError> {
        self.tab_items(year, semester, TAB_CONNECTED_MAJOR, &[CONNECTED_MAJOR_PROGRAM], &[])
            .await
    }

    pub async fn united_majors(
        &self,
        year: u32,
        semester: SemesterType,
    ) -> Result<Vec<String>, QueryError> {
        self.tab_items(year, semester, TAB_UNITED_MAJOR, &[UNITED_MAJOR_PROGRAM], &[])
            .await
    }

    /// Selects `parents` down the combo boxes `levels` of `tab` and lists the
    /// items of the next level.
    async fn tab_items(
        &self,
        year: u32,
        semester: SemesterType,
        tab: Tab,
        levels: &[&'static str],
        parents: &[&str],
    ) -> Result<Vec<String>, QueryError> {
        let Some(&level) = levels.get(parents.len()) else {
            return Err(QueryError::InvalidSelection {
                dimension: "parents",
                value: parents.join(" > "),
            });
        };
        let mut screen = self.app.screen().await?;
        select_period(&mut screen, year, semester).await?;
        select_tab(&mut screen, tab).await?;
        for (id, text) in levels.iter().zip(parents) {
            screen.select_text(id, text).await?;
        }
        let items = screen.combo_box(level).map(|combo| combo.texts());
        screen.settle(items)
    }
}

#[async_trait]
impl PortalModule for CourseScheduleApplication {
    type Query = ScheduleQuery;
    type Record = Lecture;

    async fn query(&self, query: &ScheduleQuery) -> Result<Vec<Lecture>, QueryError> {
        self.find_lectures(query).await
    }
}
