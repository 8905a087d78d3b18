pub mod api;
pub mod application;
pub mod config;
pub mod error;
pub mod model;
pub mod navigation;
pub mod parser;
pub mod query;
pub mod session;
pub mod transport;

pub use application::{
    Application, CourseGradesApplication, CourseGradesApplicationBuilder,
    CourseScheduleApplication, CourseScheduleApplicationBuilder, ModuleKind, PortalModule,
};
pub use config::PortalConfig;
pub use error::{BindError, QueryError, SessionError};
pub use model::{
    ClassGrade, CourseType, GradeSummary, Lecture, ScoreComponent, SemesterGrade, SemesterType,
};
pub use query::{
    CategoryKind, GradesQuery, GradesQueryBuilder, LectureCategory, LectureCategoryBuilder,
    ScheduleQuery, ScheduleQueryBuilder,
};
pub use session::{AuthStatus, Credentials, Session};
