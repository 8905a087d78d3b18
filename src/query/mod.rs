pub mod builder;
pub mod category;

pub use builder::{GradesQuery, GradesQueryBuilder, ScheduleQuery, ScheduleQueryBuilder};
pub use category::{CategoryKind, LectureCategory, LectureCategoryBuilder};
