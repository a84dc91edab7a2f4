//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod assignments;
pub mod class_attendance;
pub mod class_enrollments;
pub mod class_schedules;
pub mod class_sessions;
pub mod classes;
pub mod course_payments;
pub mod post_categories;
pub mod post_tags;
pub mod posts;
pub mod schedule_teachers;
pub mod students;
pub mod teachers;
pub mod users;

/// 将 unix 秒转换为 UTC 时间
pub(crate) fn ts_to_datetime(ts: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::<chrono::Utc>::from_timestamp(ts, 0).unwrap_or_default()
}
