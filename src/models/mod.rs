pub mod analytics;
pub mod assignments;
pub mod attendance;
pub mod classes;
pub mod common;
pub mod enrollments;
pub mod imports;
pub mod payments;
pub mod posts;
pub mod schedules;
pub mod sessions;
pub mod students;
pub mod system;
pub mod teachers;
pub mod users;

pub use common::{ApiResponse, ErrorCode, PaginationInfo};

// 应用启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
