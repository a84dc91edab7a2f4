use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::define_string_enum! {
    // 选课状态
    EnrollmentStatus("enrollment.ts") {
        Active => "active",
        Dropped => "dropped",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct ClassEnrollment {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub status: EnrollmentStatus,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
