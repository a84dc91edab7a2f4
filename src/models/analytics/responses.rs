use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "analytics.ts")]
pub struct AnalyticsQuery {
    pub month: Option<i32>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "analytics.ts")]
pub struct EntityCounts {
    pub active_students: i64,
    pub active_teachers: i64,
    pub classes: i64,
    pub active_enrollments: i64,
}

#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "analytics.ts")]
pub struct AttendanceBreakdown {
    pub present: i64,
    pub late: i64,
    pub absent: i64,
    pub excused: i64,
    pub sick: i64,
    pub total: i64,
    pub attendance_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "analytics.ts")]
pub struct PaymentOverview {
    pub collected_amount: f64,
    pub paid_count: i64,
    // 当前在读选课数
    pub expected_count: i64,
    pub collection_rate: f64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "analytics.ts")]
pub struct ClassAttendanceRate {
    pub class_id: i64,
    pub class_name: String,
    pub records: i64,
    pub attendance_rate: f64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "analytics.ts")]
pub struct AnalyticsOverview {
    pub month: i32,
    pub year: i32,
    pub counts: EntityCounts,
    pub attendance: AttendanceBreakdown,
    pub payments: PaymentOverview,
    // 按出勤率降序
    pub class_attendance: Vec<ClassAttendanceRate>,
}
