use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::define_string_enum! {
    // 课次状态
    SessionStatus("session.ts") {
        Scheduled => "scheduled",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

// 一次具体的上课
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "session.ts")]
pub struct ClassSession {
    pub id: i64,
    pub class_id: i64,
    pub schedule_id: Option<i64>,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub topic: Option<String>,
    pub status: SessionStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
