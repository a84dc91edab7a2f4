use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 每周固定课表
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "schedule.ts")]
pub struct ClassSchedule {
    pub id: i64,
    pub class_id: i64,
    // 0 = 周日 ... 6 = 周六
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: Option<String>,
    // 授课教师（教师档案 ID）
    pub teacher_ids: Vec<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
