use chrono::NaiveTime;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "schedule.ts")]
pub struct ScheduleListQuery {
    pub class_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub day_of_week: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "schedule.ts")]
pub struct CreateScheduleRequest {
    pub class_id: i64,
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: Option<String>,
    #[serde(default)]
    pub teacher_ids: Vec<i64>,
}

// teacher_ids 存在时整体替换授课教师
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "schedule.ts")]
pub struct UpdateScheduleRequest {
    pub day_of_week: Option<i32>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub room: Option<String>,
    pub teacher_ids: Option<Vec<i64>>,
}
