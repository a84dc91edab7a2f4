use super::entities::SessionStatus;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "session.ts")]
pub struct SessionListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub class_id: Option<i64>,
    pub status: Option<SessionStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// 未给出时间时从 schedule_id 对应的课表继承
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "session.ts")]
pub struct CreateSessionRequest {
    pub class_id: i64,
    pub schedule_id: Option<i64>,
    pub session_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub topic: Option<String>,
    pub status: Option<SessionStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "session.ts")]
pub struct UpdateSessionRequest {
    pub session_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub topic: Option<String>,
    pub status: Option<SessionStatus>,
}
