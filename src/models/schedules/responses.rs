use super::entities::ClassSchedule;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "schedule.ts")]
pub struct ScheduleListResponse {
    pub items: Vec<ClassSchedule>,
}
