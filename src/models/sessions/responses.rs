use super::entities::ClassSession;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "session.ts")]
pub struct SessionListResponse {
    pub items: Vec<ClassSession>,
    pub pagination: PaginationInfo,
}
