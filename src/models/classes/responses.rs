use super::entities::Class;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

// 班级列表项（附带教师姓名与在读人数）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "class.ts")]
pub struct ClassListItem {
    #[serde(flatten)]
    #[ts(flatten)]
    pub class: Class,
    pub teacher_name: Option<String>,
    pub active_enrollments: i64,
}

// 班级列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "class.ts")]
pub struct ClassListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<ClassListItem>,
}
