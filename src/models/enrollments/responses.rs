use super::entities::ClassEnrollment;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

// 选课记录（附带学生与班级名称）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct EnrollmentDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub enrollment: ClassEnrollment,
    pub student_name: String,
    pub class_name: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct EnrollmentListResponse {
    pub items: Vec<EnrollmentDetail>,
    pub pagination: PaginationInfo,
}
