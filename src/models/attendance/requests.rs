use serde::Deserialize;
use ts_rs::TS;

// 单条考勤更新
//
// status 以字符串接收，整批校验通过后才会写入
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceRecordUpdate {
    pub student_id: i64,
    pub status: String,
    pub notes: Option<String>,
    // RFC 3339
    pub check_in_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct BulkAttendanceUpdateRequest {
    pub records: Vec<AttendanceRecordUpdate>,
}

// 校验后的考勤更新（传给存储层）
#[derive(Debug, Clone)]
pub struct AttendanceChange {
    pub student_id: i64,
    pub status: super::entities::AttendanceStatus,
    pub notes: Option<String>,
    pub check_in_time: Option<i64>,
}
