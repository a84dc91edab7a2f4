use super::entities::{AttendanceStatus, ClassAttendance};
use serde::Serialize;
use ts_rs::TS;

// 考勤记录（附带学生信息）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceRecord {
    #[serde(flatten)]
    #[ts(flatten)]
    pub attendance: ClassAttendance,
    pub student_name: String,
    pub student_email: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct SessionAttendanceResponse {
    pub session_id: i64,
    // 本次请求是否生成了默认记录
    pub generated: bool,
    pub items: Vec<AttendanceRecord>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct BulkAttendanceUpdateResponse {
    pub updated: i64,
    // 该课次下不存在考勤记录的学生
    pub missing_student_ids: Vec<i64>,
    pub items: Vec<AttendanceRecord>,
}

// 单个学生在区间内的考勤统计
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct StudentAttendanceSummary {
    pub student_id: i64,
    pub student_name: String,
    pub present: i64,
    pub late: i64,
    pub absent: i64,
    pub excused: i64,
    pub sick: i64,
    pub total: i64,
    // (present + late) / total，无记录时为 0
    pub attendance_rate: f64,
}

impl StudentAttendanceSummary {
    pub fn record(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Late => self.late += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Excused => self.excused += 1,
            AttendanceStatus::Sick => self.sick += 1,
        }
        self.total += 1;
        self.attendance_rate = attendance_rate(self.present + self.late, self.total);
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct ClassAttendanceSummaryResponse {
    pub class_id: i64,
    pub from: Option<chrono::NaiveDate>,
    pub to: Option<chrono::NaiveDate>,
    pub session_count: i64,
    pub students: Vec<StudentAttendanceSummary>,
}

/// 出勤率（0 到 1，保留四位小数）
pub fn attendance_rate(attended: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (attended as f64 / total as f64 * 10000.0).round() / 10000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_record_counts() {
        let mut summary = StudentAttendanceSummary::default();
        summary.record(AttendanceStatus::Present);
        summary.record(AttendanceStatus::Late);
        summary.record(AttendanceStatus::Absent);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.present, 1);
        assert_eq!(summary.late, 1);
        assert_eq!(summary.attendance_rate, 0.6667);
    }

    #[test]
    fn test_rate_without_records() {
        assert_eq!(attendance_rate(0, 0), 0.0);
        assert_eq!(attendance_rate(4, 4), 1.0);
    }
}
