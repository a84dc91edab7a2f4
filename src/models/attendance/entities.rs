use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::define_string_enum! {
    // 考勤状态，不限制状态之间的转换
    AttendanceStatus("attendance.ts") {
        Present => "present",
        Late => "late",
        Absent => "absent",
        Excused => "excused",
        Sick => "sick",
    }
}

impl AttendanceStatus {
    /// 计入出勤率的状态
    pub fn counts_as_attended(&self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct ClassAttendance {
    pub id: i64,
    pub session_id: i64,
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    pub check_in_time: Option<chrono::DateTime<chrono::Utc>>,
    // 记录人（用户 ID）
    pub recorded_by: Option<i64>,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(
            "Present".parse::<AttendanceStatus>(),
            Ok(AttendanceStatus::Present)
        );
        assert_eq!(" sick ".parse::<AttendanceStatus>(), Ok(AttendanceStatus::Sick));
        assert!("skipped".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn test_attended_statuses() {
        let attended: Vec<_> = AttendanceStatus::ALL
            .iter()
            .filter(|s| s.counts_as_attended())
            .collect();
        assert_eq!(
            attended,
            vec![&AttendanceStatus::Present, &AttendanceStatus::Late]
        );
    }
}
