use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AttendanceService;
use crate::models::{
    ApiResponse, ErrorCode,
    attendance::{
        entities::AttendanceStatus,
        requests::{AttendanceChange, AttendanceRecordUpdate, BulkAttendanceUpdateRequest},
    },
};
use crate::services::common::{current_user, storage_error_response, validation_error};
use crate::services::sessions::load_session_for;

pub async fn update_session_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    session_id: i64,
    body: BulkAttendanceUpdateRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    // 整批校验通过后才写入
    let changes = match parse_changes(body.records) {
        Ok(changes) => changes,
        Err(msg) => return Ok(validation_error(msg)),
    };

    let storage = service.get_storage(request);
    let session = match load_session_for(&storage, &user, session_id).await {
        Ok(session) => session,
        Err(resp) => return Ok(resp),
    };

    match storage
        .update_session_attendance(&session, changes, user.id)
        .await
    {
        Ok(response) => {
            info!(
                "Attendance for session {} updated: {} rows, {} missing",
                session.id,
                response.updated,
                response.missing_student_ids.len()
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Attendance updated successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Failed to update attendance",
        )),
    }
}

/// 校验状态与签到时间，任何一条不合法则整批拒绝
pub(crate) fn parse_changes(
    records: Vec<AttendanceRecordUpdate>,
) -> Result<Vec<AttendanceChange>, String> {
    if records.is_empty() {
        return Err("records must not be empty".to_string());
    }

    records
        .into_iter()
        .map(|record| {
            let status = record
                .status
                .parse::<AttendanceStatus>()
                .map_err(|e| format!("student {}: {e}", record.student_id))?;
            let check_in_time = record
                .check_in_time
                .as_deref()
                .map(|value| {
                    chrono::DateTime::parse_from_rfc3339(value.trim())
                        .map(|dt| dt.timestamp())
                        .map_err(|e| {
                            format!(
                                "student {}: invalid check_in_time '{value}': {e}",
                                record.student_id
                            )
                        })
                })
                .transpose()?;

            Ok(AttendanceChange {
                student_id: record.student_id,
                status,
                notes: record.notes,
                check_in_time,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(student_id: i64, status: &str, check_in: Option<&str>) -> AttendanceRecordUpdate {
        AttendanceRecordUpdate {
            student_id,
            status: status.to_string(),
            notes: None,
            check_in_time: check_in.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_changes() {
        let changes = parse_changes(vec![
            record(1, "present", Some("2025-03-10T09:02:00+07:00")),
            record(2, "LATE", None),
        ])
        .unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].status, AttendanceStatus::Present);
        assert_eq!(changes[0].check_in_time, Some(1_741_572_120));
        assert_eq!(changes[1].status, AttendanceStatus::Late);
    }

    #[test]
    fn test_one_bad_status_rejects_batch() {
        let err = parse_changes(vec![record(1, "present", None), record(2, "skipped", None)])
            .unwrap_err();
        assert!(err.starts_with("student 2"));

        let err = parse_changes(vec![record(3, "present", Some("09:00"))]).unwrap_err();
        assert!(err.contains("check_in_time"));

        assert!(parse_changes(vec![]).is_err());
    }
}
