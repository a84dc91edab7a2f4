use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AttendanceService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{current_user, storage_error_response};
use crate::services::sessions::load_session_for;

pub async fn get_session_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    session_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let session = match load_session_for(&storage, &user, session_id).await {
        Ok(session) => session,
        Err(resp) => return Ok(resp),
    };

    match storage.get_session_attendance(&session, user.id).await {
        Ok(response) => {
            if response.generated {
                info!(
                    "Generated {} attendance records for session {}",
                    response.items.len(),
                    session.id
                );
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Attendance retrieved successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Failed to load attendance",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        classes::requests::CreateClassRequest, enrollments::requests::CreateEnrollmentRequest,
        sessions::requests::CreateSessionRequest, students::requests::CreateStudentRequest,
        teachers::requests::CreateTeacherRequest, users::entities::UserRole,
    };
    use crate::services::common::tests::{body_json, request_as, seed_user, test_storage};
    use actix_web::http::StatusCode;
    use chrono::{NaiveDate, NaiveTime};

    #[tokio::test]
    async fn test_owner_reads_generated_attendance() {
        let storage = test_storage().await;
        let account = seed_user(&storage, "idp_teacher", UserRole::Teacher).await;
        let other = seed_user(&storage, "idp_other", UserRole::Teacher).await;
        let teacher = storage
            .create_teacher(CreateTeacherRequest {
                user_id: Some(account.id),
                name: "Budi".to_string(),
                email: "budi@school.test".to_string(),
                phone: None,
                subject: None,
                hired_on: None,
                status: None,
            })
            .await
            .unwrap();
        let class = storage
            .create_class(CreateClassRequest {
                name: "English".to_string(),
                description: None,
                teacher_id: Some(teacher.id),
                level: None,
                monthly_fee: None,
                capacity: None,
            })
            .await
            .unwrap();
        for (name, email) in [("Zara", "zara@school.test"), ("Adam", "adam@school.test")] {
            let student = storage
                .create_student(CreateStudentRequest {
                    user_id: None,
                    name: name.to_string(),
                    email: email.to_string(),
                    phone: None,
                    date_of_birth: None,
                    guardian_name: None,
                    guardian_phone: None,
                    address: None,
                    status: None,
                    enrolled_on: None,
                })
                .await
                .unwrap();
            storage
                .create_enrollment(CreateEnrollmentRequest {
                    student_id: student.id,
                    class_id: class.id,
                })
                .await
                .unwrap();
        }
        let session = storage
            .create_session(CreateSessionRequest {
                class_id: class.id,
                schedule_id: None,
                session_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
                start_time: NaiveTime::from_hms_opt(9, 0, 0),
                end_time: NaiveTime::from_hms_opt(10, 0, 0),
                topic: None,
                status: None,
            })
            .await
            .unwrap();
        let service = AttendanceService::new_lazy();

        let resp = get_session_attendance(&service, &request_as(&storage, &other), session.id)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = request_as(&storage, &account);
        let body = body_json(get_session_attendance(&service, &req, session.id).await.unwrap());
        assert_eq!(body["data"]["generated"], true);
        let items = body["data"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["student_name"], "Adam");
        assert_eq!(items[0]["status"], "absent");
        assert_eq!(items[0]["recorded_by"], account.id);

        let body = body_json(get_session_attendance(&service, &req, session.id).await.unwrap());
        assert_eq!(body["data"]["generated"], false);

        let resp = get_session_attendance(&service, &req, 4040).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp)["error"], "session_not_found");
    }
}
