use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::EnrollmentService;
use crate::models::{ApiResponse, ErrorCode, enrollments::requests::CreateEnrollmentRequest};
use crate::services::common::storage_error_response;

pub async fn create_enrollment(
    service: &EnrollmentService,
    request: &HttpRequest,
    enrollment_data: CreateEnrollmentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_student_by_id(enrollment_data.student_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StudentNotFound,
                "Student not found",
            )));
        }
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::EnrollmentAlreadyExists,
                "Enrollment failed",
            ));
        }
    }

    match storage.get_class_by_id(enrollment_data.class_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ClassNotFound,
                "Class not found",
            )));
        }
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::EnrollmentAlreadyExists,
                "Enrollment failed",
            ));
        }
    }

    // 重复选课 409，班级已满 400
    match storage.create_enrollment(enrollment_data).await {
        Ok(enrollment) => {
            info!(
                "Student {} enrolled in class {}",
                enrollment.student_id, enrollment.class_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                enrollment,
                "Student enrolled successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::EnrollmentAlreadyExists,
            "Enrollment failed",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        classes::requests::CreateClassRequest, students::requests::CreateStudentRequest,
        users::entities::UserRole,
    };
    use crate::services::common::tests::{body_json, request_as, seed_user, test_storage};
    use actix_web::http::StatusCode;

    fn student(email: &str) -> CreateStudentRequest {
        CreateStudentRequest {
            user_id: None,
            name: "Student".to_string(),
            email: email.to_string(),
            phone: None,
            date_of_birth: None,
            guardian_name: None,
            guardian_phone: None,
            address: None,
            status: None,
            enrolled_on: None,
        }
    }

    #[tokio::test]
    async fn test_enrollment_conflict_and_capacity() {
        let storage = test_storage().await;
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let class = storage
            .create_class(CreateClassRequest {
                name: "Piano".to_string(),
                description: None,
                teacher_id: None,
                level: None,
                monthly_fee: Some(80.0),
                capacity: Some(1),
            })
            .await
            .unwrap();
        let first = storage.create_student(student("a@school.test")).await.unwrap();
        let second = storage.create_student(student("b@school.test")).await.unwrap();
        let req = request_as(&storage, &admin);
        let service = EnrollmentService::new_lazy();
        let enroll = |student_id| CreateEnrollmentRequest {
            student_id,
            class_id: class.id,
        };

        let resp = create_enrollment(&service, &req, enroll(first.id)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(body_json(resp)["data"]["status"], "active");

        let resp = create_enrollment(&service, &req, enroll(first.id)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp)["error"], "enrollment_already_exists");

        let resp = create_enrollment(&service, &req, enroll(second.id)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = create_enrollment(&service, &req, enroll(999)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp)["error"], "student_not_found");
    }
}
