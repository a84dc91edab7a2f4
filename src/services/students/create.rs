use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{StudentService, validate_student_fields};
use crate::models::{ApiResponse, ErrorCode, students::requests::CreateStudentRequest};
use crate::services::common::{storage_error_response, validation_error};

pub async fn create_student(
    service: &StudentService,
    request: &HttpRequest,
    student_data: CreateStudentRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_student_fields(
        Some(&student_data.name),
        Some(&student_data.email),
        student_data.phone.as_deref(),
        student_data.guardian_phone.as_deref(),
    ) {
        return Ok(validation_error(msg));
    }

    let storage = service.get_storage(request);

    match storage.get_student_by_email(student_data.email.trim()).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::StudentAlreadyExists,
                "A student with this email already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::StudentAlreadyExists,
                "Student creation failed",
            ));
        }
    }

    match storage.create_student(student_data).await {
        Ok(student) => {
            info!("Student {} created", student.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                student,
                "Student created successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::StudentAlreadyExists,
            "Student creation failed",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::services::common::tests::{body_json, request_as, seed_user, test_storage};
    use actix_web::http::StatusCode;

    fn student(name: &str, email: &str) -> CreateStudentRequest {
        CreateStudentRequest {
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
        }
    }

    #[tokio::test]
    async fn test_create_student_and_conflict() {
        let storage = test_storage().await;
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let req = request_as(&storage, &admin);
        let service = StudentService::new_lazy();

        let resp = create_student(&service, &req, student("Ana", "ana@school.test"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "active");

        let resp = create_student(&service, &req, student("Ana Two", "ANA@school.test"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp)["error"], "student_already_exists");
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let storage = test_storage().await;
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let req = request_as(&storage, &admin);

        let resp = create_student(
            &StudentService::new_lazy(),
            &req,
            student("Ana", "not-an-email"),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp)["error"], "validation_failed");
    }
}
