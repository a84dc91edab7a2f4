use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{TeacherService, validate_teacher_fields};
use crate::models::{ApiResponse, ErrorCode, teachers::requests::CreateTeacherRequest};
use crate::services::common::{storage_error_response, validation_error};

pub async fn create_teacher(
    service: &TeacherService,
    request: &HttpRequest,
    teacher_data: CreateTeacherRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_teacher_fields(
        Some(&teacher_data.name),
        Some(&teacher_data.email),
        teacher_data.phone.as_deref(),
    ) {
        return Ok(validation_error(msg));
    }

    let storage = service.get_storage(request);

    // 关联的登录账号必须存在
    if let Some(user_id) = teacher_data.user_id {
        match storage.get_user_by_id(user_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::UserNotFound,
                    "Linked user not found",
                )));
            }
            Err(e) => {
                return Ok(storage_error_response(
                    &e,
                    ErrorCode::TeacherAlreadyExists,
                    "Teacher creation failed",
                ));
            }
        }
    }

    match storage.get_teacher_by_email(teacher_data.email.trim()).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::TeacherAlreadyExists,
                "A teacher with this email already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::TeacherAlreadyExists,
                "Teacher creation failed",
            ));
        }
    }

    match storage.create_teacher(teacher_data).await {
        Ok(teacher) => {
            info!("Teacher {} created", teacher.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                teacher,
                "Teacher created successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::TeacherAlreadyExists,
            "Teacher creation failed",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::services::common::tests::{body_json, request_as, seed_user, test_storage};
    use actix_web::http::StatusCode;

    fn teacher(email: &str, user_id: Option<i64>) -> CreateTeacherRequest {
        CreateTeacherRequest {
            user_id,
            name: "Budi Santoso".to_string(),
            email: email.to_string(),
            phone: Some("+62 811-0000-1111".to_string()),
            subject: Some("Physics".to_string()),
            hired_on: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_create_teacher_linked_to_user() {
        let storage = test_storage().await;
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let account = seed_user(&storage, "idp_budi", UserRole::Teacher).await;
        let req = request_as(&storage, &admin);
        let service = TeacherService::new_lazy();

        let resp = create_teacher(&service, &req, teacher("budi@school.test", Some(account.id)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(body_json(resp)["data"]["user_id"], account.id);

        let resp = create_teacher(&service, &req, teacher("BUDI@school.test", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp)["error"], "teacher_already_exists");
    }

    #[tokio::test]
    async fn test_unknown_linked_user() {
        let storage = test_storage().await;
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let req = request_as(&storage, &admin);

        let resp = create_teacher(
            &TeacherService::new_lazy(),
            &req,
            teacher("budi@school.test", Some(9999)),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp)["error"], "user_not_found");
    }
}
