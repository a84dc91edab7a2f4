use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ClassService, ensure_teacher_exists, validate_class_fields};
use crate::models::{
    ApiResponse, ErrorCode, classes::requests::UpdateClassRequest, users::entities::UserRole,
};
use crate::services::common::{
    current_user, ensure_class_access, storage_error_response, validation_error,
};

pub async fn update_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
    update_data: UpdateClassRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = validate_class_fields(
        update_data.name.as_deref(),
        update_data.monthly_fee,
        update_data.capacity,
    ) {
        return Ok(validation_error(msg));
    }

    let storage = service.get_storage(request);

    let class = match ensure_class_access(&storage, &user, class_id).await {
        Ok(class) => class,
        Err(resp) => return Ok(resp),
    };

    // 只有管理员可以更换负责教师
    if update_data.teacher_id.is_some()
        && update_data.teacher_id != class.teacher_id
        && user.role != UserRole::Admin
    {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ClassPermissionDenied,
            "Only administrators can reassign the class teacher",
        )));
    }

    if let Err(resp) = ensure_teacher_exists(&storage, update_data.teacher_id).await {
        return Ok(resp);
    }

    if let Some(ref name) = update_data.name {
        match storage.get_class_by_name(name.trim()).await {
            Ok(Some(existing)) if existing.id != class_id => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::ClassAlreadyExists,
                    "A class with this name already exists",
                )));
            }
            Ok(_) => {}
            Err(e) => {
                return Ok(storage_error_response(
                    &e,
                    ErrorCode::ClassAlreadyExists,
                    "Class update failed",
                ));
            }
        }
    }

    match storage.update_class(class_id, update_data).await {
        Ok(Some(class)) => {
            info!("Class {} updated by user {}", class.id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                class,
                "Class information updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassNotFound,
            "Class not found",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::ClassAlreadyExists,
            "Class update failed",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        classes::requests::CreateClassRequest, teachers::requests::CreateTeacherRequest,
    };
    use crate::services::common::tests::{body_json, request_as, seed_user, test_storage};
    use actix_web::http::StatusCode;

    async fn class_owned_by_teacher(
        storage: &std::sync::Arc<dyn crate::storage::Storage>,
    ) -> (crate::models::users::entities::User, i64) {
        let account = seed_user(storage, "idp_teacher", UserRole::Teacher).await;
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
                name: "English A".to_string(),
                description: None,
                teacher_id: Some(teacher.id),
                level: None,
                monthly_fee: Some(100.0),
                capacity: None,
            })
            .await
            .unwrap();
        (account, class.id)
    }

    #[tokio::test]
    async fn test_owner_can_update_but_not_reassign() {
        let storage = test_storage().await;
        let (owner, class_id) = class_owned_by_teacher(&storage).await;
        let req = request_as(&storage, &owner);
        let service = ClassService::new_lazy();

        let resp = update_class(
            &service,
            &req,
            class_id,
            UpdateClassRequest {
                description: Some("Evening group".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp)["data"]["description"], "Evening group");

        let resp = update_class(
            &service,
            &req,
            class_id,
            UpdateClassRequest {
                teacher_id: Some(9999),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(resp)["error"], "class_permission_denied");
    }

    #[tokio::test]
    async fn test_other_teacher_denied_and_validation() {
        let storage = test_storage().await;
        let (_, class_id) = class_owned_by_teacher(&storage).await;
        let stranger = seed_user(&storage, "idp_other", UserRole::Teacher).await;
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let service = ClassService::new_lazy();

        let resp = update_class(
            &service,
            &request_as(&storage, &stranger),
            class_id,
            UpdateClassRequest::default(),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = update_class(
            &service,
            &request_as(&storage, &admin),
            class_id,
            UpdateClassRequest {
                monthly_fee: Some(-5.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = update_class(
            &service,
            &request_as(&storage, &admin),
            404_404,
            UpdateClassRequest::default(),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp)["error"], "class_not_found");
    }
}
