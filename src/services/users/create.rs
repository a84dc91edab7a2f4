use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::models::{ApiResponse, ErrorCode, users::requests::CreateUserRequest};
use crate::services::common::{storage_error_response, validation_error};
use crate::utils::validate::validate_email;

pub async fn create_user(
    service: &UserService,
    request: &HttpRequest,
    user_data: CreateUserRequest,
) -> ActixResult<HttpResponse> {
    if user_data.external_id.trim().is_empty() {
        return Ok(validation_error("external_id must not be empty"));
    }
    if let Err(msg) = validate_email(user_data.email.trim()) {
        return Ok(validation_error(msg));
    }

    let storage = service.get_storage(request);

    // 先检查身份 subject 是否已登记
    match storage
        .get_user_by_external_id(user_data.external_id.trim())
        .await
    {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserAlreadyExists,
                "User with this external id already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::UserAlreadyExists,
                "User creation failed",
            ));
        }
    }

    match storage.get_user_by_email(user_data.email.trim()).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserAlreadyExists,
                "User with this email already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::UserAlreadyExists,
                "User creation failed",
            ));
        }
    }

    match storage.create_user(user_data).await {
        Ok(user) => {
            info!("User {} registered with role {}", user.id, user.role);
            Ok(HttpResponse::Created().json(ApiResponse::success(user, "User created successfully")))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::UserAlreadyExists,
            "User creation failed",
        )),
    }
}
