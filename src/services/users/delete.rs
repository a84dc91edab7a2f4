use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::{
    middlewares::RequireJWT,
    models::{ApiResponse, ErrorCode},
    services::common::{invalidate_user_cache, storage_error_response},
};

pub async fn delete_user(
    service: &UserService,
    request: &HttpRequest,
    user_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 禁止删除当前用户
    if RequireJWT::extract_user_id(request) == Some(user_id) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::CanNotDeleteCurrentUser,
            "Cannot delete current user",
        )));
    }

    match storage.delete_user(user_id).await {
        Ok(true) => {
            invalidate_user_cache(request).await;
            info!("User {} deleted", user_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("User deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "User deletion failed",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::services::common::tests::{request_as, seed_user, test_storage};
    use actix_web::http::StatusCode;

    #[tokio::test]
    async fn test_cannot_delete_self() {
        let storage = test_storage().await;
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let other = seed_user(&storage, "idp_teacher", UserRole::Teacher).await;
        let service = UserService::new_lazy();
        let req = request_as(&storage, &admin);

        let resp = delete_user(&service, &req, admin.id).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = delete_user(&service, &req, other.id).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = delete_user(&service, &req, other.id).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
