//! 各资源服务共用的辅助函数

use actix_web::{HttpRequest, HttpResponse};
use std::sync::Arc;
use tracing::{debug, error};

use crate::cache::ObjectCache;
use crate::errors::SchoolOpsError;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    classes::entities::Class,
    users::entities::{User, UserRole},
};
use crate::storage::Storage;

/// 当前登录用户，缺失时返回 401
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing user",
        ))
    })
}

/// 存储层错误转为响应
///
/// 唯一约束冲突返回 409 并使用调用方给出的错误码。
pub(crate) fn storage_error_response(
    err: &SchoolOpsError,
    conflict_code: ErrorCode,
    context: &str,
) -> HttpResponse {
    match err {
        SchoolOpsError::Conflict(_) => HttpResponse::Conflict().json(ApiResponse::error_empty(
            conflict_code,
            format!("{context}: {}", err.message()),
        )),
        SchoolOpsError::Validation(_) => HttpResponse::BadRequest().json(
            ApiResponse::error_empty(ErrorCode::ValidationFailed, err.message()),
        ),
        SchoolOpsError::NotFound(_) => HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::NotFound, err.message())),
        SchoolOpsError::Authorization(_) => HttpResponse::Forbidden()
            .json(ApiResponse::error_empty(ErrorCode::Forbidden, err.message())),
        _ => {
            error!("{}: {}", context, err);
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("{context}: {}", err.message()),
            ))
        }
    }
}

/// 400 校验失败
pub(crate) fn validation_error(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::ValidationFailed,
        message,
    ))
}

/// 用户资料变更后清空令牌到用户的缓存
pub(crate) async fn invalidate_user_cache(request: &HttpRequest) {
    if let Some(cache) = request.app_data::<actix_web::web::Data<Arc<dyn ObjectCache>>>() {
        cache.invalidate_all().await;
        debug!("User cache invalidated");
    }
}

/// 查询班级并校验访问权限
///
/// 管理员可访问所有班级，教师只能访问自己负责的班级，其余角色一律 403。
pub(crate) async fn ensure_class_access(
    storage: &Arc<dyn Storage>,
    user: &User,
    class_id: i64,
) -> Result<Class, HttpResponse> {
    let class = match storage.get_class_by_id(class_id).await {
        Ok(Some(class)) => class,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ClassNotFound,
                "Class not found",
            )));
        }
        Err(e) => return Err(storage_error_response(&e, ErrorCode::Conflict, "查询班级失败")),
    };

    match user.role {
        UserRole::Admin => Ok(class),
        UserRole::Teacher => {
            let teacher = storage
                .get_teacher_by_user_id(user.id)
                .await
                .map_err(|e| storage_error_response(&e, ErrorCode::Conflict, "查询教师失败"))?;
            match (teacher, class.teacher_id) {
                (Some(teacher), Some(owner)) if teacher.id == owner => Ok(class),
                _ => Err(class_permission_denied()),
            }
        }
        UserRole::Student => Err(class_permission_denied()),
    }
}

fn class_permission_denied() -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(
        ErrorCode::ClassPermissionDenied,
        "No permission for this class",
    ))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use actix_web::{HttpMessage, body::MessageBody, test::TestRequest, web};

    /// 内存存储
    pub(crate) async fn test_storage() -> Arc<dyn Storage> {
        Arc::new(SeaOrmStorage::new_in_memory().await.unwrap())
    }

    /// 携带存储与当前用户的请求
    pub(crate) fn request_as(storage: &Arc<dyn Storage>, user: &User) -> HttpRequest {
        let req = TestRequest::default()
            .app_data(web::Data::new(storage.clone()))
            .to_http_request();
        req.extensions_mut().insert(user.clone());
        req
    }

    /// 注册一个本地用户
    pub(crate) async fn seed_user(
        storage: &Arc<dyn Storage>,
        subject: &str,
        role: UserRole,
    ) -> User {
        storage
            .create_user(crate::models::users::requests::CreateUserRequest {
                external_id: subject.to_string(),
                email: format!("{subject}@school.test"),
                display_name: Some(subject.to_string()),
                role,
            })
            .await
            .unwrap()
    }

    /// 解析响应体
    pub(crate) fn body_json(resp: HttpResponse) -> serde_json::Value {
        let bytes = resp.into_body().try_into_bytes().unwrap_or_default();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_class_access_rules() {
        let storage = test_storage().await;
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let owner = seed_user(&storage, "idp_owner", UserRole::Teacher).await;
        let other = seed_user(&storage, "idp_other", UserRole::Teacher).await;
        let student = seed_user(&storage, "idp_student", UserRole::Student).await;

        let teacher = storage
            .create_teacher(crate::models::teachers::requests::CreateTeacherRequest {
                user_id: Some(owner.id),
                name: "Owner".to_string(),
                email: "owner@school.test".to_string(),
                phone: None,
                subject: None,
                hired_on: None,
                status: None,
            })
            .await
            .unwrap();
        let class = storage
            .create_class(crate::models::classes::requests::CreateClassRequest {
                name: "Science".to_string(),
                description: None,
                teacher_id: Some(teacher.id),
                level: None,
                monthly_fee: Some(80.0),
                capacity: None,
            })
            .await
            .unwrap();

        assert!(ensure_class_access(&storage, &admin, class.id).await.is_ok());
        assert!(ensure_class_access(&storage, &owner, class.id).await.is_ok());

        let denied = ensure_class_access(&storage, &other, class.id)
            .await
            .unwrap_err();
        assert_eq!(denied.status(), actix_web::http::StatusCode::FORBIDDEN);
        let denied = ensure_class_access(&storage, &student, class.id)
            .await
            .unwrap_err();
        assert_eq!(denied.status(), actix_web::http::StatusCode::FORBIDDEN);

        let missing = ensure_class_access(&storage, &admin, 999).await.unwrap_err();
        assert_eq!(missing.status(), actix_web::http::StatusCode::NOT_FOUND);
        assert_eq!(body_json(missing)["error"], "class_not_found");
    }

    #[test]
    fn test_storage_error_mapping() {
        let resp = storage_error_response(
            &SchoolOpsError::conflict("dup"),
            ErrorCode::StudentAlreadyExists,
            "创建学生失败",
        );
        assert_eq!(resp.status(), actix_web::http::StatusCode::CONFLICT);
        assert_eq!(body_json(resp)["error"], "student_already_exists");

        let resp = storage_error_response(
            &SchoolOpsError::validation("bad"),
            ErrorCode::Conflict,
            "x",
        );
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let resp = storage_error_response(
            &SchoolOpsError::database_operation("boom"),
            ErrorCode::Conflict,
            "x",
        );
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
