use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{PostService, post_not_found};
use crate::models::{ApiResponse, ErrorCode, posts::entities::PostStatus};
use crate::services::common::storage_error_response;

/// 公开读取，草稿按不存在处理
pub async fn get_published_post(
    service: &PostService,
    request: &HttpRequest,
    slug: String,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_post_by_slug(slug.trim()).await {
        Ok(Some(post)) if post.status == PostStatus::Published => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(post, "Post retrieved successfully"))),
        Ok(_) => Ok(post_not_found()),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Failed to get post",
        )),
    }
}

pub async fn get_post(
    service: &PostService,
    request: &HttpRequest,
    post_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_post_by_id(post_id).await {
        Ok(Some(post)) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(post, "Post retrieved successfully"))),
        Ok(None) => Ok(post_not_found()),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Failed to get post",
        )),
    }
}
