use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::PostService;
use crate::models::{ApiResponse, ErrorCode, posts::requests::PostListQuery};
use crate::services::common::storage_error_response;

pub async fn list_posts(
    service: &PostService,
    request: &HttpRequest,
    query: PostListQuery,
    published_only: bool,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .list_posts_with_pagination(query, published_only)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Post list retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Failed to list posts",
        )),
    }
}
