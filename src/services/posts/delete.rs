use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{PostService, post_not_found};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::storage_error_response;

pub async fn delete_post(
    service: &PostService,
    request: &HttpRequest,
    post_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_post(post_id).await {
        Ok(true) => {
            info!("Post {} deleted", post_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Post deleted successfully")))
        }
        Ok(false) => Ok(post_not_found()),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Post deletion failed",
        )),
    }
}
