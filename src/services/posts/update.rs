use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{PostService, ensure_slug_available, post_not_found};
use crate::models::{ApiResponse, ErrorCode, posts::requests::UpdatePostRequest};
use crate::services::common::{storage_error_response, validation_error};
use crate::utils::slug::validate_slug;

pub async fn update_post(
    service: &PostService,
    request: &HttpRequest,
    post_id: i64,
    mut update_data: UpdatePostRequest,
) -> ActixResult<HttpResponse> {
    if update_data
        .title
        .as_deref()
        .is_some_and(|t| t.trim().is_empty())
    {
        return Ok(validation_error("Title must not be empty"));
    }
    if update_data
        .content
        .as_deref()
        .is_some_and(|c| c.trim().is_empty())
    {
        return Ok(validation_error("Content must not be empty"));
    }

    let storage = service.get_storage(request);

    if let Some(slug) = update_data.slug.take() {
        let slug = slug.trim().to_string();
        if let Err(msg) = validate_slug(&slug) {
            return Ok(validation_error(msg));
        }
        if let Err(resp) = ensure_slug_available(&storage, &slug, Some(post_id)).await {
            return Ok(resp);
        }
        update_data.slug = Some(slug);
    }

    match storage.update_post(post_id, update_data).await {
        Ok(Some(post)) => {
            info!("Post {} updated", post.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(post, "Post updated successfully")))
        }
        Ok(None) => Ok(post_not_found()),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::PostSlugAlreadyExists,
            "Post update failed",
        )),
    }
}
