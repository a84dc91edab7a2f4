use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{PostService, ensure_slug_available};
use crate::models::{ApiResponse, ErrorCode, posts::requests::CreatePostRequest};
use crate::services::common::{current_user, storage_error_response, validation_error};
use crate::utils::slug::{slugify, validate_slug};

pub async fn create_post(
    service: &PostService,
    request: &HttpRequest,
    post_data: CreatePostRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if post_data.title.trim().is_empty() {
        return Ok(validation_error("Title must not be empty"));
    }
    if post_data.content.trim().is_empty() {
        return Ok(validation_error("Content must not be empty"));
    }

    let slug = match post_data.slug.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() => slug.to_string(),
        _ => slugify(&post_data.title),
    };
    if let Err(msg) = validate_slug(&slug) {
        return Ok(validation_error(msg));
    }

    let storage = service.get_storage(request);
    if let Err(resp) = ensure_slug_available(&storage, &slug, None).await {
        return Ok(resp);
    }

    match storage.create_post(user.id, slug, post_data).await {
        Ok(post) => {
            info!("Post {} ({}) created by user {}", post.id, post.slug, user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                post,
                "Post created successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::PostSlugAlreadyExists,
            "Post creation failed",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{posts::entities::PostStatus, users::entities::UserRole};
    use crate::services::common::tests::{body_json, request_as, seed_user, test_storage};
    use actix_web::http::StatusCode;

    fn post(title: &str, slug: Option<&str>) -> CreatePostRequest {
        CreatePostRequest {
            title: title.to_string(),
            slug: slug.map(str::to_string),
            excerpt: None,
            content: "Open day is on Saturday.".to_string(),
            status: Some(PostStatus::Published),
            categories: vec!["News".to_string()],
            tags: vec![],
        }
    }

    #[tokio::test]
    async fn test_slug_generated_and_unique() {
        let storage = test_storage().await;
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let req = request_as(&storage, &admin);
        let service = PostService::new_lazy();

        let resp = create_post(&service, &req, post("Open Day: 2025!", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp);
        assert_eq!(body["data"]["slug"], "open-day-2025");
        assert_eq!(body["data"]["author_id"], admin.id);
        assert!(body["data"]["published_at"].is_string());

        let resp = create_post(&service, &req, post("Another", Some("open-day-2025")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp)["error"], "post_slug_already_exists");

        let resp = create_post(&service, &req, post("Bad slug", Some("Not A Slug")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // 标题中没有任何 ASCII 字母数字
        let resp = create_post(&service, &req, post("！！！", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
