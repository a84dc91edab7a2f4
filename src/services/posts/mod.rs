//! 文章
//!
//! 公开接口只返回已发布的文章，管理接口可见全部状态。

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ApiResponse, ErrorCode,
    posts::requests::{CreatePostRequest, PostListQuery, UpdatePostRequest},
};
use crate::services::common::storage_error_response;
use crate::storage::Storage;

pub struct PostService {
    storage: Option<Arc<dyn Storage>>,
}

impl PostService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 公开列表，只含已发布文章
    pub async fn list_published_posts(
        &self,
        request: &HttpRequest,
        query: PostListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_posts(self, request, query, true).await
    }

    pub async fn list_all_posts(
        &self,
        request: &HttpRequest,
        query: PostListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_posts(self, request, query, false).await
    }

    pub async fn get_published_post(
        &self,
        request: &HttpRequest,
        slug: String,
    ) -> ActixResult<HttpResponse> {
        get::get_published_post(self, request, slug).await
    }

    pub async fn get_post(&self, request: &HttpRequest, post_id: i64) -> ActixResult<HttpResponse> {
        get::get_post(self, request, post_id).await
    }

    pub async fn create_post(
        &self,
        request: &HttpRequest,
        post_data: CreatePostRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_post(self, request, post_data).await
    }

    pub async fn update_post(
        &self,
        request: &HttpRequest,
        post_id: i64,
        update_data: UpdatePostRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_post(self, request, post_id, update_data).await
    }

    pub async fn delete_post(
        &self,
        request: &HttpRequest,
        post_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_post(self, request, post_id).await
    }
}

pub(crate) fn post_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::PostNotFound,
        "Post not found",
    ))
}

/// slug 被其他文章占用时返回 409
pub(crate) async fn ensure_slug_available(
    storage: &Arc<dyn Storage>,
    slug: &str,
    current_id: Option<i64>,
) -> Result<(), HttpResponse> {
    match storage.get_post_by_slug(slug).await {
        Ok(Some(existing)) if Some(existing.id) != current_id => {
            Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::PostSlugAlreadyExists,
                format!("Slug '{slug}' is already in use"),
            )))
        }
        Ok(_) => Ok(()),
        Err(e) => Err(storage_error_response(
            &e,
            ErrorCode::PostSlugAlreadyExists,
            "查询文章失败",
        )),
    }
}
