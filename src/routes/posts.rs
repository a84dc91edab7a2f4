use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::posts::requests::{CreatePostRequest, PostListQuery, UpdatePostRequest};
use crate::models::users::entities::UserRole;
use crate::services::PostService;
use crate::services::posts::post_not_found;
use crate::utils::SafeIDI64;

static POST_SERVICE: Lazy<PostService> = Lazy::new(PostService::new_lazy);

pub async fn list_published_posts(
    req: HttpRequest,
    query: web::Query<PostListQuery>,
) -> ActixResult<HttpResponse> {
    POST_SERVICE
        .list_published_posts(&req, query.into_inner())
        .await
}

pub async fn get_published_post(
    req: HttpRequest,
    slug: web::Path<String>,
) -> ActixResult<HttpResponse> {
    POST_SERVICE
        .get_published_post(&req, slug.into_inner())
        .await
}

pub async fn list_all_posts(
    req: HttpRequest,
    query: web::Query<PostListQuery>,
) -> ActixResult<HttpResponse> {
    POST_SERVICE.list_all_posts(&req, query.into_inner()).await
}

pub async fn get_post(req: HttpRequest, post_id: SafeIDI64) -> ActixResult<HttpResponse> {
    POST_SERVICE.get_post(&req, post_id.0).await
}

pub async fn create_post(
    req: HttpRequest,
    post_data: web::Json<CreatePostRequest>,
) -> ActixResult<HttpResponse> {
    POST_SERVICE.create_post(&req, post_data.into_inner()).await
}

pub async fn update_post(
    req: HttpRequest,
    post_id: SafeIDI64,
    update_data: web::Json<UpdatePostRequest>,
) -> ActixResult<HttpResponse> {
    POST_SERVICE
        .update_post(&req, post_id.0, update_data.into_inner())
        .await
}

pub async fn delete_post(req: HttpRequest, post_id: SafeIDI64) -> ActixResult<HttpResponse> {
    POST_SERVICE.delete_post(&req, post_id.0).await
}

// 未匹配的公开路径统一返回 404
pub async fn post_route_not_found() -> ActixResult<HttpResponse> {
    Ok(post_not_found())
}

// 配置路由
pub fn configure_post_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/posts")
            .service(
                web::resource("")
                    // 公开接口
                    .route(web::get().to(list_published_posts))
                    .route(
                        web::post()
                            .to(create_post)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                            .wrap(middlewares::RequireJWT),
                    ),
            )
            .service(web::resource("/slug/{slug}").route(web::get().to(get_published_post)))
            .service(
                web::resource("/admin").route(
                    web::get()
                        .to(list_all_posts)
                        .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                        .wrap(middlewares::RequireJWT),
                ),
            )
            .service(
                web::resource("/admin/{id}").route(
                    web::get()
                        .to(get_post)
                        .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                        .wrap(middlewares::RequireJWT),
                ),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::put()
                            .to(update_post)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                            .wrap(middlewares::RequireJWT),
                    )
                    .route(
                        web::delete()
                            .to(delete_post)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                            .wrap(middlewares::RequireJWT),
                    )
                    .default_service(web::to(post_route_not_found)),
            )
            .default_service(web::to(post_route_not_found)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};

    #[actix_web::test]
    async fn test_unknown_public_post_path_is_not_found() {
        let app = actix_test::init_service(App::new().configure(configure_post_routes)).await;

        for uri in ["/api/posts/1", "/api/posts/slug", "/api/posts/a/b/c"] {
            let req = actix_test::TestRequest::get().uri(uri).to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[actix_web::test]
    async fn test_admin_post_routes_require_token() {
        let app = actix_test::init_service(App::new().configure(configure_post_routes)).await;

        let req = actix_test::TestRequest::post().uri("/api/posts").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = actix_test::TestRequest::get().uri("/api/posts/admin").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = actix_test::TestRequest::delete().uri("/api/posts/7").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
