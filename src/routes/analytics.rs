use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, middleware, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::analytics::AnalyticsQuery;
use crate::models::users::entities::UserRole;
use crate::services::AnalyticsService;

static ANALYTICS_SERVICE: Lazy<AnalyticsService> = Lazy::new(AnalyticsService::new_lazy);

pub async fn overview(
    req: HttpRequest,
    query: web::Query<AnalyticsQuery>,
) -> ActixResult<HttpResponse> {
    ANALYTICS_SERVICE.overview(&req, query.into_inner()).await
}

// 配置路由
pub fn configure_analytics_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/analytics")
            .wrap(middleware::Compress::default())
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("/overview", web::get().to(overview)),
            ),
    );
}
