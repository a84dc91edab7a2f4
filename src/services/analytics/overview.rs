use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AnalyticsService;
use crate::models::{ApiResponse, ErrorCode, analytics::AnalyticsQuery};
use crate::services::common::{storage_error_response, validation_error};
use crate::utils::{dates::current_period, validate::validate_period};

pub async fn overview(
    service: &AnalyticsService,
    request: &HttpRequest,
    query: AnalyticsQuery,
) -> ActixResult<HttpResponse> {
    let (current_year, current_month) = current_period();
    let month = query.month.unwrap_or(current_month);
    let year = query.year.unwrap_or(current_year);

    if let Err(msg) = validate_period(month, year) {
        return Ok(validation_error(msg));
    }

    let storage = service.get_storage(request);

    match storage.analytics_overview(month, year).await {
        Ok(overview) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            overview,
            "Analytics overview retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Failed to build analytics overview",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::services::common::tests::{body_json, request_as, seed_user, test_storage};
    use actix_web::http::StatusCode;

    #[tokio::test]
    async fn test_overview_period_validation() {
        let storage = test_storage().await;
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let req = request_as(&storage, &admin);
        let service = AnalyticsService::new_lazy();

        let resp = overview(
            &service,
            &req,
            AnalyticsQuery {
                month: Some(2),
                year: Some(2025),
            },
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp);
        assert_eq!(body["data"]["month"], 2);
        assert_eq!(body["data"]["counts"]["classes"], 0);

        let resp = overview(
            &service,
            &req,
            AnalyticsQuery {
                month: Some(0),
                year: Some(2025),
            },
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
