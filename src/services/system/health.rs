use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use super::SystemService;
use crate::models::{ApiResponse, AppStartTime, system::HealthResponse};

pub async fn health(service: &SystemService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let config = service.get_config();
    let started_at = request
        .app_data::<web::Data<AppStartTime>>()
        .map(|t| t.start_datetime)
        .unwrap_or_else(chrono::Utc::now);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        build_health(
            started_at,
            &config.app.system_name,
            &config.app.environment,
        ),
        "Service is healthy",
    )))
}

pub(crate) fn build_health(
    started_at: chrono::DateTime<chrono::Utc>,
    system_name: &str,
    environment: &str,
) -> HealthResponse {
    HealthResponse {
        status: "ok".to_string(),
        system_name: system_name.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: environment.to_string(),
        started_at,
        uptime_secs: chrono::Utc::now()
            .signed_duration_since(started_at)
            .num_seconds()
            .max(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_from_start_time() {
        let started = chrono::Utc::now() - chrono::Duration::seconds(90);
        let health = build_health(started, "School Ops", "test");
        assert_eq!(health.status, "ok");
        assert!(health.uptime_secs >= 90);
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }
}
