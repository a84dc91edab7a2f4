use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::attendance::requests::BulkAttendanceUpdateRequest;
use crate::models::sessions::requests::{
    CreateSessionRequest, SessionListQuery, UpdateSessionRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::{AttendanceService, SessionService};
use crate::utils::SafeSessionIdI64;

static SESSION_SERVICE: Lazy<SessionService> = Lazy::new(SessionService::new_lazy);
static ATTENDANCE_SERVICE: Lazy<AttendanceService> = Lazy::new(AttendanceService::new_lazy);

pub async fn list_sessions(
    req: HttpRequest,
    query: web::Query<SessionListQuery>,
) -> ActixResult<HttpResponse> {
    SESSION_SERVICE.list_sessions(&req, query.into_inner()).await
}

pub async fn create_session(
    req: HttpRequest,
    session_data: web::Json<CreateSessionRequest>,
) -> ActixResult<HttpResponse> {
    SESSION_SERVICE
        .create_session(&req, session_data.into_inner())
        .await
}

pub async fn get_session(
    req: HttpRequest,
    session_id: SafeSessionIdI64,
) -> ActixResult<HttpResponse> {
    SESSION_SERVICE.get_session(&req, session_id.0).await
}

pub async fn update_session(
    req: HttpRequest,
    session_id: SafeSessionIdI64,
    update_data: web::Json<UpdateSessionRequest>,
) -> ActixResult<HttpResponse> {
    SESSION_SERVICE
        .update_session(&req, session_id.0, update_data.into_inner())
        .await
}

pub async fn delete_session(
    req: HttpRequest,
    session_id: SafeSessionIdI64,
) -> ActixResult<HttpResponse> {
    SESSION_SERVICE.delete_session(&req, session_id.0).await
}

// 首次读取时生成默认考勤
pub async fn get_attendance(
    req: HttpRequest,
    session_id: SafeSessionIdI64,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .get_session_attendance(&req, session_id.0)
        .await
}

pub async fn update_attendance(
    req: HttpRequest,
    session_id: SafeSessionIdI64,
    body: web::Json<BulkAttendanceUpdateRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .update_session_attendance(&req, session_id.0, body.into_inner())
        .await
}

// 配置路由
pub fn configure_session_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/sessions")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()))
                    .route("", web::get().to(list_sessions))
                    .route("", web::post().to(create_session))
                    .route("/{session_id}", web::get().to(get_session))
                    .route("/{session_id}", web::put().to(update_session))
                    .route("/{session_id}", web::delete().to(delete_session))
                    .route("/{session_id}/attendance", web::get().to(get_attendance))
                    .route("/{session_id}/attendance", web::put().to(update_attendance)),
            ),
    );
}
