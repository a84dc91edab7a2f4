use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{SessionService, load_session_for};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{current_user, storage_error_response};

pub async fn delete_session(
    service: &SessionService,
    request: &HttpRequest,
    session_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_session_for(&storage, &user, session_id).await {
        return Ok(resp);
    }

    match storage.delete_session(session_id).await {
        Ok(true) => {
            info!("Session {} deleted", session_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Session deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SessionNotFound,
            "Session not found",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Session deletion failed",
        )),
    }
}
