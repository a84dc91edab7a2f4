use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AssignmentService, assignment_not_found, load_assignment_for};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{current_user, storage_error_response};

pub async fn delete_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = load_assignment_for(&storage, &user, assignment_id).await {
        return Ok(resp);
    }

    match storage.delete_assignment(assignment_id).await {
        Ok(true) => {
            info!("Assignment {} deleted", assignment_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Assignment deleted successfully",
            )))
        }
        Ok(false) => Ok(assignment_not_found()),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Assignment deletion failed",
        )),
    }
}
