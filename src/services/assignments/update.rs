use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{
    AssignmentService, assignment_not_found, load_assignment_for, validate_assignment_fields,
};
use crate::models::{ApiResponse, ErrorCode, assignments::requests::UpdateAssignmentRequest};
use crate::services::common::{current_user, storage_error_response, validation_error};

pub async fn update_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
    update_data: UpdateAssignmentRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) =
        validate_assignment_fields(update_data.title.as_deref(), update_data.max_score)
    {
        return Ok(validation_error(msg));
    }

    let storage = service.get_storage(request);
    if let Err(resp) = load_assignment_for(&storage, &user, assignment_id).await {
        return Ok(resp);
    }

    match storage.update_assignment(assignment_id, update_data).await {
        Ok(Some(assignment)) => {
            info!("Assignment {} updated", assignment.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                assignment,
                "Assignment updated successfully",
            )))
        }
        Ok(None) => Ok(assignment_not_found()),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Assignment update failed",
        )),
    }
}
