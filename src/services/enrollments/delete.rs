use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{EnrollmentService, enrollment_not_found};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::storage_error_response;

pub async fn delete_enrollment(
    service: &EnrollmentService,
    request: &HttpRequest,
    enrollment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_enrollment(enrollment_id).await {
        Ok(true) => {
            info!("Enrollment {} deleted", enrollment_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Enrollment deleted successfully",
            )))
        }
        Ok(false) => Ok(enrollment_not_found()),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Enrollment deletion failed",
        )),
    }
}
