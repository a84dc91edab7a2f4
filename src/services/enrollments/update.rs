use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{EnrollmentService, enrollment_not_found};
use crate::models::{ApiResponse, ErrorCode, enrollments::requests::UpdateEnrollmentRequest};
use crate::services::common::storage_error_response;

pub async fn update_enrollment(
    service: &EnrollmentService,
    request: &HttpRequest,
    enrollment_id: i64,
    update_data: UpdateEnrollmentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .update_enrollment_status(enrollment_id, update_data.status)
        .await
    {
        Ok(Some(enrollment)) => {
            info!(
                "Enrollment {} set to {}",
                enrollment.id, enrollment.status
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                enrollment,
                "Enrollment updated successfully",
            )))
        }
        Ok(None) => Ok(enrollment_not_found()),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::EnrollmentAlreadyExists,
            "Enrollment update failed",
        )),
    }
}
