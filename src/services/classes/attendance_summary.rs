use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::models::{ApiResponse, ErrorCode, classes::requests::AttendanceSummaryQuery};
use crate::services::common::{
    current_user, ensure_class_access, storage_error_response, validation_error,
};

pub async fn attendance_summary(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
    query: AttendanceSummaryQuery,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if let (Some(from), Some(to)) = (query.from, query.to)
        && from > to
    {
        return Ok(validation_error("'from' must not be after 'to'"));
    }

    let storage = service.get_storage(request);
    if let Err(resp) = ensure_class_access(&storage, &user, class_id).await {
        return Ok(resp);
    }

    match storage
        .class_attendance_summary(class_id, query.from, query.to)
        .await
    {
        Ok(summary) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            summary,
            "Attendance summary retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Failed to summarize attendance",
        )),
    }
}
