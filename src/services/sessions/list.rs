use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SessionService;
use crate::models::{ApiResponse, ErrorCode, sessions::requests::SessionListQuery};
use crate::services::common::{storage_error_response, validation_error};

pub async fn list_sessions(
    service: &SessionService,
    request: &HttpRequest,
    query: SessionListQuery,
) -> ActixResult<HttpResponse> {
    if let (Some(from), Some(to)) = (query.from, query.to)
        && from > to
    {
        return Ok(validation_error("'from' must not be after 'to'"));
    }

    let storage = service.get_storage(request);

    match storage.list_sessions_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Session list retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Failed to list sessions",
        )),
    }
}
