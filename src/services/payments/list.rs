use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::PaymentService;
use crate::models::{ApiResponse, ErrorCode, payments::requests::PaymentListQuery};
use crate::services::common::{storage_error_response, validation_error};

pub async fn list_payments(
    service: &PaymentService,
    request: &HttpRequest,
    query: PaymentListQuery,
) -> ActixResult<HttpResponse> {
    if let Some(month) = query.month
        && !(1..=12).contains(&month)
    {
        return Ok(validation_error("Month must be between 1 and 12"));
    }

    let storage = service.get_storage(request);

    match storage.list_payments_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Payment list retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Failed to list payments",
        )),
    }
}
