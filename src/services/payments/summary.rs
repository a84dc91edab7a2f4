use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::PaymentService;
use crate::models::{ApiResponse, ErrorCode, payments::requests::PaymentSummaryQuery};
use crate::services::common::{storage_error_response, validation_error};
use crate::utils::{dates::current_period, validate::validate_period};

pub async fn payment_summary(
    service: &PaymentService,
    request: &HttpRequest,
    query: PaymentSummaryQuery,
) -> ActixResult<HttpResponse> {
    let (current_year, current_month) = current_period();
    let month = query.month.unwrap_or(current_month);
    let year = query.year.unwrap_or(current_year);

    if let Err(msg) = validate_period(month, year) {
        return Ok(validation_error(msg));
    }

    let storage = service.get_storage(request);

    match storage.payment_summary(month, year).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            summary,
            "Payment summary retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Failed to summarize payments",
        )),
    }
}
