use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{PaymentService, payment_not_found};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::storage_error_response;

pub async fn get_payment(
    service: &PaymentService,
    request: &HttpRequest,
    payment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_payment_by_id(payment_id).await {
        Ok(Some(payment)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            payment,
            "Payment retrieved successfully",
        ))),
        Ok(None) => Ok(payment_not_found()),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Failed to get payment",
        )),
    }
}
