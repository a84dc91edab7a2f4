use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{PaymentService, payment_not_found};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::storage_error_response;

pub async fn delete_payment(
    service: &PaymentService,
    request: &HttpRequest,
    payment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_payment(payment_id).await {
        Ok(true) => {
            info!("Payment {} deleted", payment_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Payment deleted successfully")))
        }
        Ok(false) => Ok(payment_not_found()),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Payment deletion failed",
        )),
    }
}
