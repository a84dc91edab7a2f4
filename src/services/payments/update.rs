use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{PaymentService, payment_not_found, validate_amount};
use crate::models::{ApiResponse, ErrorCode, payments::requests::UpdatePaymentRequest};
use crate::services::common::{storage_error_response, validation_error};

pub async fn update_payment(
    service: &PaymentService,
    request: &HttpRequest,
    payment_id: i64,
    update_data: UpdatePaymentRequest,
) -> ActixResult<HttpResponse> {
    if let Some(amount) = update_data.amount
        && let Err(msg) = validate_amount(amount)
    {
        return Ok(validation_error(msg));
    }

    let storage = service.get_storage(request);

    match storage.update_payment(payment_id, update_data).await {
        Ok(Some(payment)) => {
            info!("Payment {} updated ({})", payment.id, payment.status);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                payment,
                "Payment updated successfully",
            )))
        }
        Ok(None) => Ok(payment_not_found()),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Payment update failed",
        )),
    }
}
