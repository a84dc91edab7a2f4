use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::payments::requests::{
    CreatePaymentRequest, PaymentListQuery, PaymentSummaryQuery, UpdatePaymentRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::PaymentService;
use crate::utils::SafeIDI64;

static PAYMENT_SERVICE: Lazy<PaymentService> = Lazy::new(PaymentService::new_lazy);

pub async fn list_payments(
    req: HttpRequest,
    query: web::Query<PaymentListQuery>,
) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE.list_payments(&req, query.into_inner()).await
}

pub async fn create_payment(
    req: HttpRequest,
    payment_data: web::Json<CreatePaymentRequest>,
) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE
        .create_payment(&req, payment_data.into_inner())
        .await
}

pub async fn payment_summary(
    req: HttpRequest,
    query: web::Query<PaymentSummaryQuery>,
) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE
        .payment_summary(&req, query.into_inner())
        .await
}

pub async fn get_payment(req: HttpRequest, payment_id: SafeIDI64) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE.get_payment(&req, payment_id.0).await
}

pub async fn update_payment(
    req: HttpRequest,
    payment_id: SafeIDI64,
    update_data: web::Json<UpdatePaymentRequest>,
) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE
        .update_payment(&req, payment_id.0, update_data.into_inner())
        .await
}

pub async fn delete_payment(req: HttpRequest, payment_id: SafeIDI64) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE.delete_payment(&req, payment_id.0).await
}

// 配置路由
pub fn configure_payment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/payments")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("", web::get().to(list_payments))
                    .route("", web::post().to(create_payment))
                    // 需要在 /{id} 之前注册
                    .route("/summary", web::get().to(payment_summary))
                    .route("/{id}", web::get().to(get_payment))
                    .route("/{id}", web::put().to(update_payment))
                    .route("/{id}", web::delete().to(delete_payment)),
            ),
    );
}
