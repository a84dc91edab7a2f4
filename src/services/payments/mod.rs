//! 学费缴纳
//!
//! 每个学生在每个班级每个月份最多一条缴费记录。

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod summary;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ApiResponse, ErrorCode,
    payments::requests::{
        CreatePaymentRequest, PaymentListQuery, PaymentSummaryQuery, UpdatePaymentRequest,
    },
};
use crate::storage::Storage;

pub struct PaymentService {
    storage: Option<Arc<dyn Storage>>,
}

impl PaymentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn list_payments(
        &self,
        request: &HttpRequest,
        query: PaymentListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_payments(self, request, query).await
    }

    pub async fn create_payment(
        &self,
        request: &HttpRequest,
        payment_data: CreatePaymentRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_payment(self, request, payment_data).await
    }

    pub async fn get_payment(
        &self,
        request: &HttpRequest,
        payment_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_payment(self, request, payment_id).await
    }

    pub async fn update_payment(
        &self,
        request: &HttpRequest,
        payment_id: i64,
        update_data: UpdatePaymentRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_payment(self, request, payment_id, update_data).await
    }

    pub async fn delete_payment(
        &self,
        request: &HttpRequest,
        payment_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_payment(self, request, payment_id).await
    }

    // 按班级、学生汇总某月的缴费情况
    pub async fn payment_summary(
        &self,
        request: &HttpRequest,
        query: PaymentSummaryQuery,
    ) -> ActixResult<HttpResponse> {
        summary::payment_summary(self, request, query).await
    }
}

pub(crate) fn validate_amount(amount: f64) -> Result<(), &'static str> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err("Amount must be greater than 0");
    }
    Ok(())
}

pub(crate) fn payment_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::PaymentNotFound,
        "Payment not found",
    ))
}
