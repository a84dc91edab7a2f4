use super::entities::{PaymentMethod, PaymentStatus};
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "payment.ts")]
pub struct PaymentListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub student_id: Option<i64>,
    pub class_id: Option<i64>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "payment.ts")]
pub struct CreatePaymentRequest {
    pub student_id: i64,
    pub class_id: i64,
    pub month: i32,
    pub year: i32,
    pub amount: f64,
    pub method: Option<PaymentMethod>,
    // 默认 paid
    pub status: Option<PaymentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "payment.ts")]
pub struct UpdatePaymentRequest {
    pub amount: Option<f64>,
    pub method: Option<PaymentMethod>,
    pub status: Option<PaymentStatus>,
    pub notes: Option<String>,
}

// 月度汇总查询，缺省为当前月份
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "payment.ts")]
pub struct PaymentSummaryQuery {
    pub month: Option<i32>,
    pub year: Option<i32>,
}
