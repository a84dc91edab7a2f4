use super::entities::{CoursePayment, PaymentStatus};
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "payment.ts")]
pub struct PaymentDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub payment: CoursePayment,
    pub student_name: String,
    pub class_name: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "payment.ts")]
pub struct PaymentListResponse {
    pub items: Vec<PaymentDetail>,
    pub pagination: PaginationInfo,
}

// 汇总中的单个学生
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "payment.ts")]
pub struct StudentPaymentStatus {
    pub student_id: i64,
    pub student_name: String,
    // 该月无在读选课、仅有缴费记录时为 false
    pub enrolled: bool,
    pub paid: bool,
    pub payment_id: Option<i64>,
    pub status: Option<PaymentStatus>,
    pub amount: f64,
    pub receipt_no: Option<String>,
}

// 汇总中的单个班级
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "payment.ts")]
pub struct ClassPaymentSummary {
    pub class_id: i64,
    pub class_name: String,
    pub monthly_fee: f64,
    pub enrolled: i64,
    pub paid_count: i64,
    // 在读学生中尚未缴清的人数
    pub unpaid_count: i64,
    pub collected_amount: f64,
    // monthly_fee * enrolled
    pub expected_amount: f64,
    pub students: Vec<StudentPaymentStatus>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "payment.ts")]
pub struct PaymentSummaryResponse {
    pub month: i32,
    pub year: i32,
    pub total_collected: f64,
    pub total_expected: f64,
    pub total_paid: i64,
    pub total_unpaid: i64,
    pub classes: Vec<ClassPaymentSummary>,
}
