use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::define_string_enum! {
    // 缴费状态
    PaymentStatus("payment.ts") {
        Paid => "paid",
        Pending => "pending",
        Refunded => "refunded",
    }
}

crate::define_string_enum! {
    // 支付方式
    PaymentMethod("payment.ts") {
        Cash => "cash",
        Transfer => "transfer",
        Card => "card",
        Other => "other",
    }
}

// 某学生某班级某月的学费记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "payment.ts")]
pub struct CoursePayment {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub month: i32,
    pub year: i32,
    pub amount: f64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub paid_at: Option<chrono::DateTime<chrono::Utc>>,
    // 收据编号 RCP-YYYYMM-XXXXXX
    pub receipt_no: String,
    pub notes: Option<String>,
    pub recorded_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
