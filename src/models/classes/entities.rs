use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "class.ts")]
pub struct Class {
    // 班级ID
    pub id: i64,
    // 班级名称
    pub name: String,
    pub description: Option<String>,
    // 负责教师（教师档案 ID）
    pub teacher_id: Option<i64>,
    pub level: Option<String>,
    // 月学费
    pub monthly_fee: f64,
    // 容量上限
    pub capacity: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
