use serde::Serialize;
use ts_rs::TS;

// 健康检查
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "system.ts")]
pub struct HealthResponse {
    pub status: String,
    pub system_name: String,
    pub version: String,
    pub environment: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub uptime_secs: i64,
}
