use serde::Deserialize;
use ts_rs::TS;

// 班级列表查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "class.ts")]
pub struct ClassListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub teacher_id: Option<i64>,
    pub search: Option<String>,
}

// 创建班级请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "class.ts")]
pub struct CreateClassRequest {
    pub name: String,
    pub description: Option<String>,
    pub teacher_id: Option<i64>,
    pub level: Option<String>,
    pub monthly_fee: Option<f64>,
    pub capacity: Option<i32>,
}

// 更新班级请求
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "class.ts")]
pub struct UpdateClassRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub teacher_id: Option<i64>,
    pub level: Option<String>,
    pub monthly_fee: Option<f64>,
    pub capacity: Option<i32>,
}

// 考勤汇总的日期区间
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "class.ts")]
pub struct AttendanceSummaryQuery {
    pub from: Option<chrono::NaiveDate>,
    pub to: Option<chrono::NaiveDate>,
}
