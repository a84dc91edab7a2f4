use super::entities::UserRole;
use serde::Deserialize;
use ts_rs::TS;

// 用户列表查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub role: Option<UserRole>,
    pub search: Option<String>,
}

// 用户创建请求（把身份提供方的账号登记到本系统）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct CreateUserRequest {
    pub external_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: UserRole,
}

// 用户更新请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<UserRole>,
}
