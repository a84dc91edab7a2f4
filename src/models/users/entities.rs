use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::define_string_enum! {
    // 用户角色
    UserRole("user.ts") {
        Admin => "admin",
        Teacher => "teacher",
        Student => "student",
    }
}

impl UserRole {
    pub fn admin_roles() -> &'static [&'static UserRole] {
        &[&Self::Admin]
    }
    // 可管理班级事务（考勤、作业）的角色
    pub fn staff_roles() -> &'static [&'static UserRole] {
        &[&Self::Teacher, &Self::Admin]
    }
    pub fn all_roles() -> &'static [&'static UserRole] {
        &[&Self::Admin, &Self::Teacher, &Self::Student]
    }
}

// 用户实体
//
// `external_id` 为身份提供方的 subject，本地只保存映射关系
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct User {
    pub id: i64,
    pub external_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: UserRole,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
