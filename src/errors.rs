//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_school_ops_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum SchoolOpsError {
            $($variant(String),)*
        }

        impl SchoolOpsError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(SchoolOpsError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(SchoolOpsError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(SchoolOpsError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl SchoolOpsError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        SchoolOpsError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_school_ops_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    FileOperation("E006", "File Operation Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Conflict("E009", "Resource Conflict"),
    Serialization("E010", "Serialization Error"),
    DateParse("E011", "Date Parse Error"),
    Authentication("E012", "Authentication Error"),
    Authorization("E013", "Authorization Error"),
    Import("E014", "Import Error"),
}

impl SchoolOpsError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否为唯一约束冲突
    pub fn is_conflict(&self) -> bool {
        matches!(self, SchoolOpsError::Conflict(_))
    }
}

impl fmt::Display for SchoolOpsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SchoolOpsError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for SchoolOpsError {
    fn from(err: sea_orm::DbErr) -> Self {
        let msg = err.to_string();
        if crate::utils::sql::is_unique_violation(&msg) {
            SchoolOpsError::Conflict(msg)
        } else {
            SchoolOpsError::DatabaseOperation(msg)
        }
    }
}

impl From<std::io::Error> for SchoolOpsError {
    fn from(err: std::io::Error) -> Self {
        SchoolOpsError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SchoolOpsError {
    fn from(err: serde_json::Error) -> Self {
        SchoolOpsError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for SchoolOpsError {
    fn from(err: chrono::ParseError) -> Self {
        SchoolOpsError::DateParse(err.to_string())
    }
}

impl From<csv::Error> for SchoolOpsError {
    fn from(err: csv::Error) -> Self {
        SchoolOpsError::Import(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SchoolOpsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchoolOpsError::cache_connection("test").code(), "E001");
        assert_eq!(SchoolOpsError::database_config("test").code(), "E003");
        assert_eq!(SchoolOpsError::validation("test").code(), "E007");
        assert_eq!(SchoolOpsError::conflict("test").code(), "E009");
        assert_eq!(SchoolOpsError::authentication("test").code(), "E012");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            SchoolOpsError::not_found("test").error_type(),
            "Resource Not Found"
        );
        assert_eq!(
            SchoolOpsError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = SchoolOpsError::validation("Invalid input");
        assert_eq!(err.message(), "Invalid input");
    }

    #[test]
    fn test_format_simple() {
        let err = SchoolOpsError::conflict("Email already exists");
        let formatted = err.format_simple();
        assert!(formatted.contains("Resource Conflict"));
        assert!(formatted.contains("Email already exists"));
    }

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let err: SchoolOpsError = sea_orm::DbErr::Custom(
            "UNIQUE constraint failed: students.email".to_string(),
        )
        .into();
        assert!(err.is_conflict());

        let err: SchoolOpsError = sea_orm::DbErr::Custom("no such table".to_string()).into();
        assert!(!err.is_conflict());
    }
}
