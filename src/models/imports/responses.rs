use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 导入行错误
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "import.ts")]
pub struct ImportRowError {
    // 行号（表头为第 1 行）
    pub row: i64,
    pub field: String,
    pub message: String,
}

// 导入结果
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "import.ts")]
pub struct ImportResult {
    pub total: i64,
    pub success: i64,
    pub skipped: i64,
    pub failed: i64,
    pub errors: Vec<ImportRowError>,
}

impl ImportResult {
    pub fn push_error(&mut self, row: i64, field: &str, message: impl Into<String>) {
        self.errors.push(ImportRowError {
            row,
            field: field.to_string(),
            message: message.into(),
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "import.ts")]
pub enum TemplateFormat {
    #[default]
    Xlsx,
    Csv,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "import.ts")]
pub struct TemplateQuery {
    pub format: Option<TemplateFormat>,
}
