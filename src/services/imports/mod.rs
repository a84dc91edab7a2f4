//! 批量导入的公共部分：上传读取、表格解析与模板生成

pub mod sheet;
pub mod template;

pub use sheet::{Cell, ImportParseError, ImportSheet, SheetRow, parse_upload};
pub use template::build_template;

use actix_multipart::Multipart;
use actix_web::HttpResponse;
use futures_util::StreamExt;

use crate::models::{ApiResponse, ErrorCode};

/// 上传的文件
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// 读取 multipart 中名为 `file` 的字段
pub async fn read_upload(payload: &mut Multipart, max_size: usize) -> Result<Upload, String> {
    let mut bytes = Vec::new();
    let mut file_name = String::new();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| format!("读取字段失败: {e}"))?;

        if field.name() != Some("file") {
            continue;
        }

        if let Some(content_disposition) = field.content_disposition() {
            file_name = content_disposition
                .get_filename()
                .unwrap_or("upload.csv")
                .to_string();
        }

        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| format!("读取数据失败: {e}"))?;
            if bytes.len() + data.len() > max_size {
                return Err(format!("文件超过大小限制 ({max_size} 字节)"));
            }
            bytes.extend_from_slice(&data);
        }
    }

    if bytes.is_empty() {
        return Err("未找到文件字段或文件为空".to_string());
    }

    Ok(Upload { file_name, bytes })
}

/// 解析上传文件并检查必需列与数据行数，失败时返回 400 响应
pub(crate) fn prepare_sheet(
    upload: &Upload,
    required_columns: &[&str],
    max_rows: usize,
) -> Result<ImportSheet, HttpResponse> {
    let sheet = parse_upload(upload)
        .and_then(|sheet| {
            sheet.require_columns(required_columns)?;
            Ok(sheet)
        })
        .map_err(|e| {
            HttpResponse::BadRequest().json(ApiResponse::error_empty(e.error_code(), e.message()))
        })?;

    if sheet.rows.is_empty() {
        return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ImportFileDataInvalid,
            "文件中没有数据行",
        )));
    }
    if sheet.rows.len() > max_rows {
        return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ImportFileDataInvalid,
            format!("单次导入最多支持 {max_rows} 行"),
        )));
    }

    Ok(sheet)
}

/// 从 `field: message` 形式的校验信息中取出字段名
pub(crate) fn field_of(message: &str, fields: &[&'static str]) -> &'static str {
    let prefix = message.split(':').next().unwrap_or_default();
    fields.iter().copied().find(|f| *f == prefix).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::common::tests::body_json;
    use actix_web::http::StatusCode;

    fn csv_upload(content: String) -> Upload {
        Upload {
            file_name: "roster.csv".to_string(),
            bytes: content.into_bytes(),
        }
    }

    fn rows(count: usize) -> String {
        let mut content = String::from("name,email\n");
        for i in 0..count {
            content.push_str(&format!("Student {i},s{i}@school.test\n"));
        }
        content
    }

    #[test]
    fn test_prepare_sheet_row_limit() {
        let sheet = prepare_sheet(&csv_upload(rows(3)), &["name", "email"], 3).unwrap();
        assert_eq!(sheet.rows.len(), 3);

        let resp = prepare_sheet(&csv_upload(rows(4)), &["name", "email"], 3).unwrap_err();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp)["error"], "import_file_data_invalid");
    }

    #[test]
    fn test_prepare_sheet_rejects_header_only_file() {
        let resp = prepare_sheet(&csv_upload(rows(0)), &["name", "email"], 10).unwrap_err();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp)["error"], "import_file_data_invalid");
    }

    #[test]
    fn test_prepare_sheet_missing_column_and_format() {
        let upload = csv_upload("name,phone\nAna,0812\n".to_string());
        let resp = prepare_sheet(&upload, &["name", "email"], 10).unwrap_err();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let upload = Upload {
            file_name: "roster.pdf".to_string(),
            bytes: b"%PDF".to_vec(),
        };
        let resp = prepare_sheet(&upload, &["name", "email"], 10).unwrap_err();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
