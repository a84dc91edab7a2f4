//! 导入模板生成：加粗表头 + 一行示例

use actix_web::HttpResponse;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::error;

use crate::models::{ApiResponse, ErrorCode, imports::TemplateFormat};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// 生成模板下载响应
pub fn build_template(
    format: TemplateFormat,
    headers: &[&str],
    example: &[&str],
    name: &str,
) -> HttpResponse {
    let result = match format {
        TemplateFormat::Xlsx => xlsx_bytes(headers, example, name)
            .map(|bytes| (bytes, XLSX_CONTENT_TYPE, "xlsx"))
            .map_err(|e| e.to_string()),
        TemplateFormat::Csv => csv_bytes(headers, example)
            .map(|bytes| (bytes, "text/csv; charset=utf-8", "csv"))
            .map_err(|e| e.to_string()),
    };

    match result {
        Ok((bytes, content_type, ext)) => HttpResponse::Ok()
            .content_type(content_type)
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{name}_template.{ext}\""),
            ))
            .body(bytes),
        Err(e) => {
            error!("模板生成失败: {}", e);
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("模板生成失败: {e}"),
            ))
        }
    }
}

pub(crate) fn xlsx_bytes(
    headers: &[&str],
    example: &[&str],
    sheet_name: &str,
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    let header_format = Format::new().set_bold();
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        worksheet.set_column_width(col as u16, 18)?;
    }
    for (col, value) in example.iter().enumerate() {
        worksheet.write_string(1, col as u16, *value)?;
    }

    workbook.save_to_buffer()
}

fn csv_bytes(headers: &[&str], example: &[&str]) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(headers)?;
    wtr.write_record(example)?;
    wtr.into_inner().map_err(|e| e.into_error().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    #[test]
    fn test_csv_template() {
        let resp = build_template(
            TemplateFormat::Csv,
            &["name", "email"],
            &["Ana", "ana@school.test"],
            "students",
        );
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get("Content-Disposition")
                .and_then(|v| v.to_str().ok()),
            Some("attachment; filename=\"students_template.csv\"")
        );
        let body = resp.into_body().try_into_bytes().unwrap_or_default();
        assert_eq!(
            String::from_utf8(body.to_vec()).unwrap(),
            "name,email\nAna,ana@school.test\n"
        );
    }

    #[test]
    fn test_xlsx_template_content_type() {
        let resp = build_template(
            TemplateFormat::Xlsx,
            &["name", "email"],
            &["Ana", "ana@school.test"],
            "teachers",
        );
        assert_eq!(
            resp.headers()
                .get("Content-Type")
                .and_then(|v| v.to_str().ok()),
            Some(XLSX_CONTENT_TYPE)
        );
    }
}
