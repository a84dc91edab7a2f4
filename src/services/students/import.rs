//! 学生批量导入

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};

use super::{StudentService, validate_student_fields};
use crate::config::AppConfig;
use crate::models::{
    ApiResponse, ErrorCode,
    imports::ImportResult,
    students::{entities::StudentStatus, requests::CreateStudentRequest},
};
use crate::services::imports::{ImportSheet, SheetRow, field_of, prepare_sheet, read_upload};
use crate::storage::Storage;

pub(crate) const REQUIRED_COLUMNS: [&str; 2] = ["name", "email"];

pub async fn import_students(
    service: &StudentService,
    request: &HttpRequest,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let limits = &AppConfig::get().import;

    let upload = match read_upload(&mut payload, limits.max_file_size).await {
        Ok(upload) => upload,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::FileUploadFailed,
                format!("文件读取失败: {e}"),
            )));
        }
    };

    let sheet = match prepare_sheet(&upload, &REQUIRED_COLUMNS, limits.max_rows) {
        Ok(sheet) => sheet,
        Err(resp) => return Ok(resp),
    };

    let result = import_student_rows(&storage, &sheet).await;
    info!(
        "Student import finished: total {}, success {}, skipped {}, failed {}",
        result.total, result.success, result.skipped, result.failed
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(result, "导入完成")))
}

/// 逐行校验并写入，单行失败不影响其他行
pub(crate) async fn import_student_rows(
    storage: &Arc<dyn Storage>,
    sheet: &ImportSheet,
) -> ImportResult {
    let mut result = ImportResult {
        total: sheet.rows.len() as i64,
        ..Default::default()
    };
    let mut seen_emails: HashSet<String> = HashSet::new();

    for row in &sheet.rows {
        let student = match row_to_request(sheet, row) {
            Ok(student) => student,
            Err((field, message)) => {
                result.failed += 1;
                result.push_error(row.row_num, field, message);
                continue;
            }
        };

        let email = student.email.trim().to_lowercase();
        if !seen_emails.insert(email.clone()) {
            result.skipped += 1;
            result.push_error(row.row_num, "email", "文件中邮箱重复");
            continue;
        }

        match storage.get_student_by_email(&email).await {
            Ok(Some(_)) => {
                result.skipped += 1;
                result.push_error(row.row_num, "email", "邮箱已存在");
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                result.failed += 1;
                result.push_error(row.row_num, "", format!("查询失败: {e}"));
                continue;
            }
        }

        match storage.create_student(student).await {
            Ok(_) => result.success += 1,
            Err(e) if e.is_conflict() => {
                result.skipped += 1;
                result.push_error(row.row_num, "email", "邮箱已存在");
            }
            Err(e) => {
                error!("导入学生失败 (第 {} 行): {}", row.row_num, e);
                result.failed += 1;
                result.push_error(row.row_num, "", format!("创建失败: {e}"));
            }
        }
    }

    result
}

type FieldError = (&'static str, String);

fn row_to_request(sheet: &ImportSheet, row: &SheetRow) -> Result<CreateStudentRequest, FieldError> {
    let name = row
        .text(sheet.column("name"))
        .ok_or(("name", "姓名不能为空".to_string()))?;
    let email = row
        .text(sheet.column("email"))
        .ok_or(("email", "邮箱不能为空".to_string()))?;
    let phone = row.text(sheet.column("phone"));
    let guardian_phone = row.text(sheet.column("guardian_phone"));

    if let Err(msg) = validate_student_fields(
        Some(&name),
        Some(&email),
        phone.as_deref(),
        guardian_phone.as_deref(),
    ) {
        let field = field_of(&msg, &["name", "email", "phone", "guardian_phone"]);
        return Err((field, msg));
    }

    let date_of_birth = row
        .date(sheet.column("date_of_birth"))
        .map_err(|e| ("date_of_birth", e))?;
    let enrolled_on = row
        .date(sheet.column("enrolled_on"))
        .map_err(|e| ("enrolled_on", e))?;
    let status = match row.text(sheet.column("status")) {
        Some(value) => Some(
            value
                .parse::<StudentStatus>()
                .map_err(|e| ("status", e))?,
        ),
        None => None,
    };

    Ok(CreateStudentRequest {
        user_id: None,
        name,
        email,
        phone,
        date_of_birth,
        guardian_name: row.text(sheet.column("guardian_name")),
        guardian_phone,
        address: row.text(sheet.column("address")),
        status,
        enrolled_on,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::common::tests::test_storage;
    use crate::services::imports::sheet::parse_csv;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_import_accumulates_row_errors() {
        let storage = test_storage().await;
        let csv = "\
Name,Email,Phone,Date of Birth,Status
Ana,ana@school.test,0812345678,2012-05-01,active
Ben,ben@school.test,,45658,
,nobody@school.test,,,
Cara,not-an-email,,,
Ana Again,ANA@school.test,,,
Dan,dan@school.test,,someday,
Eve,eve@school.test,,,expelled
";
        let sheet = parse_csv(csv.as_bytes()).unwrap();
        let result = import_student_rows(&storage, &sheet).await;

        assert_eq!(result.total, 7);
        assert_eq!(result.success, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.failed, 4);

        let fields: Vec<(i64, &str)> = result
            .errors
            .iter()
            .map(|e| (e.row, e.field.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![
                (4, "name"),
                (5, "email"),
                (6, "email"),
                (7, "date_of_birth"),
                (8, "status"),
            ]
        );

        let ben = storage
            .get_student_by_email("ben@school.test")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ben.date_of_birth, NaiveDate::from_ymd_opt(2025, 1, 1));
    }

    #[tokio::test]
    async fn test_existing_students_are_skipped() {
        let storage = test_storage().await;
        let sheet = parse_csv(b"name,email\nAna,ana@school.test\n").unwrap();

        let first = import_student_rows(&storage, &sheet).await;
        assert_eq!(first.success, 1);

        let second = import_student_rows(&storage, &sheet).await;
        assert_eq!(second.success, 0);
        assert_eq!(second.skipped, 1);
        assert_eq!(second.errors[0].message, "邮箱已存在");
    }

    #[test]
    fn test_student_file_over_row_limit_rejected() {
        use crate::services::common::tests::body_json;
        use crate::services::imports::Upload;

        let mut content = String::from("Name,Email\n");
        for i in 0..1001 {
            content.push_str(&format!("Student {i},student{i}@school.test\n"));
        }
        let upload = Upload {
            file_name: "students.csv".to_string(),
            bytes: content.into_bytes(),
        };

        let resp = prepare_sheet(&upload, &REQUIRED_COLUMNS, 1000).unwrap_err();
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp)["error"], "import_file_data_invalid");
    }
}
