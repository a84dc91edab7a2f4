//! 教师批量导入

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};

use super::{TeacherService, validate_teacher_fields};
use crate::config::AppConfig;
use crate::models::{
    ApiResponse, ErrorCode,
    imports::ImportResult,
    teachers::{entities::TeacherStatus, requests::CreateTeacherRequest},
};
use crate::services::imports::{ImportSheet, SheetRow, field_of, prepare_sheet, read_upload};
use crate::storage::Storage;

const REQUIRED_COLUMNS: [&str; 2] = ["name", "email"];

pub async fn import_teachers(
    service: &TeacherService,
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

    let result = import_teacher_rows(&storage, &sheet).await;
    info!(
        "Teacher import finished: total {}, success {}, skipped {}, failed {}",
        result.total, result.success, result.skipped, result.failed
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(result, "导入完成")))
}

pub(crate) async fn import_teacher_rows(
    storage: &Arc<dyn Storage>,
    sheet: &ImportSheet,
) -> ImportResult {
    let mut result = ImportResult {
        total: sheet.rows.len() as i64,
        ..Default::default()
    };
    let mut seen_emails: HashSet<String> = HashSet::new();

    for row in &sheet.rows {
        let teacher = match row_to_request(sheet, row) {
            Ok(teacher) => teacher,
            Err((field, message)) => {
                result.failed += 1;
                result.push_error(row.row_num, field, message);
                continue;
            }
        };

        let email = teacher.email.trim().to_lowercase();
        if !seen_emails.insert(email.clone()) {
            result.skipped += 1;
            result.push_error(row.row_num, "email", "文件中邮箱重复");
            continue;
        }

        match storage.get_teacher_by_email(&email).await {
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

        match storage.create_teacher(teacher).await {
            Ok(_) => result.success += 1,
            Err(e) if e.is_conflict() => {
                result.skipped += 1;
                result.push_error(row.row_num, "email", "邮箱已存在");
            }
            Err(e) => {
                error!("导入教师失败 (第 {} 行): {}", row.row_num, e);
                result.failed += 1;
                result.push_error(row.row_num, "", format!("创建失败: {e}"));
            }
        }
    }

    result
}

fn row_to_request(
    sheet: &ImportSheet,
    row: &SheetRow,
) -> Result<CreateTeacherRequest, (&'static str, String)> {
    let name = row
        .text(sheet.column("name"))
        .ok_or(("name", "姓名不能为空".to_string()))?;
    let email = row
        .text(sheet.column("email"))
        .ok_or(("email", "邮箱不能为空".to_string()))?;
    let phone = row.text(sheet.column("phone"));

    if let Err(msg) = validate_teacher_fields(Some(&name), Some(&email), phone.as_deref()) {
        return Err((field_of(&msg, &["name", "email", "phone"]), msg));
    }

    let hired_on = row
        .date(sheet.column("hired_on"))
        .map_err(|e| ("hired_on", e))?;
    let status = row
        .text(sheet.column("status"))
        .map(|value| value.parse::<TeacherStatus>())
        .transpose()
        .map_err(|e| ("status", e))?;

    Ok(CreateTeacherRequest {
        user_id: None,
        name,
        email,
        phone,
        subject: row.text(sheet.column("subject")),
        hired_on,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::common::tests::test_storage;
    use crate::services::imports::sheet::parse_csv;

    #[tokio::test]
    async fn test_import_teachers() {
        let storage = test_storage().await;
        let csv = "\
name,email,phone,subject,hired_on,status
Budi,budi@school.test,,Physics,2023-07-15,active
Sari,sari@school.test,12,Biology,,
Tono,tono@school.test,,Chemistry,,inactive
Budi Dup,budi@SCHOOL.test,,,,
";
        let sheet = parse_csv(csv.as_bytes()).unwrap();
        let result = import_teacher_rows(&storage, &sheet).await;

        assert_eq!(result.total, 4);
        assert_eq!(result.success, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors[0].row, 3);
        assert_eq!(result.errors[0].field, "phone");
        assert_eq!(result.errors[1].row, 5);

        let tono = storage
            .get_teacher_by_email("tono@school.test")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tono.status, TeacherStatus::Inactive);
    }

    #[test]
    fn test_teacher_file_without_rows_rejected() {
        use crate::services::common::tests::body_json;
        use crate::services::imports::Upload;

        let upload = Upload {
            file_name: "teachers.csv".to_string(),
            bytes: b"name,email,phone\n".to_vec(),
        };

        let resp = prepare_sheet(&upload, &REQUIRED_COLUMNS, 1000).unwrap_err();
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp)["error"], "import_file_data_invalid");
    }
}
