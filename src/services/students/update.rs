use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{StudentService, validate_student_fields};
use crate::models::{ApiResponse, ErrorCode, students::requests::UpdateStudentRequest};
use crate::services::common::{storage_error_response, validation_error};

pub async fn update_student(
    service: &StudentService,
    request: &HttpRequest,
    student_id: i64,
    update_data: UpdateStudentRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_student_fields(
        update_data.name.as_deref(),
        update_data.email.as_deref(),
        update_data.phone.as_deref(),
        update_data.guardian_phone.as_deref(),
    ) {
        return Ok(validation_error(msg));
    }

    let storage = service.get_storage(request);

    // 邮箱改为其他学生已使用的邮箱时返回冲突
    if let Some(ref email) = update_data.email {
        match storage.get_student_by_email(email.trim()).await {
            Ok(Some(existing)) if existing.id != student_id => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::StudentAlreadyExists,
                    "A student with this email already exists",
                )));
            }
            Ok(_) => {}
            Err(e) => {
                return Ok(storage_error_response(
                    &e,
                    ErrorCode::StudentAlreadyExists,
                    "Student update failed",
                ));
            }
        }
    }

    match storage.update_student(student_id, update_data).await {
        Ok(Some(student)) => {
            info!("Student {} updated", student.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                student,
                "Student updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::StudentNotFound,
            "Student not found",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::StudentAlreadyExists,
            "Student update failed",
        )),
    }
}
