use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{TeacherService, validate_teacher_fields};
use crate::models::{ApiResponse, ErrorCode, teachers::requests::UpdateTeacherRequest};
use crate::services::common::{storage_error_response, validation_error};

pub async fn update_teacher(
    service: &TeacherService,
    request: &HttpRequest,
    teacher_id: i64,
    update_data: UpdateTeacherRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_teacher_fields(
        update_data.name.as_deref(),
        update_data.email.as_deref(),
        update_data.phone.as_deref(),
    ) {
        return Ok(validation_error(msg));
    }

    let storage = service.get_storage(request);

    if let Some(ref email) = update_data.email {
        match storage.get_teacher_by_email(email.trim()).await {
            Ok(Some(existing)) if existing.id != teacher_id => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::TeacherAlreadyExists,
                    "A teacher with this email already exists",
                )));
            }
            Ok(_) => {}
            Err(e) => {
                return Ok(storage_error_response(
                    &e,
                    ErrorCode::TeacherAlreadyExists,
                    "Teacher update failed",
                ));
            }
        }
    }

    match storage.update_teacher(teacher_id, update_data).await {
        Ok(Some(teacher)) => {
            info!("Teacher {} updated", teacher.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                teacher,
                "Teacher updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TeacherNotFound,
            "Teacher not found",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::TeacherAlreadyExists,
            "Teacher update failed",
        )),
    }
}
