use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ClassService, ensure_teacher_exists, validate_class_fields};
use crate::models::{ApiResponse, ErrorCode, classes::requests::CreateClassRequest};
use crate::services::common::{storage_error_response, validation_error};

pub async fn create_class(
    service: &ClassService,
    request: &HttpRequest,
    class_data: CreateClassRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_class_fields(
        Some(&class_data.name),
        class_data.monthly_fee,
        class_data.capacity,
    ) {
        return Ok(validation_error(msg));
    }

    let storage = service.get_storage(request);

    if let Err(resp) = ensure_teacher_exists(&storage, class_data.teacher_id).await {
        return Ok(resp);
    }

    match storage.get_class_by_name(class_data.name.trim()).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::ClassAlreadyExists,
                "A class with this name already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::ClassAlreadyExists,
                "Class creation failed",
            ));
        }
    }

    match storage.create_class(class_data).await {
        Ok(class) => {
            info!("Class {} created", class.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                class,
                "Class created successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::ClassAlreadyExists,
            "Class creation failed",
        )),
    }
}
