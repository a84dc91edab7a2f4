use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ScheduleService, schedule_not_found};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{current_user, ensure_class_access, storage_error_response};

pub async fn delete_schedule(
    service: &ScheduleService,
    request: &HttpRequest,
    schedule_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let existing = match storage.get_schedule_by_id(schedule_id).await {
        Ok(Some(schedule)) => schedule,
        Ok(None) => return Ok(schedule_not_found()),
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::Conflict,
                "Schedule deletion failed",
            ));
        }
    };

    if let Err(resp) = ensure_class_access(&storage, &user, existing.class_id).await {
        return Ok(resp);
    }

    // 已生成的课次保留，schedule_id 置空
    match storage.delete_schedule(schedule_id).await {
        Ok(true) => {
            info!("Schedule {} deleted", schedule_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Schedule deleted successfully")))
        }
        Ok(false) => Ok(schedule_not_found()),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Schedule deletion failed",
        )),
    }
}
