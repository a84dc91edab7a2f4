use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ScheduleService, ensure_teachers_exist, schedule_not_found, validate_slot};
use crate::models::{ApiResponse, ErrorCode, schedules::requests::UpdateScheduleRequest};
use crate::services::common::{
    current_user, ensure_class_access, storage_error_response, validation_error,
};

pub async fn update_schedule(
    service: &ScheduleService,
    request: &HttpRequest,
    schedule_id: i64,
    mut update_data: UpdateScheduleRequest,
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
                "Schedule update failed",
            ));
        }
    };

    if let Err(resp) = ensure_class_access(&storage, &user, existing.class_id).await {
        return Ok(resp);
    }

    // 与现有值合并后再校验
    if let Err(msg) = validate_slot(
        update_data.day_of_week.unwrap_or(existing.day_of_week),
        update_data.start_time.unwrap_or(existing.start_time),
        update_data.end_time.unwrap_or(existing.end_time),
    ) {
        return Ok(validation_error(msg));
    }

    if let Some(ref mut teacher_ids) = update_data.teacher_ids {
        teacher_ids.sort_unstable();
        teacher_ids.dedup();
        if let Err(resp) = ensure_teachers_exist(&storage, teacher_ids).await {
            return Ok(resp);
        }
    }

    match storage.update_schedule(schedule_id, update_data).await {
        Ok(Some(schedule)) => {
            info!("Schedule {} updated", schedule.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                schedule,
                "Schedule updated successfully",
            )))
        }
        Ok(None) => Ok(schedule_not_found()),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Schedule update failed",
        )),
    }
}
