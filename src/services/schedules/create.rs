use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ScheduleService, ensure_teachers_exist, validate_slot};
use crate::models::{ApiResponse, ErrorCode, schedules::requests::CreateScheduleRequest};
use crate::services::common::{
    current_user, ensure_class_access, storage_error_response, validation_error,
};

pub async fn create_schedule(
    service: &ScheduleService,
    request: &HttpRequest,
    mut schedule_data: CreateScheduleRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = validate_slot(
        schedule_data.day_of_week,
        schedule_data.start_time,
        schedule_data.end_time,
    ) {
        return Ok(validation_error(msg));
    }

    let storage = service.get_storage(request);

    if let Err(resp) = ensure_class_access(&storage, &user, schedule_data.class_id).await {
        return Ok(resp);
    }

    schedule_data.teacher_ids.sort_unstable();
    schedule_data.teacher_ids.dedup();
    if let Err(resp) = ensure_teachers_exist(&storage, &schedule_data.teacher_ids).await {
        return Ok(resp);
    }

    match storage.create_schedule(schedule_data).await {
        Ok(schedule) => {
            info!(
                "Schedule {} created for class {}",
                schedule.id, schedule.class_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                schedule,
                "Schedule created successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Schedule creation failed",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{classes::requests::CreateClassRequest, users::entities::UserRole};
    use crate::services::common::tests::{body_json, request_as, seed_user, test_storage};
    use actix_web::http::StatusCode;
    use chrono::NaiveTime;

    fn request(class_id: i64, day_of_week: i32, teacher_ids: Vec<i64>) -> CreateScheduleRequest {
        CreateScheduleRequest {
            class_id,
            day_of_week,
            start_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(16, 30, 0).unwrap(),
            room: Some("R101".to_string()),
            teacher_ids,
        }
    }

    #[tokio::test]
    async fn test_create_schedule_validates_input() {
        let storage = test_storage().await;
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let class = storage
            .create_class(CreateClassRequest {
                name: "Maths".to_string(),
                description: None,
                teacher_id: None,
                level: None,
                monthly_fee: None,
                capacity: None,
            })
            .await
            .unwrap();
        let req = request_as(&storage, &admin);
        let service = ScheduleService::new_lazy();

        let resp = create_schedule(&service, &req, request(class.id, 9, vec![]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = create_schedule(&service, &req, request(class.id, 2, vec![42]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp)["error"], "teacher_not_found");

        let resp = create_schedule(&service, &req, request(777, 2, vec![]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp)["error"], "class_not_found");

        let resp = create_schedule(&service, &req, request(class.id, 2, vec![]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(body_json(resp)["data"]["start_time"], "15:00:00");
    }
}
