use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::SessionService;
use crate::models::{ApiResponse, ErrorCode, sessions::requests::CreateSessionRequest};
use crate::services::common::{current_user, ensure_class_access, storage_error_response};

pub async fn create_session(
    service: &SessionService,
    request: &HttpRequest,
    session_data: CreateSessionRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    if let Err(resp) = ensure_class_access(&storage, &user, session_data.class_id).await {
        return Ok(resp);
    }

    // 课表归属与时间继承在存储层校验
    match storage.create_session(session_data).await {
        Ok(session) => {
            info!(
                "Session {} created for class {} on {}",
                session.id, session.class_id, session.session_date
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                session,
                "Session created successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Session creation failed",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        classes::requests::CreateClassRequest, schedules::requests::CreateScheduleRequest,
        users::entities::UserRole,
    };
    use crate::services::common::tests::{body_json, request_as, seed_user, test_storage};
    use actix_web::http::StatusCode;
    use chrono::{NaiveDate, NaiveTime};

    #[tokio::test]
    async fn test_session_inherits_schedule_times() {
        let storage = test_storage().await;
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let class = storage
            .create_class(CreateClassRequest {
                name: "Science".to_string(),
                description: None,
                teacher_id: None,
                level: None,
                monthly_fee: None,
                capacity: None,
            })
            .await
            .unwrap();
        let schedule = storage
            .create_schedule(CreateScheduleRequest {
                class_id: class.id,
                day_of_week: 1,
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                room: None,
                teacher_ids: vec![],
            })
            .await
            .unwrap();
        let req = request_as(&storage, &admin);
        let service = SessionService::new_lazy();

        let resp = create_session(
            &service,
            &req,
            CreateSessionRequest {
                class_id: class.id,
                schedule_id: Some(schedule.id),
                session_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
                start_time: None,
                end_time: None,
                topic: Some("Plants".to_string()),
                status: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp);
        assert_eq!(body["data"]["start_time"], "09:00:00");
        assert_eq!(body["data"]["status"], "scheduled");

        // 没有课表也没有时间
        let resp = create_session(
            &service,
            &req,
            CreateSessionRequest {
                class_id: class.id,
                schedule_id: None,
                session_date: NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(),
                start_time: None,
                end_time: None,
                topic: None,
                status: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp)["error"], "validation_failed");
    }
}
