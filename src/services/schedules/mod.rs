pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::NaiveTime;
use std::sync::Arc;

use crate::models::{
    ApiResponse, ErrorCode,
    schedules::requests::{CreateScheduleRequest, ScheduleListQuery, UpdateScheduleRequest},
};
use crate::services::common::storage_error_response;
use crate::storage::Storage;

pub struct ScheduleService {
    storage: Option<Arc<dyn Storage>>,
}

impl ScheduleService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn list_schedules(
        &self,
        request: &HttpRequest,
        query: ScheduleListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_schedules(self, request, query).await
    }

    pub async fn create_schedule(
        &self,
        request: &HttpRequest,
        schedule_data: CreateScheduleRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_schedule(self, request, schedule_data).await
    }

    pub async fn get_schedule(
        &self,
        request: &HttpRequest,
        schedule_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_schedule(self, request, schedule_id).await
    }

    pub async fn update_schedule(
        &self,
        request: &HttpRequest,
        schedule_id: i64,
        update_data: UpdateScheduleRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_schedule(self, request, schedule_id, update_data).await
    }

    pub async fn delete_schedule(
        &self,
        request: &HttpRequest,
        schedule_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_schedule(self, request, schedule_id).await
    }
}

/// 星期取值 0（周日）到 6（周六），开始时间必须早于结束时间
pub(crate) fn validate_slot(
    day_of_week: i32,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> Result<(), String> {
    if !(0..=6).contains(&day_of_week) {
        return Err("day_of_week must be between 0 (Sunday) and 6 (Saturday)".to_string());
    }
    if start_time >= end_time {
        return Err("start_time must be earlier than end_time".to_string());
    }
    Ok(())
}

/// 授课教师必须全部存在
pub(crate) async fn ensure_teachers_exist(
    storage: &Arc<dyn Storage>,
    teacher_ids: &[i64],
) -> Result<(), HttpResponse> {
    for &teacher_id in teacher_ids {
        match storage.get_teacher_by_id(teacher_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::TeacherNotFound,
                    format!("Teacher {teacher_id} not found"),
                )));
            }
            Err(e) => return Err(storage_error_response(&e, ErrorCode::Conflict, "查询教师失败")),
        }
    }
    Ok(())
}

pub(crate) fn schedule_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::ScheduleNotFound,
        "Schedule not found",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_validate_slot() {
        assert!(validate_slot(0, t(8, 0), t(9, 30)).is_ok());
        assert!(validate_slot(6, t(13, 0), t(14, 0)).is_ok());
        assert!(validate_slot(7, t(8, 0), t(9, 0)).is_err());
        assert!(validate_slot(-1, t(8, 0), t(9, 0)).is_err());
        assert!(validate_slot(2, t(9, 0), t(9, 0)).is_err());
        assert!(validate_slot(2, t(10, 0), t(9, 0)).is_err());
    }
}
