pub mod attendance_summary;
pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::classes::requests::{
    AttendanceSummaryQuery, ClassListQuery, CreateClassRequest, UpdateClassRequest,
};
use crate::storage::Storage;

pub struct ClassService {
    storage: Option<Arc<dyn Storage>>,
}

impl ClassService {
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

    // 获取班级列表
    pub async fn list_classes(
        &self,
        request: &HttpRequest,
        query: ClassListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_classes(self, request, query).await
    }

    pub async fn create_class(
        &self,
        req: &HttpRequest,
        class_data: CreateClassRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_class(self, req, class_data).await
    }

    // 根据班级 ID 获取班级信息
    pub async fn get_class(&self, req: &HttpRequest, class_id: i64) -> ActixResult<HttpResponse> {
        get::get_class(self, req, class_id).await
    }

    // 更新班级信息（管理员或负责教师）
    pub async fn update_class(
        &self,
        req: &HttpRequest,
        class_id: i64,
        update_data: UpdateClassRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_class(self, req, class_id, update_data).await
    }

    // 删除班级
    pub async fn delete_class(
        &self,
        req: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_class(self, req, class_id).await
    }

    pub async fn attendance_summary(
        &self,
        req: &HttpRequest,
        class_id: i64,
        query: AttendanceSummaryQuery,
    ) -> ActixResult<HttpResponse> {
        attendance_summary::attendance_summary(self, req, class_id, query).await
    }
}

/// 班级字段校验
pub(crate) fn validate_class_fields(
    name: Option<&str>,
    monthly_fee: Option<f64>,
    capacity: Option<i32>,
) -> Result<(), String> {
    if let Some(name) = name {
        let len = name.trim().chars().count();
        if len == 0 || len > 100 {
            return Err("Class name must be 1-100 characters".to_string());
        }
    }
    if let Some(fee) = monthly_fee
        && (!fee.is_finite() || fee < 0.0)
    {
        return Err("Monthly fee must be a non-negative number".to_string());
    }
    if let Some(capacity) = capacity
        && capacity <= 0
    {
        return Err("Capacity must be greater than 0".to_string());
    }
    Ok(())
}

/// 指定的教师必须存在
pub(crate) async fn ensure_teacher_exists(
    storage: &Arc<dyn Storage>,
    teacher_id: Option<i64>,
) -> Result<(), HttpResponse> {
    use crate::models::{ApiResponse, ErrorCode};
    use crate::services::common::storage_error_response;

    let Some(teacher_id) = teacher_id else {
        return Ok(());
    };
    match storage.get_teacher_by_id(teacher_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TeacherNotFound,
            "Teacher not found",
        ))),
        Err(e) => Err(storage_error_response(&e, ErrorCode::Conflict, "查询教师失败")),
    }
}
