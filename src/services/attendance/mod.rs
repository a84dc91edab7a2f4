//! 课次考勤
//!
//! 首次读取（或首次批量更新）时为班级在读学生生成 `absent` 默认记录，
//! 之后的读取只返回已有记录。

pub mod get;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::attendance::requests::BulkAttendanceUpdateRequest;
use crate::storage::Storage;

pub struct AttendanceService {
    storage: Option<Arc<dyn Storage>>,
}

impl AttendanceService {
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

    pub async fn get_session_attendance(
        &self,
        request: &HttpRequest,
        session_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_session_attendance(self, request, session_id).await
    }

    pub async fn update_session_attendance(
        &self,
        request: &HttpRequest,
        session_id: i64,
        body: BulkAttendanceUpdateRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_session_attendance(self, request, session_id, body).await
    }
}
