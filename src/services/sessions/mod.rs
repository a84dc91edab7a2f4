pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ApiResponse, ErrorCode,
    sessions::{
        entities::ClassSession,
        requests::{CreateSessionRequest, SessionListQuery, UpdateSessionRequest},
    },
    users::entities::User,
};
use crate::services::common::{ensure_class_access, storage_error_response};
use crate::storage::Storage;

pub struct SessionService {
    storage: Option<Arc<dyn Storage>>,
}

impl SessionService {
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

    pub async fn list_sessions(
        &self,
        request: &HttpRequest,
        query: SessionListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_sessions(self, request, query).await
    }

    pub async fn create_session(
        &self,
        request: &HttpRequest,
        session_data: CreateSessionRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_session(self, request, session_data).await
    }

    pub async fn get_session(
        &self,
        request: &HttpRequest,
        session_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_session(self, request, session_id).await
    }

    pub async fn update_session(
        &self,
        request: &HttpRequest,
        session_id: i64,
        update_data: UpdateSessionRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_session(self, request, session_id, update_data).await
    }

    // 级联删除该课次的考勤记录
    pub async fn delete_session(
        &self,
        request: &HttpRequest,
        session_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_session(self, request, session_id).await
    }
}

/// 查询课次并校验其所属班级的访问权限
pub(crate) async fn load_session_for(
    storage: &Arc<dyn Storage>,
    user: &User,
    session_id: i64,
) -> Result<ClassSession, HttpResponse> {
    let session = match storage.get_session_by_id(session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SessionNotFound,
                "Session not found",
            )));
        }
        Err(e) => return Err(storage_error_response(&e, ErrorCode::Conflict, "查询课次失败")),
    };

    ensure_class_access(storage, user, session.class_id).await?;
    Ok(session)
}
