pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ApiResponse, ErrorCode,
    assignments::{
        entities::Assignment,
        requests::{AssignmentListQuery, CreateAssignmentRequest, UpdateAssignmentRequest},
    },
    users::entities::User,
};
use crate::services::common::{ensure_class_access, storage_error_response};
use crate::storage::Storage;

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
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

    pub async fn list_assignments(
        &self,
        request: &HttpRequest,
        query: AssignmentListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_assignments(self, request, query).await
    }

    pub async fn create_assignment(
        &self,
        request: &HttpRequest,
        assignment_data: CreateAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_assignment(self, request, assignment_data).await
    }

    pub async fn get_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_assignment(self, request, assignment_id).await
    }

    pub async fn update_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        update_data: UpdateAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_assignment(self, request, assignment_id, update_data).await
    }

    pub async fn delete_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_assignment(self, request, assignment_id).await
    }
}

pub(crate) fn validate_assignment_fields(
    title: Option<&str>,
    max_score: Option<f64>,
) -> Result<(), String> {
    if let Some(title) = title {
        let len = title.trim().chars().count();
        if len == 0 || len > 200 {
            return Err("Title must be 1-200 characters".to_string());
        }
    }
    if let Some(score) = max_score
        && (!score.is_finite() || score <= 0.0)
    {
        return Err("max_score must be greater than 0".to_string());
    }
    Ok(())
}

pub(crate) fn assignment_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::AssignmentNotFound,
        "Assignment not found",
    ))
}

/// 查询作业并校验其班级的写权限
pub(crate) async fn load_assignment_for(
    storage: &Arc<dyn Storage>,
    user: &User,
    assignment_id: i64,
) -> Result<Assignment, HttpResponse> {
    let assignment = match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => return Err(assignment_not_found()),
        Err(e) => return Err(storage_error_response(&e, ErrorCode::Conflict, "查询作业失败")),
    };

    ensure_class_access(storage, user, assignment.class_id).await?;
    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_assignment_fields() {
        assert!(validate_assignment_fields(Some("Essay"), Some(100.0)).is_ok());
        assert!(validate_assignment_fields(None, None).is_ok());
        assert!(validate_assignment_fields(Some("   "), None).is_err());
        assert!(validate_assignment_fields(None, Some(0.0)).is_err());
        assert!(validate_assignment_fields(None, Some(f64::NAN)).is_err());
    }
}
