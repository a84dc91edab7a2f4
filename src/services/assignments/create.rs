use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AssignmentService, validate_assignment_fields};
use crate::models::{ApiResponse, ErrorCode, assignments::requests::CreateAssignmentRequest};
use crate::services::common::{
    current_user, ensure_class_access, storage_error_response, validation_error,
};

pub async fn create_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_data: CreateAssignmentRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) =
        validate_assignment_fields(Some(&assignment_data.title), assignment_data.max_score)
    {
        return Ok(validation_error(msg));
    }

    let storage = service.get_storage(request);
    if let Err(resp) = ensure_class_access(&storage, &user, assignment_data.class_id).await {
        return Ok(resp);
    }

    match storage.create_assignment(user.id, assignment_data).await {
        Ok(assignment) => {
            info!(
                "Assignment {} created in class {}",
                assignment.id, assignment.class_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                assignment,
                "Assignment created successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::Conflict,
            "Assignment creation failed",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{classes::requests::CreateClassRequest, users::entities::UserRole};
    use crate::services::common::tests::{body_json, request_as, seed_user, test_storage};
    use actix_web::http::StatusCode;

    #[tokio::test]
    async fn test_create_assignment_defaults_and_roles() {
        let storage = test_storage().await;
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let learner = seed_user(&storage, "idp_student", UserRole::Student).await;
        let class = storage
            .create_class(CreateClassRequest {
                name: "History".to_string(),
                description: None,
                teacher_id: None,
                level: None,
                monthly_fee: None,
                capacity: None,
            })
            .await
            .unwrap();
        let service = AssignmentService::new_lazy();
        let request_body = || CreateAssignmentRequest {
            class_id: class.id,
            title: "Essay on Majapahit".to_string(),
            description: None,
            due_date: None,
            max_score: None,
        };

        let resp = create_assignment(&service, &request_as(&storage, &learner), request_body())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = create_assignment(&service, &request_as(&storage, &admin), request_body())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp);
        assert_eq!(body["data"]["max_score"], 100.0);
        assert_eq!(body["data"]["created_by"], admin.id);
    }
}
