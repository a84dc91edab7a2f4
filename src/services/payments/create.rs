use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{PaymentService, validate_amount};
use crate::models::{ApiResponse, ErrorCode, payments::requests::CreatePaymentRequest};
use crate::services::common::{current_user, storage_error_response, validation_error};
use crate::utils::validate::validate_period;

pub async fn create_payment(
    service: &PaymentService,
    request: &HttpRequest,
    payment_data: CreatePaymentRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = validate_period(payment_data.month, payment_data.year)
        .and_then(|_| validate_amount(payment_data.amount))
    {
        return Ok(validation_error(msg));
    }

    let storage = service.get_storage(request);

    match storage.get_student_by_id(payment_data.student_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StudentNotFound,
                "Student not found",
            )));
        }
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::PaymentAlreadyExists,
                "Payment creation failed",
            ));
        }
    }

    match storage.get_class_by_id(payment_data.class_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ClassNotFound,
                "Class not found",
            )));
        }
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::PaymentAlreadyExists,
                "Payment creation failed",
            ));
        }
    }

    match storage
        .get_payment_by_period(
            payment_data.student_id,
            payment_data.class_id,
            payment_data.month,
            payment_data.year,
        )
        .await
    {
        Ok(Some(existing)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::PaymentAlreadyExists,
                format!(
                    "Payment for {:04}-{:02} already recorded ({})",
                    existing.year, existing.month, existing.receipt_no
                ),
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::PaymentAlreadyExists,
                "Payment creation failed",
            ));
        }
    }

    // 并发写入同一周期时由唯一索引兜底，映射为 409
    match storage.create_payment(user.id, payment_data).await {
        Ok(payment) => {
            info!(
                "Payment {} recorded for student {} class {} ({:04}-{:02})",
                payment.receipt_no, payment.student_id, payment.class_id, payment.year, payment.month
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                payment,
                "Payment recorded successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::PaymentAlreadyExists,
            "Payment creation failed",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        classes::requests::CreateClassRequest, students::requests::CreateStudentRequest,
        users::entities::UserRole,
    };
    use crate::services::common::tests::{body_json, request_as, seed_user, test_storage};
    use actix_web::http::StatusCode;

    #[tokio::test]
    async fn test_record_payment_once_per_period() {
        let storage = test_storage().await;
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let class = storage
            .create_class(CreateClassRequest {
                name: "Guitar".to_string(),
                description: None,
                teacher_id: None,
                level: None,
                monthly_fee: Some(150.0),
                capacity: None,
            })
            .await
            .unwrap();
        let student = storage
            .create_student(CreateStudentRequest {
                user_id: None,
                name: "Rina".to_string(),
                email: "rina@school.test".to_string(),
                phone: None,
                date_of_birth: None,
                guardian_name: None,
                guardian_phone: None,
                address: None,
                status: None,
                enrolled_on: None,
            })
            .await
            .unwrap();
        let req = request_as(&storage, &admin);
        let service = PaymentService::new_lazy();
        let payment = |month, year, amount| CreatePaymentRequest {
            student_id: student.id,
            class_id: class.id,
            month,
            year,
            amount,
            method: None,
            status: None,
            notes: None,
        };

        let resp = create_payment(&service, &req, payment(3, 2025, 150.0))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp);
        assert_eq!(body["data"]["status"], "paid");
        assert_eq!(body["data"]["method"], "cash");
        assert!(
            body["data"]["receipt_no"]
                .as_str()
                .unwrap()
                .starts_with("RCP-202503-")
        );

        let resp = create_payment(&service, &req, payment(3, 2025, 150.0))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp)["error"], "payment_already_exists");

        for bad in [payment(13, 2025, 150.0), payment(3, 1999, 150.0), payment(4, 2025, 0.0)] {
            let resp = create_payment(&service, &req, bad).await.unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
    }
}
