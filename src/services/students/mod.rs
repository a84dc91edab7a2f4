pub mod create;
pub mod delete;
pub mod get;
pub mod import;
pub mod list;
pub mod template;
pub mod update;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::imports::TemplateFormat;
use crate::models::students::requests::{
    CreateStudentRequest, StudentListQuery, UpdateStudentRequest,
};
use crate::storage::Storage;

pub struct StudentService {
    storage: Option<Arc<dyn Storage>>,
}

impl StudentService {
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

    pub async fn list_students(
        &self,
        request: &HttpRequest,
        query: StudentListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_students(self, request, query).await
    }

    pub async fn create_student(
        &self,
        request: &HttpRequest,
        student_data: CreateStudentRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_student(self, request, student_data).await
    }

    pub async fn get_student(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_student(self, request, student_id).await
    }

    pub async fn update_student(
        &self,
        request: &HttpRequest,
        student_id: i64,
        update_data: UpdateStudentRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_student(self, request, student_id, update_data).await
    }

    // 级联删除选课、考勤与缴费记录
    pub async fn delete_student(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_student(self, request, student_id).await
    }

    // 从 xlsx / csv 批量导入
    pub async fn import_students(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        import::import_students(self, request, payload).await
    }

    pub async fn download_template(&self, format: TemplateFormat) -> ActixResult<HttpResponse> {
        Ok(template::download_template(format))
    }
}

/// 学生字段校验，创建与更新共用
pub(crate) fn validate_student_fields(
    name: Option<&str>,
    email: Option<&str>,
    phone: Option<&str>,
    guardian_phone: Option<&str>,
) -> Result<(), String> {
    use crate::utils::validate::{validate_email, validate_person_name, validate_phone};

    if let Some(name) = name {
        validate_person_name(name).map_err(|e| format!("name: {e}"))?;
    }
    if let Some(email) = email {
        validate_email(email.trim()).map_err(|e| format!("email: {e}"))?;
    }
    if let Some(phone) = phone {
        validate_phone(phone).map_err(|e| format!("phone: {e}"))?;
    }
    if let Some(phone) = guardian_phone {
        validate_phone(phone).map_err(|e| format!("guardian_phone: {e}"))?;
    }
    Ok(())
}
