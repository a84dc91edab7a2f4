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
use crate::models::teachers::requests::{
    CreateTeacherRequest, TeacherListQuery, UpdateTeacherRequest,
};
use crate::storage::Storage;

pub struct TeacherService {
    storage: Option<Arc<dyn Storage>>,
}

impl TeacherService {
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

    pub async fn list_teachers(
        &self,
        request: &HttpRequest,
        query: TeacherListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_teachers(self, request, query).await
    }

    pub async fn create_teacher(
        &self,
        request: &HttpRequest,
        teacher_data: CreateTeacherRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_teacher(self, request, teacher_data).await
    }

    pub async fn get_teacher(
        &self,
        request: &HttpRequest,
        teacher_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_teacher(self, request, teacher_id).await
    }

    pub async fn update_teacher(
        &self,
        request: &HttpRequest,
        teacher_id: i64,
        update_data: UpdateTeacherRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_teacher(self, request, teacher_id, update_data).await
    }

    // 其负责的班级保留，teacher_id 置空
    pub async fn delete_teacher(
        &self,
        request: &HttpRequest,
        teacher_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_teacher(self, request, teacher_id).await
    }

    pub async fn import_teachers(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        import::import_teachers(self, request, payload).await
    }

    pub async fn download_template(&self, format: TemplateFormat) -> ActixResult<HttpResponse> {
        Ok(template::download_template(format))
    }
}

pub(crate) fn validate_teacher_fields(
    name: Option<&str>,
    email: Option<&str>,
    phone: Option<&str>,
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
    Ok(())
}
