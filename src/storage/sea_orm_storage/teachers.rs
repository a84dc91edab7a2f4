//! 教师档案存储操作

use super::{SeaOrmStorage, read_error, write_error};
use crate::entity::teachers::{ActiveModel, Column, Entity as Teachers};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    common::normalize_page,
    teachers::{
        entities::{Teacher, TeacherStatus},
        requests::{CreateTeacherRequest, TeacherListQuery, UpdateTeacherRequest},
        responses::TeacherListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    /// 创建教师
    pub async fn create_teacher_impl(&self, req: CreateTeacherRequest) -> Result<Teacher> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            user_id: Set(req.user_id),
            name: Set(req.name.trim().to_string()),
            email: Set(req.email.trim().to_lowercase()),
            phone: Set(req.phone),
            subject: Set(req.subject),
            hired_on: Set(req.hired_on),
            status: Set(req.status.unwrap_or(TeacherStatus::Active).to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| write_error("创建教师失败", e))?;

        Ok(result.into_teacher())
    }

    pub async fn get_teacher_by_id_impl(&self, id: i64) -> Result<Option<Teacher>> {
        let result = Teachers::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询教师失败", e))?;

        Ok(result.map(|m| m.into_teacher()))
    }

    pub async fn get_teacher_by_email_impl(&self, email: &str) -> Result<Option<Teacher>> {
        let result = Teachers::find()
            .filter(Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询教师失败", e))?;

        Ok(result.map(|m| m.into_teacher()))
    }

    pub async fn get_teacher_by_user_id_impl(&self, user_id: i64) -> Result<Option<Teacher>> {
        let result = Teachers::find()
            .filter(Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询教师失败", e))?;

        Ok(result.map(|m| m.into_teacher()))
    }

    /// 分页列出教师
    pub async fn list_teachers_with_pagination_impl(
        &self,
        query: TeacherListQuery,
    ) -> Result<TeacherListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Teachers::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Name.contains(&escaped))
                    .add(Column::Email.contains(&escaped))
                    .add(Column::Subject.contains(&escaped)),
            );
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        select = select.order_by_asc(Column::Name);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| read_error("查询教师总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| read_error("查询教师页数失败", e))?;
        let teachers = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| read_error("查询教师列表失败", e))?;

        Ok(TeacherListResponse {
            items: teachers.into_iter().map(|m| m.into_teacher()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 更新教师信息
    pub async fn update_teacher_impl(
        &self,
        id: i64,
        update: UpdateTeacherRequest,
    ) -> Result<Option<Teacher>> {
        if self.get_teacher_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(user_id) = update.user_id {
            model.user_id = Set(Some(user_id));
        }
        if let Some(name) = update.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(email) = update.email {
            model.email = Set(email.trim().to_lowercase());
        }
        if let Some(phone) = update.phone {
            model.phone = Set(Some(phone));
        }
        if let Some(subject) = update.subject {
            model.subject = Set(Some(subject));
        }
        if let Some(hired_on) = update.hired_on {
            model.hired_on = Set(Some(hired_on));
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| write_error("更新教师失败", e))?;

        Ok(Some(result.into_teacher()))
    }

    /// 删除教师（其负责的班级 teacher_id 置空）
    pub async fn delete_teacher_impl(&self, id: i64) -> Result<bool> {
        let result = Teachers::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| write_error("删除教师失败", e))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn teacher_request(name: &str, email: &str) -> CreateTeacherRequest {
        CreateTeacherRequest {
            user_id: None,
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            subject: Some("Mathematics".to_string()),
            hired_on: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_teacher_linked_to_user() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let user = super::super::users::tests::seed_user(
            &storage,
            "idp_teacher",
            crate::models::users::entities::UserRole::Teacher,
        )
        .await;

        let mut req = teacher_request("Mr Lee", "lee@school.test");
        req.user_id = Some(user.id);
        let teacher = storage.create_teacher_impl(req).await.unwrap();

        let linked = storage
            .get_teacher_by_user_id_impl(user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(linked.id, teacher.id);
        assert_eq!(linked.status, TeacherStatus::Active);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        storage
            .create_teacher_impl(teacher_request("Ms Wong", "wong@school.test"))
            .await
            .unwrap();
        let mut inactive = teacher_request("Mr Ng", "ng@school.test");
        inactive.status = Some(TeacherStatus::Inactive);
        storage.create_teacher_impl(inactive).await.unwrap();

        let result = storage
            .list_teachers_with_pagination_impl(TeacherListQuery {
                page: Some(1),
                size: Some(10),
                status: Some(TeacherStatus::Inactive),
                search: None,
            })
            .await
            .unwrap();
        assert_eq!(result.pagination.total, 1);
        assert_eq!(result.items[0].name, "Mr Ng");
    }
}
