//! 学生档案存储操作

use super::{SeaOrmStorage, read_error, write_error};
use crate::entity::class_enrollments::{Column as EnrollmentColumn, Entity as ClassEnrollments};
use crate::entity::students::{ActiveModel, Column, Entity as Students};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    common::normalize_page,
    enrollments::entities::EnrollmentStatus,
    students::{
        entities::{Student, StudentStatus},
        requests::{CreateStudentRequest, StudentListQuery, UpdateStudentRequest},
        responses::StudentListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 创建学生
    pub async fn create_student_impl(&self, req: CreateStudentRequest) -> Result<Student> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            user_id: Set(req.user_id),
            name: Set(req.name.trim().to_string()),
            email: Set(req.email.trim().to_lowercase()),
            phone: Set(req.phone),
            date_of_birth: Set(req.date_of_birth),
            guardian_name: Set(req.guardian_name),
            guardian_phone: Set(req.guardian_phone),
            address: Set(req.address),
            status: Set(req.status.unwrap_or(StudentStatus::Active).to_string()),
            enrolled_on: Set(req.enrolled_on),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| write_error("创建学生失败", e))?;

        Ok(result.into_student())
    }

    pub async fn get_student_by_id_impl(&self, id: i64) -> Result<Option<Student>> {
        let result = Students::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询学生失败", e))?;

        Ok(result.map(|m| m.into_student()))
    }

    pub async fn get_student_by_email_impl(&self, email: &str) -> Result<Option<Student>> {
        let result = Students::find()
            .filter(Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询学生失败", e))?;

        Ok(result.map(|m| m.into_student()))
    }

    /// 分页列出学生
    pub async fn list_students_with_pagination_impl(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Students::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Name.contains(&escaped))
                    .add(Column::Email.contains(&escaped)),
            );
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        // 班级筛选：只看在读学生
        if let Some(class_id) = query.class_id {
            let student_ids: Vec<i64> = ClassEnrollments::find()
                .select_only()
                .column(EnrollmentColumn::StudentId)
                .filter(EnrollmentColumn::ClassId.eq(class_id))
                .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Active.as_str()))
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| read_error("查询班级学生失败", e))?;
            select = select.filter(Column::Id.is_in(student_ids));
        }

        select = select.order_by_asc(Column::Name);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| read_error("查询学生总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| read_error("查询学生页数失败", e))?;
        let students = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| read_error("查询学生列表失败", e))?;

        Ok(StudentListResponse {
            items: students.into_iter().map(|m| m.into_student()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 更新学生信息
    pub async fn update_student_impl(
        &self,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        if self.get_student_by_id_impl(id).await?.is_none() {
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
        if let Some(date_of_birth) = update.date_of_birth {
            model.date_of_birth = Set(Some(date_of_birth));
        }
        if let Some(guardian_name) = update.guardian_name {
            model.guardian_name = Set(Some(guardian_name));
        }
        if let Some(guardian_phone) = update.guardian_phone {
            model.guardian_phone = Set(Some(guardian_phone));
        }
        if let Some(address) = update.address {
            model.address = Set(Some(address));
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }
        if let Some(enrolled_on) = update.enrolled_on {
            model.enrolled_on = Set(Some(enrolled_on));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| write_error("更新学生失败", e))?;

        Ok(Some(result.into_student()))
    }

    /// 删除学生（选课、考勤、缴费随外键级联删除）
    pub async fn delete_student_impl(&self, id: i64) -> Result<bool> {
        let result = Students::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| write_error("删除学生失败", e))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn student_request(name: &str, email: &str) -> CreateStudentRequest {
        CreateStudentRequest {
            user_id: None,
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            date_of_birth: None,
            guardian_name: None,
            guardian_phone: None,
            address: None,
            status: None,
            enrolled_on: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_search_students() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        storage
            .create_student_impl(student_request("Alice Tan", "Alice@School.test"))
            .await
            .unwrap();
        storage
            .create_student_impl(student_request("Bob Lim", "bob@school.test"))
            .await
            .unwrap();

        // 邮箱统一小写保存
        let alice = storage
            .get_student_by_email_impl("alice@school.test")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(alice.status, StudentStatus::Active);

        let result = storage
            .list_students_with_pagination_impl(StudentListQuery {
                page: None,
                size: None,
                status: None,
                search: Some("lim".to_string()),
                class_id: None,
            })
            .await
            .unwrap();
        assert_eq!(result.pagination.total, 1);
        assert_eq!(result.items[0].name, "Bob Lim");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        storage
            .create_student_impl(student_request("Alice", "alice@school.test"))
            .await
            .unwrap();

        let err = storage
            .create_student_impl(student_request("Alice Again", "alice@school.test"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let mut req = student_request("Carol", "carol@school.test");
        req.phone = Some("+60 12 345 6789".to_string());
        let student = storage.create_student_impl(req).await.unwrap();

        let updated = storage
            .update_student_impl(
                student.id,
                UpdateStudentRequest {
                    status: Some(StudentStatus::Graduated),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, StudentStatus::Graduated);
        assert_eq!(updated.phone.as_deref(), Some("+60 12 345 6789"));

        assert!(
            storage
                .update_student_impl(9999, UpdateStudentRequest::default())
                .await
                .unwrap()
                .is_none()
        );
    }
}
