//! 选课存储操作

use std::collections::HashMap;

use super::{SeaOrmStorage, read_error, write_error};
use crate::entity::class_enrollments::{ActiveModel, Column, Entity as ClassEnrollments};
use crate::entity::classes::{Column as ClassColumn, Entity as Classes};
use crate::entity::students::Entity as Students;
use crate::errors::{Result, SchoolOpsError};
use crate::models::{
    PaginationInfo,
    common::normalize_page,
    enrollments::{
        entities::{ClassEnrollment, EnrollmentStatus},
        requests::{CreateEnrollmentRequest, EnrollmentListQuery},
        responses::{EnrollmentDetail, EnrollmentListResponse},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 学生选课
    ///
    /// 已退课的记录重新激活；在读记录重复选课返回 Conflict；超出班级容量返回 Validation
    pub async fn create_enrollment_impl(
        &self,
        req: CreateEnrollmentRequest,
    ) -> Result<ClassEnrollment> {
        let class = Classes::find_by_id(req.class_id)
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询班级失败", e))?
            .ok_or_else(|| SchoolOpsError::not_found(format!("班级 {} 不存在", req.class_id)))?;

        let existing = self
            .find_enrollment_model(req.student_id, req.class_id)
            .await?;
        if existing
            .as_ref()
            .is_some_and(|m| m.status == EnrollmentStatus::Active.as_str())
        {
            return Err(SchoolOpsError::conflict("学生已在该班级中"));
        }

        if let Some(capacity) = class.capacity
            && self.count_active_enrollments(class.id).await? >= capacity.max(0) as u64
        {
            return Err(SchoolOpsError::validation(format!(
                "班级已满（容量 {capacity}）"
            )));
        }

        let now = chrono::Utc::now().timestamp();
        let result = match existing {
            Some(model) => {
                let mut active: ActiveModel = model.into();
                active.status = Set(EnrollmentStatus::Active.to_string());
                active.enrolled_at = Set(now);
                active.updated_at = Set(now);
                active
                    .update(&self.db)
                    .await
                    .map_err(|e| write_error("恢复选课失败", e))?
            }
            None => ActiveModel {
                student_id: Set(req.student_id),
                class_id: Set(req.class_id),
                status: Set(EnrollmentStatus::Active.to_string()),
                enrolled_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&self.db)
            .await
            .map_err(|e| write_error("创建选课失败", e))?,
        };

        Ok(result.into_enrollment())
    }

    async fn find_enrollment_model(
        &self,
        student_id: i64,
        class_id: i64,
    ) -> Result<Option<crate::entity::class_enrollments::Model>> {
        ClassEnrollments::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::ClassId.eq(class_id))
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询选课失败", e))
    }

    pub async fn get_enrollment_by_id_impl(&self, id: i64) -> Result<Option<ClassEnrollment>> {
        let result = ClassEnrollments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询选课失败", e))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    pub async fn get_enrollment_by_student_and_class_impl(
        &self,
        student_id: i64,
        class_id: i64,
    ) -> Result<Option<ClassEnrollment>> {
        Ok(self
            .find_enrollment_model(student_id, class_id)
            .await?
            .map(|m| m.into_enrollment()))
    }

    /// 分页列出选课记录
    pub async fn list_enrollments_with_pagination_impl(
        &self,
        query: EnrollmentListQuery,
    ) -> Result<EnrollmentListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = ClassEnrollments::find();

        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        let paginator = select
            .order_by_desc(Column::EnrolledAt)
            .find_also_related(Students)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| read_error("查询选课总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| read_error("查询选课页数失败", e))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| read_error("查询选课列表失败", e))?;

        let class_ids: Vec<i64> = rows.iter().map(|(e, _)| e.class_id).collect();
        let class_names: HashMap<i64, String> = if class_ids.is_empty() {
            HashMap::new()
        } else {
            Classes::find()
                .filter(ClassColumn::Id.is_in(class_ids))
                .all(&self.db)
                .await
                .map_err(|e| read_error("查询班级失败", e))?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect()
        };

        let items = rows
            .into_iter()
            .map(|(enrollment, student)| EnrollmentDetail {
                student_name: student.map(|s| s.name).unwrap_or_default(),
                class_name: class_names
                    .get(&enrollment.class_id)
                    .cloned()
                    .unwrap_or_default(),
                enrollment: enrollment.into_enrollment(),
            })
            .collect();

        Ok(EnrollmentListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 更新选课状态（退课 / 恢复）
    pub async fn update_enrollment_status_impl(
        &self,
        id: i64,
        status: EnrollmentStatus,
    ) -> Result<Option<ClassEnrollment>> {
        let Some(model) = ClassEnrollments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询选课失败", e))?
        else {
            return Ok(None);
        };

        let mut active: ActiveModel = model.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(chrono::Utc::now().timestamp());

        let result = active
            .update(&self.db)
            .await
            .map_err(|e| write_error("更新选课失败", e))?;

        Ok(Some(result.into_enrollment()))
    }

    pub async fn delete_enrollment_impl(&self, id: i64) -> Result<bool> {
        let result = ClassEnrollments::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| write_error("删除选课失败", e))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::classes::tests::class_request;
    use crate::storage::sea_orm_storage::students::tests::student_request;

    #[tokio::test]
    async fn test_enroll_drop_and_reactivate() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let class = storage
            .create_class_impl(class_request("Art", None))
            .await
            .unwrap();
        let student = storage
            .create_student_impl(student_request("Dan", "dan@school.test"))
            .await
            .unwrap();
        let req = CreateEnrollmentRequest {
            student_id: student.id,
            class_id: class.id,
        };

        let enrollment = storage.create_enrollment_impl(req.clone()).await.unwrap();
        assert_eq!(enrollment.status, EnrollmentStatus::Active);

        // 在读时重复选课
        let err = storage
            .create_enrollment_impl(req.clone())
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        storage
            .update_enrollment_status_impl(enrollment.id, EnrollmentStatus::Dropped)
            .await
            .unwrap()
            .unwrap();

        // 退课后重新选课沿用原记录
        let again = storage.create_enrollment_impl(req).await.unwrap();
        assert_eq!(again.id, enrollment.id);
        assert_eq!(again.status, EnrollmentStatus::Active);
    }

    #[tokio::test]
    async fn test_capacity_is_enforced() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let mut req = class_request("Tiny", None);
        req.capacity = Some(1);
        let class = storage.create_class_impl(req).await.unwrap();

        for (name, email) in [("A", "a@school.test"), ("B", "b@school.test")] {
            let student = storage
                .create_student_impl(student_request(name, email))
                .await
                .unwrap();
            let result = storage
                .create_enrollment_impl(CreateEnrollmentRequest {
                    student_id: student.id,
                    class_id: class.id,
                })
                .await;
            if name == "A" {
                assert!(result.is_ok());
            } else {
                assert!(matches!(result, Err(SchoolOpsError::Validation(_))));
            }
        }
    }
}
