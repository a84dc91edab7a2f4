//! 班级存储操作

use std::collections::HashMap;

use super::{SeaOrmStorage, read_error, write_error};
use crate::entity::class_enrollments::{Column as EnrollmentColumn, Entity as ClassEnrollments};
use crate::entity::classes::{ActiveModel, Column, Entity as Classes};
use crate::entity::teachers::{Column as TeacherColumn, Entity as Teachers};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    classes::{
        entities::Class,
        requests::{ClassListQuery, CreateClassRequest, UpdateClassRequest},
        responses::{ClassListItem, ClassListResponse},
    },
    common::normalize_page,
    enrollments::entities::EnrollmentStatus,
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 创建班级
    pub async fn create_class_impl(&self, req: CreateClassRequest) -> Result<Class> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name.trim().to_string()),
            description: Set(req.description),
            teacher_id: Set(req.teacher_id),
            level: Set(req.level),
            monthly_fee: Set(req.monthly_fee.unwrap_or(0.0)),
            capacity: Set(req.capacity),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| write_error("创建班级失败", e))?;

        Ok(result.into_class())
    }

    /// 通过 ID 获取班级
    pub async fn get_class_by_id_impl(&self, class_id: i64) -> Result<Option<Class>> {
        let result = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询班级失败", e))?;

        Ok(result.map(|m| m.into_class()))
    }

    pub async fn get_class_by_name_impl(&self, name: &str) -> Result<Option<Class>> {
        let result = Classes::find()
            .filter(Column::Name.eq(name.trim()))
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询班级失败", e))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 分页列出班级，附带教师姓名与在读人数
    pub async fn list_classes_with_pagination_impl(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Classes::find();

        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(Column::Name.contains(&escaped));
        }

        select = select.order_by_asc(Column::Name);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| read_error("查询班级总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| read_error("查询班级页数失败", e))?;
        let classes = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| read_error("查询班级列表失败", e))?;

        // 批量加载教师姓名
        let teacher_ids: Vec<i64> = classes.iter().filter_map(|c| c.teacher_id).collect();
        let teacher_names: HashMap<i64, String> = if teacher_ids.is_empty() {
            HashMap::new()
        } else {
            Teachers::find()
                .filter(TeacherColumn::Id.is_in(teacher_ids))
                .all(&self.db)
                .await
                .map_err(|e| read_error("查询教师失败", e))?
                .into_iter()
                .map(|t| (t.id, t.name))
                .collect()
        };

        // 统计在读人数
        let class_ids: Vec<i64> = classes.iter().map(|c| c.id).collect();
        let mut enrollment_counts: HashMap<i64, i64> = HashMap::new();
        if !class_ids.is_empty() {
            let rows: Vec<i64> = ClassEnrollments::find()
                .select_only()
                .column(EnrollmentColumn::ClassId)
                .filter(EnrollmentColumn::ClassId.is_in(class_ids))
                .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Active.as_str()))
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| read_error("统计选课人数失败", e))?;
            for class_id in rows {
                *enrollment_counts.entry(class_id).or_insert(0) += 1;
            }
        }

        let items = classes
            .into_iter()
            .map(|m| {
                let teacher_name = m.teacher_id.and_then(|id| teacher_names.get(&id).cloned());
                let active_enrollments = enrollment_counts.get(&m.id).copied().unwrap_or(0);
                ClassListItem {
                    class: m.into_class(),
                    teacher_name,
                    active_enrollments,
                }
            })
            .collect();

        Ok(ClassListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 更新班级信息
    pub async fn update_class_impl(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        if self.get_class_by_id_impl(class_id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(class_id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(teacher_id) = update.teacher_id {
            model.teacher_id = Set(Some(teacher_id));
        }
        if let Some(level) = update.level {
            model.level = Set(Some(level));
        }
        if let Some(monthly_fee) = update.monthly_fee {
            model.monthly_fee = Set(monthly_fee);
        }
        if let Some(capacity) = update.capacity {
            model.capacity = Set(Some(capacity));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| write_error("更新班级失败", e))?;

        Ok(Some(result.into_class()))
    }

    /// 删除班级（关联数据由外键级联删除）
    pub async fn delete_class_impl(&self, class_id: i64) -> Result<bool> {
        let result = Classes::delete_by_id(class_id)
            .exec(&self.db)
            .await
            .map_err(|e| write_error("删除班级失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 班级在读人数
    pub(crate) async fn count_active_enrollments(&self, class_id: i64) -> Result<u64> {
        ClassEnrollments::find()
            .filter(EnrollmentColumn::ClassId.eq(class_id))
            .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Active.as_str()))
            .count(&self.db)
            .await
            .map_err(|e| read_error("统计选课人数失败", e))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn class_request(name: &str, teacher_id: Option<i64>) -> CreateClassRequest {
        CreateClassRequest {
            name: name.to_string(),
            description: None,
            teacher_id,
            level: Some("Primary 5".to_string()),
            monthly_fee: Some(120.0),
            capacity: Some(20),
        }
    }

    #[tokio::test]
    async fn test_class_list_includes_teacher_and_counts() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let teacher = storage
            .create_teacher_impl(super::super::teachers::tests::teacher_request(
                "Ms Wong",
                "wong@school.test",
            ))
            .await
            .unwrap();
        let class = storage
            .create_class_impl(class_request("Math P5", Some(teacher.id)))
            .await
            .unwrap();
        let student = storage
            .create_student_impl(super::super::students::tests::student_request(
                "Alice",
                "alice@school.test",
            ))
            .await
            .unwrap();
        storage
            .create_enrollment_impl(crate::models::enrollments::requests::CreateEnrollmentRequest {
                student_id: student.id,
                class_id: class.id,
            })
            .await
            .unwrap();

        let result = storage
            .list_classes_with_pagination_impl(ClassListQuery {
                page: None,
                size: None,
                teacher_id: None,
                search: None,
            })
            .await
            .unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].teacher_name.as_deref(), Some("Ms Wong"));
        assert_eq!(result.items[0].active_enrollments, 1);
        assert_eq!(storage.count_active_enrollments(class.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_class_name_is_conflict() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        storage
            .create_class_impl(class_request("Science", None))
            .await
            .unwrap();

        let err = storage
            .create_class_impl(class_request("Science", None))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_delete_class_cascades_to_operations_data() {
        use crate::entity::{
            assignments, class_attendance, class_enrollments, class_schedules, class_sessions,
            course_payments,
        };
        use crate::models::assignments::requests::CreateAssignmentRequest;
        use crate::models::enrollments::requests::CreateEnrollmentRequest;
        use crate::models::payments::requests::CreatePaymentRequest;
        use crate::models::schedules::requests::CreateScheduleRequest;
        use crate::models::users::entities::UserRole;
        use chrono::{NaiveDate, NaiveTime};

        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let admin = super::super::users::tests::seed_user(&storage, "idp_admin", UserRole::Admin)
            .await;
        let class = storage
            .create_class_impl(class_request("Violin", None))
            .await
            .unwrap();
        let student = storage
            .create_student_impl(super::super::students::tests::student_request(
                "Bima",
                "bima@school.test",
            ))
            .await
            .unwrap();
        storage
            .create_enrollment_impl(CreateEnrollmentRequest {
                student_id: student.id,
                class_id: class.id,
            })
            .await
            .unwrap();
        storage
            .create_schedule_impl(CreateScheduleRequest {
                class_id: class.id,
                day_of_week: 1,
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                room: None,
                teacher_ids: vec![],
            })
            .await
            .unwrap();
        let session = storage
            .create_session_impl(super::super::sessions::tests::session_request(
                class.id,
                NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            ))
            .await
            .unwrap();
        let attendance = storage
            .get_session_attendance_impl(&session, admin.id)
            .await
            .unwrap();
        assert_eq!(attendance.items.len(), 1);
        storage
            .create_assignment_impl(
                admin.id,
                CreateAssignmentRequest {
                    class_id: class.id,
                    title: "Scales".to_string(),
                    description: None,
                    due_date: None,
                    max_score: None,
                },
            )
            .await
            .unwrap();
        storage
            .create_payment_impl(
                admin.id,
                CreatePaymentRequest {
                    student_id: student.id,
                    class_id: class.id,
                    month: 3,
                    year: 2025,
                    amount: 150.0,
                    method: None,
                    status: None,
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert!(storage.delete_class_impl(class.id).await.unwrap());
        assert!(!storage.delete_class_impl(class.id).await.unwrap());

        let db = &storage.db;
        assert_eq!(class_schedules::Entity::find().count(db).await.unwrap(), 0);
        assert_eq!(class_sessions::Entity::find().count(db).await.unwrap(), 0);
        assert_eq!(class_enrollments::Entity::find().count(db).await.unwrap(), 0);
        assert_eq!(class_attendance::Entity::find().count(db).await.unwrap(), 0);
        assert_eq!(assignments::Entity::find().count(db).await.unwrap(), 0);
        assert_eq!(course_payments::Entity::find().count(db).await.unwrap(), 0);

        // 学生档案不随班级删除
        assert!(storage.get_student_by_id_impl(student.id).await.unwrap().is_some());
    }
}
