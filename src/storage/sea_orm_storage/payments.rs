//! 学费缴纳存储操作

use std::collections::{HashMap, HashSet};

use super::{SeaOrmStorage, read_error, write_error};
use crate::entity::class_enrollments::{Column as EnrollmentColumn, Entity as ClassEnrollments};
use crate::entity::classes::{Column as ClassColumn, Entity as Classes};
use crate::entity::course_payments::{ActiveModel, Column, Entity as CoursePayments, Model};
use crate::entity::students::{Column as StudentColumn, Entity as Students};
use crate::errors::{Result, SchoolOpsError};
use crate::models::{
    PaginationInfo,
    common::normalize_page,
    enrollments::entities::EnrollmentStatus,
    payments::{
        entities::{CoursePayment, PaymentMethod, PaymentStatus},
        requests::{CreatePaymentRequest, PaymentListQuery, UpdatePaymentRequest},
        responses::{
            ClassPaymentSummary, PaymentDetail, PaymentListResponse, PaymentSummaryResponse,
            StudentPaymentStatus,
        },
    },
};
use crate::utils::random_code::generate_receipt_no;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

// 收据号碰撞时的重试次数
const RECEIPT_ATTEMPTS: usize = 5;

impl SeaOrmStorage {
    /// 记录一笔学费
    pub async fn create_payment_impl(
        &self,
        recorded_by: i64,
        req: CreatePaymentRequest,
    ) -> Result<CoursePayment> {
        let receipt_no = self.unused_receipt_no(req.year, req.month).await?;
        let status = req.status.unwrap_or(PaymentStatus::Paid);
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            student_id: Set(req.student_id),
            class_id: Set(req.class_id),
            month: Set(req.month),
            year: Set(req.year),
            amount: Set(req.amount),
            method: Set(req.method.unwrap_or(PaymentMethod::Cash).to_string()),
            status: Set(status.to_string()),
            paid_at: Set((status == PaymentStatus::Paid).then_some(now)),
            receipt_no: Set(receipt_no),
            notes: Set(req.notes),
            recorded_by: Set(Some(recorded_by)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| write_error("创建缴费记录失败", e))?;

        Ok(result.into_payment())
    }

    async fn unused_receipt_no(&self, year: i32, month: i32) -> Result<String> {
        for _ in 0..RECEIPT_ATTEMPTS {
            let candidate = generate_receipt_no(year, month);
            let taken = CoursePayments::find()
                .filter(Column::ReceiptNo.eq(candidate.as_str()))
                .count(&self.db)
                .await
                .map_err(|e| read_error("查询收据号失败", e))?;
            if taken == 0 {
                return Ok(candidate);
            }
        }
        Err(SchoolOpsError::conflict("无法生成唯一的收据号"))
    }

    pub async fn get_payment_by_id_impl(&self, id: i64) -> Result<Option<PaymentDetail>> {
        let Some(model) = CoursePayments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询缴费记录失败", e))?
        else {
            return Ok(None);
        };

        let mut details = self.payment_details(vec![model]).await?;
        Ok(details.pop())
    }

    pub async fn get_payment_by_period_impl(
        &self,
        student_id: i64,
        class_id: i64,
        month: i32,
        year: i32,
    ) -> Result<Option<CoursePayment>> {
        let result = CoursePayments::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::Month.eq(month))
            .filter(Column::Year.eq(year))
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询缴费记录失败", e))?;

        Ok(result.map(|m| m.into_payment()))
    }

    /// 分页列出缴费记录
    pub async fn list_payments_with_pagination_impl(
        &self,
        query: PaymentListQuery,
    ) -> Result<PaymentListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = CoursePayments::find();

        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }
        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        if let Some(month) = query.month {
            select = select.filter(Column::Month.eq(month));
        }
        if let Some(year) = query.year {
            select = select.filter(Column::Year.eq(year));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        let paginator = select
            .order_by_desc(Column::Year)
            .order_by_desc(Column::Month)
            .order_by_desc(Column::CreatedAt)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| read_error("查询缴费总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| read_error("查询缴费页数失败", e))?;
        let payments = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| read_error("查询缴费列表失败", e))?;

        Ok(PaymentListResponse {
            items: self.payment_details(payments).await?,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 更新缴费记录；首次变为 paid 时写入 paid_at
    pub async fn update_payment_impl(
        &self,
        id: i64,
        update: UpdatePaymentRequest,
    ) -> Result<Option<CoursePayment>> {
        let Some(existing) = CoursePayments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询缴费记录失败", e))?
        else {
            return Ok(None);
        };

        let now = chrono::Utc::now().timestamp();
        let paid_at = existing.paid_at;
        let mut model: ActiveModel = existing.into();

        if let Some(amount) = update.amount {
            model.amount = Set(amount);
        }
        if let Some(method) = update.method {
            model.method = Set(method.to_string());
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
            if status == PaymentStatus::Paid && paid_at.is_none() {
                model.paid_at = Set(Some(now));
            }
        }
        if let Some(notes) = update.notes {
            model.notes = Set(Some(notes));
        }
        model.updated_at = Set(now);

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| write_error("更新缴费记录失败", e))?;

        Ok(Some(result.into_payment()))
    }

    pub async fn delete_payment_impl(&self, id: i64) -> Result<bool> {
        let result = CoursePayments::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| write_error("删除缴费记录失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 月度缴费汇总：按班级分组，再列出每个学生的缴费情况
    ///
    /// 学生集合为在读学生加上该月已有缴费记录的学生；
    /// 未缴人数只统计在读学生，已缴人数包含所有已缴记录
    pub async fn payment_summary_impl(
        &self,
        month: i32,
        year: i32,
    ) -> Result<PaymentSummaryResponse> {
        let classes = Classes::find()
            .order_by_asc(ClassColumn::Name)
            .all(&self.db)
            .await
            .map_err(|e| read_error("查询班级失败", e))?;

        let enrollments = ClassEnrollments::find()
            .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Active.as_str()))
            .all(&self.db)
            .await
            .map_err(|e| read_error("查询选课失败", e))?;

        let payments = CoursePayments::find()
            .filter(Column::Month.eq(month))
            .filter(Column::Year.eq(year))
            .all(&self.db)
            .await
            .map_err(|e| read_error("查询缴费记录失败", e))?;

        let mut student_ids: Vec<i64> = enrollments
            .iter()
            .map(|e| e.student_id)
            .chain(payments.iter().map(|p| p.student_id))
            .collect();
        student_ids.sort_unstable();
        student_ids.dedup();
        let student_names: HashMap<i64, String> = if student_ids.is_empty() {
            HashMap::new()
        } else {
            Students::find()
                .filter(StudentColumn::Id.is_in(student_ids))
                .all(&self.db)
                .await
                .map_err(|e| read_error("查询学生失败", e))?
                .into_iter()
                .map(|s| (s.id, s.name))
                .collect()
        };

        // class_id -> student_id 集合
        let mut members: HashMap<i64, Vec<i64>> = HashMap::new();
        for enrollment in &enrollments {
            members
                .entry(enrollment.class_id)
                .or_default()
                .push(enrollment.student_id);
        }
        // (class_id, student_id) -> payment
        let mut payment_map: HashMap<(i64, i64), Model> = HashMap::new();
        for payment in payments {
            let ids = members.entry(payment.class_id).or_default();
            if !ids.contains(&payment.student_id) {
                ids.push(payment.student_id);
            }
            payment_map.insert((payment.class_id, payment.student_id), payment);
        }

        let mut summary = PaymentSummaryResponse {
            month,
            year,
            total_collected: 0.0,
            total_expected: 0.0,
            total_paid: 0,
            total_unpaid: 0,
            classes: Vec::with_capacity(classes.len()),
        };

        for class in classes {
            let enrolled_ids: HashSet<i64> = enrollments
                .iter()
                .filter(|e| e.class_id == class.id)
                .map(|e| e.student_id)
                .collect();
            let enrolled = enrolled_ids.len() as i64;

            let mut students: Vec<StudentPaymentStatus> = members
                .remove(&class.id)
                .unwrap_or_default()
                .into_iter()
                .map(|student_id| {
                    let payment = payment_map.get(&(class.id, student_id));
                    let status = payment.and_then(|p| p.status.parse::<PaymentStatus>().ok());
                    let paid = status == Some(PaymentStatus::Paid);
                    StudentPaymentStatus {
                        student_id,
                        student_name: student_names.get(&student_id).cloned().unwrap_or_default(),
                        enrolled: enrolled_ids.contains(&student_id),
                        paid,
                        payment_id: payment.map(|p| p.id),
                        status,
                        amount: if paid {
                            payment.map(|p| p.amount).unwrap_or(0.0)
                        } else {
                            0.0
                        },
                        receipt_no: payment.map(|p| p.receipt_no.clone()),
                    }
                })
                .collect();
            students.sort_by(|a, b| a.student_name.cmp(&b.student_name));

            let paid_count = students.iter().filter(|s| s.paid).count() as i64;
            let unpaid_count = students.iter().filter(|s| s.enrolled && !s.paid).count() as i64;
            let collected_amount: f64 = students.iter().map(|s| s.amount).sum();
            let class_summary = ClassPaymentSummary {
                class_id: class.id,
                class_name: class.name,
                monthly_fee: class.monthly_fee,
                enrolled,
                paid_count,
                unpaid_count,
                collected_amount,
                expected_amount: class.monthly_fee * enrolled as f64,
                students,
            };

            summary.total_collected += class_summary.collected_amount;
            summary.total_expected += class_summary.expected_amount;
            summary.total_paid += class_summary.paid_count;
            summary.total_unpaid += class_summary.unpaid_count;
            summary.classes.push(class_summary);
        }

        Ok(summary)
    }

    /// 附带学生与班级名称
    async fn payment_details(&self, payments: Vec<Model>) -> Result<Vec<PaymentDetail>> {
        if payments.is_empty() {
            return Ok(Vec::new());
        }

        let student_ids: Vec<i64> = payments.iter().map(|p| p.student_id).collect();
        let class_ids: Vec<i64> = payments.iter().map(|p| p.class_id).collect();

        let student_names: HashMap<i64, String> = Students::find()
            .filter(StudentColumn::Id.is_in(student_ids))
            .all(&self.db)
            .await
            .map_err(|e| read_error("查询学生失败", e))?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();
        let class_names: HashMap<i64, String> = Classes::find()
            .filter(ClassColumn::Id.is_in(class_ids))
            .all(&self.db)
            .await
            .map_err(|e| read_error("查询班级失败", e))?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        Ok(payments
            .into_iter()
            .map(|p| PaymentDetail {
                student_name: student_names.get(&p.student_id).cloned().unwrap_or_default(),
                class_name: class_names.get(&p.class_id).cloned().unwrap_or_default(),
                payment: p.into_payment(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enrollments::requests::CreateEnrollmentRequest;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::classes::tests::class_request;
    use crate::storage::sea_orm_storage::students::tests::student_request;
    use crate::storage::sea_orm_storage::users::tests::seed_user;

    fn payment_request(student_id: i64, class_id: i64) -> CreatePaymentRequest {
        CreatePaymentRequest {
            student_id,
            class_id,
            month: 3,
            year: 2025,
            amount: 120.0,
            method: None,
            status: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_payment_generates_receipt() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let class = storage
            .create_class_impl(class_request("Piano", None))
            .await
            .unwrap();
        let student = storage
            .create_student_impl(student_request("Eve", "eve@school.test"))
            .await
            .unwrap();

        let payment = storage
            .create_payment_impl(admin.id, payment_request(student.id, class.id))
            .await
            .unwrap();
        assert!(payment.receipt_no.starts_with("RCP-202503-"));
        assert_eq!(payment.status, PaymentStatus::Paid);
        assert_eq!(payment.method, PaymentMethod::Cash);
        assert!(payment.paid_at.is_some());

        // 同一周期的第二笔由唯一索引拦截
        let err = storage
            .create_payment_impl(admin.id, payment_request(student.id, class.id))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let found = storage
            .get_payment_by_period_impl(student.id, class.id, 3, 2025)
            .await
            .unwrap();
        assert_eq!(found.map(|p| p.id), Some(payment.id));

        let detail = storage
            .get_payment_by_id_impl(payment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.student_name, "Eve");
        assert_eq!(detail.class_name, "Piano");
    }

    #[tokio::test]
    async fn test_pending_payment_stamped_when_paid() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let class = storage
            .create_class_impl(class_request("Violin", None))
            .await
            .unwrap();
        let student = storage
            .create_student_impl(student_request("Finn", "finn@school.test"))
            .await
            .unwrap();

        let mut req = payment_request(student.id, class.id);
        req.status = Some(PaymentStatus::Pending);
        let payment = storage.create_payment_impl(admin.id, req).await.unwrap();
        assert!(payment.paid_at.is_none());

        let updated = storage
            .update_payment_impl(
                payment.id,
                UpdatePaymentRequest {
                    status: Some(PaymentStatus::Paid),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(updated.paid_at.is_some());
    }

    #[tokio::test]
    async fn test_summary_groups_by_class_then_student() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let class = storage
            .create_class_impl(class_request("Drama", None))
            .await
            .unwrap();
        let empty_class = storage
            .create_class_impl(class_request("Ballet", None))
            .await
            .unwrap();

        let mut ids = Vec::new();
        for (name, email) in [("Gina", "gina@school.test"), ("Hugo", "hugo@school.test")] {
            let student = storage
                .create_student_impl(student_request(name, email))
                .await
                .unwrap();
            storage
                .create_enrollment_impl(CreateEnrollmentRequest {
                    student_id: student.id,
                    class_id: class.id,
                })
                .await
                .unwrap();
            ids.push(student.id);
        }
        storage
            .create_payment_impl(admin.id, payment_request(ids[0], class.id))
            .await
            .unwrap();

        let summary = storage.payment_summary_impl(3, 2025).await.unwrap();
        assert_eq!(summary.classes.len(), 2);
        assert_eq!(summary.classes[0].class_id, empty_class.id);
        assert!(summary.classes[0].students.is_empty());

        let drama = &summary.classes[1];
        assert_eq!(drama.enrolled, 2);
        assert_eq!(drama.paid_count, 1);
        assert_eq!(drama.unpaid_count, 1);
        assert_eq!(drama.collected_amount, 120.0);
        assert_eq!(drama.expected_amount, 240.0);
        assert_eq!(drama.students[0].student_name, "Gina");
        assert!(drama.students[0].paid);
        assert!(!drama.students[1].paid);

        assert_eq!(summary.total_paid, 1);
        assert_eq!(summary.total_collected, 120.0);

        // 其他月份没有缴费
        let other = storage.payment_summary_impl(4, 2025).await.unwrap();
        assert_eq!(other.total_paid, 0);
        assert_eq!(other.total_unpaid, 2);
    }

    #[tokio::test]
    async fn test_summary_unpaid_counts_only_enrolled_students() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let class = storage
            .create_class_impl(class_request("Chess", None))
            .await
            .unwrap();

        let enrolled = storage
            .create_student_impl(student_request("Ivan", "ivan@school.test"))
            .await
            .unwrap();
        storage
            .create_enrollment_impl(CreateEnrollmentRequest {
                student_id: enrolled.id,
                class_id: class.id,
            })
            .await
            .unwrap();
        // 已退课但仍交了本月学费
        let former = storage
            .create_student_impl(student_request("Jade", "jade@school.test"))
            .await
            .unwrap();
        storage
            .create_payment_impl(admin.id, payment_request(former.id, class.id))
            .await
            .unwrap();
        // 未在读且只有待缴记录
        let pending = storage
            .create_student_impl(student_request("Kofi", "kofi@school.test"))
            .await
            .unwrap();
        storage
            .create_payment_impl(
                admin.id,
                CreatePaymentRequest {
                    status: Some(PaymentStatus::Pending),
                    ..payment_request(pending.id, class.id)
                },
            )
            .await
            .unwrap();

        let summary = storage.payment_summary_impl(3, 2025).await.unwrap();
        let chess = &summary.classes[0];
        assert_eq!(chess.students.len(), 3);
        assert_eq!(chess.enrolled, 1);
        assert_eq!(chess.paid_count, 1);
        assert_eq!(chess.unpaid_count, 1);
        assert!(chess.paid_count + chess.unpaid_count <= chess.students.len() as i64);
        assert_eq!(chess.collected_amount, 120.0);
        assert_eq!(chess.expected_amount, 120.0);

        let by_name = |name: &str| {
            chess
                .students
                .iter()
                .find(|s| s.student_name == name)
                .unwrap()
        };
        assert!(by_name("Ivan").enrolled && !by_name("Ivan").paid);
        assert!(!by_name("Jade").enrolled && by_name("Jade").paid);
        assert!(!by_name("Kofi").enrolled && !by_name("Kofi").paid);
        assert_eq!(summary.total_unpaid, 1);
    }
}
