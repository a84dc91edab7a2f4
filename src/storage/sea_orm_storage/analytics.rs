//! 统计分析存储操作

use std::collections::HashMap;

use super::{SeaOrmStorage, read_error};
use crate::entity::class_attendance::{Column as AttendanceColumn, Entity as ClassAttendance};
use crate::entity::class_enrollments::{Column as EnrollmentColumn, Entity as ClassEnrollments};
use crate::entity::class_sessions::{Column as SessionColumn, Entity as ClassSessions};
use crate::entity::classes::{Column as ClassColumn, Entity as Classes};
use crate::entity::course_payments::{Column as PaymentColumn, Entity as CoursePayments};
use crate::entity::students::{Column as StudentColumn, Entity as Students};
use crate::entity::teachers::{Column as TeacherColumn, Entity as Teachers};
use crate::errors::{Result, SchoolOpsError};
use crate::models::{
    analytics::{
        AnalyticsOverview, AttendanceBreakdown, ClassAttendanceRate, EntityCounts,
        PaymentOverview,
    },
    attendance::{entities::AttendanceStatus, responses::attendance_rate},
    enrollments::entities::EnrollmentStatus,
    payments::entities::PaymentStatus,
    sessions::entities::SessionStatus,
    students::entities::StudentStatus,
    teachers::entities::TeacherStatus,
};
use crate::utils::dates::month_bounds;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

impl SeaOrmStorage {
    /// 指定月份的运营概览
    pub async fn analytics_overview_impl(
        &self,
        month: i32,
        year: i32,
    ) -> Result<AnalyticsOverview> {
        let (first_day, last_day) = u32::try_from(month)
            .ok()
            .and_then(|m| month_bounds(year, m))
            .ok_or_else(|| SchoolOpsError::validation(format!("无效的月份: {year}-{month}")))?;

        let counts = self.entity_counts().await?;

        // 月内未取消的课次
        let sessions: Vec<(i64, i64)> = ClassSessions::find()
            .select_only()
            .column(SessionColumn::Id)
            .column(SessionColumn::ClassId)
            .filter(SessionColumn::SessionDate.gte(first_day))
            .filter(SessionColumn::SessionDate.lte(last_day))
            .filter(SessionColumn::Status.ne(SessionStatus::Cancelled.as_str()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| read_error("查询课次失败", e))?;
        let session_class: HashMap<i64, i64> = sessions.iter().copied().collect();

        let mut attendance = AttendanceBreakdown::default();
        // class_id -> (attended, total)
        let mut per_class: HashMap<i64, (i64, i64)> = HashMap::new();

        if !session_class.is_empty() {
            let rows: Vec<(i64, String)> = ClassAttendance::find()
                .select_only()
                .column(AttendanceColumn::SessionId)
                .column(AttendanceColumn::Status)
                .filter(AttendanceColumn::SessionId.is_in(session_class.keys().copied()))
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| read_error("查询考勤失败", e))?;

            for (session_id, status) in rows {
                let status = status
                    .parse::<AttendanceStatus>()
                    .unwrap_or(AttendanceStatus::Absent);
                match status {
                    AttendanceStatus::Present => attendance.present += 1,
                    AttendanceStatus::Late => attendance.late += 1,
                    AttendanceStatus::Absent => attendance.absent += 1,
                    AttendanceStatus::Excused => attendance.excused += 1,
                    AttendanceStatus::Sick => attendance.sick += 1,
                }
                attendance.total += 1;

                if let Some(class_id) = session_class.get(&session_id) {
                    let entry = per_class.entry(*class_id).or_default();
                    entry.1 += 1;
                    if status.counts_as_attended() {
                        entry.0 += 1;
                    }
                }
            }
        }
        attendance.attendance_rate =
            attendance_rate(attendance.present + attendance.late, attendance.total);

        let class_attendance = self.class_attendance_rates(per_class).await?;
        let payments = self
            .payment_overview(month, year, counts.active_enrollments)
            .await?;

        Ok(AnalyticsOverview {
            month,
            year,
            counts,
            attendance,
            payments,
            class_attendance,
        })
    }

    async fn entity_counts(&self) -> Result<EntityCounts> {
        let active_students = Students::find()
            .filter(StudentColumn::Status.eq(StudentStatus::Active.as_str()))
            .count(&self.db)
            .await
            .map_err(|e| read_error("统计学生失败", e))?;
        let active_teachers = Teachers::find()
            .filter(TeacherColumn::Status.eq(TeacherStatus::Active.as_str()))
            .count(&self.db)
            .await
            .map_err(|e| read_error("统计教师失败", e))?;
        let classes = Classes::find()
            .count(&self.db)
            .await
            .map_err(|e| read_error("统计班级失败", e))?;
        let active_enrollments = ClassEnrollments::find()
            .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Active.as_str()))
            .count(&self.db)
            .await
            .map_err(|e| read_error("统计选课失败", e))?;

        Ok(EntityCounts {
            active_students: active_students as i64,
            active_teachers: active_teachers as i64,
            classes: classes as i64,
            active_enrollments: active_enrollments as i64,
        })
    }

    async fn payment_overview(
        &self,
        month: i32,
        year: i32,
        expected_count: i64,
    ) -> Result<PaymentOverview> {
        let amounts: Vec<f64> = CoursePayments::find()
            .select_only()
            .column(PaymentColumn::Amount)
            .filter(PaymentColumn::Month.eq(month))
            .filter(PaymentColumn::Year.eq(year))
            .filter(PaymentColumn::Status.eq(PaymentStatus::Paid.as_str()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| read_error("统计缴费失败", e))?;

        let paid_count = amounts.len() as i64;
        let collected_amount = amounts.iter().sum::<f64>();
        let collection_rate = if expected_count > 0 {
            ((paid_count as f64 / expected_count as f64) * 10_000.0).round() / 10_000.0
        } else {
            0.0
        };

        Ok(PaymentOverview {
            collected_amount: (collected_amount * 100.0).round() / 100.0,
            paid_count,
            expected_count,
            collection_rate,
        })
    }

    /// 各班出勤率，按出勤率降序，相同时按班级名称
    async fn class_attendance_rates(
        &self,
        per_class: HashMap<i64, (i64, i64)>,
    ) -> Result<Vec<ClassAttendanceRate>> {
        if per_class.is_empty() {
            return Ok(Vec::new());
        }

        let classes: Vec<(i64, String)> = Classes::find()
            .select_only()
            .column(ClassColumn::Id)
            .column(ClassColumn::Name)
            .filter(ClassColumn::Id.is_in(per_class.keys().copied()))
            .order_by_asc(ClassColumn::Name)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| read_error("查询班级失败", e))?;

        let mut rates: Vec<ClassAttendanceRate> = classes
            .into_iter()
            .filter_map(|(class_id, class_name)| {
                let (attended, total) = per_class.get(&class_id).copied()?;
                Some(ClassAttendanceRate {
                    class_id,
                    class_name,
                    records: total,
                    attendance_rate: attendance_rate(attended, total),
                })
            })
            .collect();

        // 稳定排序，保留名称顺序
        rates.sort_by(|a, b| b.attendance_rate.total_cmp(&a.attendance_rate));
        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::requests::AttendanceChange;
    use crate::models::enrollments::requests::CreateEnrollmentRequest;
    use crate::models::payments::requests::CreatePaymentRequest;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::classes::tests::class_request;
    use crate::storage::sea_orm_storage::sessions::tests::session_request;
    use crate::storage::sea_orm_storage::students::tests::student_request;
    use crate::storage::sea_orm_storage::users::tests::seed_user;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_empty_overview() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let overview = storage.analytics_overview_impl(3, 2025).await.unwrap();
        assert_eq!(overview.counts.classes, 0);
        assert_eq!(overview.attendance.total, 0);
        assert_eq!(overview.attendance.attendance_rate, 0.0);
        assert_eq!(overview.payments.collection_rate, 0.0);
        assert!(overview.class_attendance.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_month_rejected() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        assert!(storage.analytics_overview_impl(13, 2025).await.is_err());
        assert!(storage.analytics_overview_impl(0, 2025).await.is_err());
    }

    #[tokio::test]
    async fn test_overview_aggregates_month() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let recorder = seed_user(&storage, "idp_admin", UserRole::Admin).await.id;

        let english = storage
            .create_class_impl(class_request("English", None))
            .await
            .unwrap();
        let maths = storage
            .create_class_impl(class_request("Maths", None))
            .await
            .unwrap();

        let ann = storage
            .create_student_impl(student_request("Ann", "ann@school.test"))
            .await
            .unwrap();
        let ben = storage
            .create_student_impl(student_request("Ben", "ben@school.test"))
            .await
            .unwrap();
        for (student_id, class_id) in [(ann.id, english.id), (ben.id, english.id), (ann.id, maths.id)]
        {
            storage
                .create_enrollment_impl(CreateEnrollmentRequest {
                    student_id,
                    class_id,
                })
                .await
                .unwrap();
        }

        let march = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let english_session = storage
            .create_session_impl(session_request(english.id, march))
            .await
            .unwrap();
        let maths_session = storage
            .create_session_impl(session_request(maths.id, march))
            .await
            .unwrap();
        // 四月的课次不计入
        let april_session = storage
            .create_session_impl(session_request(
                english.id,
                NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            ))
            .await
            .unwrap();

        storage
            .update_session_attendance_impl(
                &english_session,
                vec![
                    AttendanceChange {
                        student_id: ann.id,
                        status: AttendanceStatus::Present,
                        notes: None,
                        check_in_time: None,
                    },
                    AttendanceChange {
                        student_id: ben.id,
                        status: AttendanceStatus::Late,
                        notes: None,
                        check_in_time: None,
                    },
                ],
                recorder,
            )
            .await
            .unwrap();
        storage
            .get_session_attendance_impl(&maths_session, recorder)
            .await
            .unwrap();
        storage
            .get_session_attendance_impl(&april_session, recorder)
            .await
            .unwrap();

        storage
            .create_payment_impl(
                recorder,
                CreatePaymentRequest {
                    student_id: ann.id,
                    class_id: english.id,
                    month: 3,
                    year: 2025,
                    amount: 120.0,
                    method: None,
                    status: None,
                    notes: None,
                },
            )
            .await
            .unwrap();
        storage
            .create_payment_impl(
                recorder,
                CreatePaymentRequest {
                    student_id: ben.id,
                    class_id: english.id,
                    month: 3,
                    year: 2025,
                    amount: 120.0,
                    method: None,
                    status: Some(PaymentStatus::Pending),
                    notes: None,
                },
            )
            .await
            .unwrap();

        let overview = storage.analytics_overview_impl(3, 2025).await.unwrap();
        assert_eq!(overview.counts.active_students, 2);
        assert_eq!(overview.counts.classes, 2);
        assert_eq!(overview.counts.active_enrollments, 3);

        assert_eq!(overview.attendance.total, 3);
        assert_eq!(overview.attendance.present, 1);
        assert_eq!(overview.attendance.late, 1);
        assert_eq!(overview.attendance.absent, 1);
        assert_eq!(overview.attendance.attendance_rate, 0.6667);

        assert_eq!(overview.payments.paid_count, 1);
        assert_eq!(overview.payments.collected_amount, 120.0);
        assert_eq!(overview.payments.expected_count, 3);
        assert_eq!(overview.payments.collection_rate, 0.3333);

        assert_eq!(overview.class_attendance.len(), 2);
        assert_eq!(overview.class_attendance[0].class_name, "English");
        assert_eq!(overview.class_attendance[0].attendance_rate, 1.0);
        assert_eq!(overview.class_attendance[1].class_name, "Maths");
        assert_eq!(overview.class_attendance[1].attendance_rate, 0.0);
    }
}
