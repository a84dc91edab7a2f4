//! 考勤存储操作
//!
//! 考勤记录不在创建课次时生成，而是在第一次读取（或更新）某个课次的考勤时，
//! 为该班级所有在读学生各生成一条 `absent` 记录。生成过程在单个事务中完成，
//! 之后的读取直接返回已有记录，不会再补充新选课的学生。

use std::collections::HashMap;

use super::{SeaOrmStorage, read_error, write_error};
use crate::entity::class_attendance::{ActiveModel, Column, Entity as ClassAttendance};
use crate::entity::class_enrollments::{Column as EnrollmentColumn, Entity as ClassEnrollments};
use crate::entity::class_sessions::{Column as SessionColumn, Entity as ClassSessions};
use crate::entity::students::{Column as StudentColumn, Entity as Students};
use crate::errors::Result;
use crate::models::{
    attendance::{
        entities::AttendanceStatus,
        requests::AttendanceChange,
        responses::{
            AttendanceRecord, BulkAttendanceUpdateResponse, ClassAttendanceSummaryResponse,
            SessionAttendanceResponse, StudentAttendanceSummary,
        },
    },
    enrollments::entities::EnrollmentStatus,
    sessions::entities::{ClassSession, SessionStatus},
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use tracing::{debug, info};

impl SeaOrmStorage {
    /// 读取课次考勤，必要时先生成默认记录
    pub async fn get_session_attendance_impl(
        &self,
        session: &ClassSession,
        recorded_by: i64,
    ) -> Result<SessionAttendanceResponse> {
        let generated = self
            .generate_attendance_if_missing(session, recorded_by)
            .await?;
        let items = self.load_attendance_records(session.id).await?;

        Ok(SessionAttendanceResponse {
            session_id: session.id,
            generated,
            items,
        })
    }

    /// 批量更新考勤，每条记录按 (session_id, student_id) 独立更新
    pub async fn update_session_attendance_impl(
        &self,
        session: &ClassSession,
        changes: Vec<AttendanceChange>,
        recorded_by: i64,
    ) -> Result<BulkAttendanceUpdateResponse> {
        self.generate_attendance_if_missing(session, recorded_by)
            .await?;

        let now = chrono::Utc::now().timestamp();
        let mut updated = 0;
        let mut missing_student_ids = Vec::new();

        for change in changes {
            let mut update = ClassAttendance::update_many()
                .col_expr(Column::Status, Expr::value(change.status.as_str()))
                .col_expr(Column::RecordedBy, Expr::value(recorded_by))
                .col_expr(Column::RecordedAt, Expr::value(now));
            if let Some(notes) = change.notes {
                update = update.col_expr(Column::Notes, Expr::value(notes));
            }
            if let Some(check_in_time) = change.check_in_time {
                update = update.col_expr(Column::CheckInTime, Expr::value(check_in_time));
            }

            let result = update
                .filter(Column::SessionId.eq(session.id))
                .filter(Column::StudentId.eq(change.student_id))
                .exec(&self.db)
                .await
                .map_err(|e| write_error("更新考勤失败", e))?;

            if result.rows_affected == 0 {
                missing_student_ids.push(change.student_id);
            } else {
                updated += 1;
            }
        }

        let items = self.load_attendance_records(session.id).await?;

        Ok(BulkAttendanceUpdateResponse {
            updated,
            missing_student_ids,
            items,
        })
    }

    /// 班级考勤汇总（不含已取消的课次）
    pub async fn class_attendance_summary_impl(
        &self,
        class_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<ClassAttendanceSummaryResponse> {
        let mut select = ClassSessions::find()
            .select_only()
            .column(SessionColumn::Id)
            .filter(SessionColumn::ClassId.eq(class_id))
            .filter(SessionColumn::Status.ne(SessionStatus::Cancelled.as_str()));
        if let Some(from) = from {
            select = select.filter(SessionColumn::SessionDate.gte(from));
        }
        if let Some(to) = to {
            select = select.filter(SessionColumn::SessionDate.lte(to));
        }
        let session_ids: Vec<i64> = select
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| read_error("查询课次失败", e))?;

        let mut summaries: HashMap<i64, StudentAttendanceSummary> = HashMap::new();

        // 在读学生即使没有记录也列出
        let enrolled = ClassEnrollments::find()
            .filter(EnrollmentColumn::ClassId.eq(class_id))
            .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Active.as_str()))
            .find_also_related(Students)
            .all(&self.db)
            .await
            .map_err(|e| read_error("查询选课失败", e))?;
        for (enrollment, student) in enrolled {
            summaries
                .entry(enrollment.student_id)
                .or_insert_with(|| StudentAttendanceSummary {
                    student_id: enrollment.student_id,
                    student_name: student.map(|s| s.name).unwrap_or_default(),
                    ..Default::default()
                });
        }

        if !session_ids.is_empty() {
            let rows = ClassAttendance::find()
                .filter(Column::SessionId.is_in(session_ids.clone()))
                .find_also_related(Students)
                .all(&self.db)
                .await
                .map_err(|e| read_error("查询考勤失败", e))?;

            for (attendance, student) in rows {
                let status = attendance
                    .status
                    .parse::<AttendanceStatus>()
                    .unwrap_or(AttendanceStatus::Absent);
                summaries
                    .entry(attendance.student_id)
                    .or_insert_with(|| StudentAttendanceSummary {
                        student_id: attendance.student_id,
                        student_name: student.map(|s| s.name).unwrap_or_default(),
                        ..Default::default()
                    })
                    .record(status);
            }
        }

        let mut students: Vec<StudentAttendanceSummary> = summaries.into_values().collect();
        students.sort_by(|a, b| {
            a.student_name
                .cmp(&b.student_name)
                .then(a.student_id.cmp(&b.student_id))
        });

        Ok(ClassAttendanceSummaryResponse {
            class_id,
            from,
            to,
            session_count: session_ids.len() as i64,
            students,
        })
    }

    /// 课次没有任何考勤记录时，为在读学生生成 `absent` 记录
    ///
    /// 返回本次是否生成了记录
    async fn generate_attendance_if_missing(
        &self,
        session: &ClassSession,
        recorded_by: i64,
    ) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| write_error("开启事务失败", e))?;

        let existing = ClassAttendance::find()
            .filter(Column::SessionId.eq(session.id))
            .count(&txn)
            .await
            .map_err(|e| read_error("统计考勤记录失败", e))?;
        if existing > 0 {
            return Ok(false);
        }

        let student_ids: Vec<i64> = ClassEnrollments::find()
            .select_only()
            .column(EnrollmentColumn::StudentId)
            .filter(EnrollmentColumn::ClassId.eq(session.class_id))
            .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Active.as_str()))
            .order_by_asc(EnrollmentColumn::StudentId)
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| read_error("查询在读学生失败", e))?;
        if student_ids.is_empty() {
            debug!("课次 {} 所属班级没有在读学生，跳过考勤生成", session.id);
            return Ok(false);
        }

        let now = chrono::Utc::now().timestamp();
        for student_id in &student_ids {
            let inserted = ActiveModel {
                session_id: Set(session.id),
                student_id: Set(*student_id),
                status: Set(AttendanceStatus::Absent.to_string()),
                recorded_by: Set(Some(recorded_by)),
                recorded_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await;

            if let Err(e) = inserted {
                let err = write_error("生成考勤记录失败", e);
                if err.is_conflict() {
                    // 并发请求已经生成过
                    txn.rollback()
                        .await
                        .map_err(|e| write_error("回滚事务失败", e))?;
                    return Ok(false);
                }
                return Err(err);
            }
        }

        txn.commit()
            .await
            .map_err(|e| write_error("提交事务失败", e))?;

        info!(
            "为课次 {} 生成了 {} 条默认考勤记录",
            session.id,
            student_ids.len()
        );
        Ok(true)
    }

    /// 读取课次考勤（附带学生信息），按学生姓名排序
    async fn load_attendance_records(&self, session_id: i64) -> Result<Vec<AttendanceRecord>> {
        let rows = ClassAttendance::find()
            .filter(Column::SessionId.eq(session_id))
            .find_also_related(Students)
            .order_by_asc(StudentColumn::Name)
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| read_error("查询考勤失败", e))?;

        Ok(rows
            .into_iter()
            .map(|(attendance, student)| {
                let (student_name, student_email) =
                    student.map(|s| (s.name, s.email)).unwrap_or_default();
                AttendanceRecord {
                    attendance: attendance.into_attendance(),
                    student_name,
                    student_email,
                }
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
    use crate::storage::sea_orm_storage::sessions::tests::session_request;
    use crate::storage::sea_orm_storage::students::tests::student_request;
    use crate::storage::sea_orm_storage::users::tests::seed_user;

    struct Fixture {
        storage: SeaOrmStorage,
        session: ClassSession,
        recorder: i64,
        student_ids: Vec<i64>,
        class_id: i64,
    }

    async fn fixture() -> Fixture {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let recorder = seed_user(&storage, "idp_teacher", UserRole::Teacher).await.id;
        let class = storage
            .create_class_impl(class_request("English", None))
            .await
            .unwrap();

        let mut student_ids = Vec::new();
        for (name, email) in [
            ("Zara", "zara@school.test"),
            ("Adam", "adam@school.test"),
            ("Mei", "mei@school.test"),
        ] {
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
            student_ids.push(student.id);
        }

        let session = storage
            .create_session_impl(session_request(
                class.id,
                NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            ))
            .await
            .unwrap();

        Fixture {
            storage,
            session,
            recorder,
            student_ids,
            class_id: class.id,
        }
    }

    #[tokio::test]
    async fn test_first_read_generates_absent_rows() {
        let f = fixture().await;

        let first = f
            .storage
            .get_session_attendance_impl(&f.session, f.recorder)
            .await
            .unwrap();
        assert!(first.generated);
        assert_eq!(first.items.len(), 3);
        assert!(
            first
                .items
                .iter()
                .all(|r| r.attendance.status == AttendanceStatus::Absent
                    && r.attendance.recorded_by == Some(f.recorder))
        );
        // 按学生姓名排序
        let names: Vec<_> = first.items.iter().map(|r| r.student_name.as_str()).collect();
        assert_eq!(names, vec!["Adam", "Mei", "Zara"]);

        let second = f
            .storage
            .get_session_attendance_impl(&f.session, f.recorder)
            .await
            .unwrap();
        assert!(!second.generated);
        assert_eq!(second.items.len(), 3);
    }

    #[tokio::test]
    async fn test_late_enrollment_not_added_after_generation() {
        let f = fixture().await;
        f.storage
            .get_session_attendance_impl(&f.session, f.recorder)
            .await
            .unwrap();

        let newcomer = f
            .storage
            .create_student_impl(student_request("Newcomer", "new@school.test"))
            .await
            .unwrap();
        f.storage
            .create_enrollment_impl(CreateEnrollmentRequest {
                student_id: newcomer.id,
                class_id: f.class_id,
            })
            .await
            .unwrap();

        let again = f
            .storage
            .get_session_attendance_impl(&f.session, f.recorder)
            .await
            .unwrap();
        assert_eq!(again.items.len(), 3);
    }

    #[tokio::test]
    async fn test_dropped_students_are_skipped() {
        let f = fixture().await;
        let enrollment = f
            .storage
            .get_enrollment_by_student_and_class_impl(f.student_ids[0], f.class_id)
            .await
            .unwrap()
            .unwrap();
        f.storage
            .update_enrollment_status_impl(enrollment.id, EnrollmentStatus::Dropped)
            .await
            .unwrap();

        let result = f
            .storage
            .get_session_attendance_impl(&f.session, f.recorder)
            .await
            .unwrap();
        assert_eq!(result.items.len(), 2);
        assert!(
            result
                .items
                .iter()
                .all(|r| r.attendance.student_id != f.student_ids[0])
        );
    }

    #[tokio::test]
    async fn test_bulk_update_reports_missing_students() {
        let f = fixture().await;

        // 未读取过也会先生成记录
        let result = f
            .storage
            .update_session_attendance_impl(
                &f.session,
                vec![
                    AttendanceChange {
                        student_id: f.student_ids[0],
                        status: AttendanceStatus::Present,
                        notes: None,
                        check_in_time: Some(1_741_597_200),
                    },
                    AttendanceChange {
                        student_id: f.student_ids[1],
                        status: AttendanceStatus::Sick,
                        notes: Some("fever".to_string()),
                        check_in_time: None,
                    },
                    AttendanceChange {
                        student_id: 99_999,
                        status: AttendanceStatus::Late,
                        notes: None,
                        check_in_time: None,
                    },
                ],
                f.recorder,
            )
            .await
            .unwrap();

        assert_eq!(result.updated, 2);
        assert_eq!(result.missing_student_ids, vec![99_999]);

        let by_student: HashMap<i64, &AttendanceRecord> = result
            .items
            .iter()
            .map(|r| (r.attendance.student_id, r))
            .collect();
        let zara = by_student[&f.student_ids[0]];
        assert_eq!(zara.attendance.status, AttendanceStatus::Present);
        assert!(zara.attendance.check_in_time.is_some());
        let adam = by_student[&f.student_ids[1]];
        assert_eq!(adam.attendance.status, AttendanceStatus::Sick);
        assert_eq!(adam.attendance.notes.as_deref(), Some("fever"));
        let mei = by_student[&f.student_ids[2]];
        assert_eq!(mei.attendance.status, AttendanceStatus::Absent);
    }

    #[tokio::test]
    async fn test_class_summary_counts_and_rate() {
        let f = fixture().await;
        f.storage
            .update_session_attendance_impl(
                &f.session,
                vec![AttendanceChange {
                    student_id: f.student_ids[1],
                    status: AttendanceStatus::Late,
                    notes: None,
                    check_in_time: None,
                }],
                f.recorder,
            )
            .await
            .unwrap();

        let summary = f
            .storage
            .class_attendance_summary_impl(f.class_id, None, None)
            .await
            .unwrap();
        assert_eq!(summary.session_count, 1);
        assert_eq!(summary.students.len(), 3);
        let adam = &summary.students[0];
        assert_eq!(adam.student_name, "Adam");
        assert_eq!(adam.late, 1);
        assert_eq!(adam.attendance_rate, 1.0);
        let zara = &summary.students[2];
        assert_eq!(zara.absent, 1);
        assert_eq!(zara.attendance_rate, 0.0);

        // 区间外没有课次
        let empty = f
            .storage
            .class_attendance_summary_impl(
                f.class_id,
                NaiveDate::from_ymd_opt(2025, 4, 1),
                NaiveDate::from_ymd_opt(2025, 4, 30),
            )
            .await
            .unwrap();
        assert_eq!(empty.session_count, 0);
        assert!(empty.students.iter().all(|s| s.total == 0));
    }
}
