//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod analytics;
mod assignments;
mod attendance;
mod classes;
mod enrollments;
mod payments;
mod posts;
mod schedules;
mod sessions;
mod students;
mod teachers;
mod users;

use crate::config::AppConfig;
use crate::errors::{Result, SchoolOpsError};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| SchoolOpsError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| SchoolOpsError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| SchoolOpsError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| SchoolOpsError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(SchoolOpsError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

impl SeaOrmStorage {
    /// 内存数据库（测试用），单连接保证所有查询落在同一个库上
    #[cfg(test)]
    pub(crate) async fn new_in_memory() -> Result<Self> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);

        let db = Database::connect(opt)
            .await
            .map_err(|e| SchoolOpsError::database_connection(format!("SQLite 连接失败: {e}")))?;
        Migrator::up(&db, None)
            .await
            .map_err(|e| SchoolOpsError::database_operation(format!("数据库迁移失败: {e}")))?;

        Ok(Self { db })
    }
}

/// 写操作错误，唯一约束冲突映射为 Conflict
pub(crate) fn write_error(context: &str, err: DbErr) -> SchoolOpsError {
    let msg = format!("{context}: {err}");
    if crate::utils::sql::is_unique_violation(&msg) {
        SchoolOpsError::conflict(msg)
    } else {
        SchoolOpsError::database_operation(msg)
    }
}

/// 读操作错误
pub(crate) fn read_error(context: &str, err: DbErr) -> SchoolOpsError {
    SchoolOpsError::database_operation(format!("{context}: {err}"))
}

// Storage trait 实现
use crate::models::{
    analytics::AnalyticsOverview,
    assignments::{
        entities::Assignment,
        requests::{AssignmentListQuery, CreateAssignmentRequest, UpdateAssignmentRequest},
        responses::AssignmentListResponse,
    },
    attendance::{
        requests::AttendanceChange,
        responses::{
            BulkAttendanceUpdateResponse, ClassAttendanceSummaryResponse,
            SessionAttendanceResponse,
        },
    },
    classes::{
        entities::Class,
        requests::{ClassListQuery, CreateClassRequest, UpdateClassRequest},
        responses::ClassListResponse,
    },
    enrollments::{
        entities::{ClassEnrollment, EnrollmentStatus},
        requests::{CreateEnrollmentRequest, EnrollmentListQuery},
        responses::EnrollmentListResponse,
    },
    payments::{
        entities::CoursePayment,
        requests::{CreatePaymentRequest, PaymentListQuery, UpdatePaymentRequest},
        responses::{PaymentDetail, PaymentListResponse, PaymentSummaryResponse},
    },
    posts::{
        entities::Post,
        requests::{CreatePostRequest, PostListQuery, UpdatePostRequest},
        responses::PostListResponse,
    },
    schedules::{
        entities::ClassSchedule,
        requests::{CreateScheduleRequest, ScheduleListQuery, UpdateScheduleRequest},
    },
    sessions::{
        entities::ClassSession,
        requests::{CreateSessionRequest, SessionListQuery, UpdateSessionRequest},
        responses::SessionListResponse,
    },
    students::{
        entities::Student,
        requests::{CreateStudentRequest, StudentListQuery, UpdateStudentRequest},
        responses::StudentListResponse,
    },
    teachers::{
        entities::Teacher,
        requests::{CreateTeacherRequest, TeacherListQuery, UpdateTeacherRequest},
        responses::TeacherListResponse,
    },
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        self.get_user_by_external_id_impl(external_id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    // 学生模块
    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student> {
        self.create_student_impl(student).await
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>> {
        self.get_student_by_id_impl(id).await
    }

    async fn get_student_by_email(&self, email: &str) -> Result<Option<Student>> {
        self.get_student_by_email_impl(email).await
    }

    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        self.list_students_with_pagination_impl(query).await
    }

    async fn update_student(
        &self,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        self.update_student_impl(id, update).await
    }

    async fn delete_student(&self, id: i64) -> Result<bool> {
        self.delete_student_impl(id).await
    }

    // 教师模块
    async fn create_teacher(&self, teacher: CreateTeacherRequest) -> Result<Teacher> {
        self.create_teacher_impl(teacher).await
    }

    async fn get_teacher_by_id(&self, id: i64) -> Result<Option<Teacher>> {
        self.get_teacher_by_id_impl(id).await
    }

    async fn get_teacher_by_email(&self, email: &str) -> Result<Option<Teacher>> {
        self.get_teacher_by_email_impl(email).await
    }

    async fn get_teacher_by_user_id(&self, user_id: i64) -> Result<Option<Teacher>> {
        self.get_teacher_by_user_id_impl(user_id).await
    }

    async fn list_teachers_with_pagination(
        &self,
        query: TeacherListQuery,
    ) -> Result<TeacherListResponse> {
        self.list_teachers_with_pagination_impl(query).await
    }

    async fn update_teacher(
        &self,
        id: i64,
        update: UpdateTeacherRequest,
    ) -> Result<Option<Teacher>> {
        self.update_teacher_impl(id, update).await
    }

    async fn delete_teacher(&self, id: i64) -> Result<bool> {
        self.delete_teacher_impl(id).await
    }

    // 班级模块
    async fn create_class(&self, class: CreateClassRequest) -> Result<Class> {
        self.create_class_impl(class).await
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn get_class_by_name(&self, name: &str) -> Result<Option<Class>> {
        self.get_class_by_name_impl(name).await
    }

    async fn list_classes_with_pagination(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        self.list_classes_with_pagination_impl(query).await
    }

    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        self.update_class_impl(class_id, update).await
    }

    async fn delete_class(&self, class_id: i64) -> Result<bool> {
        self.delete_class_impl(class_id).await
    }

    // 课表模块
    async fn create_schedule(&self, schedule: CreateScheduleRequest) -> Result<ClassSchedule> {
        self.create_schedule_impl(schedule).await
    }

    async fn get_schedule_by_id(&self, id: i64) -> Result<Option<ClassSchedule>> {
        self.get_schedule_by_id_impl(id).await
    }

    async fn list_schedules(&self, query: ScheduleListQuery) -> Result<Vec<ClassSchedule>> {
        self.list_schedules_impl(query).await
    }

    async fn update_schedule(
        &self,
        id: i64,
        update: UpdateScheduleRequest,
    ) -> Result<Option<ClassSchedule>> {
        self.update_schedule_impl(id, update).await
    }

    async fn delete_schedule(&self, id: i64) -> Result<bool> {
        self.delete_schedule_impl(id).await
    }

    // 课次模块
    async fn create_session(&self, session: CreateSessionRequest) -> Result<ClassSession> {
        self.create_session_impl(session).await
    }

    async fn get_session_by_id(&self, id: i64) -> Result<Option<ClassSession>> {
        self.get_session_by_id_impl(id).await
    }

    async fn list_sessions_with_pagination(
        &self,
        query: SessionListQuery,
    ) -> Result<SessionListResponse> {
        self.list_sessions_with_pagination_impl(query).await
    }

    async fn update_session(
        &self,
        id: i64,
        update: UpdateSessionRequest,
    ) -> Result<Option<ClassSession>> {
        self.update_session_impl(id, update).await
    }

    async fn delete_session(&self, id: i64) -> Result<bool> {
        self.delete_session_impl(id).await
    }

    // 选课模块
    async fn create_enrollment(
        &self,
        enrollment: CreateEnrollmentRequest,
    ) -> Result<ClassEnrollment> {
        self.create_enrollment_impl(enrollment).await
    }

    async fn get_enrollment_by_id(&self, id: i64) -> Result<Option<ClassEnrollment>> {
        self.get_enrollment_by_id_impl(id).await
    }

    async fn get_enrollment_by_student_and_class(
        &self,
        student_id: i64,
        class_id: i64,
    ) -> Result<Option<ClassEnrollment>> {
        self.get_enrollment_by_student_and_class_impl(student_id, class_id)
            .await
    }

    async fn list_enrollments_with_pagination(
        &self,
        query: EnrollmentListQuery,
    ) -> Result<EnrollmentListResponse> {
        self.list_enrollments_with_pagination_impl(query).await
    }

    async fn update_enrollment_status(
        &self,
        id: i64,
        status: EnrollmentStatus,
    ) -> Result<Option<ClassEnrollment>> {
        self.update_enrollment_status_impl(id, status).await
    }

    async fn delete_enrollment(&self, id: i64) -> Result<bool> {
        self.delete_enrollment_impl(id).await
    }

    // 考勤模块
    async fn get_session_attendance(
        &self,
        session: &ClassSession,
        recorded_by: i64,
    ) -> Result<SessionAttendanceResponse> {
        self.get_session_attendance_impl(session, recorded_by).await
    }

    async fn update_session_attendance(
        &self,
        session: &ClassSession,
        changes: Vec<AttendanceChange>,
        recorded_by: i64,
    ) -> Result<BulkAttendanceUpdateResponse> {
        self.update_session_attendance_impl(session, changes, recorded_by)
            .await
    }

    async fn class_attendance_summary(
        &self,
        class_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<ClassAttendanceSummaryResponse> {
        self.class_attendance_summary_impl(class_id, from, to).await
    }

    // 作业模块
    async fn create_assignment(
        &self,
        created_by: i64,
        assignment: CreateAssignmentRequest,
    ) -> Result<Assignment> {
        self.create_assignment_impl(created_by, assignment).await
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(id).await
    }

    async fn list_assignments_with_pagination(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse> {
        self.list_assignments_with_pagination_impl(query).await
    }

    async fn update_assignment(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>> {
        self.update_assignment_impl(id, update).await
    }

    async fn delete_assignment(&self, id: i64) -> Result<bool> {
        self.delete_assignment_impl(id).await
    }

    // 缴费模块
    async fn create_payment(
        &self,
        recorded_by: i64,
        payment: CreatePaymentRequest,
    ) -> Result<CoursePayment> {
        self.create_payment_impl(recorded_by, payment).await
    }

    async fn get_payment_by_id(&self, id: i64) -> Result<Option<PaymentDetail>> {
        self.get_payment_by_id_impl(id).await
    }

    async fn get_payment_by_period(
        &self,
        student_id: i64,
        class_id: i64,
        month: i32,
        year: i32,
    ) -> Result<Option<CoursePayment>> {
        self.get_payment_by_period_impl(student_id, class_id, month, year)
            .await
    }

    async fn list_payments_with_pagination(
        &self,
        query: PaymentListQuery,
    ) -> Result<PaymentListResponse> {
        self.list_payments_with_pagination_impl(query).await
    }

    async fn update_payment(
        &self,
        id: i64,
        update: UpdatePaymentRequest,
    ) -> Result<Option<CoursePayment>> {
        self.update_payment_impl(id, update).await
    }

    async fn delete_payment(&self, id: i64) -> Result<bool> {
        self.delete_payment_impl(id).await
    }

    async fn payment_summary(&self, month: i32, year: i32) -> Result<PaymentSummaryResponse> {
        self.payment_summary_impl(month, year).await
    }

    // 文章模块
    async fn create_post(
        &self,
        author_id: i64,
        slug: String,
        post: CreatePostRequest,
    ) -> Result<Post> {
        self.create_post_impl(author_id, slug, post).await
    }

    async fn get_post_by_id(&self, id: i64) -> Result<Option<Post>> {
        self.get_post_by_id_impl(id).await
    }

    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        self.get_post_by_slug_impl(slug).await
    }

    async fn list_posts_with_pagination(
        &self,
        query: PostListQuery,
        published_only: bool,
    ) -> Result<PostListResponse> {
        self.list_posts_with_pagination_impl(query, published_only)
            .await
    }

    async fn update_post(&self, id: i64, update: UpdatePostRequest) -> Result<Option<Post>> {
        self.update_post_impl(id, update).await
    }

    async fn delete_post(&self, id: i64) -> Result<bool> {
        self.delete_post_impl(id).await
    }

    // 统计模块
    async fn analytics_overview(&self, month: i32, year: i32) -> Result<AnalyticsOverview> {
        self.analytics_overview_impl(month, year).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("school.db").unwrap(),
            "sqlite://school.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/school").unwrap(),
            "postgres://u:p@localhost/school"
        );
        assert!(SeaOrmStorage::build_database_url("ftp://nowhere").is_err());
    }
}
