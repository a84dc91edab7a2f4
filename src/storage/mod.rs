use std::sync::Arc;

use chrono::NaiveDate;

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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过身份提供方 subject 获取用户
    async fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    async fn delete_user(&self, id: i64) -> Result<bool>;

    /// 学生档案
    async fn create_student(&self, student: CreateStudentRequest) -> Result<Student>;
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>>;
    async fn get_student_by_email(&self, email: &str) -> Result<Option<Student>>;
    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse>;
    async fn update_student(
        &self,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>>;
    async fn delete_student(&self, id: i64) -> Result<bool>;

    /// 教师档案
    async fn create_teacher(&self, teacher: CreateTeacherRequest) -> Result<Teacher>;
    async fn get_teacher_by_id(&self, id: i64) -> Result<Option<Teacher>>;
    async fn get_teacher_by_email(&self, email: &str) -> Result<Option<Teacher>>;
    // 登录账号对应的教师档案
    async fn get_teacher_by_user_id(&self, user_id: i64) -> Result<Option<Teacher>>;
    async fn list_teachers_with_pagination(
        &self,
        query: TeacherListQuery,
    ) -> Result<TeacherListResponse>;
    async fn update_teacher(
        &self,
        id: i64,
        update: UpdateTeacherRequest,
    ) -> Result<Option<Teacher>>;
    async fn delete_teacher(&self, id: i64) -> Result<bool>;

    /// 班级管理方法
    async fn create_class(&self, class: CreateClassRequest) -> Result<Class>;
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>>;
    async fn get_class_by_name(&self, name: &str) -> Result<Option<Class>>;
    async fn list_classes_with_pagination(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse>;
    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>>;
    // 级联删除课表、课次、选课、考勤、作业与缴费
    async fn delete_class(&self, class_id: i64) -> Result<bool>;

    /// 课表
    // 课表与授课教师在同一事务中写入
    async fn create_schedule(&self, schedule: CreateScheduleRequest) -> Result<ClassSchedule>;
    async fn get_schedule_by_id(&self, id: i64) -> Result<Option<ClassSchedule>>;
    async fn list_schedules(&self, query: ScheduleListQuery) -> Result<Vec<ClassSchedule>>;
    async fn update_schedule(
        &self,
        id: i64,
        update: UpdateScheduleRequest,
    ) -> Result<Option<ClassSchedule>>;
    async fn delete_schedule(&self, id: i64) -> Result<bool>;

    /// 课次
    async fn create_session(&self, session: CreateSessionRequest) -> Result<ClassSession>;
    async fn get_session_by_id(&self, id: i64) -> Result<Option<ClassSession>>;
    async fn list_sessions_with_pagination(
        &self,
        query: SessionListQuery,
    ) -> Result<SessionListResponse>;
    async fn update_session(
        &self,
        id: i64,
        update: UpdateSessionRequest,
    ) -> Result<Option<ClassSession>>;
    async fn delete_session(&self, id: i64) -> Result<bool>;

    /// 选课
    async fn create_enrollment(&self, enrollment: CreateEnrollmentRequest)
    -> Result<ClassEnrollment>;
    async fn get_enrollment_by_id(&self, id: i64) -> Result<Option<ClassEnrollment>>;
    async fn get_enrollment_by_student_and_class(
        &self,
        student_id: i64,
        class_id: i64,
    ) -> Result<Option<ClassEnrollment>>;
    async fn list_enrollments_with_pagination(
        &self,
        query: EnrollmentListQuery,
    ) -> Result<EnrollmentListResponse>;
    async fn update_enrollment_status(
        &self,
        id: i64,
        status: EnrollmentStatus,
    ) -> Result<Option<ClassEnrollment>>;
    async fn delete_enrollment(&self, id: i64) -> Result<bool>;

    /// 考勤
    // 读取课次考勤，首次读取时为在读学生生成默认记录
    async fn get_session_attendance(
        &self,
        session: &ClassSession,
        recorded_by: i64,
    ) -> Result<SessionAttendanceResponse>;
    async fn update_session_attendance(
        &self,
        session: &ClassSession,
        changes: Vec<AttendanceChange>,
        recorded_by: i64,
    ) -> Result<BulkAttendanceUpdateResponse>;
    async fn class_attendance_summary(
        &self,
        class_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<ClassAttendanceSummaryResponse>;

    /// 作业
    async fn create_assignment(
        &self,
        created_by: i64,
        assignment: CreateAssignmentRequest,
    ) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    async fn list_assignments_with_pagination(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse>;
    async fn update_assignment(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>>;
    async fn delete_assignment(&self, id: i64) -> Result<bool>;

    /// 缴费
    async fn create_payment(
        &self,
        recorded_by: i64,
        payment: CreatePaymentRequest,
    ) -> Result<CoursePayment>;
    async fn get_payment_by_id(&self, id: i64) -> Result<Option<PaymentDetail>>;
    // 同一学生同一班级同一月份只允许一条记录
    async fn get_payment_by_period(
        &self,
        student_id: i64,
        class_id: i64,
        month: i32,
        year: i32,
    ) -> Result<Option<CoursePayment>>;
    async fn list_payments_with_pagination(
        &self,
        query: PaymentListQuery,
    ) -> Result<PaymentListResponse>;
    async fn update_payment(
        &self,
        id: i64,
        update: UpdatePaymentRequest,
    ) -> Result<Option<CoursePayment>>;
    async fn delete_payment(&self, id: i64) -> Result<bool>;
    async fn payment_summary(&self, month: i32, year: i32) -> Result<PaymentSummaryResponse>;

    /// 文章
    async fn create_post(&self, author_id: i64, slug: String, post: CreatePostRequest)
    -> Result<Post>;
    async fn get_post_by_id(&self, id: i64) -> Result<Option<Post>>;
    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>>;
    async fn list_posts_with_pagination(
        &self,
        query: PostListQuery,
        published_only: bool,
    ) -> Result<PostListResponse>;
    async fn update_post(&self, id: i64, update: UpdatePostRequest) -> Result<Option<Post>>;
    async fn delete_post(&self, id: i64) -> Result<bool>;

    /// 统计
    async fn analytics_overview(&self, month: i32, year: i32) -> Result<AnalyticsOverview>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
