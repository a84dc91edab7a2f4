//! 预导入模块，方便使用

pub use super::assignments::{
    ActiveModel as AssignmentActiveModel, Entity as Assignments, Model as AssignmentModel,
};
pub use super::class_attendance::{
    ActiveModel as AttendanceActiveModel, Entity as ClassAttendance, Model as AttendanceModel,
};
pub use super::class_enrollments::{
    ActiveModel as EnrollmentActiveModel, Entity as ClassEnrollments, Model as EnrollmentModel,
};
pub use super::class_schedules::{
    ActiveModel as ScheduleActiveModel, Entity as ClassSchedules, Model as ScheduleModel,
};
pub use super::class_sessions::{
    ActiveModel as SessionActiveModel, Entity as ClassSessions, Model as SessionModel,
};
pub use super::classes::{ActiveModel as ClassActiveModel, Entity as Classes, Model as ClassModel};
pub use super::course_payments::{
    ActiveModel as PaymentActiveModel, Entity as CoursePayments, Model as PaymentModel,
};
pub use super::post_categories::{
    ActiveModel as PostCategoryActiveModel, Entity as PostCategories,
    Model as PostCategoryModel,
};
pub use super::post_tags::{
    ActiveModel as PostTagActiveModel, Entity as PostTags, Model as PostTagModel,
};
pub use super::posts::{ActiveModel as PostActiveModel, Entity as Posts, Model as PostModel};
pub use super::schedule_teachers::{
    ActiveModel as ScheduleTeacherActiveModel, Entity as ScheduleTeachers,
    Model as ScheduleTeacherModel,
};
pub use super::students::{
    ActiveModel as StudentActiveModel, Entity as Students, Model as StudentModel,
};
pub use super::teachers::{
    ActiveModel as TeacherActiveModel, Entity as Teachers, Model as TeacherModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
