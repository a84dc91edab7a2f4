use serde::Serialize;
use ts_rs::TS;

// 业务错误码，以 snake_case 字符串出现在响应的 `error` 字段中
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "api.ts")]
pub enum ErrorCode {
    // 通用
    BadRequest,
    ValidationFailed,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    RateLimitExceeded,
    InternalServerError,

    // 用户
    UserNotFound,
    UserAlreadyExists,
    CanNotDeleteCurrentUser,

    // 学生 / 教师
    StudentNotFound,
    StudentAlreadyExists,
    TeacherNotFound,
    TeacherAlreadyExists,

    // 班级 / 课表 / 课次
    ClassNotFound,
    ClassAlreadyExists,
    ClassPermissionDenied,
    ScheduleNotFound,
    SessionNotFound,

    // 选课 / 考勤 / 作业
    EnrollmentNotFound,
    EnrollmentAlreadyExists,
    AssignmentNotFound,

    // 缴费
    PaymentNotFound,
    PaymentAlreadyExists,

    // 文章
    PostNotFound,
    PostSlugAlreadyExists,

    // 导入
    FileUploadFailed,
    ImportFileMissingColumn,
    ImportFileParseFailed,
    ImportFileDataInvalid,
}
