pub mod analytics;
pub mod assignments;
pub mod attendance;
pub mod classes;
pub(crate) mod common;
pub mod enrollments;
pub mod imports;
pub mod payments;
pub mod posts;
pub mod schedules;
pub mod sessions;
pub mod students;
pub mod system;
pub mod teachers;
pub mod users;

pub use analytics::AnalyticsService;
pub use assignments::AssignmentService;
pub use attendance::AttendanceService;
pub use classes::ClassService;
pub use enrollments::EnrollmentService;
pub use payments::PaymentService;
pub use posts::PostService;
pub use schedules::ScheduleService;
pub use sessions::SessionService;
pub use students::StudentService;
pub use system::SystemService;
pub use teachers::TeacherService;
pub use users::UserService;
