pub mod analytics;

pub mod assignments;

pub mod classes;

pub mod enrollments;

pub mod payments;

pub mod posts;

pub mod schedules;

pub mod sessions;

pub mod students;

pub mod system;

pub mod teachers;

pub mod users;

pub use analytics::configure_analytics_routes;
pub use assignments::configure_assignment_routes;
pub use classes::configure_classes_routes;
pub use enrollments::configure_enrollment_routes;
pub use payments::configure_payment_routes;
pub use posts::configure_post_routes;
pub use schedules::configure_schedule_routes;
pub use sessions::configure_session_routes;
pub use students::configure_student_routes;
pub use system::configure_system_routes;
pub use teachers::configure_teacher_routes;
pub use users::configure_user_routes;
