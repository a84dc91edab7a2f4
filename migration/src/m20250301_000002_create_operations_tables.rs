use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_core_tables::{ClassSchedules, Classes, Students, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 课次表
        manager
            .create_table(
                Table::create()
                    .table(ClassSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassSessions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClassSessions::ClassId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassSessions::ScheduleId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(ClassSessions::SessionDate).date().not_null())
                    .col(ColumnDef::new(ClassSessions::StartTime).time().not_null())
                    .col(ColumnDef::new(ClassSessions::EndTime).time().not_null())
                    .col(ColumnDef::new(ClassSessions::Topic).string().null())
                    .col(ColumnDef::new(ClassSessions::Status).string().not_null())
                    .col(
                        ColumnDef::new(ClassSessions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassSessions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ClassSessions::Table, ClassSessions::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ClassSessions::Table, ClassSessions::ScheduleId)
                            .to(ClassSchedules::Table, ClassSchedules::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 选课表
        manager
            .create_table(
                Table::create()
                    .table(ClassEnrollments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassEnrollments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClassEnrollments::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassEnrollments::ClassId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassEnrollments::Status)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassEnrollments::EnrolledAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassEnrollments::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ClassEnrollments::Table, ClassEnrollments::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ClassEnrollments::Table, ClassEnrollments::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 考勤表
        manager
            .create_table(
                Table::create()
                    .table(ClassAttendance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassAttendance::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClassAttendance::SessionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassAttendance::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClassAttendance::Status).string().not_null())
                    .col(ColumnDef::new(ClassAttendance::Notes).text().null())
                    .col(
                        ColumnDef::new(ClassAttendance::CheckInTime)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ClassAttendance::RecordedBy)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ClassAttendance::RecordedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ClassAttendance::Table, ClassAttendance::SessionId)
                            .to(ClassSessions::Table, ClassSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ClassAttendance::Table, ClassAttendance::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ClassAttendance::Table, ClassAttendance::RecordedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 作业表
        manager
            .create_table(
                Table::create()
                    .table(Assignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assignments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assignments::ClassId).big_integer().not_null())
                    .col(ColumnDef::new(Assignments::Title).string().not_null())
                    .col(ColumnDef::new(Assignments::Description).text().null())
                    .col(ColumnDef::new(Assignments::DueDate).big_integer().null())
                    .col(ColumnDef::new(Assignments::MaxScore).double().not_null())
                    .col(ColumnDef::new(Assignments::CreatedBy).big_integer().null())
                    .col(ColumnDef::new(Assignments::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Assignments::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Assignments::Table, Assignments::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Assignments::Table, Assignments::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 课程缴费表
        manager
            .create_table(
                Table::create()
                    .table(CoursePayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CoursePayments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CoursePayments::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CoursePayments::ClassId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CoursePayments::Month).integer().not_null())
                    .col(ColumnDef::new(CoursePayments::Year).integer().not_null())
                    .col(ColumnDef::new(CoursePayments::Amount).double().not_null())
                    .col(ColumnDef::new(CoursePayments::Method).string().not_null())
                    .col(ColumnDef::new(CoursePayments::Status).string().not_null())
                    .col(ColumnDef::new(CoursePayments::PaidAt).big_integer().null())
                    .col(
                        ColumnDef::new(CoursePayments::ReceiptNo)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(CoursePayments::Notes).text().null())
                    .col(
                        ColumnDef::new(CoursePayments::RecordedBy)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CoursePayments::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CoursePayments::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CoursePayments::Table, CoursePayments::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CoursePayments::Table, CoursePayments::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CoursePayments::Table, CoursePayments::RecordedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 唯一约束与索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_class_sessions_class_date")
                    .table(ClassSessions::Table)
                    .col(ClassSessions::ClassId)
                    .col(ClassSessions::SessionDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("uq_class_enrollments_student_class")
                    .table(ClassEnrollments::Table)
                    .col(ClassEnrollments::StudentId)
                    .col(ClassEnrollments::ClassId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("uq_class_attendance_session_student")
                    .table(ClassAttendance::Table)
                    .col(ClassAttendance::SessionId)
                    .col(ClassAttendance::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assignments_class_id")
                    .table(Assignments::Table)
                    .col(Assignments::ClassId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("uq_course_payments_period")
                    .table(CoursePayments::Table)
                    .col(CoursePayments::StudentId)
                    .col(CoursePayments::ClassId)
                    .col(CoursePayments::Month)
                    .col(CoursePayments::Year)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_course_payments_year_month")
                    .table(CoursePayments::Table)
                    .col(CoursePayments::Year)
                    .col(CoursePayments::Month)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CoursePayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClassAttendance::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClassEnrollments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClassSessions::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum ClassSessions {
    #[sea_orm(iden = "class_sessions")]
    Table,
    Id,
    ClassId,
    ScheduleId,
    SessionDate,
    StartTime,
    EndTime,
    Topic,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ClassEnrollments {
    #[sea_orm(iden = "class_enrollments")]
    Table,
    Id,
    StudentId,
    ClassId,
    Status,
    EnrolledAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ClassAttendance {
    #[sea_orm(iden = "class_attendance")]
    Table,
    Id,
    SessionId,
    StudentId,
    Status,
    Notes,
    CheckInTime,
    RecordedBy,
    RecordedAt,
}

#[derive(DeriveIden)]
enum Assignments {
    #[sea_orm(iden = "assignments")]
    Table,
    Id,
    ClassId,
    Title,
    Description,
    DueDate,
    MaxScore,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CoursePayments {
    #[sea_orm(iden = "course_payments")]
    Table,
    Id,
    StudentId,
    ClassId,
    Month,
    Year,
    Amount,
    Method,
    Status,
    PaidAt,
    ReceiptNo,
    Notes,
    RecordedBy,
    CreatedAt,
    UpdatedAt,
}
