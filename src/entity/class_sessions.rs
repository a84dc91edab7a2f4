//! 课次实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "class_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub schedule_id: Option<i64>,
    pub session_date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub topic: Option<String>,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id"
    )]
    Class,
    #[sea_orm(
        belongs_to = "super::class_schedules::Entity",
        from = "Column::ScheduleId",
        to = "super::class_schedules::Column::Id"
    )]
    Schedule,
    #[sea_orm(has_many = "super::class_attendance::Entity")]
    Attendance,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::class_schedules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedule.def()
    }
}

impl Related<super::class_attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_session(self) -> crate::models::sessions::entities::ClassSession {
        use crate::models::sessions::entities::{ClassSession, SessionStatus};

        ClassSession {
            id: self.id,
            class_id: self.class_id,
            schedule_id: self.schedule_id,
            session_date: self.session_date,
            start_time: self.start_time,
            end_time: self.end_time,
            topic: self.topic,
            status: self
                .status
                .parse::<SessionStatus>()
                .unwrap_or(SessionStatus::Scheduled),
            created_at: super::ts_to_datetime(self.created_at),
            updated_at: super::ts_to_datetime(self.updated_at),
        }
    }
}
