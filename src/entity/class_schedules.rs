//! 课表实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "class_schedules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub day_of_week: i32,
    pub start_time: Time,
    pub end_time: Time,
    pub room: Option<String>,
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
    #[sea_orm(has_many = "super::schedule_teachers::Entity")]
    ScheduleTeachers,
    #[sea_orm(has_many = "super::class_sessions::Entity")]
    Sessions,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::schedule_teachers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScheduleTeachers.def()
    }
}

impl Related<super::class_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 授课教师单独存放在 schedule_teachers 表中
    pub fn into_schedule(
        self,
        teacher_ids: Vec<i64>,
    ) -> crate::models::schedules::entities::ClassSchedule {
        use crate::models::schedules::entities::ClassSchedule;

        ClassSchedule {
            id: self.id,
            class_id: self.class_id,
            day_of_week: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
            room: self.room,
            teacher_ids,
            created_at: super::ts_to_datetime(self.created_at),
            updated_at: super::ts_to_datetime(self.updated_at),
        }
    }
}
