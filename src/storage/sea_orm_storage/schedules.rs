//! 课表存储操作

use std::collections::HashMap;

use super::{SeaOrmStorage, read_error, write_error};
use crate::entity::class_schedules::{ActiveModel, Column, Entity as ClassSchedules, Model};
use crate::entity::schedule_teachers::{
    ActiveModel as ScheduleTeacherActiveModel, Column as ScheduleTeacherColumn,
    Entity as ScheduleTeachers,
};
use crate::errors::Result;
use crate::models::schedules::{
    entities::ClassSchedule,
    requests::{CreateScheduleRequest, ScheduleListQuery, UpdateScheduleRequest},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建课表，课表与授课教师在同一事务中写入
    pub async fn create_schedule_impl(&self, req: CreateScheduleRequest) -> Result<ClassSchedule> {
        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| write_error("开启事务失败", e))?;

        let schedule = ActiveModel {
            class_id: Set(req.class_id),
            day_of_week: Set(req.day_of_week),
            start_time: Set(req.start_time),
            end_time: Set(req.end_time),
            room: Set(req.room),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| write_error("创建课表失败", e))?;

        let teacher_ids = dedup_ids(req.teacher_ids);
        insert_schedule_teachers(&txn, schedule.id, &teacher_ids).await?;

        txn.commit()
            .await
            .map_err(|e| write_error("提交事务失败", e))?;

        Ok(schedule.into_schedule(teacher_ids))
    }

    pub async fn get_schedule_by_id_impl(&self, id: i64) -> Result<Option<ClassSchedule>> {
        let Some(model) = ClassSchedules::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询课表失败", e))?
        else {
            return Ok(None);
        };

        let mut schedules = self.attach_teachers(vec![model]).await?;
        Ok(schedules.pop())
    }

    /// 列出课表，按星期与开始时间排序
    pub async fn list_schedules_impl(&self, query: ScheduleListQuery) -> Result<Vec<ClassSchedule>> {
        let mut select = ClassSchedules::find();

        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        if let Some(day_of_week) = query.day_of_week {
            select = select.filter(Column::DayOfWeek.eq(day_of_week));
        }
        if let Some(teacher_id) = query.teacher_id {
            let schedule_ids: Vec<i64> = ScheduleTeachers::find()
                .select_only()
                .column(ScheduleTeacherColumn::ScheduleId)
                .filter(ScheduleTeacherColumn::TeacherId.eq(teacher_id))
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| read_error("查询授课教师失败", e))?;
            select = select.filter(Column::Id.is_in(schedule_ids));
        }

        let models = select
            .order_by_asc(Column::DayOfWeek)
            .order_by_asc(Column::StartTime)
            .all(&self.db)
            .await
            .map_err(|e| read_error("查询课表列表失败", e))?;

        self.attach_teachers(models).await
    }

    /// 更新课表；teacher_ids 存在时在同一事务中替换授课教师
    pub async fn update_schedule_impl(
        &self,
        id: i64,
        update: UpdateScheduleRequest,
    ) -> Result<Option<ClassSchedule>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| write_error("开启事务失败", e))?;

        let Some(existing) = ClassSchedules::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| read_error("查询课表失败", e))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(day_of_week) = update.day_of_week {
            model.day_of_week = Set(day_of_week);
        }
        if let Some(start_time) = update.start_time {
            model.start_time = Set(start_time);
        }
        if let Some(end_time) = update.end_time {
            model.end_time = Set(end_time);
        }
        if let Some(room) = update.room {
            model.room = Set(Some(room));
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        model
            .update(&txn)
            .await
            .map_err(|e| write_error("更新课表失败", e))?;

        if let Some(teacher_ids) = update.teacher_ids {
            ScheduleTeachers::delete_many()
                .filter(ScheduleTeacherColumn::ScheduleId.eq(id))
                .exec(&txn)
                .await
                .map_err(|e| write_error("清除授课教师失败", e))?;
            insert_schedule_teachers(&txn, id, &dedup_ids(teacher_ids)).await?;
        }

        txn.commit()
            .await
            .map_err(|e| write_error("提交事务失败", e))?;

        self.get_schedule_by_id_impl(id).await
    }

    pub async fn delete_schedule_impl(&self, id: i64) -> Result<bool> {
        let result = ClassSchedules::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| write_error("删除课表失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 批量加载授课教师
    async fn attach_teachers(&self, models: Vec<Model>) -> Result<Vec<ClassSchedule>> {
        let schedule_ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let mut teacher_map: HashMap<i64, Vec<i64>> = HashMap::new();

        if !schedule_ids.is_empty() {
            let links = ScheduleTeachers::find()
                .filter(ScheduleTeacherColumn::ScheduleId.is_in(schedule_ids))
                .order_by_asc(ScheduleTeacherColumn::Id)
                .all(&self.db)
                .await
                .map_err(|e| read_error("查询授课教师失败", e))?;
            for link in links {
                teacher_map
                    .entry(link.schedule_id)
                    .or_default()
                    .push(link.teacher_id);
            }
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let teacher_ids = teacher_map.remove(&m.id).unwrap_or_default();
                m.into_schedule(teacher_ids)
            })
            .collect())
    }
}

fn dedup_ids(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

async fn insert_schedule_teachers<C: ConnectionTrait>(
    conn: &C,
    schedule_id: i64,
    teacher_ids: &[i64],
) -> Result<()> {
    for teacher_id in teacher_ids {
        ScheduleTeacherActiveModel {
            schedule_id: Set(schedule_id),
            teacher_id: Set(*teacher_id),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| write_error("分配授课教师失败", e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::classes::tests::class_request;
    use crate::storage::sea_orm_storage::teachers::tests::teacher_request;
    use chrono::NaiveTime;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[tokio::test]
    async fn test_schedule_with_teachers() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let class = storage
            .create_class_impl(class_request("Chemistry", None))
            .await
            .unwrap();
        let t1 = storage
            .create_teacher_impl(teacher_request("T1", "t1@school.test"))
            .await
            .unwrap();
        let t2 = storage
            .create_teacher_impl(teacher_request("T2", "t2@school.test"))
            .await
            .unwrap();

        let schedule = storage
            .create_schedule_impl(CreateScheduleRequest {
                class_id: class.id,
                day_of_week: 2,
                start_time: time(9, 0),
                end_time: time(10, 30),
                room: Some("Lab 1".to_string()),
                teacher_ids: vec![t1.id, t2.id, t1.id],
            })
            .await
            .unwrap();
        assert_eq!(schedule.teacher_ids, vec![t1.id, t2.id]);

        let by_teacher = storage
            .list_schedules_impl(ScheduleListQuery {
                class_id: None,
                teacher_id: Some(t2.id),
                day_of_week: None,
            })
            .await
            .unwrap();
        assert_eq!(by_teacher.len(), 1);

        let updated = storage
            .update_schedule_impl(
                schedule.id,
                UpdateScheduleRequest {
                    teacher_ids: Some(vec![t2.id]),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.teacher_ids, vec![t2.id]);
        assert_eq!(updated.room.as_deref(), Some("Lab 1"));
    }

    #[tokio::test]
    async fn test_unknown_teacher_rolls_back_schedule() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let class = storage
            .create_class_impl(class_request("Physics", None))
            .await
            .unwrap();

        let result = storage
            .create_schedule_impl(CreateScheduleRequest {
                class_id: class.id,
                day_of_week: 1,
                start_time: time(14, 0),
                end_time: time(15, 0),
                room: None,
                teacher_ids: vec![4242],
            })
            .await;
        assert!(result.is_err());

        let schedules = storage
            .list_schedules_impl(ScheduleListQuery {
                class_id: Some(class.id),
                teacher_id: None,
                day_of_week: None,
            })
            .await
            .unwrap();
        assert!(schedules.is_empty());
    }
}
