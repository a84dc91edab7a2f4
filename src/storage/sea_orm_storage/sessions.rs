//! 课次存储操作

use super::{SeaOrmStorage, read_error, write_error};
use crate::entity::class_schedules::Entity as ClassSchedules;
use crate::entity::class_sessions::{ActiveModel, Column, Entity as ClassSessions};
use crate::errors::{Result, SchoolOpsError};
use crate::models::{
    PaginationInfo,
    common::normalize_page,
    sessions::{
        entities::{ClassSession, SessionStatus},
        requests::{CreateSessionRequest, SessionListQuery, UpdateSessionRequest},
        responses::SessionListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建课次，缺省的上下课时间取自所属课表
    pub async fn create_session_impl(&self, req: CreateSessionRequest) -> Result<ClassSession> {
        let schedule = match req.schedule_id {
            Some(schedule_id) => {
                let schedule = ClassSchedules::find_by_id(schedule_id)
                    .one(&self.db)
                    .await
                    .map_err(|e| read_error("查询课表失败", e))?
                    .ok_or_else(|| {
                        SchoolOpsError::not_found(format!("课表 {schedule_id} 不存在"))
                    })?;
                if schedule.class_id != req.class_id {
                    return Err(SchoolOpsError::validation("课表不属于该班级"));
                }
                Some(schedule)
            }
            None => None,
        };

        let start_time = req
            .start_time
            .or(schedule.as_ref().map(|s| s.start_time))
            .ok_or_else(|| SchoolOpsError::validation("缺少上课时间 start_time"))?;
        let end_time = req
            .end_time
            .or(schedule.as_ref().map(|s| s.end_time))
            .ok_or_else(|| SchoolOpsError::validation("缺少下课时间 end_time"))?;
        if start_time >= end_time {
            return Err(SchoolOpsError::validation("上课时间必须早于下课时间"));
        }

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            class_id: Set(req.class_id),
            schedule_id: Set(req.schedule_id),
            session_date: Set(req.session_date),
            start_time: Set(start_time),
            end_time: Set(end_time),
            topic: Set(req.topic),
            status: Set(req.status.unwrap_or(SessionStatus::Scheduled).to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| write_error("创建课次失败", e))?;

        Ok(result.into_session())
    }

    pub async fn get_session_by_id_impl(&self, id: i64) -> Result<Option<ClassSession>> {
        let result = ClassSessions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询课次失败", e))?;

        Ok(result.map(|m| m.into_session()))
    }

    /// 分页列出课次，按日期倒序
    pub async fn list_sessions_with_pagination_impl(
        &self,
        query: SessionListQuery,
    ) -> Result<SessionListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = ClassSessions::find();

        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }
        if let Some(from) = query.from {
            select = select.filter(Column::SessionDate.gte(from));
        }
        if let Some(to) = query.to {
            select = select.filter(Column::SessionDate.lte(to));
        }

        let paginator = select
            .order_by_desc(Column::SessionDate)
            .order_by_desc(Column::StartTime)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| read_error("查询课次总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| read_error("查询课次页数失败", e))?;
        let sessions = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| read_error("查询课次列表失败", e))?;

        Ok(SessionListResponse {
            items: sessions.into_iter().map(|m| m.into_session()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn update_session_impl(
        &self,
        id: i64,
        update: UpdateSessionRequest,
    ) -> Result<Option<ClassSession>> {
        let Some(existing) = ClassSessions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询课次失败", e))?
        else {
            return Ok(None);
        };

        let start_time = update.start_time.unwrap_or(existing.start_time);
        let end_time = update.end_time.unwrap_or(existing.end_time);
        if start_time >= end_time {
            return Err(SchoolOpsError::validation("上课时间必须早于下课时间"));
        }

        let mut model: ActiveModel = existing.into();
        model.start_time = Set(start_time);
        model.end_time = Set(end_time);
        if let Some(session_date) = update.session_date {
            model.session_date = Set(session_date);
        }
        if let Some(topic) = update.topic {
            model.topic = Set(Some(topic));
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| write_error("更新课次失败", e))?;

        Ok(Some(result.into_session()))
    }

    pub async fn delete_session_impl(&self, id: i64) -> Result<bool> {
        let result = ClassSessions::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| write_error("删除课次失败", e))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::schedules::requests::CreateScheduleRequest;
    use crate::storage::sea_orm_storage::classes::tests::class_request;
    use chrono::{NaiveDate, NaiveTime};

    pub(crate) fn session_request(class_id: i64, date: NaiveDate) -> CreateSessionRequest {
        CreateSessionRequest {
            class_id,
            schedule_id: None,
            session_date: date,
            start_time: NaiveTime::from_hms_opt(9, 0, 0),
            end_time: NaiveTime::from_hms_opt(10, 0, 0),
            topic: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_session_inherits_schedule_times() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let class = storage
            .create_class_impl(class_request("Biology", None))
            .await
            .unwrap();
        let schedule = storage
            .create_schedule_impl(CreateScheduleRequest {
                class_id: class.id,
                day_of_week: 3,
                start_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
                room: None,
                teacher_ids: vec![],
            })
            .await
            .unwrap();

        let session = storage
            .create_session_impl(CreateSessionRequest {
                class_id: class.id,
                schedule_id: Some(schedule.id),
                session_date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
                start_time: None,
                end_time: None,
                topic: Some("Cells".to_string()),
                status: None,
            })
            .await
            .unwrap();
        assert_eq!(session.start_time, schedule.start_time);
        assert_eq!(session.end_time, schedule.end_time);
        assert_eq!(session.status, SessionStatus::Scheduled);
    }

    #[tokio::test]
    async fn test_session_rejects_inverted_times() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let class = storage
            .create_class_impl(class_request("History", None))
            .await
            .unwrap();
        let mut req = session_request(class.id, NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
        req.start_time = NaiveTime::from_hms_opt(11, 0, 0);

        let err = storage.create_session_impl(req).await.unwrap_err();
        assert!(matches!(err, SchoolOpsError::Validation(_)));
    }
}
