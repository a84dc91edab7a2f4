//! 作业存储操作

use super::{SeaOrmStorage, read_error, write_error};
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    assignments::{
        entities::Assignment,
        requests::{AssignmentListQuery, CreateAssignmentRequest, UpdateAssignmentRequest},
        responses::AssignmentListResponse,
    },
    common::normalize_page,
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建作业
    pub async fn create_assignment_impl(
        &self,
        created_by: i64,
        req: CreateAssignmentRequest,
    ) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            class_id: Set(req.class_id),
            title: Set(req.title.trim().to_string()),
            description: Set(req.description),
            due_date: Set(req.due_date.map(|dt| dt.timestamp())),
            max_score: Set(req.max_score.unwrap_or(100.0)),
            created_by: Set(Some(created_by)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| write_error("创建作业失败", e))?;

        Ok(result.into_assignment())
    }

    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询作业失败", e))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 分页列出作业
    pub async fn list_assignments_with_pagination_impl(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Assignments::find();

        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(Column::Title.contains(&escaped));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| read_error("查询作业总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| read_error("查询作业页数失败", e))?;
        let assignments = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| read_error("查询作业列表失败", e))?;

        Ok(AssignmentListResponse {
            items: assignments
                .into_iter()
                .map(|m| m.into_assignment())
                .collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn update_assignment_impl(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>> {
        if self.get_assignment_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(title) = update.title {
            model.title = Set(title.trim().to_string());
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(due_date) = update.due_date {
            model.due_date = Set(Some(due_date.timestamp()));
        }
        if let Some(max_score) = update.max_score {
            model.max_score = Set(max_score);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| write_error("更新作业失败", e))?;

        Ok(Some(result.into_assignment()))
    }

    pub async fn delete_assignment_impl(&self, id: i64) -> Result<bool> {
        let result = Assignments::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| write_error("删除作业失败", e))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::classes::tests::class_request;
    use crate::storage::sea_orm_storage::users::tests::seed_user;

    #[tokio::test]
    async fn test_assignment_defaults_and_deleted_with_class() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let teacher = seed_user(&storage, "idp_t", UserRole::Teacher).await;
        let class = storage
            .create_class_impl(class_request("Geography", None))
            .await
            .unwrap();

        let assignment = storage
            .create_assignment_impl(
                teacher.id,
                CreateAssignmentRequest {
                    class_id: class.id,
                    title: "  Map reading  ".to_string(),
                    description: None,
                    due_date: None,
                    max_score: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(assignment.title, "Map reading");
        assert_eq!(assignment.max_score, 100.0);
        assert_eq!(assignment.created_by, Some(teacher.id));

        assert!(storage.delete_class_impl(class.id).await.unwrap());
        assert!(
            storage
                .get_assignment_by_id_impl(assignment.id)
                .await
                .unwrap()
                .is_none()
        );
    }
}
