//! 用户存储操作

use super::{SeaOrmStorage, read_error, write_error};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    common::normalize_page,
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            external_id: Set(req.external_id.trim().to_string()),
            email: Set(req.email.trim().to_lowercase()),
            display_name: Set(req.display_name),
            role: Set(req.role.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| write_error("创建用户失败", e))?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询用户失败", e))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过身份提供方 subject 获取用户
    pub async fn get_user_by_external_id_impl(&self, external_id: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::ExternalId.eq(external_id))
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询用户失败", e))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过邮箱获取用户
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询用户失败", e))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 分页列出用户
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Users::find();

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Email.contains(&escaped))
                    .add(Column::DisplayName.contains(&escaped)),
            );
        }

        // 角色筛选
        if let Some(ref role) = query.role {
            select = select.filter(Column::Role.eq(role.as_str()));
        }

        select = select.order_by_desc(Column::CreatedAt);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| read_error("查询用户总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| read_error("查询用户页数失败", e))?;
        let users = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| read_error("查询用户列表失败", e))?;

        Ok(UserListResponse {
            items: users.into_iter().map(|m| m.into_user()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 更新用户信息
    pub async fn update_user_impl(
        &self,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        if self.get_user_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(email) = update.email {
            model.email = Set(email.trim().to_lowercase());
        }
        if let Some(display_name) = update.display_name {
            model.display_name = Set(Some(display_name));
        }
        if let Some(role) = update.role {
            model.role = Set(role.to_string());
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| write_error("更新用户失败", e))?;

        Ok(Some(result.into_user()))
    }

    /// 删除用户
    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| write_error("删除用户失败", e))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;

    pub(crate) async fn seed_user(storage: &SeaOrmStorage, subject: &str, role: UserRole) -> User {
        storage
            .create_user_impl(CreateUserRequest {
                external_id: subject.to_string(),
                email: format!("{subject}@school.test"),
                display_name: Some(subject.to_string()),
                role,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_lookup_by_external_id() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let user = seed_user(&storage, "idp_admin", UserRole::Admin).await;

        let found = storage
            .get_user_by_external_id_impl("idp_admin")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.role, UserRole::Admin);

        assert!(
            storage
                .get_user_by_external_id_impl("idp_unknown")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_duplicate_external_id_is_conflict() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        seed_user(&storage, "idp_dup", UserRole::Teacher).await;

        let err = storage
            .create_user_impl(CreateUserRequest {
                external_id: "idp_dup".to_string(),
                email: "other@school.test".to_string(),
                display_name: None,
                role: UserRole::Teacher,
            })
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_update_and_delete_user() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let user = seed_user(&storage, "idp_student", UserRole::Student).await;

        let updated = storage
            .update_user_impl(
                user.id,
                UpdateUserRequest {
                    email: None,
                    display_name: Some("Renamed".to_string()),
                    role: Some(UserRole::Teacher),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.display_name.as_deref(), Some("Renamed"));
        assert_eq!(updated.role, UserRole::Teacher);

        assert!(storage.delete_user_impl(user.id).await.unwrap());
        assert!(!storage.delete_user_impl(user.id).await.unwrap());
    }
}
