//! 文章存储操作

use std::collections::HashMap;

use super::{SeaOrmStorage, read_error, write_error};
use crate::entity::post_categories::{
    ActiveModel as CategoryActiveModel, Column as CategoryColumn, Entity as PostCategories,
};
use crate::entity::post_tags::{
    ActiveModel as TagActiveModel, Column as TagColumn, Entity as PostTags,
};
use crate::entity::posts::{ActiveModel, Column, Entity as Posts, Model};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    common::normalize_page,
    posts::{
        entities::{Post, PostStatus},
        requests::{CreatePostRequest, PostListQuery, UpdatePostRequest},
        responses::PostListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建文章，分类与标签在同一事务中写入
    pub async fn create_post_impl(
        &self,
        author_id: i64,
        slug: String,
        req: CreatePostRequest,
    ) -> Result<Post> {
        let now = chrono::Utc::now().timestamp();
        let status = req.status.unwrap_or(PostStatus::Draft);
        let categories = normalize_labels(req.categories);
        let tags = normalize_labels(req.tags);

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| write_error("开启事务失败", e))?;

        let post = ActiveModel {
            title: Set(req.title.trim().to_string()),
            slug: Set(slug),
            excerpt: Set(req.excerpt),
            content: Set(req.content),
            status: Set(status.to_string()),
            author_id: Set(Some(author_id)),
            published_at: Set((status == PostStatus::Published).then_some(now)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| write_error("创建文章失败", e))?;

        replace_labels(&txn, post.id, Some(&categories), Some(&tags)).await?;

        txn.commit()
            .await
            .map_err(|e| write_error("提交事务失败", e))?;

        Ok(post.into_post(categories, tags))
    }

    pub async fn get_post_by_id_impl(&self, id: i64) -> Result<Option<Post>> {
        let Some(model) = Posts::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询文章失败", e))?
        else {
            return Ok(None);
        };

        Ok(self.attach_labels(vec![model]).await?.pop())
    }

    pub async fn get_post_by_slug_impl(&self, slug: &str) -> Result<Option<Post>> {
        let Some(model) = Posts::find()
            .filter(Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(|e| read_error("查询文章失败", e))?
        else {
            return Ok(None);
        };

        Ok(self.attach_labels(vec![model]).await?.pop())
    }

    /// 分页列出文章；公开列表只含已发布文章并按发布时间倒序
    pub async fn list_posts_with_pagination_impl(
        &self,
        query: PostListQuery,
        published_only: bool,
    ) -> Result<PostListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Posts::find();

        if published_only {
            select = select
                .filter(Column::Status.eq(PostStatus::Published.as_str()))
                .order_by_desc(Column::PublishedAt);
        } else {
            if let Some(status) = query.status {
                select = select.filter(Column::Status.eq(status.as_str()));
            }
            select = select.order_by_desc(Column::CreatedAt);
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(Column::Title.contains(&escaped));
        }

        if let Some(ref category) = query.category
            && !category.trim().is_empty()
        {
            let post_ids: Vec<i64> = PostCategories::find()
                .select_only()
                .column(CategoryColumn::PostId)
                .filter(CategoryColumn::Name.eq(category.trim()))
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| read_error("查询文章分类失败", e))?;
            select = select.filter(Column::Id.is_in(post_ids));
        }

        if let Some(ref tag) = query.tag
            && !tag.trim().is_empty()
        {
            let post_ids: Vec<i64> = PostTags::find()
                .select_only()
                .column(TagColumn::PostId)
                .filter(TagColumn::Name.eq(tag.trim()))
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| read_error("查询文章标签失败", e))?;
            select = select.filter(Column::Id.is_in(post_ids));
        }

        let paginator = select.order_by_desc(Column::Id).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| read_error("查询文章总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| read_error("查询文章页数失败", e))?;
        let posts = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| read_error("查询文章列表失败", e))?;

        Ok(PostListResponse {
            items: self.attach_labels(posts).await?,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 更新文章；分类与标签的替换和文章本身在同一事务中完成
    pub async fn update_post_impl(
        &self,
        id: i64,
        update: UpdatePostRequest,
    ) -> Result<Option<Post>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| write_error("开启事务失败", e))?;

        let Some(existing) = Posts::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| read_error("查询文章失败", e))?
        else {
            return Ok(None);
        };

        let now = chrono::Utc::now().timestamp();
        let published_at = existing.published_at;
        let mut model: ActiveModel = existing.into();

        if let Some(title) = update.title {
            model.title = Set(title.trim().to_string());
        }
        if let Some(slug) = update.slug {
            model.slug = Set(slug);
        }
        if let Some(excerpt) = update.excerpt {
            model.excerpt = Set(Some(excerpt));
        }
        if let Some(content) = update.content {
            model.content = Set(content);
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
            // 只在第一次发布时记录
            if status == PostStatus::Published && published_at.is_none() {
                model.published_at = Set(Some(now));
            }
        }
        model.updated_at = Set(now);

        model
            .update(&txn)
            .await
            .map_err(|e| write_error("更新文章失败", e))?;

        let categories = update.categories.map(normalize_labels);
        let tags = update.tags.map(normalize_labels);
        replace_labels(&txn, id, categories.as_deref(), tags.as_deref()).await?;

        txn.commit()
            .await
            .map_err(|e| write_error("提交事务失败", e))?;

        self.get_post_by_id_impl(id).await
    }

    pub async fn delete_post_impl(&self, id: i64) -> Result<bool> {
        let result = Posts::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| write_error("删除文章失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 批量加载分类与标签
    async fn attach_labels(&self, models: Vec<Model>) -> Result<Vec<Post>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let post_ids: Vec<i64> = models.iter().map(|m| m.id).collect();

        let mut categories: HashMap<i64, Vec<String>> = HashMap::new();
        for row in PostCategories::find()
            .filter(CategoryColumn::PostId.is_in(post_ids.clone()))
            .order_by_asc(CategoryColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| read_error("查询文章分类失败", e))?
        {
            categories.entry(row.post_id).or_default().push(row.name);
        }

        let mut tags: HashMap<i64, Vec<String>> = HashMap::new();
        for row in PostTags::find()
            .filter(TagColumn::PostId.is_in(post_ids))
            .order_by_asc(TagColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| read_error("查询文章标签失败", e))?
        {
            tags.entry(row.post_id).or_default().push(row.name);
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let c = categories.remove(&m.id).unwrap_or_default();
                let t = tags.remove(&m.id).unwrap_or_default();
                m.into_post(c, t)
            })
            .collect())
    }
}

/// 去除空白、空值与重复项，保留原有顺序
fn normalize_labels(labels: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim();
        if !label.is_empty() && !result.iter().any(|l| l == label) {
            result.push(label.to_string());
        }
    }
    result
}

/// 替换文章的分类 / 标签，None 表示保持不变
async fn replace_labels<C: ConnectionTrait>(
    conn: &C,
    post_id: i64,
    categories: Option<&[String]>,
    tags: Option<&[String]>,
) -> Result<()> {
    if let Some(categories) = categories {
        PostCategories::delete_many()
            .filter(CategoryColumn::PostId.eq(post_id))
            .exec(conn)
            .await
            .map_err(|e| write_error("清除文章分类失败", e))?;
        for name in categories {
            CategoryActiveModel {
                post_id: Set(post_id),
                name: Set(name.clone()),
                ..Default::default()
            }
            .insert(conn)
            .await
            .map_err(|e| write_error("写入文章分类失败", e))?;
        }
    }

    if let Some(tags) = tags {
        PostTags::delete_many()
            .filter(TagColumn::PostId.eq(post_id))
            .exec(conn)
            .await
            .map_err(|e| write_error("清除文章标签失败", e))?;
        for name in tags {
            TagActiveModel {
                post_id: Set(post_id),
                name: Set(name.clone()),
                ..Default::default()
            }
            .insert(conn)
            .await
            .map_err(|e| write_error("写入文章标签失败", e))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::users::tests::seed_user;

    fn post_request(title: &str, status: PostStatus) -> CreatePostRequest {
        CreatePostRequest {
            title: title.to_string(),
            slug: None,
            excerpt: None,
            content: "Body".to_string(),
            status: Some(status),
            categories: vec!["News".to_string(), " News ".to_string(), "".to_string()],
            tags: vec!["term-1".to_string()],
        }
    }

    #[tokio::test]
    async fn test_create_post_with_labels() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;

        let post = storage
            .create_post_impl(
                admin.id,
                "open-day".to_string(),
                post_request("Open Day", PostStatus::Published),
            )
            .await
            .unwrap();
        assert_eq!(post.categories, vec!["News".to_string()]);
        assert!(post.published_at.is_some());

        let by_slug = storage.get_post_by_slug_impl("open-day").await.unwrap().unwrap();
        assert_eq!(by_slug.id, post.id);
        assert_eq!(by_slug.tags, vec!["term-1".to_string()]);

        let err = storage
            .create_post_impl(
                admin.id,
                "open-day".to_string(),
                post_request("Open Day again", PostStatus::Draft),
            )
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_public_list_only_published() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        storage
            .create_post_impl(
                admin.id,
                "draft".to_string(),
                post_request("Draft", PostStatus::Draft),
            )
            .await
            .unwrap();
        storage
            .create_post_impl(
                admin.id,
                "live".to_string(),
                post_request("Live", PostStatus::Published),
            )
            .await
            .unwrap();

        let query = PostListQuery {
            page: None,
            size: None,
            status: None,
            category: Some("News".to_string()),
            tag: None,
            search: None,
        };
        let public = storage
            .list_posts_with_pagination_impl(query.clone(), true)
            .await
            .unwrap();
        assert_eq!(public.pagination.total, 1);
        assert_eq!(public.items[0].slug, "live");

        let admin_view = storage
            .list_posts_with_pagination_impl(query, false)
            .await
            .unwrap();
        assert_eq!(admin_view.pagination.total, 2);
    }

    #[tokio::test]
    async fn test_publish_stamps_once_and_relinks_labels() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let admin = seed_user(&storage, "idp_admin", UserRole::Admin).await;
        let post = storage
            .create_post_impl(
                admin.id,
                "notes".to_string(),
                post_request("Notes", PostStatus::Draft),
            )
            .await
            .unwrap();
        assert!(post.published_at.is_none());

        let published = storage
            .update_post_impl(
                post.id,
                UpdatePostRequest {
                    status: Some(PostStatus::Published),
                    tags: Some(vec!["exams".to_string(), "term-2".to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        let first_published_at = published.published_at;
        assert!(first_published_at.is_some());
        assert_eq!(published.tags, vec!["exams".to_string(), "term-2".to_string()]);
        assert_eq!(published.categories, vec!["News".to_string()]);

        let unpublished = storage
            .update_post_impl(
                post.id,
                UpdatePostRequest {
                    status: Some(PostStatus::Draft),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unpublished.published_at, first_published_at);

        let republished = storage
            .update_post_impl(
                post.id,
                UpdatePostRequest {
                    status: Some(PostStatus::Published),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(republished.published_at, first_published_at);
    }
}
