use super::entities::PostStatus;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "post.ts")]
pub struct PostListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    // 公开接口忽略此字段，只返回已发布文章
    pub status: Option<PostStatus>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "post.ts")]
pub struct CreatePostRequest {
    pub title: String,
    // 缺省时由标题生成
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: String,
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// categories / tags 存在时整体替换
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "post.ts")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub status: Option<PostStatus>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}
