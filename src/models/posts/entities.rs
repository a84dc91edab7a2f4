use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::define_string_enum! {
    // 文章状态
    PostStatus("post.ts") {
        Draft => "draft",
        Published => "published",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "post.ts")]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub status: PostStatus,
    pub author_id: Option<i64>,
    // 首次发布时写入，之后不再变化
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
