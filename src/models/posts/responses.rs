use super::entities::Post;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "post.ts")]
pub struct PostListResponse {
    pub items: Vec<Post>,
    pub pagination: PaginationInfo,
}
