use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Article, ArticleComment};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateArticleRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCommentRequest {
    pub text: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    Like,
    Dislike,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VoteRequest {
    pub vote: Vote,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArticleList {
    pub items: Vec<Article>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArticleDetail {
    pub article: Article,
    pub comments: Vec<ArticleComment>,
    pub comments_count: i64,
}
