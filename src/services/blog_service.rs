use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::blog::{
        AddCommentRequest, ArticleDetail, ArticleList, CreateArticleRequest, Vote, VoteRequest,
    },
    entity::{
        article_comments::{
            ActiveModel as CommentActive, Column as CommentCol, Entity as ArticleComments,
        },
        articles::{ActiveModel as ArticleActive, Column as ArticleCol, Entity as Articles, Model as ArticleModel},
    },
    error::{AppError, AppResult, FieldError},
    middleware::auth::AuthUser,
    models::{Article, ArticleComment},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    slug::slugify,
    state::AppState,
};

pub async fn list_articles(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<ArticleList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Articles::find().order_by_desc(ArticleCol::Added);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(article_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Articles",
        ArticleList { items },
        Some(meta),
    ))
}

pub async fn get_article(state: &AppState, slug: &str) -> AppResult<ApiResponse<ArticleDetail>> {
    let article = find_by_slug(state, slug).await?;

    let comments: Vec<ArticleComment> = ArticleComments::find()
        .filter(CommentCol::ArticleId.eq(article.id))
        .order_by_desc(CommentCol::Added)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(comment_from_entity)
        .collect();
    let comments_count = comments.len() as i64;

    Ok(ApiResponse::success(
        "Article",
        ArticleDetail {
            article: article_from_entity(article),
            comments,
            comments_count,
        },
        None,
    ))
}

pub async fn create_article(
    state: &AppState,
    user: &AuthUser,
    payload: CreateArticleRequest,
) -> AppResult<ApiResponse<Article>> {
    let mut errors = Vec::new();
    if payload.title.trim().is_empty() {
        errors.push(FieldError::new("title", "required"));
    }
    if payload.content.trim().is_empty() {
        errors.push(FieldError::new("content", "required"));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let article = ArticleActive {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title.clone()),
        slug: Set(slugify(&payload.title)),
        content: Set(payload.content),
        user_id: Set(user.user_id),
        added: NotSet,
        likes: Set(0),
        dislikes: Set(0),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Article created",
        article_from_entity(article),
        Some(Meta::empty()),
    ))
}

pub async fn add_comment(
    state: &AppState,
    user: &AuthUser,
    slug: &str,
    payload: AddCommentRequest,
) -> AppResult<ApiResponse<ArticleComment>> {
    if payload.text.trim().is_empty() {
        return Err(AppError::Validation(vec![FieldError::new(
            "text", "required",
        )]));
    }

    let article = find_by_slug(state, slug).await?;

    let comment = CommentActive {
        id: Set(Uuid::new_v4()),
        article_id: Set(article.id),
        text: Set(payload.text),
        user_id: Set(user.user_id),
        added: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Comment added",
        comment_from_entity(comment),
        Some(Meta::empty()),
    ))
}

/// Bump the like or dislike counter. Votes are anonymous and unlimited, as
/// in the original blog.
pub async fn vote(
    state: &AppState,
    slug: &str,
    payload: VoteRequest,
) -> AppResult<ApiResponse<Article>> {
    let article = find_by_slug(state, slug).await?;

    let column = match payload.vote {
        Vote::Like => ArticleCol::Likes,
        Vote::Dislike => ArticleCol::Dislikes,
    };

    // Incremented in SQL so concurrent votes do not lose updates.
    Articles::update_many()
        .col_expr(column, Expr::col(column).add(1))
        .filter(ArticleCol::Id.eq(article.id))
        .exec(&state.orm)
        .await?;

    let article = find_by_slug(state, slug).await?;
    Ok(ApiResponse::success(
        "Vote recorded",
        article_from_entity(article),
        Some(Meta::empty()),
    ))
}

async fn find_by_slug(state: &AppState, slug: &str) -> AppResult<ArticleModel> {
    Articles::find()
        .filter(ArticleCol::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

fn article_from_entity(model: ArticleModel) -> Article {
    Article {
        id: model.id,
        title: model.title,
        slug: model.slug,
        content: model.content,
        user_id: model.user_id,
        added: model.added.with_timezone(&Utc),
        likes: model.likes,
        dislikes: model.dislikes,
    }
}

fn comment_from_entity(model: crate::entity::article_comments::Model) -> ArticleComment {
    ArticleComment {
        id: model.id,
        article_id: model.article_id,
        text: model.text,
        user_id: model.user_id,
        added: model.added.with_timezone(&Utc),
    }
}
