use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};

use crate::{
    dto::blog::{
        AddCommentRequest, ArticleDetail, ArticleList, CreateArticleRequest, VoteRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Article, ArticleComment},
    response::ApiResponse,
    routes::params::Pagination,
    services::blog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list_articles).post(create_article))
        .route("/articles/{slug}", get(get_article))
        .route("/articles/{slug}/comments", post(add_comment))
        .route("/articles/{slug}/vote", post(vote))
}

#[utoipa::path(
    get,
    path = "/api/blog/articles",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Articles, newest first", body = ApiResponse<ArticleList>)
    ),
    tag = "Blog"
)]
pub async fn list_articles(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ArticleList>>> {
    let response = blog_service::list_articles(&state, pagination).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/blog/articles/{slug}",
    params(
        ("slug" = String, Path, description = "Article slug")
    ),
    responses(
        (status = 200, description = "Article with comments, newest first", body = ApiResponse<ArticleDetail>),
        (status = 404, description = "Article not found"),
    ),
    tag = "Blog"
)]
pub async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<ArticleDetail>>> {
    let response = blog_service::get_article(&state, &slug).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/blog/articles",
    request_body = CreateArticleRequest,
    responses(
        (status = 200, description = "Article created, slug derived from title", body = ApiResponse<Article>),
        (status = 400, description = "Missing title or content"),
    ),
    security(("bearer_auth" = [])),
    tag = "Blog"
)]
pub async fn create_article(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateArticleRequest>,
) -> AppResult<Json<ApiResponse<Article>>> {
    let response = blog_service::create_article(&state, &user, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/blog/articles/{slug}/comments",
    params(
        ("slug" = String, Path, description = "Article slug")
    ),
    request_body = AddCommentRequest,
    responses(
        (status = 200, description = "Comment added", body = ApiResponse<ArticleComment>),
        (status = 404, description = "Article not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Blog"
)]
pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
    Json(payload): Json<AddCommentRequest>,
) -> AppResult<Json<ApiResponse<ArticleComment>>> {
    let response = blog_service::add_comment(&state, &user, &slug, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/blog/articles/{slug}/vote",
    params(
        ("slug" = String, Path, description = "Article slug")
    ),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Counter bumped", body = ApiResponse<Article>),
        (status = 404, description = "Article not found"),
    ),
    tag = "Blog"
)]
pub async fn vote(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<VoteRequest>,
) -> AppResult<Json<ApiResponse<Article>>> {
    let response = blog_service::vote(&state, &slug, payload).await?;
    Ok(Json(response))
}
