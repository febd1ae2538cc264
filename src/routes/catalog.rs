use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, put},
};
use uuid::Uuid;

use crate::{
    dto::catalog::{
        CarList, CarWithProducts, CategoryList, CategoryWithProducts, CreateProductRequest,
        ProductDetail, ProductList, SearchResults, UpdateProductRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::{ProductQuery, SearchQuery},
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{slug}", get(get_product))
        .route("/products/id/{id}", put(update_product))
        .route("/products/id/{id}", delete(delete_product))
        .route("/cars", get(list_cars))
        .route("/cars/{slug}", get(get_car))
        .route("/categories", get(list_categories))
        .route("/categories/{slug}", get(get_category))
        .route("/search", get(search))
}

#[utoipa::path(
    get,
    path = "/api/catalog/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Name or code fragment"),
        ("sort_by" = Option<String>, Query, description = "added | price | name"),
        ("sort_order" = Option<String>, Query, description = "asc | desc"),
    ),
    responses(
        (status = 200, description = "List products, newest first by default", body = ApiResponse<ProductList>)
    ),
    tag = "Catalog"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let response = catalog_service::list_products(&state, query).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/catalog/products/{slug}",
    params(
        ("slug" = String, Path, description = "Product slug")
    ),
    responses(
        (status = 200, description = "Product with its cars and categories", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Catalog"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let response = catalog_service::get_product_by_slug(&state, &slug).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/catalog/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Product created, slug derived from name", body = ApiResponse<ProductDetail>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let response = catalog_service::create_product(&state, &user, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    put,
    path = "/api/catalog/products/id/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated, slug re-derived", body = ApiResponse<ProductDetail>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let response = catalog_service::update_product(&state, &user, id, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/api/catalog/products/id/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let response = catalog_service::delete_product(&state, &user, id).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/catalog/cars",
    responses(
        (status = 200, description = "All car models", body = ApiResponse<CarList>)
    ),
    tag = "Catalog"
)]
pub async fn list_cars(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CarList>>> {
    let response = catalog_service::list_cars(&state).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/catalog/cars/{slug}",
    params(
        ("slug" = String, Path, description = "Car slug")
    ),
    responses(
        (status = 200, description = "Car with matching products", body = ApiResponse<CarWithProducts>),
        (status = 404, description = "Car not found"),
    ),
    tag = "Catalog"
)]
pub async fn get_car(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<CarWithProducts>>> {
    let response = catalog_service::get_car_by_slug(&state, &slug).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/catalog/categories",
    responses(
        (status = 200, description = "All categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let response = catalog_service::list_categories(&state).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/catalog/categories/{slug}",
    params(
        ("slug" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Category with its products", body = ApiResponse<CategoryWithProducts>),
        (status = 404, description = "Category not found"),
    ),
    tag = "Catalog"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<CategoryWithProducts>>> {
    let response = catalog_service::get_category_by_slug(&state, &slug).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/catalog/search",
    params(
        ("query" = String, Query, description = "Search term")
    ),
    responses(
        (status = 200, description = "Matches across categories, products and cars", body = ApiResponse<SearchResults>)
    ),
    tag = "Catalog"
)]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<SearchResults>>> {
    let response = catalog_service::search(&state, &params.query).await?;
    Ok(Json(response))
}
