use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartView, UpdateQuantityRequest},
    error::AppResult,
    middleware::auth::BuyerContext,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view_cart).put(update_quantity))
        .route("/items", post(add_to_cart))
        .route("/items/{item_id}", delete(remove_item))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    params(
        ("x-cart-token" = Option<Uuid>, Header, description = "Anonymous cart handle")
    ),
    responses(
        (status = 200, description = "Current cart with fresh total", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn view_cart(
    State(state): State<AppState>,
    buyer: BuyerContext,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let response = cart_service::view_cart(&state, &buyer).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddToCartRequest,
    params(
        ("x-cart-token" = Option<Uuid>, Header, description = "Anonymous cart handle")
    ),
    responses(
        (status = 200, description = "Item added or merged; keep the returned cart_id", body = ApiResponse<CartView>),
        (status = 400, description = "Non-positive quantity"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    buyer: BuyerContext,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let response = cart_service::add_to_cart(&state, &buyer, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    put,
    path = "/api/cart",
    request_body = UpdateQuantityRequest,
    params(
        ("x-cart-token" = Option<Uuid>, Header, description = "Anonymous cart handle")
    ),
    responses(
        (status = 200, description = "Quantity set, total recomputed", body = ApiResponse<CartView>),
        (status = 404, description = "No active cart or no such line"),
    ),
    tag = "Cart"
)]
pub async fn update_quantity(
    State(state): State<AppState>,
    buyer: BuyerContext,
    Json(payload): Json<UpdateQuantityRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let response = cart_service::update_quantity(&state, &buyer, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{item_id}",
    params(
        ("item_id" = Uuid, Path, description = "Cart item ID")
    ),
    responses(
        (status = 200, description = "Removed", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Cart item not found"),
    ),
    tag = "Cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    buyer: BuyerContext,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let response = cart_service::remove_item(&state, &buyer, item_id).await?;
    Ok(Json(response))
}
