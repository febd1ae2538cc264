use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{CheckoutRequest, OrderCreated, OrderWithItems, PurchaseConfirmation},
    error::AppResult,
    middleware::auth::BuyerContext,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/{id}", get(get_order))
        .route("/{id}/confirm", post(confirm_purchase))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CheckoutRequest,
    params(
        ("x-cart-token" = Option<Uuid>, Header, description = "Anonymous cart handle, required for guest checkout")
    ),
    responses(
        (status = 200, description = "Order created or refreshed for the cart", body = ApiResponse<OrderCreated>),
        (status = 400, description = "Field validation failed"),
        (status = 404, description = "No cart to order"),
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    buyer: BuyerContext,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<OrderCreated>>> {
    let response = order_service::create_order(&state, &buyer, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/confirm",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Stock decremented, cart closed; repeat calls are no-ops", body = ApiResponse<PurchaseConfirmation>),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn confirm_purchase(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PurchaseConfirmation>>> {
    let response = order_service::confirm_purchase(&state, id).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with its cart lines", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let response = order_service::get_order(&state, id).await?;
    Ok(Json(response))
}
