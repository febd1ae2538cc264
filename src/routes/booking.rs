use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::booking::{BookingCreated, CarServiceList, CreateBookingRequest},
    error::AppResult,
    response::ApiResponse,
    services::booking_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_services))
        .route("/bookings", post(create_booking))
}

#[utoipa::path(
    get,
    path = "/api/service",
    responses(
        (status = 200, description = "Workshop service catalog", body = ApiResponse<CarServiceList>)
    ),
    tag = "Service"
)]
pub async fn list_services(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CarServiceList>>> {
    let response = booking_service::list_services(&state).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/service/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Booking recorded", body = ApiResponse<BookingCreated>),
        (status = 400, description = "Field validation failed"),
        (status = 404, description = "Car service not found"),
    ),
    tag = "Service"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<ApiResponse<BookingCreated>>> {
    let response = booking_service::create_booking(&state, payload).await?;
    Ok(Json(response))
}
