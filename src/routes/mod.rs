use axum::Router;

use crate::state::AppState;

pub mod blog;
pub mod booking;
pub mod cart;
pub mod catalog;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/catalog", catalog::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .nest("/blog", blog::router())
        .nest("/service", booking::router())
}
