use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Absolute set, not a delta; zero is allowed and is not a removal.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemDto {
    pub id: Uuid,
    pub product: Product,
    pub quantity: i32,
    /// quantity * product.price, recomputed on every read.
    pub value: Decimal,
}

/// The cart view handed back after every cart mutation. For anonymous
/// buyers `cart_id` is the handle the client must send back as
/// `X-Cart-Token` on the next request. `None` only on reads when the buyer
/// has no cart yet.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub cart_id: Option<Uuid>,
    pub items: Vec<CartItemDto>,
    pub total: Decimal,
}
