use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::cart::CartItemDto;
use crate::models::Order;

/// Checkout form. Buyer name/email is required on the guest path and, on the
/// registered path, overwrites the account's contact fields.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address_city: String,
    pub address_zipcode: String,
    pub address_street: String,
    pub address_country: String,
    pub delivery_method: String,
    pub payment_method: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderCreated {
    pub order_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<CartItemDto>,
    pub total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseConfirmation {
    pub order: Order,
    pub items: Vec<CartItemDto>,
    pub total: Decimal,
    /// Wire-transfer title the buyer quotes when paying; payment capture
    /// itself happens outside this system, so `order.paid` stays false here.
    pub payment_reference: String,
}
