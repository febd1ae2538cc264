use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{CheckoutRequest, OrderCreated, OrderWithItems, PurchaseConfirmation},
    entity::{
        cart_items::{Column as ItemCol, Entity as CartItems},
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts, Model as CartModel},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
        users::{ActiveModel as UserActive, Entity as Users},
    },
    error::{AppError, AppResult, FieldError},
    middleware::auth::BuyerContext,
    models::Order,
    response::{ApiResponse, Meta},
    services::cart_service,
    state::AppState,
};

fn valid_zipcode(s: &str) -> bool {
    // Polish postal code, NN-NNN.
    let b = s.as_bytes();
    b.len() == 6
        && b[0].is_ascii_digit()
        && b[1].is_ascii_digit()
        && b[2] == b'-'
        && b[3].is_ascii_digit()
        && b[4].is_ascii_digit()
        && b[5].is_ascii_digit()
}

/// Field-level checkout validation. Runs before any write; a failure means
/// nothing was mutated.
fn validate_checkout(payload: &CheckoutRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if payload.first_name.trim().is_empty() {
        errors.push(FieldError::new("first_name", "required"));
    }
    if payload.last_name.trim().is_empty() {
        errors.push(FieldError::new("last_name", "required"));
    }
    if payload.email.trim().is_empty() {
        errors.push(FieldError::new("email", "required"));
    } else if !payload.email.contains('@') {
        errors.push(FieldError::new("email", "not a valid email address"));
    }
    if payload.address_city.trim().is_empty() {
        errors.push(FieldError::new("address_city", "required"));
    }
    if !valid_zipcode(payload.address_zipcode.trim()) {
        errors.push(FieldError::new(
            "address_zipcode",
            "must match NN-NNN, e.g. 00-950",
        ));
    }
    if payload.address_street.trim().is_empty() {
        errors.push(FieldError::new("address_street", "required"));
    }
    if payload.address_country.trim().is_empty() {
        errors.push(FieldError::new("address_country", "required"));
    }
    if payload.delivery_method.trim().is_empty() {
        errors.push(FieldError::new("delivery_method", "required"));
    }
    if payload.payment_method.trim().is_empty() {
        errors.push(FieldError::new("payment_method", "required"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// The cart an order may be created against: the caller's open cart on the
/// registered path, or the cart named by the guest handle. No cart, no order.
async fn checkout_cart(state: &AppState, buyer: &BuyerContext) -> AppResult<CartModel> {
    let cart = match buyer {
        BuyerContext::Registered(user) => {
            Carts::find()
                .filter(
                    Condition::all()
                        .add(CartCol::UserId.eq(user.user_id))
                        .add(CartCol::IsOrdered.eq(false)),
                )
                .one(&state.orm)
                .await?
        }
        BuyerContext::Guest(Some(cart_id)) => {
            // Anonymous carts only; a registered buyer's cart cannot be
            // ordered through a guessed handle.
            Carts::find()
                .filter(
                    Condition::all()
                        .add(CartCol::Id.eq(*cart_id))
                        .add(CartCol::UserId.is_null())
                        .add(CartCol::IsOrdered.eq(false)),
                )
                .one(&state.orm)
                .await?
        }
        BuyerContext::Guest(None) => None,
    };

    cart.ok_or(AppError::NotFound)
}

/// Create or refresh the order for the buyer's cart. Re-submission updates
/// the mutable fields of the existing order in place instead of inserting a
/// duplicate row. An empty cart is deliberately not rejected.
pub async fn create_order(
    state: &AppState,
    buyer: &BuyerContext,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderCreated>> {
    validate_checkout(&payload)?;

    let cart = checkout_cart(state, buyer).await?;

    let is_guest = buyer.user().is_none();
    let existing = Orders::find()
        .filter(OrderCol::CartId.eq(cart.id))
        .one(&state.orm)
        .await?;

    let order = match existing {
        Some(order) => {
            let mut active: OrderActive = order.into();
            active.address_city = Set(payload.address_city.clone());
            active.address_zipcode = Set(payload.address_zipcode.clone());
            active.address_street = Set(payload.address_street.clone());
            active.address_country = Set(payload.address_country.clone());
            active.delivery_method = Set(payload.delivery_method.clone());
            active.payment_method = Set(payload.payment_method.clone());
            if is_guest {
                active.guest_first_name = Set(Some(payload.first_name.clone()));
                active.guest_last_name = Set(Some(payload.last_name.clone()));
                active.guest_email = Set(Some(payload.email.clone()));
            }
            active.update(&state.orm).await?
        }
        None => {
            OrderActive {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart.id),
                user_id: Set(buyer.user().map(|u| u.user_id)),
                guest_first_name: Set(is_guest.then(|| payload.first_name.clone())),
                guest_last_name: Set(is_guest.then(|| payload.last_name.clone())),
                guest_email: Set(is_guest.then(|| payload.email.clone())),
                address_city: Set(payload.address_city.clone()),
                address_zipcode: Set(payload.address_zipcode.clone()),
                address_street: Set(payload.address_street.clone()),
                address_country: Set(payload.address_country.clone()),
                delivery_method: Set(payload.delivery_method.clone()),
                payment_method: Set(payload.payment_method.clone()),
                paid: Set(false),
                created_at: NotSet,
            }
            .insert(&state.orm)
            .await?
        }
    };

    // The registered buyer's submitted contact data lands on the account,
    // matching the original order form behavior.
    if let Some(user) = buyer.user() {
        if let Some(account) = Users::find_by_id(user.user_id).one(&state.orm).await? {
            let mut active: UserActive = account.into();
            active.first_name = Set(payload.first_name.clone());
            active.last_name = Set(payload.last_name.clone());
            active.email = Set(payload.email.clone());
            active.update(&state.orm).await?;
        }
    }

    log_audit(
        &state.pool,
        buyer.user().map(|u| u.user_id),
        "order_create",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "cart_id": cart.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created",
        OrderCreated { order_id: order.id },
        Some(Meta::empty()),
    ))
}

/// Finalize the purchase: decrement stock for every line of the order's cart
/// and close the cart. A repeat confirmation finds the cart already closed
/// and returns the current state without touching stock again; the original
/// double-decremented here, which is the one behavior deliberately hardened.
/// There is no floor on stock, so a confirmed oversell drives it negative.
pub async fn confirm_purchase(
    state: &AppState,
    order_id: Uuid,
) -> AppResult<ApiResponse<PurchaseConfirmation>> {
    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(order_id).one(&txn).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let cart = Carts::find_by_id(order.cart_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let cart = match cart {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    if !cart.is_ordered {
        let items = CartItems::find()
            .filter(ItemCol::CartId.eq(cart.id))
            .all(&txn)
            .await?;

        for item in &items {
            Products::update_many()
                .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(item.quantity))
                .filter(ProdCol::Id.eq(item.product_id))
                .exec(&txn)
                .await?;
        }

        let mut active: CartActive = cart.into();
        active.is_ordered = Set(true);
        active.update(&txn).await?;
    }

    txn.commit().await?;

    log_audit(
        &state.pool,
        order.user_id,
        "purchase_confirm",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await;

    let buyer_name = buyer_display_name(state, &order).await?;
    let payment_reference = build_payment_reference(&order, &buyer_name);
    let view = cart_service::cart_view(state, order.cart_id).await?;

    Ok(ApiResponse::success(
        "Purchase confirmed",
        PurchaseConfirmation {
            order: order_from_entity(order),
            items: view.items,
            total: view.total,
            payment_reference,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(state: &AppState, order_id: Uuid) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(order_id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let view = cart_service::cart_view(state, order.cart_id).await?;

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order),
            items: view.items,
            total: view.total,
        },
        Some(Meta::empty()),
    ))
}

async fn buyer_display_name(state: &AppState, order: &OrderModel) -> AppResult<String> {
    if let (Some(first), Some(last)) = (&order.guest_first_name, &order.guest_last_name) {
        return Ok(format!("{first} {last}"));
    }
    if let Some(user_id) = order.user_id {
        if let Some(user) = Users::find_by_id(user_id).one(&state.orm).await? {
            return Ok(format!("{} {}", user.first_name, user.last_name));
        }
    }
    Ok(String::new())
}

/// Wire-transfer title quoted in the confirmation message.
fn build_payment_reference(order: &OrderModel, buyer_name: &str) -> String {
    let date = Utc::now().format("%Y-%m-%d");
    let short = &order.id.to_string()[..8];
    format!("{buyer_name}, order #{short}, {date}")
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        cart_id: model.cart_id,
        user_id: model.user_id,
        guest_first_name: model.guest_first_name,
        guest_last_name: model.guest_last_name,
        guest_email: model.guest_email,
        address_city: model.address_city,
        address_zipcode: model.address_zipcode,
        address_street: model.address_street,
        address_country: model.address_country,
        delivery_method: model.delivery_method,
        payment_method: model.payment_method,
        paid: model.paid,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::valid_zipcode;

    #[test]
    fn accepts_well_formed_zipcodes() {
        assert!(valid_zipcode("00-950"));
        assert!(valid_zipcode("62-800"));
    }

    #[test]
    fn rejects_malformed_zipcodes() {
        assert!(!valid_zipcode("00950"));
        assert!(!valid_zipcode("0-0950"));
        assert!(!valid_zipcode("ab-cde"));
        assert!(!valid_zipcode("00-95"));
        assert!(!valid_zipcode(""));
    }
}
