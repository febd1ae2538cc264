use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::cart::{AddToCartRequest, CartItemDto, CartView, UpdateQuantityRequest},
    entity::{
        cart_items::{ActiveModel as CartItemActive, Column as ItemCol, Entity as CartItems},
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts, Model as CartModel},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::BuyerContext,
    models::Product,
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(FromRow)]
struct CartRow {
    item_id: Uuid,
    quantity: i32,
    product_id: Uuid,
    name: String,
    slug: String,
    code: String,
    stock: i32,
    description: String,
    price: Decimal,
    image_url: Option<String>,
    added: DateTime<Utc>,
}

/// Find the buyer's open cart without creating one.
async fn find_active_cart(state: &AppState, buyer: &BuyerContext) -> AppResult<Option<CartModel>> {
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
            // The handle only ever addresses anonymous carts; a guessed id of
            // a registered buyer's cart must not resolve. A handle naming a
            // closed or vanished cart counts as no cart, and the guest simply
            // starts over with a fresh one.
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
    Ok(cart)
}

/// Resolve the buyer's open cart, creating one lazily on first use.
async fn resolve_or_create_cart(state: &AppState, buyer: &BuyerContext) -> AppResult<CartModel> {
    if let Some(cart) = find_active_cart(state, buyer).await? {
        return Ok(cart);
    }

    let cart = CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(buyer.user().map(|u| u.user_id)),
        is_ordered: Set(false),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(cart)
}

pub async fn add_to_cart(
    state: &AppState,
    buyer: &BuyerContext,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    // No stock check here; stock is only touched at purchase confirmation.
    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?;
    if product.is_none() {
        return Err(AppError::NotFound);
    }

    let cart = resolve_or_create_cart(state, buyer).await?;

    let existing = CartItems::find()
        .filter(
            Condition::all()
                .add(ItemCol::CartId.eq(cart.id))
                .add(ItemCol::ProductId.eq(payload.product_id)),
        )
        .one(&state.orm)
        .await?;

    // Repeat adds merge into the one (cart, product) row.
    match existing {
        Some(item) => {
            let quantity = item.quantity + payload.quantity;
            let mut active: CartItemActive = item.into();
            active.quantity = Set(quantity);
            active.update(&state.orm).await?;
        }
        None => {
            CartItemActive {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart.id),
                product_id: Set(payload.product_id),
                quantity: Set(payload.quantity),
                created_at: NotSet,
            }
            .insert(&state.orm)
            .await?;
        }
    }

    log_audit(
        &state.pool,
        buyer.user().map(|u| u.user_id),
        "cart_add",
        Some("cart_items"),
        Some(serde_json::json!({
            "cart_id": cart.id,
            "product_id": payload.product_id,
            "quantity": payload.quantity,
        })),
    )
    .await;

    let view = cart_view(state, cart.id).await?;
    Ok(ApiResponse::success("Added to cart", view, None))
}

pub async fn update_quantity(
    state: &AppState,
    buyer: &BuyerContext,
    payload: UpdateQuantityRequest,
) -> AppResult<ApiResponse<CartView>> {
    if payload.quantity < 0 {
        return Err(AppError::BadRequest(
            "quantity must not be negative".to_string(),
        ));
    }

    let cart = match find_active_cart(state, buyer).await? {
        Some(cart) => cart,
        None => return Err(AppError::NotFound),
    };

    let item = CartItems::find()
        .filter(
            Condition::all()
                .add(ItemCol::CartId.eq(cart.id))
                .add(ItemCol::ProductId.eq(payload.product_id)),
        )
        .one(&state.orm)
        .await?;
    let item = match item {
        Some(item) => item,
        None => return Err(AppError::NotFound),
    };

    // Absolute set; zero keeps the row, removal is a separate action.
    let mut active: CartItemActive = item.into();
    active.quantity = Set(payload.quantity);
    active.update(&state.orm).await?;

    let view = cart_view(state, cart.id).await?;
    Ok(ApiResponse::success("Quantity updated", view, None))
}

/// Delete a cart line by its id. The original deletes by bare item id with
/// no ownership re-validation; kept as-is.
pub async fn remove_item(
    state: &AppState,
    buyer: &BuyerContext,
    item_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
        .bind(item_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    log_audit(
        &state.pool,
        buyer.user().map(|u| u.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "item_id": item_id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn view_cart(
    state: &AppState,
    buyer: &BuyerContext,
) -> AppResult<ApiResponse<CartView>> {
    let view = match find_active_cart(state, buyer).await? {
        Some(cart) => cart_view(state, cart.id).await?,
        None => CartView {
            cart_id: None,
            items: Vec::new(),
            total: Decimal::ZERO,
        },
    };
    Ok(ApiResponse::success("OK", view, None))
}

/// Build the cart view with one join, items in insertion order and the total
/// recomputed from scratch.
pub async fn cart_view(state: &AppState, cart_id: Uuid) -> AppResult<CartView> {
    let rows = sqlx::query_as::<_, CartRow>(
        r#"
        SELECT ci.id AS item_id, ci.quantity,
               p.id AS product_id, p.name, p.slug, p.code, p.stock,
               p.description, p.price, p.image_url, p.added
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1
        ORDER BY ci.created_at, ci.id
        "#,
    )
    .bind(cart_id)
    .fetch_all(&state.pool)
    .await?;

    let items: Vec<CartItemDto> = rows
        .into_iter()
        .map(|row| {
            let value = Decimal::from(row.quantity) * row.price;
            CartItemDto {
                id: row.item_id,
                product: Product {
                    id: row.product_id,
                    name: row.name,
                    slug: row.slug,
                    code: row.code,
                    stock: row.stock,
                    description: row.description,
                    price: row.price,
                    image_url: row.image_url,
                    added: row.added,
                },
                quantity: row.quantity,
                value,
            }
        })
        .collect();

    let total = items.iter().map(|item| item.value).sum();

    Ok(CartView {
        cart_id: Some(cart_id),
        items,
        total,
    })
}
