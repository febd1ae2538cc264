use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Header carrying the anonymous cart handle between requests. This is the
/// only piece of client-side state the cart flow depends on; the boundary
/// stores whatever cart id the responses hand back.
pub const CART_TOKEN_HEADER: &str = "x-cart-token";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

/// Who is driving the cart: a registered account, or an anonymous visitor
/// who may already hold a cart handle. Dispatched once at the entry of each
/// cart/order operation.
#[derive(Debug, Clone)]
pub enum BuyerContext {
    Registered(AuthUser),
    Guest(Option<Uuid>),
}

impl BuyerContext {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            BuyerContext::Registered(user) => Some(user),
            BuyerContext::Guest(_) => None,
        }
    }
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, "admin")
}

fn decode_bearer(auth_str: &str) -> Result<AuthUser, AppError> {
    if !auth_str.starts_with("Bearer ") {
        return Err(AppError::BadRequest("Invalid Authorization scheme".into()));
    }
    let token = auth_str.trim_start_matches("Bearer ").trim();

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::BadRequest("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::BadRequest("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        role: decoded.claims.role.clone(),
    })
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::BadRequest("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;

        decode_bearer(auth_str)
    }
}

impl<S> FromRequestParts<S> for BuyerContext
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        // A presented Authorization header must be valid; downgrading a bad
        // token to the guest path would silently detach the buyer's cart.
        if let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) {
            let auth_str = auth_header
                .to_str()
                .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;
            return Ok(BuyerContext::Registered(decode_bearer(auth_str)?));
        }

        let cart_token = match parts.headers.get(CART_TOKEN_HEADER) {
            Some(value) => {
                let raw = value
                    .to_str()
                    .map_err(|_| AppError::BadRequest("Invalid cart token header".into()))?;
                let id = Uuid::parse_str(raw)
                    .map_err(|_| AppError::BadRequest("Invalid cart token".into()))?;
                Some(id)
            }
            None => None,
        };

        Ok(BuyerContext::Guest(cart_token))
    }
}
