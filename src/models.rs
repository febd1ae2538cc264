use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub code: String,
    pub stock: i32,
    pub description: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub added: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Car {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub slug: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub is_ordered: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub user_id: Option<Uuid>,
    pub guest_first_name: Option<String>,
    pub guest_last_name: Option<String>,
    pub guest_email: Option<String>,
    pub address_city: String,
    pub address_zipcode: String,
    pub address_street: String,
    pub address_country: String,
    pub delivery_method: String,
    pub payment_method: String,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub user_id: Uuid,
    pub added: DateTime<Utc>,
    pub likes: i32,
    pub dislikes: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ArticleComment {
    pub id: Uuid,
    pub article_id: Uuid,
    pub text: String,
    pub user_id: Uuid,
    pub added: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CarService {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub duration_minutes: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceBooking {
    pub id: Uuid,
    pub car_service_id: Uuid,
    pub day: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
