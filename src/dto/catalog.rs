use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Car, Category, Product};

/// Distinguishes an absent field (outer `None`) from an explicit JSON `null`
/// (`Some(None)`), which plain `Option<Option<T>>` cannot.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub code: String,
    pub stock: i32,
    pub description: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    #[serde(default)]
    pub car_ids: Vec<Uuid>,
    #[serde(default)]
    pub category_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub stock: Option<i32>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    /// Absent leaves the image untouched; explicit `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    /// When present, replaces the association list wholesale.
    pub car_ids: Option<Vec<Uuid>>,
    pub category_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: Product,
    pub cars: Vec<Car>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CarList {
    pub items: Vec<Car>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CarWithProducts {
    pub car: Car,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryWithProducts {
    pub category: Category,
    pub products: Vec<Product>,
}

/// One query, three result lists: category names, product names/codes and
/// car models are all matched.
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResults {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub cars: Vec<Car>,
}
