use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::catalog::{
        CarList, CarWithProducts, CategoryList, CategoryWithProducts, CreateProductRequest,
        ProductDetail, ProductList, SearchResults, UpdateProductRequest,
    },
    entity::{
        cars::{Entity as Cars, Model as CarModel},
        categories::{Entity as Categories, Model as CategoryModel},
        product_cars::{
            ActiveModel as ProductCarActive, Column as ProductCarCol, Entity as ProductCars,
        },
        product_categories::{
            ActiveModel as ProductCategoryActive, Column as ProductCategoryCol,
            Entity as ProductCategories,
        },
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Car, Category, Product},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    slug::slugify,
    state::AppState,
};

/// ILIKE pattern matching rows that contain `term` literally. `%`, `_` and
/// the escape character itself are escaped so user input cannot widen the
/// match.
fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = contains_pattern(search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(ProdCol::Name).ilike(pattern.clone()))
                .add(Expr::col(ProdCol::Code).ilike(pattern)),
        );
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(ProdCol::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(ProdCol::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::Added);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::Added => ProdCol::Added,
        ProductSortBy::Price => ProdCol::Price,
        ProductSortBy::Name => ProdCol::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product_by_slug(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<ProductDetail>> {
    let product = Products::find()
        .filter(ProdCol::Slug.eq(slug))
        .one(&state.orm)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let cars = product
        .find_related(Cars)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(car_from_entity)
        .collect();
    let categories = product
        .find_related(Categories)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Product",
        ProductDetail {
            product: product_from_entity(product),
            cars,
            categories,
        },
        None,
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    ensure_admin(user)?;

    let id = Uuid::new_v4();
    let product = ProductActive {
        id: Set(id),
        name: Set(payload.name.clone()),
        slug: Set(slugify(&payload.name)),
        code: Set(payload.code),
        stock: Set(payload.stock),
        description: Set(payload.description),
        price: Set(payload.price),
        image_url: Set(payload.image_url),
        added: NotSet,
    }
    .insert(&state.orm)
    .await?;

    replace_car_links(state, id, &payload.car_ids).await?;
    replace_category_links(state, id, &payload.category_ids).await?;

    log_audit(
        &state.pool,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await;

    product_detail(state, product).await
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    ensure_admin(user)?;

    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut active: ProductActive = existing.into();
    if let Some(name) = payload.name {
        // The slug always tracks the current name.
        active.slug = Set(slugify(&name));
        active.name = Set(name);
    }
    if let Some(code) = payload.code {
        active.code = Set(code);
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(image_url) = payload.image_url {
        // Explicit null clears the image.
        active.image_url = Set(image_url);
    }
    let product = active.update(&state.orm).await?;

    if let Some(car_ids) = payload.car_ids {
        replace_car_links(state, id, &car_ids).await?;
    }
    if let Some(category_ids) = payload.category_ids {
        replace_category_links(state, id, &category_ids).await?;
    }

    log_audit(
        &state.pool,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await;

    product_detail(state, product).await
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    log_audit(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_cars(state: &AppState) -> AppResult<ApiResponse<CarList>> {
    let items = Cars::find()
        .order_by_asc(crate::entity::cars::Column::Brand)
        .order_by_asc(crate::entity::cars::Column::Model)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(car_from_entity)
        .collect();
    Ok(ApiResponse::success("Cars", CarList { items }, None))
}

pub async fn get_car_by_slug(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<CarWithProducts>> {
    let car = Cars::find()
        .filter(crate::entity::cars::Column::Slug.eq(slug))
        .one(&state.orm)
        .await?;
    let car = match car {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let products = car
        .find_related(Products)
        .order_by_desc(ProdCol::Added)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Car",
        CarWithProducts {
            car: car_from_entity(car),
            products,
        },
        None,
    ))
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(crate::entity::categories::Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        None,
    ))
}

pub async fn get_category_by_slug(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<CategoryWithProducts>> {
    let category = Categories::find()
        .filter(crate::entity::categories::Column::Slug.eq(slug))
        .one(&state.orm)
        .await?;
    let category = match category {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let products = category
        .find_related(Products)
        .order_by_desc(ProdCol::Added)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Category",
        CategoryWithProducts {
            category: category_from_entity(category),
            products,
        },
        None,
    ))
}

/// Cross-entity storefront search: category names, product names and codes,
/// car models, one pattern across all three.
pub async fn search(state: &AppState, query: &str) -> AppResult<ApiResponse<SearchResults>> {
    let pattern = contains_pattern(query);

    let categories = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories WHERE name ILIKE $1 ORDER BY name",
    )
    .bind(&pattern)
    .fetch_all(&state.pool)
    .await?;

    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE name ILIKE $1 OR code ILIKE $1 ORDER BY added DESC",
    )
    .bind(&pattern)
    .fetch_all(&state.pool)
    .await?;

    let cars = sqlx::query_as::<_, Car>(
        "SELECT * FROM cars WHERE model ILIKE $1 ORDER BY brand, model",
    )
    .bind(&pattern)
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Search results",
        SearchResults {
            categories,
            products,
            cars,
        },
        None,
    ))
}

async fn replace_car_links(state: &AppState, product_id: Uuid, car_ids: &[Uuid]) -> AppResult<()> {
    ProductCars::delete_many()
        .filter(ProductCarCol::ProductId.eq(product_id))
        .exec(&state.orm)
        .await?;

    if !car_ids.is_empty() {
        let links = car_ids.iter().map(|car_id| ProductCarActive {
            product_id: Set(product_id),
            car_id: Set(*car_id),
        });
        ProductCars::insert_many(links).exec(&state.orm).await?;
    }
    Ok(())
}

async fn replace_category_links(
    state: &AppState,
    product_id: Uuid,
    category_ids: &[Uuid],
) -> AppResult<()> {
    ProductCategories::delete_many()
        .filter(ProductCategoryCol::ProductId.eq(product_id))
        .exec(&state.orm)
        .await?;

    if !category_ids.is_empty() {
        let links = category_ids.iter().map(|category_id| ProductCategoryActive {
            product_id: Set(product_id),
            category_id: Set(*category_id),
        });
        ProductCategories::insert_many(links)
            .exec(&state.orm)
            .await?;
    }
    Ok(())
}

async fn product_detail(
    state: &AppState,
    product: ProductModel,
) -> AppResult<ApiResponse<ProductDetail>> {
    let cars = product
        .find_related(Cars)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(car_from_entity)
        .collect();
    let categories = product
        .find_related(Categories)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Product",
        ProductDetail {
            product: product_from_entity(product),
            cars,
            categories,
        },
        Some(Meta::empty()),
    ))
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        slug: model.slug,
        code: model.code,
        stock: model.stock,
        description: model.description,
        price: model.price,
        image_url: model.image_url,
        added: model.added.with_timezone(&Utc),
    }
}

fn car_from_entity(model: CarModel) -> Car {
    Car {
        id: model.id,
        brand: model.brand,
        model: model.model,
        slug: model.slug,
        image_url: model.image_url,
    }
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        slug: model.slug,
    }
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn wraps_plain_terms() {
        assert_eq!(contains_pattern("brake pad"), "%brake pad%");
    }

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(contains_pattern("%"), "%\\%%");
        assert_eq!(contains_pattern("OF_20"), "%OF\\_20%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
