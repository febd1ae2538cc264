use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        blog::{AddCommentRequest, ArticleDetail, ArticleList, CreateArticleRequest, VoteRequest},
        booking::{BookingCreated, CarServiceList, CreateBookingRequest},
        cart::{AddToCartRequest, CartItemDto, CartView, UpdateQuantityRequest},
        catalog::{
            CarList, CarWithProducts, CategoryList, CategoryWithProducts, CreateProductRequest,
            ProductDetail, ProductList, SearchResults, UpdateProductRequest,
        },
        orders::{CheckoutRequest, OrderCreated, OrderWithItems, PurchaseConfirmation},
    },
    models::{
        Article, ArticleComment, Car, CarService, Cart, Category, Order, Product, ServiceBooking,
        User,
    },
    response::{ApiResponse, Meta},
    routes::{blog, booking, cart, catalog, health, orders, params},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        cart::view_cart,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_item,
        orders::create_order,
        orders::confirm_purchase,
        orders::get_order,
        catalog::list_products,
        catalog::get_product,
        catalog::create_product,
        catalog::update_product,
        catalog::delete_product,
        catalog::list_cars,
        catalog::get_car,
        catalog::list_categories,
        catalog::get_category,
        catalog::search,
        blog::list_articles,
        blog::get_article,
        blog::create_article,
        blog::add_comment,
        blog::vote,
        booking::list_services,
        booking::create_booking
    ),
    components(
        schemas(
            User,
            Product,
            Car,
            Category,
            Cart,
            Order,
            Article,
            ArticleComment,
            CarService,
            ServiceBooking,
            AddToCartRequest,
            UpdateQuantityRequest,
            CartItemDto,
            CartView,
            CheckoutRequest,
            OrderCreated,
            OrderWithItems,
            PurchaseConfirmation,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            ProductDetail,
            CarList,
            CarWithProducts,
            CategoryList,
            CategoryWithProducts,
            SearchResults,
            CreateArticleRequest,
            AddCommentRequest,
            VoteRequest,
            ArticleList,
            ArticleDetail,
            CarServiceList,
            CreateBookingRequest,
            BookingCreated,
            params::Pagination,
            params::ProductQuery,
            Meta,
            ApiResponse<CartView>,
            ApiResponse<OrderWithItems>,
            ApiResponse<ProductList>,
            ApiResponse<SearchResults>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Catalog", description = "Products, cars, categories, search"),
        (name = "Cart", description = "Shopping cart endpoints"),
        (name = "Orders", description = "Checkout and purchase confirmation"),
        (name = "Blog", description = "Articles, comments and votes"),
        (name = "Service", description = "Workshop services and bookings"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
