pub mod article_comments;
pub mod articles;
pub mod audit_logs;
pub mod car_services;
pub mod cars;
pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod orders;
pub mod product_cars;
pub mod product_categories;
pub mod products;
pub mod service_bookings;
pub mod users;

pub use article_comments::Entity as ArticleComments;
pub use articles::Entity as Articles;
pub use audit_logs::Entity as AuditLogs;
pub use car_services::Entity as CarServices;
pub use cars::Entity as Cars;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use categories::Entity as Categories;
pub use orders::Entity as Orders;
pub use product_cars::Entity as ProductCars;
pub use product_categories::Entity as ProductCategories;
pub use products::Entity as Products;
pub use service_bookings::Entity as ServiceBookings;
pub use users::Entity as Users;
