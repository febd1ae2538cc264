pub mod blog;
pub mod booking;
pub mod cart;
pub mod catalog;
pub mod orders;
