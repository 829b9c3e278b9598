//! Data models for the ordering backend.
//!
//! - `AdminProfile`: the signed-in administrator, cached with the session
//! - `Order`, `OrderItem`, `OrderStatus`: customer orders and their workflow
//! - `Product`, `ProductInput`: the catalogue
//! - `DashboardStats`: landing page counters
//!
//! The filter types mirror the search boxes of the console's list views.

pub mod admin;
pub mod dashboard;
pub mod order;
pub mod product;

pub use admin::AdminProfile;
pub use dashboard::{Dashboard, DashboardStats};
pub use order::{Order, OrderFilter, OrderItem, OrderStatus, OrderStatusUpdate, PaymentStatus};
pub use product::{
    canonical_category, product_categories, Product, ProductFilter, ProductInput, DEFAULT_STOCK,
    PRODUCT_CATEGORIES,
};
