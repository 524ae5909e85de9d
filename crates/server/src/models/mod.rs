//! Wire and row types for orders and catalog products.

pub mod order;
pub mod product;

pub use order::{CreateOrderRequest, NewOrder, NewOrderRow, Order, OrderItem, parse_pickup_time};
pub use product::{NewProductRequest, Product, ProductPatch};
