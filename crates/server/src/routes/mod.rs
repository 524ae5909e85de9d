//! HTTP route handlers for the ordering backend.
//!
//! # Route Structure
//!
//! ```text
//! GET   /health                     - Liveness check
//! GET   /health/ready               - Readiness check (pings Supabase auth)
//!
//! # Orders
//! POST  /orders                     - Create an order (auth; slot admission)
//! GET   /orders?ids=a,b             - List orders (auth; owner-scoped unless barista)
//! PATCH /orders/{id}                - Update status (auth + barista)
//! GET   /orders/slot-availability   - Remaining capacity for a pickup window (public)
//!
//! # Products
//! GET    /products?category=coffee  - List catalog (optional auth; active-only for non-baristas)
//! POST   /products                  - Create product (auth + barista)
//! PATCH  /products/{id}             - Update product (auth + barista)
//! DELETE /products/{id}             - Delete product (auth + barista)
//!
//! # Auth (thin proxies to GoTrue plus role derivation)
//! POST /auth/signup                 - Register
//! POST /auth/login                  - Password login
//! POST /auth/refresh                - Refresh a session
//! GET  /auth/me                     - Resolve the caller
//! POST /auth/barista-signup         - Register with an invite code
//! POST /auth/barista-grant          - Claim the barista role with an invite code
//! ```

pub mod auth;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/me", get(auth::me))
        .route("/barista-signup", post(auth::barista_signup))
        .route("/barista-grant", post(auth::barista_grant))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::create))
        .route("/slot-availability", get(orders::slot_availability))
        .route("/{id}", patch(orders::update_status))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            patch(products::update).delete(products::destroy),
        )
}

/// Create all routes for the backend.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/orders", order_routes())
        .nest("/products", product_routes())
}
