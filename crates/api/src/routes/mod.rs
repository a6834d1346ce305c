//! HTTP route handlers for the Voltcart API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Liveness check
//! GET    /health/ready                        - Readiness check (pings the database)
//!
//! # Auth
//! POST   /user/signup                         - Register with name/email/password
//! POST   /auth/login                          - Password login, returns bearer token
//! POST   /auth/refresh-token                  - Exchange a valid token for a fresh one
//! GET    /auth/verify                         - Resolve the caller's account
//! GET    /auth/google                         - Redirect to the Google consent screen
//! GET    /auth/google/callback                - OAuth callback, redirects with token in query
//!
//! # Users (admin)
//! GET    /api/users                           - List all accounts
//!
//! # Products
//! GET    /api/products                        - Catalog listing
//! GET    /api/products/{id}                   - Catalog entry
//! POST   /api/products                        - Create entry (admin)
//! PUT    /api/products/{id}                   - Replace entry (admin)
//! DELETE /api/products/{id}                   - Delete entry (admin)
//!
//! # Cart (requires auth)
//! GET    /api/cart                            - Caller's cart
//! GET    /api/cart/summary                    - Aggregates for the caller's cart
//! GET    /api/cart/{userId}                   - A user's cart (owner or admin)
//! POST   /api/cart                            - Replace item list (upsert)
//! PUT    /api/cart                            - Same as POST
//! POST   /api/cart/add-item                   - Add/merge one line
//! DELETE /api/cart/remove-item/{productId}    - Drop one line
//! DELETE /api/cart                            - Clear caller's cart
//! DELETE /api/cart/{userId}                   - Clear a user's cart (owner or admin)
//! GET    /api/cart/admin/all                  - Every cart (admin)
//!
//! # Checkout (requires auth)
//! POST   /api/checkout                        - Place an order (201)
//! GET    /api/checkout                        - Caller's orders, page/limit paginated
//! GET    /api/checkout/admin/all              - All orders, filterable (admin)
//! GET    /api/checkout/user/{userId}          - A user's orders (owner or admin)
//! GET    /api/checkout/search/phone/{phone}   - Orders by phone (admin)
//! GET    /api/checkout/{id}                   - One order (owner or admin)
//! PATCH  /api/checkout/{id}/status            - Status update (admin)
//! PUT    /api/checkout/{id}                   - Contact/delivery update (owner or admin)
//! DELETE /api/checkout/{id}                   - Delete order (owner or admin)
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/refresh-token", post(auth::refresh_token))
        .route("/verify", get(auth::verify))
        .route("/google", get(auth::google_login))
        .route("/google/callback", get(auth::google_callback))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(cart::show_own)
                .post(cart::replace)
                .put(cart::replace)
                .delete(cart::clear_own),
        )
        .route("/summary", get(cart::summary))
        .route("/add-item", post(cart::add_item))
        .route("/remove-item/{productId}", delete(cart::remove_item))
        .route("/admin/all", get(cart::admin_all))
        .route("/{userId}", get(cart::show_user).delete(cart::clear_user))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::create).get(checkout::list_own))
        .route("/admin/all", get(checkout::admin_all))
        .route("/user/{userId}", get(checkout::list_user))
        .route("/search/phone/{phone}", get(checkout::search_phone))
        .route("/{id}/status", patch(checkout::update_status))
        .route(
            "/{id}",
            get(checkout::show)
                .put(checkout::update)
                .delete(checkout::destroy),
        )
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::live))
        .route("/health/ready", get(health::ready))
        .route("/user/signup", post(auth::signup))
        .nest("/auth", auth_routes())
        .route("/api/users", get(users::index))
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/checkout", checkout_routes())
}
