use axum::Router;

use crate::state::AppState;

pub mod accounts;
pub mod auth;
pub mod doc;
pub mod health;
pub mod orders;
pub mod products;
pub mod store;

// Build the API router without binding state; it is provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/accounts", accounts::router())
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/store", store::router())
}
