pub mod accounts;
pub mod auth;
pub mod orders;
pub mod products;
