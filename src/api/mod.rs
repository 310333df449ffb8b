//! HTTP surface of the tool server

pub mod auth;
pub mod handlers;
pub mod routes;

pub use auth::AuthService;
pub use routes::create_api_router;
