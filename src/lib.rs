pub mod api;
pub mod auth;
pub mod backend;
pub mod config;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod query;
pub mod tool;
