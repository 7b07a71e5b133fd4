pub mod auth;
pub mod errors;
pub mod rate_limit;
pub mod responses;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;

pub use server::{ServerConfig, serve};
