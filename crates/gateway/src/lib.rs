//! HTTP adapter for the browser session controller: one route per operation,
//! a uniform `{success, ...}` response envelope, and process lifecycle
//! (startup auto-init, signal-triggered graceful shutdown).

pub mod error;
pub mod extract;
pub mod routes;
pub mod server;

pub use {
    error::ApiError,
    server::{AppState, build_app, start},
};
