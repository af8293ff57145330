pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod tokens;

pub use app::{build_router, AppState};
