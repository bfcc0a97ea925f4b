#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;
pub mod stream;

pub use routes::router;
pub use state::AppState;
