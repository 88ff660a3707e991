//! jobhook API server library.
//!
//! Exposes the axum adapter for job trigger callbacks (route extension,
//! response mapping, error handling) plus the config, state and router
//! builder shared by the binary entrypoint and integration tests.

pub mod config;
pub mod error;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;

pub use routes::{JobTriggerRouterExt, TriggerOptions};
