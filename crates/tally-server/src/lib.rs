//! tally server library entry.
//!
//! Wires config, the shared counter store, and the HTTP routes into an axum
//! app. Consumed by the binary (`main.rs`) and by integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
