//! Fleet Dashboard HTTP API
//!
//! Serves the dashboard, Excel reports and charts over HTTP.
//! Run with `fleetdash-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server, ApiConfig, AppState};
