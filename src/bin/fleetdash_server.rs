//! Fleet Dashboard API Server binary
//!
//! HTTP REST API for the vehicle fleet dashboard.
//! Provides upload, dashboard, report and chart endpoints.

use clap::Parser;
use fleetdash::api::{run_api_server, ApiConfig};

#[derive(Parser, Debug)]
#[command(name = "fleetdash-server")]
#[command(version)]
#[command(about = "Fleet Dashboard API Server - vehicle costs, alerts and reports over HTTP")]
#[command(long_about = r#"
Fleet Dashboard API Server

Provides RESTful endpoints over a fleet workbook (.xlsx):
  - POST /api/v1/upload    - Upload a workbook, returns its file_id
  - POST /api/v1/sheets    - Sheet row counts
  - POST /api/v1/vehicles  - Directions and vehicle choices
  - POST /api/v1/dashboard - KPIs, alerts and tabs of one vehicle
  - POST /api/v1/report    - Excel report of one vehicle
  - POST /api/v1/chart     - One chart as SVG

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Example usage:
  fleetdash-server                           # Start on localhost:8080
  fleetdash-server --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/v1/upload --data-binary @flotte.xlsx
  curl -X POST http://localhost:8080/api/v1/dashboard \
    -H "Content-Type: application/json" \
    -d '{"file_id": "<hash>", "vehicle": "1234 TBA"}'
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "FLEETDASH_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "FLEETDASH_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
    };

    run_api_server(config).await
}
