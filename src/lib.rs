//! Fleet Dashboard - vehicle fleet follow-up from an Excel workbook
//!
//! This library loads a multi-sheet fleet workbook, cleans it, and derives
//! the per-vehicle dashboard: KPIs, expiry alerts, formatted tables, charts
//! and a downloadable Excel report.
//!
//! # Features
//!
//! - Workbook import with cleaning (empty rows, serial dates, numeric gaps)
//! - Direction, vehicle and period selection
//! - Cost and consumption KPIs in Ariary, liters and kilometres
//! - Insurance and technical inspection alerts
//! - Excel report export and SVG charts
//! - CLI and HTTP API
//!
//! # Example
//!
//! ```no_run
//! use fleetdash::cli::load_workbook;
//! use fleetdash::core::{Dashboard, Selection};
//! use std::path::Path;
//!
//! let workbook = load_workbook(Path::new("flotte.xlsx"))?;
//! let today = chrono::NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
//! let dashboard = Dashboard::build(&workbook, &Selection::default().vehicle("1234 TBA"), today)?;
//!
//! for kpi in &dashboard.kpis {
//!     println!("{}: {}", kpi.label, kpi.value);
//! }
//! # Ok::<(), fleetdash::error::FleetError>(())
//! ```

pub mod api;
pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod format;
pub mod render;
pub mod types;

// Re-export commonly used types
pub use error::{FleetError, FleetResult};
pub use types::{CellValue, FleetData, Frame};
