//! CLI command handlers

pub mod commands;

pub use commands::{
    build_selection, chart, load_workbook, report, resolve_today, sheets, show, vehicles, watch,
    OutputFormat,
};
