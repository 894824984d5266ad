//! Excel import/export for the fleet workbook
//!
//! - Import: fleet workbook (.xlsx) → cleaned frames
//! - Export: one vehicle's report (.xlsx) with a summary sheet

mod exporter;
mod importer;

pub use exporter::{ReportExporter, REPORT_SHEETS, SUMMARY_SHEET};
pub use importer::{content_hash, FleetImporter};
