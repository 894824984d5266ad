//! Fleet data model and the computations behind the dashboard

pub mod charts;
pub mod cleaning;
pub mod columns;
pub mod dashboard;
pub mod metrics;
pub mod report;
pub mod selection;
pub mod sheets;

pub use charts::{ChartId, ChartKind, ChartSpec};
pub use dashboard::{Dashboard, FleetView, TabId};
pub use metrics::{Alert, AlertLevel, GlobalSummary, VehicleKpis};
pub use report::ReportSummary;
pub use selection::{Period, Selection, VehicleScope};
pub use sheets::{FleetSheet, FleetWorkbook};
