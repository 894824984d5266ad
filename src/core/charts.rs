//! Chart data behind the dashboard's pie and bar charts

use super::columns;
use super::metrics::{self, GlobalSummary};
use super::selection::VehicleScope;
use super::sheets::{FleetSheet, FleetWorkbook};
use crate::error::{FleetError, FleetResult};
use crate::format;
use crate::types::{CellValue, Frame};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: ChartId,
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub unit: String,
    pub points: Vec<ChartPoint>,
}

impl ChartSpec {
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    /// Distinct x labels, in point order
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for p in &self.points {
            if !labels.contains(&p.label) {
                labels.push(p.label.clone());
            }
        }
        labels
    }

    /// Distinct groups, in point order
    pub fn groups(&self) -> Vec<Option<String>> {
        let mut groups: Vec<Option<String>> = Vec::new();
        for p in &self.points {
            if !groups.contains(&p.group) {
                groups.push(p.group.clone());
            }
        }
        groups
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartId {
    MaintenanceByType,
    InternalRepairs,
    ExternalServices,
    Mileage,
    PurchasesBySupplier,
    FuelLiters,
    CostsByDirection,
    FuelCostByType,
}

impl ChartId {
    pub const ALL: [ChartId; 8] = [
        ChartId::MaintenanceByType,
        ChartId::InternalRepairs,
        ChartId::ExternalServices,
        ChartId::Mileage,
        ChartId::PurchasesBySupplier,
        ChartId::FuelLiters,
        ChartId::CostsByDirection,
        ChartId::FuelCostByType,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartId::MaintenanceByType => "maintenance-by-type",
            ChartId::InternalRepairs => "internal-repairs",
            ChartId::ExternalServices => "external-services",
            ChartId::Mileage => "mileage",
            ChartId::PurchasesBySupplier => "purchases-by-supplier",
            ChartId::FuelLiters => "fuel-liters",
            ChartId::CostsByDirection => "costs-by-direction",
            ChartId::FuelCostByType => "fuel-cost-by-type",
        }
    }

    /// Charts drawn from the whole fleet rather than one vehicle
    pub fn is_global(self) -> bool {
        matches!(self, ChartId::CostsByDirection | ChartId::FuelCostByType)
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartId {
    type Err = FleetError;

    fn from_str(s: &str) -> FleetResult<Self> {
        ChartId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| FleetError::UnknownChart(s.to_string()))
    }
}

fn label_of(cell: &CellValue) -> String {
    match cell {
        CellValue::Date(d) => format::date_fr(d),
        other => other.to_key(),
    }
}

/// Category totals as a pie; `None` when a column is missing or nothing is left
fn pie(id: ChartId, title: &str, frame: &Frame, names: &str, values: &str) -> Option<ChartSpec> {
    if frame.is_empty() || !frame.has_column(names) || !frame.has_column(values) {
        return None;
    }
    let points: Vec<ChartPoint> = frame
        .group_sum(names, values)
        .into_iter()
        .map(|(label, value)| ChartPoint {
            label,
            group: None,
            value,
        })
        .collect();
    if points.is_empty() {
        return None;
    }
    Some(ChartSpec {
        id,
        kind: ChartKind::Pie,
        title: title.to_string(),
        x_label: names.to_string(),
        y_label: values.to_string(),
        unit: format::CURRENCY.to_string(),
        points,
    })
}

struct BarAxes<'a> {
    x: &'a str,
    y: &'a str,
    color: Option<&'a str>,
    y_title: &'a str,
    unit: &'a str,
}

/// One bar segment per row, rows ordered by the x date when x is a date column
fn bar(id: ChartId, title: &str, frame: &Frame, axes: BarAxes<'_>) -> Option<ChartSpec> {
    let (Some(x), Some(y)) = (frame.column_index(axes.x), frame.column_index(axes.y)) else {
        return None;
    };
    if frame.is_empty() {
        return None;
    }
    let color = axes.color.and_then(|c| frame.column_index(c));
    let ordered = if frame.is_date_column(x) {
        frame.sort_by_date(axes.x, false)
    } else {
        frame.clone()
    };

    let points = ordered
        .rows
        .iter()
        .filter(|row| !row[x].is_empty())
        .map(|row| ChartPoint {
            label: label_of(&row[x]),
            group: color.map(|c| row[c].to_key()).filter(|g| !g.is_empty()),
            value: row[y].as_number().unwrap_or(0.0),
        })
        .collect();

    Some(ChartSpec {
        id,
        kind: ChartKind::Bar,
        title: title.to_string(),
        x_label: axes.x.to_string(),
        y_label: axes.y_title.to_string(),
        unit: axes.unit.to_string(),
        points,
    })
}

fn direction_bars(id: ChartId, costs: &[(String, f64)]) -> Option<ChartSpec> {
    if costs.is_empty() {
        return None;
    }
    Some(ChartSpec {
        id,
        kind: ChartKind::Bar,
        title: "Coûts par Direction (Ar)".to_string(),
        x_label: columns::DIRECTION.to_string(),
        y_label: "Coût (Ar)".to_string(),
        unit: format::CURRENCY.to_string(),
        points: costs
            .iter()
            .map(|(label, value)| ChartPoint {
                label: label.clone(),
                group: None,
                value: *value,
            })
            .collect(),
    })
}

/// Build a per-vehicle chart; global charts take their data from the workbook
pub fn build(
    id: ChartId,
    workbook: &FleetWorkbook,
    scope: &VehicleScope,
    global: &GlobalSummary,
) -> Option<ChartSpec> {
    let records = |sheet: FleetSheet| scope.records_or_empty(sheet);
    match id {
        ChartId::MaintenanceByType => pie(
            id,
            "Répartition Coûts Entretien (Ar)",
            &records(FleetSheet::Maintenance),
            columns::MAINTENANCE_TYPE,
            columns::TOTAL_COST,
        ),
        ChartId::InternalRepairs => bar(
            id,
            "Évolution Coûts Réparations Internes (Ar)",
            &records(FleetSheet::InternalRepairs),
            BarAxes {
                x: columns::WORKSHOP_ENTRY_DATE,
                y: columns::TOTAL_COST,
                color: Some(columns::FAILURE),
                y_title: "Coût (Ar)",
                unit: format::CURRENCY,
            },
        ),
        ChartId::ExternalServices => pie(
            id,
            "Répartition Prestations (Ar)",
            &records(FleetSheet::ExternalServices),
            columns::SERVICE_TYPE,
            columns::TOTAL_COST,
        ),
        ChartId::Mileage => bar(
            id,
            "Évolution Km Parcourus",
            &metrics::mileage_history(&records(FleetSheet::Mileage)),
            BarAxes {
                x: columns::DATE,
                y: columns::KM_TRAVELED,
                color: None,
                y_title: "Km Parcourus entre Dates",
                unit: "km",
            },
        ),
        ChartId::PurchasesBySupplier => pie(
            id,
            "Achats par Fournisseur (Ar)",
            &records(FleetSheet::Purchases),
            columns::SUPPLIER_NAME,
            columns::TOTAL_PRICE,
        ),
        ChartId::FuelLiters => bar(
            id,
            "Évolution Consommation (L)",
            &records(FleetSheet::Fuel),
            BarAxes {
                x: columns::DATE,
                y: columns::LITERS,
                color: Some(columns::FUEL_TYPE),
                y_title: "Litres (L)",
                unit: "L",
            },
        ),
        ChartId::CostsByDirection => direction_bars(id, &global.costs_by_direction),
        ChartId::FuelCostByType => pie(
            id,
            "Répartition Coûts Carburant par Type (Ar)",
            workbook.sheet(FleetSheet::Fuel),
            columns::FUEL_TYPE,
            columns::FUEL_TOTAL,
        ),
    }
}
