//! Aggregates: per-vehicle KPIs, alerts, mileage deltas and fleet-wide totals

use super::columns;
use super::selection::VehicleScope;
use super::sheets::{FleetSheet, FleetWorkbook};
use crate::format;
use crate::types::{CellValue, Frame};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Cost and consumption totals of one vehicle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct VehicleKpis {
    /// Latest odometer reading, truncated to whole kilometres
    pub current_mileage: f64,
    pub maintenance_cost: f64,
    /// Internal repairs plus external services
    pub repair_cost: f64,
    pub purchases_cost: f64,
    pub liters: f64,
    pub fuel_cost: f64,
}

impl VehicleKpis {
    pub fn compute(scope: &VehicleScope) -> Self {
        let sum = |sheet: FleetSheet, column: &str| {
            scope.records(sheet).map(|f| f.sum(column)).unwrap_or(0.0)
        };

        let current_mileage = scope
            .records(FleetSheet::Mileage)
            .map(latest_mileage)
            .unwrap_or(0.0);

        Self {
            current_mileage,
            maintenance_cost: sum(FleetSheet::Maintenance, columns::TOTAL_COST),
            repair_cost: sum(FleetSheet::InternalRepairs, columns::TOTAL_COST)
                + sum(FleetSheet::ExternalServices, columns::TOTAL_COST),
            purchases_cost: sum(FleetSheet::Purchases, columns::TOTAL_PRICE),
            liters: sum(FleetSheet::Fuel, columns::LITERS),
            fuel_cost: sum(FleetSheet::Fuel, columns::FUEL_TOTAL),
        }
    }

    /// Maintenance + repairs + purchases
    pub fn mechanical_total(&self) -> f64 {
        self.maintenance_cost + self.repair_cost + self.purchases_cost
    }

    /// Mechanical total + fuel
    pub fn global_total(&self) -> f64 {
        self.mechanical_total() + self.fuel_cost
    }
}

/// Mileage of the most recent reading; 0 when there is none
fn latest_mileage(frame: &Frame) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }
    frame
        .sort_by_date(columns::DATE, true)
        .number_at(0, columns::MILEAGE)
        .unwrap_or(0.0)
        .trunc()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub count: usize,
    pub message: String,
}

/// Expired insurance policies and technical inspections to renew
pub fn alerts(scope: &VehicleScope, today: NaiveDate) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if let Some(insurance) = scope.records(FleetSheet::Insurance) {
        if insurance.has_column(columns::END_DATE) {
            let expired = insurance
                .column_values(columns::END_DATE)
                .filter_map(CellValue::as_date)
                .filter(|end| end.date() < today)
                .count();
            if expired > 0 {
                alerts.push(Alert {
                    level: AlertLevel::Error,
                    count: expired,
                    message: format!(
                        "{} assurance(s) expirée(s) pour {} !",
                        expired, scope.plate
                    ),
                });
            }
        }
    }

    if let Some(inspections) = scope.records(FleetSheet::TechnicalInspection) {
        let expired = inspections
            .column_values(columns::STATE)
            .filter(|c| c.to_key() == columns::EXPIRED)
            .count();
        if expired > 0 {
            alerts.push(Alert {
                level: AlertLevel::Warning,
                count: expired,
                message: format!("{} visite(s) technique(s) à renouveler.", expired),
            });
        }
    }

    alerts
}

/// Readings sorted by date with a `Km_Parcourus` column (0 for the first row)
pub fn mileage_history(frame: &Frame) -> Frame {
    let mut sorted = frame.sort_by_date(columns::DATE, false);
    let mut previous: Option<f64> = None;
    let mut deltas = Vec::with_capacity(sorted.len());
    for row in 0..sorted.len() {
        let current = sorted.number_at(row, columns::MILEAGE);
        let delta = match (previous, current) {
            (Some(p), Some(c)) => c - p,
            _ => 0.0,
        };
        deltas.push(CellValue::Number(delta));
        previous = current;
    }
    match sorted.column_index(columns::KM_TRAVELED) {
        Some(idx) => {
            for (row, delta) in sorted.rows.iter_mut().zip(deltas) {
                row[idx] = delta;
            }
        }
        None => sorted.push_column(columns::KM_TRAVELED, deltas),
    }
    sorted
}

/// Fleet-wide figures of the global dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalSummary {
    pub vehicle_count: usize,
    pub total_cost: f64,
    pub last_update: NaiveDate,
    /// Maintenance cost per direction, directions sorted
    pub costs_by_direction: Vec<(String, f64)>,
    /// Fuel cost per fuel type, first-seen order
    pub fuel_cost_by_type: Vec<(String, f64)>,
}

impl GlobalSummary {
    pub fn compute(workbook: &FleetWorkbook, filtered_vehicles: &Frame, today: NaiveDate) -> Self {
        let total_cost = workbook.sheet(FleetSheet::Maintenance).sum(columns::TOTAL_COST)
            + workbook.sheet(FleetSheet::InternalRepairs).sum(columns::TOTAL_COST)
            + workbook.sheet(FleetSheet::ExternalServices).sum(columns::TOTAL_COST)
            + workbook.sheet(FleetSheet::Purchases).sum(columns::TOTAL_PRICE)
            + workbook.sheet(FleetSheet::Fuel).sum(columns::FUEL_TOTAL);

        Self {
            vehicle_count: filtered_vehicles.len(),
            total_cost,
            last_update: today,
            costs_by_direction: costs_by_direction(workbook),
            fuel_cost_by_type: workbook
                .sheet(FleetSheet::Fuel)
                .group_sum(columns::FUEL_TYPE, columns::FUEL_TOTAL),
        }
    }

    pub fn last_update_fr(&self) -> String {
        format::date_fr(&self.last_update)
    }
}

/// Vehicles left-joined with maintenance on plate, cost summed per direction.
///
/// Every vehicle row counts once per matching maintenance row; a vehicle
/// without maintenance still gives its direction a 0 entry.
pub fn costs_by_direction(workbook: &FleetWorkbook) -> Vec<(String, f64)> {
    let vehicles = workbook.sheet(FleetSheet::Vehicles);
    let maintenance = workbook.sheet(FleetSheet::Maintenance);

    let mut cost_by_plate: BTreeMap<String, f64> = BTreeMap::new();
    for (plate, cost) in maintenance.group_sum(columns::PLATE, columns::TOTAL_COST) {
        cost_by_plate.insert(plate, cost);
    }

    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for row in 0..vehicles.len() {
        let Some(direction) = vehicles.text_at(row, columns::DIRECTION) else {
            continue;
        };
        let cost = vehicles
            .text_at(row, columns::PLATE)
            .and_then(|plate| cost_by_plate.get(&plate).copied())
            .unwrap_or(0.0);
        *totals.entry(direction).or_insert(0.0) += cost;
    }
    totals.into_iter().collect()
}
