//! User selections: directions, period and vehicle

use super::columns;
use super::sheets::{FleetSheet, FleetWorkbook};
use crate::error::{FleetError, FleetResult};
use crate::types::{CellValue, Frame};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> FleetResult<Self> {
        if end < start {
            return Err(FleetError::Validation(format!(
                "period end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Keep rows whose first date column falls in the period.
    ///
    /// Rows without a date there are kept; frames without a date column are
    /// returned unchanged.
    pub fn apply(&self, frame: &Frame) -> Frame {
        match frame.first_date_column() {
            Some(idx) => frame.filter_rows(|row| match &row[idx] {
                CellValue::Date(d) => self.contains(d.date()),
                _ => true,
            }),
            None => frame.clone(),
        }
    }
}

/// What the user picked; `None` fields mean "everything" / "first vehicle"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub directions: Option<Vec<String>>,
    pub period: Option<Period>,
    pub vehicle: Option<String>,
}

impl Selection {
    pub fn vehicle(mut self, plate: impl Into<String>) -> Self {
        self.vehicle = Some(plate.into());
        self
    }

    pub fn directions<I, S>(mut self, directions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.directions = Some(directions.into_iter().map(Into::into).collect());
        self
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }
}

/// Distinct non-empty directions, sorted
pub fn directions(workbook: &FleetWorkbook) -> Vec<String> {
    let mut dirs = workbook
        .sheet(FleetSheet::Vehicles)
        .unique_texts(columns::DIRECTION);
    dirs.sort();
    dirs
}

/// Vehicle rows of the selected directions
pub fn filtered_vehicles(workbook: &FleetWorkbook, selection: &Selection) -> FleetResult<Frame> {
    let vehicles = workbook.sheet(FleetSheet::Vehicles);
    // Vehicles without a direction are never selectable, not even by default
    let filtered = match vehicles.column_index(columns::DIRECTION) {
        Some(idx) => vehicles.filter_rows(|row| {
            !row[idx].is_empty()
                && selection
                    .directions
                    .as_ref()
                    .map_or(true, |selected| selected.contains(&row[idx].to_key()))
        }),
        None => vehicles.empty_like(),
    };
    if filtered.is_empty() {
        return Err(FleetError::NoVehicles);
    }
    Ok(filtered)
}

/// Plates offered for selection, in sheet order
pub fn vehicle_choices(filtered: &Frame) -> Vec<String> {
    filtered.unique_texts(columns::PLATE)
}

/// Everything the dashboard knows about one vehicle
#[derive(Debug, Clone)]
pub struct VehicleScope {
    pub plate: String,
    /// The vehicle's row of the vehicle sheet
    pub info: Frame,
    records: HashMap<FleetSheet, Frame>,
}

impl VehicleScope {
    /// Resolve the selected (or first) vehicle and collect its records
    pub fn resolve(
        workbook: &FleetWorkbook,
        filtered: &Frame,
        selection: &Selection,
    ) -> FleetResult<Self> {
        let choices = vehicle_choices(filtered);
        let plate = match &selection.vehicle {
            Some(requested) => {
                let requested = requested.trim().to_string();
                if !choices.contains(&requested) {
                    return Err(FleetError::UnknownVehicle(requested));
                }
                requested
            }
            None => choices.first().cloned().ok_or(FleetError::NoVehicles)?,
        };

        let info = filtered.filter_eq(columns::PLATE, &plate).row_frame(0);

        let mut records = HashMap::new();
        for sheet in FleetSheet::ALL {
            let frame = workbook.sheet(sheet);
            if sheet == FleetSheet::Vehicles || !frame.has_column(columns::PLATE) {
                continue;
            }
            let mut rows = frame.filter_eq(columns::PLATE, &plate);
            if let (Some(period), true) = (&selection.period, sheet.is_event()) {
                rows = period.apply(&rows);
            }
            records.insert(sheet, rows);
        }

        tracing::debug!(%plate, sheets = records.len(), "vehicle scope resolved");
        Ok(Self {
            plate,
            info,
            records,
        })
    }

    /// Records of a sheet for this vehicle; `None` if the sheet has no plate column
    pub fn records(&self, sheet: FleetSheet) -> Option<&Frame> {
        self.records.get(&sheet)
    }

    /// Records of a sheet, or an empty frame named after it
    pub fn records_or_empty(&self, sheet: FleetSheet) -> Frame {
        self.records
            .get(&sheet)
            .cloned()
            .unwrap_or_else(|| Frame::new(sheet.sheet_name(), Vec::new()))
    }

    pub fn direction(&self) -> String {
        self.info.text_at(0, columns::DIRECTION).unwrap_or_default()
    }
}
