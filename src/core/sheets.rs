//! The fleet sheet set: the tabs the dashboard expects by name

use crate::error::{FleetError, FleetResult};
use crate::types::{FleetData, Frame, SheetStats};
use serde::Serialize;

/// One expected tab of the fleet workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FleetSheet {
    Vehicles,
    Maintenance,
    InternalRepairs,
    ExternalServices,
    Mileage,
    Garage,
    Suppliers,
    Purchases,
    Insurance,
    TechnicalInspection,
    Fuel,
}

impl FleetSheet {
    pub const ALL: [FleetSheet; 11] = [
        FleetSheet::Vehicles,
        FleetSheet::Maintenance,
        FleetSheet::InternalRepairs,
        FleetSheet::ExternalServices,
        FleetSheet::Mileage,
        FleetSheet::Garage,
        FleetSheet::Suppliers,
        FleetSheet::Purchases,
        FleetSheet::Insurance,
        FleetSheet::TechnicalInspection,
        FleetSheet::Fuel,
    ];

    /// Dated event sheets, the ones a period selection applies to
    pub const EVENTS: [FleetSheet; 6] = [
        FleetSheet::Maintenance,
        FleetSheet::InternalRepairs,
        FleetSheet::ExternalServices,
        FleetSheet::Mileage,
        FleetSheet::Purchases,
        FleetSheet::Fuel,
    ];

    pub fn sheet_name(self) -> &'static str {
        match self {
            FleetSheet::Vehicles => "Parc_Véhicules",
            FleetSheet::Maintenance => "Entretien",
            FleetSheet::InternalRepairs => "Réparations Internes",
            FleetSheet::ExternalServices => "Prestation externe",
            FleetSheet::Mileage => "Suivi_Kilométrage",
            FleetSheet::Garage => "Garage",
            FleetSheet::Suppliers => "Fournisseurs",
            FleetSheet::Purchases => "Achats",
            FleetSheet::Insurance => "Assurance",
            FleetSheet::TechnicalInspection => "Visite_Technique",
            FleetSheet::Fuel => "Carburant",
        }
    }

    pub fn from_sheet_name(name: &str) -> Option<FleetSheet> {
        Self::ALL.into_iter().find(|s| s.sheet_name() == name)
    }

    pub fn is_event(self) -> bool {
        Self::EVENTS.contains(&self)
    }
}

/// A loaded workbook known to contain the whole fleet sheet set
#[derive(Debug, Clone)]
pub struct FleetWorkbook {
    data: FleetData,
    /// One frame per `FleetSheet`, indexed by discriminant
    sheets: Vec<Frame>,
}

impl FleetWorkbook {
    /// Check the sheet set; the first missing sheet is reported
    pub fn from_data(data: FleetData) -> FleetResult<Self> {
        if data.frames.is_empty() {
            return Err(FleetError::Workbook(
                "Impossible de charger les données".to_string(),
            ));
        }
        let sheets = FleetSheet::ALL
            .iter()
            .map(|s| {
                data.get(s.sheet_name())
                    .cloned()
                    .ok_or_else(|| FleetError::MissingSheet(s.sheet_name().to_string()))
            })
            .collect::<FleetResult<Vec<_>>>()?;
        tracing::debug!(hash = %data.hash, sheets = data.frames.len(), "fleet sheet set complete");
        Ok(Self { data, sheets })
    }

    pub fn sheet(&self, sheet: FleetSheet) -> &Frame {
        &self.sheets[sheet as usize]
    }

    pub fn data(&self) -> &FleetData {
        &self.data
    }

    pub fn hash(&self) -> &str {
        &self.data.hash
    }

    pub fn stats(&self) -> Vec<SheetStats> {
        self.data.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_with(sheets: &[&str]) -> FleetData {
        FleetData {
            frames: sheets
                .iter()
                .map(|name| Frame::new(*name, vec!["Immatriculation".to_string()]))
                .collect(),
            hash: "abc".to_string(),
        }
    }

    #[test]
    fn test_sheet_names_round_trip() {
        for sheet in FleetSheet::ALL {
            assert_eq!(FleetSheet::from_sheet_name(sheet.sheet_name()), Some(sheet));
        }
        assert_eq!(FleetSheet::from_sheet_name("Feuil1"), None);
    }

    #[test]
    fn test_complete_sheet_set() {
        let names: Vec<&str> = FleetSheet::ALL.iter().map(|s| s.sheet_name()).collect();
        let workbook = FleetWorkbook::from_data(data_with(&names)).unwrap();
        assert_eq!(workbook.sheet(FleetSheet::Fuel).name, "Carburant");
        assert_eq!(workbook.hash(), "abc");
    }

    #[test]
    fn test_first_missing_sheet_reported() {
        let names: Vec<&str> = FleetSheet::ALL
            .iter()
            .filter(|s| !matches!(s, FleetSheet::Garage | FleetSheet::Fuel))
            .map(|s| s.sheet_name())
            .collect();
        let err = FleetWorkbook::from_data(data_with(&names)).unwrap_err();
        match err {
            FleetError::MissingSheet(name) => assert_eq!(name, "Garage"),
            other => panic!("expected MissingSheet, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_workbook_is_load_error() {
        let err = FleetWorkbook::from_data(FleetData::default()).unwrap_err();
        assert!(matches!(err, FleetError::Workbook(_)));
    }

    #[test]
    fn test_event_sheets() {
        assert!(FleetSheet::Fuel.is_event());
        assert!(!FleetSheet::Insurance.is_event());
        assert!(!FleetSheet::Vehicles.is_event());
    }
}
