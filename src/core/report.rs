//! The per-vehicle summary record exported as the report's first sheet

use super::metrics::VehicleKpis;
use super::selection::VehicleScope;
use crate::error::{FleetError, FleetResult};
use crate::format::{self, FormattedTable};
use chrono::NaiveDate;
use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryValue {
    Text(String),
    Money(f64),
    Liters(f64),
    Kilometers(f64),
}

impl SummaryValue {
    pub fn display(&self) -> String {
        match self {
            SummaryValue::Text(s) => s.clone(),
            SummaryValue::Money(v) => format::money(*v),
            SummaryValue::Liters(v) => format::liters_grouped(*v),
            SummaryValue::Kilometers(v) => format::kilometers(*v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryField {
    pub name: &'static str,
    pub value: SummaryValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub plate: String,
    pub direction: String,
    pub kpis: VehicleKpis,
    pub report_date: NaiveDate,
}

impl ReportSummary {
    pub fn new(scope: &VehicleScope, kpis: VehicleKpis, today: NaiveDate) -> Self {
        Self {
            plate: scope.plate.clone(),
            direction: scope.direction(),
            kpis,
            report_date: today,
        }
    }

    /// Fields in report column order
    pub fn fields(&self) -> Vec<SummaryField> {
        fn field(name: &'static str, value: SummaryValue) -> SummaryField {
            SummaryField { name, value }
        }
        let k = &self.kpis;
        vec![
            field("Immatriculation", SummaryValue::Text(self.plate.clone())),
            field("Direction", SummaryValue::Text(self.direction.clone())),
            field("Kilométrage Actuel", SummaryValue::Kilometers(k.current_mileage)),
            field("Coût Entretien", SummaryValue::Money(k.maintenance_cost)),
            field("Coût Réparations", SummaryValue::Money(k.repair_cost)),
            field("Coût Achats", SummaryValue::Money(k.purchases_cost)),
            field("Coût Total Mécanique", SummaryValue::Money(k.mechanical_total())),
            field("Total Litres Carburant", SummaryValue::Liters(k.liters)),
            field("Coût Carburant", SummaryValue::Money(k.fuel_cost)),
            field("Coût Total Global", SummaryValue::Money(k.global_total())),
            field(
                "Date Rapport",
                SummaryValue::Text(format::date_fr(&self.report_date)),
            ),
        ]
    }

    /// One-row display table
    pub fn to_table(&self) -> FormattedTable {
        let fields = self.fields();
        FormattedTable {
            title: "Résumé".to_string(),
            headers: fields.iter().map(|f| f.name.to_string()).collect(),
            rows: vec![fields.iter().map(|f| f.value.display()).collect()],
        }
    }

    pub fn file_name(&self) -> FleetResult<String> {
        report_file_name(&self.plate, self.report_date)
    }
}

/// `Rapport_<PLATE>_<YYYYMMDD>.xlsx`, path separators and reserved characters replaced
pub fn report_file_name(plate: &str, date: NaiveDate) -> FleetResult<String> {
    let hostile = Regex::new(r#"[/\\:*?"<>|\x00-\x1f]"#)
        .map_err(|e| FleetError::Validation(format!("Regex error: {}", e)))?;
    let plate = hostile.replace_all(plate.trim(), "_");
    Ok(format!("Rapport_{}_{}.xlsx", plate, date.format("%Y%m%d")))
}
