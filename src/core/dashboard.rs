//! The dashboard page: KPIs, alerts and the seven tabs for one selection

use super::charts::{self, ChartId, ChartSpec};
use super::columns;
use super::metrics::{self, Alert, GlobalSummary, VehicleKpis};
use super::report::ReportSummary;
use super::selection::{self, Period, Selection, VehicleScope};
use super::sheets::{FleetSheet, FleetWorkbook};
use crate::error::{FleetError, FleetResult};
use crate::format::{self, format_frame, FormattedTable};
use crate::types::{Frame, SheetStats};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const TITLE: &str = "Suivi des Véhicules OMNIS";

/// A workbook seen through one selection on one day.
///
/// Computes the filtered vehicles, the vehicle scope and all totals once;
/// the dashboard, the charts and the report are derived from it.
#[derive(Debug, Clone)]
pub struct FleetView<'a> {
    pub workbook: &'a FleetWorkbook,
    pub selection: Selection,
    pub today: NaiveDate,
    pub vehicles: Frame,
    pub scope: VehicleScope,
    pub kpis: VehicleKpis,
    pub global: GlobalSummary,
}

impl<'a> FleetView<'a> {
    pub fn new(
        workbook: &'a FleetWorkbook,
        selection: Selection,
        today: NaiveDate,
    ) -> FleetResult<Self> {
        let vehicles = selection::filtered_vehicles(workbook, &selection)?;
        let scope = VehicleScope::resolve(workbook, &vehicles, &selection)?;
        let kpis = VehicleKpis::compute(&scope);
        let global = GlobalSummary::compute(workbook, &vehicles, today);
        Ok(Self {
            workbook,
            selection,
            today,
            vehicles,
            scope,
            kpis,
            global,
        })
    }

    pub fn alerts(&self) -> Vec<Alert> {
        metrics::alerts(&self.scope, self.today)
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary::new(&self.scope, self.kpis, self.today)
    }

    pub fn chart(&self, id: ChartId) -> Option<ChartSpec> {
        charts::build(id, self.workbook, &self.scope, &self.global)
    }

    /// Chart by id, failing when its data is absent
    pub fn require_chart(&self, id: ChartId) -> FleetResult<ChartSpec> {
        self.chart(id).ok_or_else(|| {
            FleetError::Validation(format!(
                "no data for chart '{}' on vehicle {}",
                id, self.scope.plate
            ))
        })
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::from_view(self)
    }
}

//==============================================================================
// Serializable page
//==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub label: String,
    pub value: String,
}

impl Kpi {
    fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<FormattedTable>,
    /// Shown instead of the table when there is nothing to list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub charts: Vec<ChartSpec>,
}

impl Section {
    fn table(title: &str, table: FormattedTable) -> Self {
        Self {
            title: title.to_string(),
            table: Some(table),
            info: None,
            charts: Vec::new(),
        }
    }

    /// Table with charts, or an info line when the frame is empty
    fn records(
        title: &str,
        frame: &Frame,
        money: &[&str],
        quantity: &[&str],
        empty_info: &str,
        charts: Vec<ChartSpec>,
    ) -> Self {
        if frame.is_empty() {
            return Self {
                title: title.to_string(),
                table: None,
                info: Some(empty_info.to_string()),
                charts: Vec::new(),
            };
        }
        Self {
            title: title.to_string(),
            table: Some(format_frame(frame, money, quantity)),
            info: None,
            charts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TabId {
    Vehicle,
    Maintenance,
    Mileage,
    Insurance,
    Purchases,
    Fuel,
    Global,
}

impl TabId {
    pub const ALL: [TabId; 7] = [
        TabId::Vehicle,
        TabId::Maintenance,
        TabId::Mileage,
        TabId::Insurance,
        TabId::Purchases,
        TabId::Fuel,
        TabId::Global,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TabId::Vehicle => "vehicle",
            TabId::Maintenance => "maintenance",
            TabId::Mileage => "mileage",
            TabId::Insurance => "insurance",
            TabId::Purchases => "purchases",
            TabId::Fuel => "fuel",
            TabId::Global => "global",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            TabId::Vehicle => "📋 Fiche Véhicule",
            TabId::Maintenance => "🛠 Entretien & Réparations",
            TabId::Mileage => "📈 Kilométrage & Performances",
            TabId::Insurance => "📋 Assurance & Visites",
            TabId::Purchases => "🛒 Achats & Fournisseurs",
            TabId::Fuel => "⛽ Carburant",
            TabId::Global => "📊 Dashboard Global & Export",
        }
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TabId {
    type Err = FleetError;

    fn from_str(s: &str) -> FleetResult<Self> {
        TabId::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FleetError::Validation(format!("unknown tab '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tab {
    pub id: TabId,
    pub title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub kpis: Vec<Kpi>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub file_hash: String,
    pub sheets: Vec<SheetStats>,
    pub directions: Vec<String>,
    pub vehicles: Vec<String>,
    pub vehicle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    pub today: NaiveDate,
    pub totals: VehicleKpis,
    pub kpis: Vec<Kpi>,
    pub alerts: Vec<Alert>,
    pub tabs: Vec<Tab>,
}

impl Dashboard {
    pub fn build(
        workbook: &FleetWorkbook,
        selection: &Selection,
        today: NaiveDate,
    ) -> FleetResult<Self> {
        Ok(FleetView::new(workbook, selection.clone(), today)?.dashboard())
    }

    fn from_view(view: &FleetView<'_>) -> Self {
        let tabs = TabId::ALL.iter().map(|&id| build_tab(view, id)).collect();
        Self {
            title: TITLE.to_string(),
            file_hash: view.workbook.hash().to_string(),
            sheets: view.workbook.stats(),
            directions: selection::directions(view.workbook),
            vehicles: selection::vehicle_choices(&view.vehicles),
            vehicle: view.scope.plate.clone(),
            period: view.selection.period,
            today: view.today,
            totals: view.kpis,
            kpis: vehicle_kpis(&view.kpis),
            alerts: view.alerts(),
            tabs,
        }
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }
}

/// The two KPI rows above the tabs
pub fn vehicle_kpis(k: &VehicleKpis) -> Vec<Kpi> {
    vec![
        Kpi::new("📏 Kilométrage", format::kilometers(k.current_mileage)),
        Kpi::new("🛠 Coût Entretien", format::money(k.maintenance_cost)),
        Kpi::new("🔧 Coût Réparations", format::money(k.repair_cost)),
        Kpi::new("🛒 Achats", format::money(k.purchases_cost)),
        Kpi::new("💰 Coût Total Véhicule", format::money(k.mechanical_total())),
        Kpi::new("⛽ Total Litres", format::liters_grouped(k.liters)),
        Kpi::new("⛽ Coût Carburant", format::money(k.fuel_cost)),
    ]
}

fn charts_of(view: &FleetView<'_>, ids: &[ChartId]) -> Vec<ChartSpec> {
    ids.iter().filter_map(|&id| view.chart(id)).collect()
}

fn build_tab(view: &FleetView<'_>, id: TabId) -> Tab {
    let records = |sheet: FleetSheet| view.scope.records_or_empty(sheet);
    let mut kpis = Vec::new();

    let sections = match id {
        TabId::Vehicle => {
            let money: &[&str] = if view.scope.info.has_column(columns::PURCHASE_PRICE) {
                &[columns::PURCHASE_PRICE]
            } else {
                &[]
            };
            vec![Section::table(
                &format!("📌 Détails : {}", view.scope.plate),
                format_frame(&view.scope.info, money, &[]),
            )]
        }
        TabId::Maintenance => vec![
            Section::records(
                "🛠 Entretien",
                &records(FleetSheet::Maintenance),
                &[columns::TOTAL_COST],
                &[],
                "Aucun entretien.",
                charts_of(view, &[ChartId::MaintenanceByType]),
            ),
            Section::records(
                "🔧 Réparations Internes",
                &records(FleetSheet::InternalRepairs),
                &[columns::TOTAL_COST],
                &[],
                "Aucune réparation interne.",
                charts_of(view, &[ChartId::InternalRepairs]),
            ),
            Section::records(
                "🌐 Prestations Externes",
                &records(FleetSheet::ExternalServices),
                &[columns::TOTAL_COST],
                &[],
                "Aucune prestation externe.",
                charts_of(view, &[ChartId::ExternalServices]),
            ),
        ],
        TabId::Mileage => vec![Section::records(
            "📈 Suivi Kilométrage",
            &metrics::mileage_history(&records(FleetSheet::Mileage)),
            &[],
            &[columns::MILEAGE, columns::KM_TRAVELED],
            "Pas de données kilométriques.",
            charts_of(view, &[ChartId::Mileage]),
        )],
        TabId::Insurance => vec![
            Section::table(
                "📋 Assurances",
                format_frame(&records(FleetSheet::Insurance), &[columns::AMOUNT], &[]),
            ),
            Section::table(
                "🔍 Visites Techniques",
                format_frame(&records(FleetSheet::TechnicalInspection), &[], &[]),
            ),
        ],
        TabId::Purchases => vec![
            Section::records(
                "🛒 Achats",
                &records(FleetSheet::Purchases),
                &[columns::UNIT_PRICE, columns::TOTAL_PRICE],
                &[columns::QUANTITY],
                "Aucun achat.",
                charts_of(view, &[ChartId::PurchasesBySupplier]),
            ),
            Section::table(
                "📇 Fournisseurs",
                format_frame(view.workbook.sheet(FleetSheet::Suppliers), &[], &[]),
            ),
        ],
        TabId::Fuel => vec![Section::records(
            "⛽ Consommation Carburant",
            &records(FleetSheet::Fuel),
            &[columns::LITER_PRICE, columns::FUEL_TOTAL],
            &[columns::LITERS],
            "Aucune donnée carburant.",
            charts_of(view, &[ChartId::FuelLiters]),
        )],
        TabId::Global => {
            kpis = vec![
                Kpi::new("🚗 Nb Véhicules", view.global.vehicle_count.to_string()),
                Kpi::new("💰 Coût Total Global", format::money(view.global.total_cost)),
                Kpi::new("⏱ Dernière MAJ", view.global.last_update_fr()),
            ];
            vec![
                Section {
                    title: "📊 Dashboard Global".to_string(),
                    table: None,
                    info: None,
                    charts: charts_of(view, &[ChartId::CostsByDirection, ChartId::FuelCostByType]),
                },
                Section::table("📥 Générer Rapport", view.summary().to_table()),
            ]
        }
    };

    Tab {
        id,
        title: id.title().to_string(),
        kpis,
        sections,
    }
}
