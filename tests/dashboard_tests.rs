//! Dashboard tests: selection, KPIs, alerts, tabs and charts on the fixture fleet

mod common;

use common::*;
use fleetdash::core::charts::{ChartId, ChartKind};
use fleetdash::core::dashboard::{Dashboard, FleetView, TabId};
use fleetdash::core::metrics::{self, AlertLevel};
use fleetdash::core::selection::{self, Period, Selection};
use fleetdash::core::sheets::FleetSheet;
use fleetdash::error::FleetError;
use fleetdash::types::CellValue;
use pretty_assertions::assert_eq;

fn view_of(selection: Selection) -> Dashboard {
    Dashboard::build(&load_fleet(), &selection, today()).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// SELECTION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_directions_sorted_unique() {
    let workbook = load_fleet();
    assert_eq!(selection::directions(&workbook), vec!["DAF", "DSI"]);
}

#[test]
fn test_direction_filter_limits_choices() {
    let workbook = load_fleet();
    let filtered =
        selection::filtered_vehicles(&workbook, &Selection::default().directions(["DSI"])).unwrap();
    assert_eq!(selection::vehicle_choices(&filtered), vec![PLATE_A, PLATE_C]);
}

#[test]
fn test_unknown_direction_selects_nothing() {
    let workbook = load_fleet();
    let result = selection::filtered_vehicles(&workbook, &Selection::default().directions(["DRH"]));
    assert!(matches!(result, Err(FleetError::NoVehicles)));
}

#[test]
fn test_vehicle_without_direction_is_never_offered() {
    let bytes = workbook_bytes_with_vehicles(vec![vec![
        Cell::S("0000 XXX"),
        Cell::Blank,
        Cell::S("Renault"),
        Cell::N(30_000_000.0),
        Cell::N(44_197.0),
        Cell::N(2018.0),
    ]]);
    let workbook = load_bytes(&bytes);

    assert_eq!(selection::directions(&workbook), vec!["DAF", "DSI"]);
    let filtered = selection::filtered_vehicles(&workbook, &Selection::default()).unwrap();
    assert_eq!(
        selection::vehicle_choices(&filtered),
        vec![PLATE_A, PLATE_B, PLATE_C]
    );

    let dashboard = Dashboard::build(&workbook, &Selection::default(), today()).unwrap();
    assert_eq!(dashboard.vehicle, PLATE_A);
    let global = dashboard.tab(TabId::Global).unwrap();
    assert_eq!(global.kpis[0].value, "3");
}

#[test]
fn test_first_vehicle_is_default() {
    let dashboard = view_of(Selection::default().directions(["DAF"]));
    assert_eq!(dashboard.vehicle, PLATE_B);
    assert_eq!(dashboard.vehicles, vec![PLATE_B]);
}

#[test]
fn test_vehicle_outside_directions_is_rejected() {
    let workbook = load_fleet();
    let selection = Selection::default().directions(["DAF"]).vehicle(PLATE_A);
    let result = Dashboard::build(&workbook, &selection, today());
    assert!(matches!(result, Err(FleetError::UnknownVehicle(p)) if p == PLATE_A));
}

// ═══════════════════════════════════════════════════════════════════════════
// KPIS AND ALERTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_vehicle_kpis() {
    let dashboard = view_of(Selection::default().vehicle(PLATE_A));
    let totals = dashboard.totals;
    assert_eq!(totals.current_mileage, 43_500.0);
    assert_eq!(totals.maintenance_cost, 350_000.0);
    assert_eq!(totals.repair_cost, 1_200_000.0);
    assert_eq!(totals.purchases_cost, 70_000.0);
    assert_eq!(totals.mechanical_total(), 1_620_000.0);
    assert_eq!(totals.liters, 95.5);
    assert_eq!(totals.fuel_cost, 477_500.0);
}

#[test]
fn test_kpi_labels_and_values() {
    let dashboard = view_of(Selection::default().vehicle(PLATE_A));
    let kpis: Vec<(String, String)> = dashboard
        .kpis
        .iter()
        .map(|k| (k.label.clone(), k.value.clone()))
        .collect();
    assert_eq!(
        kpis,
        vec![
            ("📏 Kilométrage".to_string(), "43 500 km".to_string()),
            ("🛠 Coût Entretien".to_string(), "350 000 Ar".to_string()),
            ("🔧 Coût Réparations".to_string(), "1 200 000 Ar".to_string()),
            ("🛒 Achats".to_string(), "70 000 Ar".to_string()),
            ("💰 Coût Total Véhicule".to_string(), "1 620 000 Ar".to_string()),
            ("⛽ Total Litres".to_string(), "95.5 L".to_string()),
            ("⛽ Coût Carburant".to_string(), "477 500 Ar".to_string()),
        ]
    );
}

#[test]
fn test_alerts_for_expired_documents() {
    let dashboard = view_of(Selection::default().vehicle(PLATE_A));
    assert_eq!(dashboard.alerts.len(), 2);
    assert_eq!(dashboard.alerts[0].level, AlertLevel::Error);
    assert_eq!(
        dashboard.alerts[0].message,
        "1 assurance(s) expirée(s) pour 1234 TBA !"
    );
    assert_eq!(dashboard.alerts[1].level, AlertLevel::Warning);
    assert_eq!(
        dashboard.alerts[1].message,
        "1 visite(s) technique(s) à renouveler."
    );
}

#[test]
fn test_insurance_expiry_depends_on_today() {
    let workbook = load_fleet();
    let selection = Selection::default().vehicle(PLATE_B);
    let before = Dashboard::build(&workbook, &selection, date(2024, 12, 31)).unwrap();
    assert!(before.alerts.is_empty());
    let after = Dashboard::build(&workbook, &selection, date(2025, 1, 1)).unwrap();
    assert_eq!(after.alerts.len(), 1);
}

#[test]
fn test_vehicle_without_records_has_zero_kpis() {
    let dashboard = view_of(Selection::default().vehicle(PLATE_C));
    assert_eq!(dashboard.totals.current_mileage, 0.0);
    assert_eq!(dashboard.totals.maintenance_cost, 0.0);
    assert_eq!(dashboard.totals.repair_cost, 90_000.0);
    assert!(dashboard.alerts.is_empty());

    let maintenance = dashboard.tab(TabId::Maintenance).unwrap();
    assert_eq!(maintenance.sections[0].info.as_deref(), Some("Aucun entretien."));
    assert!(maintenance.sections[0].table.is_none());
    assert_eq!(
        maintenance.sections[1].info.as_deref(),
        Some("Aucune réparation interne.")
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// PERIOD
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_period_filters_event_sheets() {
    let period = Period::new(date(2024, 3, 1), date(2024, 12, 31)).unwrap();
    let dashboard = view_of(Selection::default().vehicle(PLATE_A).period(period));
    let totals = dashboard.totals;
    assert_eq!(totals.maintenance_cost, 200_000.0);
    assert_eq!(totals.repair_cost, 1_200_000.0);
    assert_eq!(totals.purchases_cost, 20_000.0);
    assert_eq!(totals.liters, 0.0);
    assert_eq!(totals.current_mileage, 43_500.0);
}

#[test]
fn test_period_keeps_insurance_alerts() {
    let period = Period::new(date(2024, 6, 1), date(2024, 6, 30)).unwrap();
    let dashboard = view_of(Selection::default().vehicle(PLATE_A).period(period));
    assert_eq!(dashboard.alerts.len(), 2);
}

// ═══════════════════════════════════════════════════════════════════════════
// TABS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_seven_tabs_in_order() {
    let dashboard = view_of(Selection::default());
    let ids: Vec<TabId> = dashboard.tabs.iter().map(|t| t.id).collect();
    assert_eq!(ids, TabId::ALL.to_vec());
}

#[test]
fn test_maintenance_table_formats_money_and_dates() {
    let dashboard = view_of(Selection::default().vehicle(PLATE_A));
    let table = dashboard.tab(TabId::Maintenance).unwrap().sections[0]
        .table
        .clone()
        .unwrap();
    assert_eq!(
        table.headers,
        vec!["Immatriculation", "Date", "Type_Entretien", "Coût_Total"]
    );
    assert_eq!(table.rows[0][1], "10 février 2024");
    assert_eq!(table.rows[0][3], "150 000 Ar");
}

#[test]
fn test_mileage_tab_has_distance_column() {
    let dashboard = view_of(Selection::default().vehicle(PLATE_A));
    let table = dashboard.tab(TabId::Mileage).unwrap().sections[0]
        .table
        .clone()
        .unwrap();
    assert_eq!(table.headers.last().map(String::as_str), Some("Km_Parcourus"));
    let km: Vec<&str> = table.rows.iter().map(|r| r[3].as_str()).collect();
    assert_eq!(km, vec!["0 km", "1 800 km", "1 700 km"]);
}

#[test]
fn test_purchases_tab_lists_all_suppliers() {
    let dashboard = view_of(Selection::default().vehicle(PLATE_B));
    let purchases = dashboard.tab(TabId::Purchases).unwrap();
    assert_eq!(purchases.sections[0].info.as_deref(), Some("Aucun achat."));
    assert_eq!(purchases.sections[1].table.as_ref().unwrap().rows.len(), 2);
}

#[test]
fn test_global_tab() {
    let dashboard = view_of(Selection::default());
    let global = dashboard.tab(TabId::Global).unwrap();
    let values: Vec<&str> = global.kpis.iter().map(|k| k.value.as_str()).collect();
    assert_eq!(values, vec!["3", "2 463 500 Ar", "4 mars 2025"]);

    let summary = global.sections[1].table.as_ref().unwrap();
    assert_eq!(summary.title, "Résumé");
    assert_eq!(summary.rows[0][0], PLATE_A);
    assert_eq!(summary.rows[0][9], "2 097 500 Ar");
}

#[test]
fn test_dashboard_serializes() {
    let dashboard = view_of(Selection::default().vehicle(PLATE_A));
    let json = serde_json::to_value(&dashboard).unwrap();
    assert_eq!(json["vehicle"], PLATE_A);
    assert_eq!(json["tabs"][0]["id"], "vehicle");
    assert_eq!(json["alerts"][0]["level"], "error");
    assert!(serde_yaml::to_string(&dashboard).unwrap().contains("Suivi des Véhicules"));
}

// ═══════════════════════════════════════════════════════════════════════════
// METRICS AND CHARTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_costs_by_direction_left_join() {
    let workbook = load_fleet();
    assert_eq!(
        metrics::costs_by_direction(&workbook),
        vec![("DAF".to_string(), 120_000.0), ("DSI".to_string(), 350_000.0)]
    );
}

#[test]
fn test_mileage_history_sorted_with_deltas() {
    let workbook = load_fleet();
    let view = FleetView::new(&workbook, Selection::default().vehicle(PLATE_A), today()).unwrap();
    let history = metrics::mileage_history(&view.scope.records_or_empty(FleetSheet::Mileage));
    let deltas: Vec<f64> = history
        .column_values("Km_Parcourus")
        .filter_map(CellValue::as_number)
        .collect();
    assert_eq!(deltas, vec![0.0, 1_800.0, 1_700.0]);
}

#[test]
fn test_fuel_cost_pie_covers_fleet() {
    let workbook = load_fleet();
    let view = FleetView::new(&workbook, Selection::default().vehicle(PLATE_A), today()).unwrap();
    let chart = view.chart(ChartId::FuelCostByType).unwrap();
    assert_eq!(chart.kind, ChartKind::Pie);
    assert_eq!(chart.labels(), vec!["Gasoil", "Essence"]);
    assert_eq!(chart.total(), 633_500.0);
}

#[test]
fn test_internal_repairs_bar_chart_by_date() {
    let workbook = load_fleet();
    let view = FleetView::new(&workbook, Selection::default().vehicle(PLATE_A), today()).unwrap();
    let chart = view.chart(ChartId::InternalRepairs).unwrap();
    assert_eq!(chart.kind, ChartKind::Bar);
    assert_eq!(chart.labels(), vec!["12 avril 2024", "20 septembre 2024"]);
    assert_eq!(chart.points[0].group.as_deref(), Some("Moteur"));
}

#[test]
fn test_chart_missing_for_vehicle_without_data() {
    let workbook = load_fleet();
    let view = FleetView::new(&workbook, Selection::default().vehicle(PLATE_C), today()).unwrap();
    assert!(view.chart(ChartId::FuelLiters).is_none());
    assert!(matches!(
        view.require_chart(ChartId::FuelLiters),
        Err(FleetError::Validation(_))
    ));
}
