//! Shared fixture: a small fleet workbook generated with rust_xlsxwriter

#![allow(dead_code)]

use chrono::NaiveDate;
use fleetdash::core::sheets::FleetWorkbook;
use fleetdash::excel::FleetImporter;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::{Path, PathBuf};

pub const PLATE_A: &str = "1234 TBA";
pub const PLATE_B: &str = "5678 TBB";
pub const PLATE_C: &str = "9012 TBC";

pub enum Cell {
    S(&'static str),
    N(f64),
    D(i32, u32, u32),
    Blank,
}

use Cell::{Blank, D, N, S};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Reference day of the fixture: after the first insurance expired
pub fn today() -> NaiveDate {
    date(2025, 3, 4)
}

fn serial(y: i32, m: u32, d: u32) -> f64 {
    (date(y, m, d) - date(1899, 12, 30)).num_days() as f64
}

type Rows = Vec<Vec<Cell>>;

fn fleet_sheets() -> Vec<(&'static str, Vec<&'static str>, Rows)> {
    vec![
        (
            "Parc_Véhicules",
            vec!["Immatriculation", "Direction", "Marque", "Prix_Achat", "Mise_En_Service", "Année"],
            vec![
                vec![S(PLATE_A), S("DSI"), S("Toyota"), N(85_000_000.0), N(43_831.0), N(2020.0)],
                vec![S(PLATE_B), S("DAF"), S("Nissan"), N(60_000_000.0), N(43_831.0), N(2020.0)],
                vec![S(PLATE_C), S("DSI"), S("Mazda"), N(45_000_000.0), N(44_197.0), N(2019.0)],
            ],
        ),
        (
            "Entretien",
            vec!["Immatriculation", "Date", "Type_Entretien", "Coût_Total"],
            vec![
                vec![S(PLATE_A), D(2024, 2, 10), S("Vidange"), N(150_000.0)],
                vec![Blank, Blank, Blank, Blank],
                vec![S(PLATE_A), D(2024, 8, 5), S("Freins"), N(200_000.0)],
                vec![S(PLATE_B), D(2024, 3, 1), S("Vidange"), N(120_000.0)],
            ],
        ),
        (
            "Réparations Internes",
            vec!["Immatriculation", "Date d_entrée à Andraharo", "Panne", "Coût_Total"],
            vec![
                vec![S(PLATE_A), D(2024, 4, 12), S("Moteur"), N(800_000.0)],
                vec![S(PLATE_A), D(2024, 9, 20), S("Electrique"), N(100_000.0)],
            ],
        ),
        (
            "Prestation externe",
            vec!["Immatriculation", "Date", "Type de Prestation", "Coût_Total"],
            vec![
                vec![S(PLATE_A), D(2024, 5, 2), S("Carrosserie"), N(300_000.0)],
                vec![S(PLATE_C), D(2024, 6, 10), S("Pneus"), N(90_000.0)],
            ],
        ),
        (
            "Suivi_Kilométrage",
            vec!["Immatriculation", "Date", "Kilométrage"],
            vec![
                vec![S(PLATE_A), D(2024, 1, 1), N(40_000.0)],
                vec![S(PLATE_A), D(2024, 6, 1), N(43_500.0)],
                vec![S(PLATE_A), D(2024, 3, 1), N(41_800.0)],
                vec![S(PLATE_B), D(2024, 2, 1), N(20_000.0)],
            ],
        ),
        (
            "Garage",
            vec!["Nom", "Adresse"],
            vec![vec![S("Atelier Andraharo"), S("Antananarivo")]],
        ),
        (
            "Fournisseurs",
            vec!["Nom_du_fournisseur", "Contact"],
            vec![
                vec![S("AutoPièces"), S("034 00 000 01")],
                vec![S("Garage Central"), S("034 00 000 02")],
            ],
        ),
        (
            "Achats",
            vec![
                "Immatriculation",
                "Date",
                "Nom_du_fournisseur",
                "Quantité",
                "Prix_Unitaire",
                "Prix_Total",
            ],
            vec![
                vec![S(PLATE_A), D(2024, 2, 15), S("AutoPièces"), S("2,5"), N(20_000.0), N(50_000.0)],
                vec![S(PLATE_A), D(2024, 7, 1), S("Garage Central"), N(-4.0), N(5_000.0), N(20_000.0)],
            ],
        ),
        (
            "Assurance",
            vec!["Immatriculation", "Assureur", "Date_Debut", "Date_Fin", "Montant"],
            vec![
                vec![S(PLATE_A), S("Ny Havana"), D(2023, 1, 1), D(2023, 12, 31), N(450_000.0)],
                vec![S(PLATE_A), S("Ny Havana"), D(2024, 1, 1), D(2025, 12, 31), N(480_000.0)],
                vec![S(PLATE_B), S("ARO"), D(2024, 1, 1), D(2024, 12, 31), N(300_000.0)],
            ],
        ),
        (
            "Visite_Technique",
            vec!["Immatriculation", "Date_Visite", "Etat"],
            vec![
                vec![S(PLATE_A), D(2024, 1, 20), S("Expiré")],
                vec![S(PLATE_A), D(2025, 1, 20), S("Valide")],
            ],
        ),
        (
            "Carburant",
            vec!["Immatriculation", "Date", "Type_Carburant", "Litres", "Prix_Litre", "Total_Ar"],
            vec![
                vec![S(PLATE_A), D(2024, 1, 10), S("Gasoil"), N(50.0), N(5_000.0), N(250_000.0)],
                vec![S(PLATE_A), D(2024, 2, 10), S("Gasoil"), N(45.5), N(5_000.0), N(227_500.0)],
                vec![S(PLATE_B), D(2024, 1, 12), S("Essence"), N(30.0), N(5_200.0), N(156_000.0)],
            ],
        ),
    ]
}

fn write_workbook(skip: &[&str], extra_vehicles: Rows) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let mut extra_vehicles = Some(extra_vehicles);

    for (name, headers, mut rows) in fleet_sheets() {
        if skip.contains(&name) {
            continue;
        }
        if name == "Parc_Véhicules" {
            let mut extra = extra_vehicles.take().unwrap_or_default();
            extra.append(&mut rows);
            rows = extra;
        }
        let sheet = workbook.add_worksheet();
        sheet.set_name(name)?;
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header)?;
        }
        for (r, row) in rows.iter().enumerate() {
            let r = r as u32 + 1;
            for (c, cell) in row.iter().enumerate() {
                let c = c as u16;
                match cell {
                    S(s) => {
                        sheet.write_string(r, c, *s)?;
                    }
                    N(n) => {
                        sheet.write_number(r, c, *n)?;
                    }
                    D(y, m, d) => {
                        sheet.write_number_with_format(r, c, serial(*y, *m, *d), &date_format)?;
                    }
                    Blank => {}
                }
            }
        }
    }
    workbook.save_to_buffer()
}

/// The complete fleet workbook as .xlsx bytes
pub fn fleet_workbook_bytes() -> Vec<u8> {
    write_workbook(&[], vec![]).expect("fixture workbook")
}

/// The fleet workbook without some sheets
pub fn workbook_bytes_without(skip: &[&str]) -> Vec<u8> {
    write_workbook(skip, vec![]).expect("fixture workbook")
}

/// The fleet workbook with more vehicle rows, placed before the usual ones
pub fn workbook_bytes_with_vehicles(extra: Vec<Vec<Cell>>) -> Vec<u8> {
    write_workbook(&[], extra).expect("fixture workbook")
}

pub fn load_bytes(bytes: &[u8]) -> FleetWorkbook {
    let data = FleetImporter::import_bytes(bytes).expect("import fixture");
    FleetWorkbook::from_data(data).expect("complete fixture")
}

/// Write the fixture into `dir` and return its path
pub fn write_fleet_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("flotte.xlsx");
    std::fs::write(&path, fleet_workbook_bytes()).expect("write fixture");
    path
}

pub fn load_fleet() -> FleetWorkbook {
    load_bytes(&fleet_workbook_bytes())
}
