//! Sheet cleaning applied right after import

use super::columns;
use super::sheets::FleetSheet;
use crate::types::{CellValue, Frame};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashSet;

/// Largest serial Excel can display as a date (9999-12-31)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;
const MS_PER_DAY: f64 = 86_400_000.0;

fn excel_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Excel serial day number (1900 system, origin 1899-12-30) to a datetime
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..MAX_EXCEL_SERIAL + 1.0).contains(&serial) {
        return None;
    }
    let millis = (serial * MS_PER_DAY).round() as i64;
    excel_epoch().checked_add_signed(Duration::milliseconds(millis))
}

pub fn datetime_to_serial(dt: NaiveDateTime) -> f64 {
    (dt - excel_epoch()).num_milliseconds() as f64 / MS_PER_DAY
}

/// Run every cleaning step on a freshly imported sheet
pub fn clean_frame(mut frame: Frame) -> Frame {
    let before = frame.len();
    drop_empty_rows(&mut frame);
    let converted = convert_serial_dates(&mut frame);
    fill_numeric_gaps(&mut frame);
    if FleetSheet::from_sheet_name(&frame.name) == Some(FleetSheet::Purchases) {
        coerce_quantity(&mut frame);
    }
    tracing::debug!(
        sheet = %frame.name,
        rows = frame.len(),
        dropped = before - frame.len(),
        date_columns = ?converted,
        "sheet cleaned"
    );
    frame
}

/// Remove rows where every cell is empty
pub fn drop_empty_rows(frame: &mut Frame) {
    frame.rows.retain(|row| row.iter().any(|c| !c.is_empty()));
}

fn is_date_candidate(sheet: &str, column: &str) -> bool {
    if column.contains(columns::YEAR_MARKER) || columns::MEASURES.contains(&column) {
        return false;
    }
    !(FleetSheet::from_sheet_name(sheet) == Some(FleetSheet::Purchases)
        && column == columns::QUANTITY)
}

/// Integer columns without gaps and with repeated values hold serial dates.
///
/// Returns the names of the converted columns.
pub fn convert_serial_dates(frame: &mut Frame) -> Vec<String> {
    let mut converted = Vec::new();
    if frame.rows.is_empty() {
        return converted;
    }
    for idx in 0..frame.columns.len() {
        if !is_date_candidate(&frame.name, &frame.columns[idx]) {
            continue;
        }
        let mut distinct = HashSet::new();
        let all_integers = frame.rows.iter().all(|row| match row[idx] {
            CellValue::Number(n) if n.fract() == 0.0 => {
                distinct.insert(n as i64);
                true
            }
            _ => false,
        });
        if !all_integers || distinct.len() >= frame.rows.len() {
            continue;
        }
        for row in &mut frame.rows {
            if let CellValue::Number(n) = row[idx] {
                row[idx] = serial_to_datetime(n)
                    .map(CellValue::Date)
                    .unwrap_or(CellValue::Empty);
            }
        }
        converted.push(frame.columns[idx].clone());
    }
    converted
}

/// Empty cells of numeric columns become 0.
///
/// A column with no value at all counts as numeric and is filled too.
pub fn fill_numeric_gaps(frame: &mut Frame) {
    for idx in 0..frame.columns.len() {
        let blank = frame.rows.iter().all(|row| row[idx] == CellValue::Empty);
        if !blank && !frame.is_numeric_column(idx) {
            continue;
        }
        for row in &mut frame.rows {
            if row[idx].is_empty() {
                row[idx] = CellValue::Number(0.0);
            }
        }
    }
}

/// `Quantité` of purchases: forced numeric, unparseable as 0, absolute value
pub fn coerce_quantity(frame: &mut Frame) {
    let Some(idx) = frame.column_index(columns::QUANTITY) else {
        return;
    };
    for row in &mut frame.rows {
        let value = match &row[idx] {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().replace(',', ".").parse::<f64>().unwrap_or(0.0),
            CellValue::Date(d) => datetime_to_serial(*d),
            CellValue::Bool(b) => f64::from(u8::from(*b)),
            CellValue::Empty => 0.0,
        };
        let value = if value.is_finite() { value.abs() } else { 0.0 };
        row[idx] = CellValue::Number(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(name: &str, columns: &[&str], rows: Vec<Vec<CellValue>>) -> Frame {
        Frame::with_rows(
            name,
            columns.iter().map(|c| c.to_string()).collect(),
            rows,
        )
    }

    fn n(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    fn t(v: &str) -> CellValue {
        CellValue::Text(v.to_string())
    }

    #[test]
    fn test_serial_to_datetime() {
        let dt = serial_to_datetime(45292.0).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        let noon = serial_to_datetime(45292.5).unwrap();
        assert_eq!(noon.format("%H:%M").to_string(), "12:00");

        assert!(serial_to_datetime(-1.0).is_none());
        assert!(serial_to_datetime(3_000_000.0).is_none());
    }

    #[test]
    fn test_serial_round_trip() {
        let dt = serial_to_datetime(45500.0).unwrap();
        assert_eq!(datetime_to_serial(dt), 45500.0);
    }

    #[test]
    fn test_drop_empty_rows() {
        let mut f = frame(
            "Entretien",
            &["a", "b"],
            vec![
                vec![n(1.0), t("x")],
                vec![CellValue::Empty, t("  ")],
                vec![CellValue::Empty, t("y")],
            ],
        );
        drop_empty_rows(&mut f);
        assert_eq!(f.len(), 2);
    }

    #[test]
    fn test_integer_column_with_repeats_becomes_dates() {
        let mut f = frame(
            "Carburant",
            &["Date", "Litres"],
            vec![
                vec![n(45292.0), n(40.0)],
                vec![n(45292.0), n(40.0)],
                vec![n(45300.0), n(35.0)],
            ],
        );
        let converted = convert_serial_dates(&mut f);
        assert_eq!(converted, vec!["Date".to_string()]);
        assert!(f.is_date_column(0));
        // Litres is a measure even though it repeats
        assert!(f.is_numeric_column(1));
    }

    #[test]
    fn test_unique_integers_stay_numbers() {
        let mut f = frame(
            "Garage",
            &["Code"],
            vec![vec![n(1.0)], vec![n(2.0)], vec![n(3.0)]],
        );
        assert!(convert_serial_dates(&mut f).is_empty());
        assert!(f.is_numeric_column(0));
    }

    #[test]
    fn test_gaps_and_fractions_block_conversion() {
        let mut f = frame(
            "Entretien",
            &["with_gap", "fraction"],
            vec![
                vec![n(45292.0), n(1.5)],
                vec![CellValue::Empty, n(1.5)],
                vec![n(45292.0), n(2.0)],
            ],
        );
        assert!(convert_serial_dates(&mut f).is_empty());
    }

    #[test]
    fn test_year_and_quantity_columns_excluded() {
        let mut f = frame(
            "Achats",
            &["Année_Modèle", "Quantité"],
            vec![vec![n(2020.0), n(2.0)], vec![n(2020.0), n(2.0)]],
        );
        assert!(convert_serial_dates(&mut f).is_empty());
    }

    #[test]
    fn test_fill_numeric_gaps() {
        let mut f = frame(
            "Entretien",
            &["Coût_Total", "Observation"],
            vec![
                vec![n(10.0), CellValue::Empty],
                vec![CellValue::Empty, t("ok")],
            ],
        );
        fill_numeric_gaps(&mut f);
        assert_eq!(f.rows[1][0], n(0.0));
        assert_eq!(f.rows[0][1], CellValue::Empty);
    }

    #[test]
    fn test_fill_blank_column_with_zero() {
        let mut f = frame(
            "Carburant",
            &["Litres", "Remarque"],
            vec![
                vec![n(40.0), CellValue::Empty],
                vec![n(35.5), CellValue::Empty],
            ],
        );
        fill_numeric_gaps(&mut f);
        assert_eq!(f.rows[0][1], n(0.0));
        assert_eq!(f.rows[1][1], n(0.0));
    }

    #[test]
    fn test_coerce_quantity() {
        let mut f = frame(
            "Achats",
            &["Quantité"],
            vec![
                vec![n(-3.0)],
                vec![t("2,5")],
                vec![t("beaucoup")],
                vec![CellValue::Empty],
            ],
        );
        coerce_quantity(&mut f);
        let values: Vec<f64> = f.rows.iter().map(|r| r[0].as_number().unwrap()).collect();
        assert_eq!(values, vec![3.0, 2.5, 0.0, 0.0]);
    }

    #[test]
    fn test_clean_frame_purchases() {
        let f = frame(
            "Achats",
            &["Immatriculation", "Quantité", "Prix_Total"],
            vec![
                vec![t("1234 TBA"), t("-4"), CellValue::Empty],
                vec![CellValue::Empty, CellValue::Empty, CellValue::Empty],
                vec![t("1234 TBA"), n(4.0), n(20_000.0)],
            ],
        );
        let cleaned = clean_frame(f);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned.sum("Quantité"), 8.0);
        assert_eq!(cleaned.rows[0][2], n(0.0));
    }
}
