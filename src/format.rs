//! Display formatting: Ariary amounts, liters, kilometres and French dates

use crate::core::columns;
use crate::types::{CellValue, Frame};
use chrono::Datelike;
use serde::Serialize;

pub const CURRENCY: &str = "Ar";

const MONTHS_FR: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Insert a space every three digits of the integer part
fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Avoid printing "-0" after rounding
fn normalize_zero(s: String) -> String {
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_string()
    } else {
        s
    }
}

/// `1234567.4` → `1 234 567`
pub fn group_integer(value: f64) -> String {
    group_thousands(&normalize_zero(format!("{:.0}", value)))
}

/// `1234567.4` → `1 234 567 Ar`
pub fn money(value: f64) -> String {
    format!("{} {}", group_integer(value), CURRENCY)
}

/// Table cell liters: `12.5 L`
pub fn liters(value: f64) -> String {
    format!("{} L", normalize_zero(format!("{:.1}", value)))
}

/// KPI liters, grouped: `1 234.5 L`
pub fn liters_grouped(value: f64) -> String {
    format!(
        "{} L",
        group_thousands(&normalize_zero(format!("{:.1}", value)))
    )
}

/// `12345` → `12 345 km`
pub fn kilometers(value: f64) -> String {
    format!("{} km", group_integer(value))
}

/// `5 janvier 2025`
pub fn date_fr<D: Datelike>(date: &D) -> String {
    let month = MONTHS_FR[date.month0() as usize];
    format!("{} {} {}", date.day(), month, date.year())
}

/// Cell rendering for tables, French dates included
pub fn plain_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => String::new(),
        CellValue::Date(d) => date_fr(d),
        CellValue::Number(n) if n.fract() == 0.0 => format!("{:.0}", n),
        CellValue::Number(n) => n.to_string(),
        CellValue::Text(s) => s.clone(),
        CellValue::Bool(b) => b.to_string(),
    }
}

/// A frame rendered to display strings
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct FormattedTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl FormattedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn quantity_cell(column: &str, value: f64) -> String {
    match column {
        columns::LITERS => liters(value),
        columns::MILEAGE | columns::KM_TRAVELED => kilometers(value),
        columns::QUANTITY => normalize_zero(format!("{:.1}", value)),
        _ => normalize_zero(format!("{:.0}", value)),
    }
}

/// Render a frame: money columns in Ar, quantity columns by unit, dates in French
pub fn format_frame(frame: &Frame, money_cols: &[&str], quantity_cols: &[&str]) -> FormattedTable {
    let rows = frame
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(&frame.columns)
                .map(|(cell, column)| {
                    let col = column.as_str();
                    match cell.as_number() {
                        Some(n) if money_cols.contains(&col) => money(n),
                        Some(n) if quantity_cols.contains(&col) => quantity_cell(col, n),
                        _ => plain_cell(cell),
                    }
                })
                .collect()
        })
        .collect();

    FormattedTable {
        title: frame.name.clone(),
        headers: frame.columns.clone(),
        rows,
    }
}
