//! Fleet workbook importer - Excel (.xlsx) → cleaned frames

use crate::core::cleaning::{clean_frame, serial_to_datetime};
use crate::error::FleetResult;
use crate::types::{CellValue, FleetData, Frame};
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use md5::{Digest, Md5};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// MD5 hex digest of the workbook bytes
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Md5::digest(bytes))
}

/// Importer for the fleet workbook
pub struct FleetImporter {
    path: PathBuf,
}

impl FleetImporter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read and clean every sheet of the file
    pub fn import(&self) -> FleetResult<FleetData> {
        let bytes = std::fs::read(&self.path)?;
        tracing::info!(path = %self.path.display(), bytes = bytes.len(), "loading workbook");
        Self::import_bytes(&bytes)
    }

    /// Read and clean every sheet of an in-memory workbook
    pub fn import_bytes(bytes: &[u8]) -> FleetResult<FleetData> {
        let hash = content_hash(bytes);
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;

        let mut frames = Vec::new();
        for sheet_name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&sheet_name)?;
            frames.push(clean_frame(Self::range_to_frame(&sheet_name, &range)));
        }

        tracing::info!(%hash, sheets = frames.len(), "workbook loaded");
        Ok(FleetData { frames, hash })
    }

    /// First row is the header, the rest are data rows
    fn range_to_frame(sheet_name: &str, range: &Range<Data>) -> Frame {
        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Frame::new(sheet_name, Vec::new());
        };

        let columns = Self::header_names(header);
        let data = rows
            .map(|row| row.iter().map(Self::convert_cell).collect())
            .collect();
        Frame::with_rows(sheet_name, columns, data)
    }

    /// Header cells to unique column names
    fn header_names(header: &[Data]) -> Vec<String> {
        let mut names: Vec<String> = Vec::with_capacity(header.len());
        for (idx, cell) in header.iter().enumerate() {
            let base = match Self::convert_cell(cell) {
                CellValue::Empty => format!("Unnamed: {}", idx),
                other => other.to_key(),
            };
            let mut name = base.clone();
            let mut suffix = 1;
            while names.contains(&name) {
                name = format!("{}.{}", base, suffix);
                suffix += 1;
            }
            names.push(name);
        }
        names
    }

    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Empty | Data::Error(_) => CellValue::Empty,
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::String(s) if s.trim().is_empty() => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::DateTime(dt) => serial_to_datetime(dt.as_f64())
                .map(CellValue::Date)
                .unwrap_or(CellValue::Empty),
            Data::DateTimeIso(s) => Self::parse_iso(s)
                .map(CellValue::Date)
                .unwrap_or_else(|| CellValue::Text(s.clone())),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }

    fn parse_iso(s: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }
}
