//! Report exporter - selected vehicle → Excel (.xlsx)

use crate::core::columns;
use crate::core::dashboard::FleetView;
use crate::core::metrics;
use crate::core::report::{ReportSummary, SummaryValue};
use crate::core::sheets::FleetSheet;
use crate::error::{FleetError, FleetResult};
use crate::format;
use crate::types::{CellValue, Frame};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;

/// Per-vehicle sheets, in workbook order after the summary
pub const REPORT_SHEETS: [FleetSheet; 8] = [
    FleetSheet::Maintenance,
    FleetSheet::InternalRepairs,
    FleetSheet::ExternalServices,
    FleetSheet::Insurance,
    FleetSheet::TechnicalInspection,
    FleetSheet::Purchases,
    FleetSheet::Fuel,
    FleetSheet::Mileage,
];

pub const SUMMARY_SHEET: &str = "Résumé";

const MONEY_FORMAT: &str = "#,##0 \"Ar\"";
const LITERS_FORMAT: &str = "#,##0.0 \"L\"";
const KM_FORMAT: &str = "#,##0 \"km\"";

struct Formats {
    header: Format,
    money: Format,
    liters: Format,
    km: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_text_wrap()
                .set_align(FormatAlign::Top)
                .set_background_color(Color::RGB(0xD7E4BC))
                .set_border(FormatBorder::Thin),
            money: Format::new().set_num_format(MONEY_FORMAT),
            liters: Format::new().set_num_format(LITERS_FORMAT),
            km: Format::new().set_num_format(KM_FORMAT),
        }
    }

    /// Number format of a summary cell
    fn for_summary(&self, value: &SummaryValue) -> Option<&Format> {
        match value {
            SummaryValue::Text(_) => None,
            SummaryValue::Money(_) => Some(&self.money),
            SummaryValue::Liters(_) => Some(&self.liters),
            SummaryValue::Kilometers(_) => Some(&self.km),
        }
    }

    /// Number format of a column of a report sheet
    fn for_column(&self, sheet: FleetSheet, column: &str) -> Option<&Format> {
        match (sheet, column) {
            (_, columns::TOTAL_COST)
            | (_, columns::AMOUNT)
            | (_, columns::UNIT_PRICE)
            | (_, columns::TOTAL_PRICE)
            | (_, columns::LITER_PRICE)
            | (_, columns::FUEL_TOTAL)
            | (_, columns::PURCHASE_PRICE) => Some(&self.money),
            (FleetSheet::Fuel, columns::LITERS) => Some(&self.liters),
            (FleetSheet::Mileage, columns::MILEAGE) | (FleetSheet::Mileage, columns::KM_TRAVELED) => {
                Some(&self.km)
            }
            _ => None,
        }
    }
}

/// Excel report of one vehicle
pub struct ReportExporter {
    summary: ReportSummary,
    /// Per-vehicle sheets followed by the whole vehicle sheet
    sheets: Vec<(FleetSheet, Frame)>,
}

impl ReportExporter {
    pub fn new(view: &FleetView<'_>) -> Self {
        let mut sheets: Vec<(FleetSheet, Frame)> = REPORT_SHEETS
            .iter()
            .map(|&sheet| {
                let records = view.scope.records_or_empty(sheet);
                let frame = if sheet == FleetSheet::Mileage {
                    metrics::mileage_history(&records)
                } else {
                    records
                };
                (sheet, frame)
            })
            .collect();
        sheets.push((
            FleetSheet::Vehicles,
            view.workbook.sheet(FleetSheet::Vehicles).clone(),
        ));

        Self {
            summary: view.summary(),
            sheets,
        }
    }

    /// Default file name, `Rapport_<PLATE>_<YYYYMMDD>.xlsx`
    pub fn file_name(&self) -> FleetResult<String> {
        self.summary.file_name()
    }

    /// Write the report to an .xlsx file
    pub fn export(&self, output_path: &Path) -> FleetResult<()> {
        let mut workbook = self.build()?;
        workbook
            .save(output_path)
            .map_err(|e| FleetError::Export(format!("Failed to save Excel file: {}", e)))?;
        tracing::info!(path = %output_path.display(), plate = %self.summary.plate, "report written");
        Ok(())
    }

    /// Write the report to memory
    pub fn to_buffer(&self) -> FleetResult<Vec<u8>> {
        let mut workbook = self.build()?;
        Ok(workbook.save_to_buffer()?)
    }

    fn build(&self) -> FleetResult<Workbook> {
        let formats = Formats::new();
        let mut workbook = Workbook::new();

        self.write_summary(workbook.add_worksheet(), &formats)?;
        for (sheet, frame) in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(sheet.sheet_name()).map_err(|e| {
                FleetError::Export(format!("Failed to set worksheet name: {}", e))
            })?;
            write_frame(worksheet, *sheet, frame, &formats)?;
        }
        Ok(workbook)
    }

    fn write_summary(&self, worksheet: &mut Worksheet, formats: &Formats) -> FleetResult<()> {
        worksheet.set_name(SUMMARY_SHEET).map_err(|e| {
            FleetError::Export(format!("Failed to set worksheet name: {}", e))
        })?;

        for (col, field) in self.summary.fields().iter().enumerate() {
            let col = col as u16;
            worksheet
                .write_string_with_format(0, col, field.name, &formats.header)
                .map_err(|e| FleetError::Export(format!("Failed to write header: {}", e)))?;
            worksheet.set_column_width(col, 18)?;

            match (&field.value, formats.for_summary(&field.value)) {
                (SummaryValue::Text(s), _) => {
                    worksheet.write_string(1, col, s)?;
                }
                (
                    SummaryValue::Money(v) | SummaryValue::Liters(v) | SummaryValue::Kilometers(v),
                    Some(fmt),
                ) => {
                    worksheet.write_number_with_format(1, col, *v, fmt)?;
                }
                (
                    SummaryValue::Money(v) | SummaryValue::Liters(v) | SummaryValue::Kilometers(v),
                    None,
                ) => {
                    worksheet.write_number(1, col, *v)?;
                }
            }
        }
        Ok(())
    }
}

fn write_frame(
    worksheet: &mut Worksheet,
    sheet: FleetSheet,
    frame: &Frame,
    formats: &Formats,
) -> FleetResult<()> {
    for (col, name) in frame.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, name, &formats.header)
            .map_err(|e| FleetError::Export(format!("Failed to write header: {}", e)))?;
    }

    let column_formats: Vec<Option<&Format>> = frame
        .columns
        .iter()
        .map(|name| formats.for_column(sheet, name))
        .collect();

    for (idx, row) in frame.rows.iter().enumerate() {
        let r = idx as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let c = col as u16;
            match cell {
                CellValue::Empty => {}
                CellValue::Number(n) => match column_formats[col] {
                    Some(fmt) => {
                        worksheet.write_number_with_format(r, c, *n, fmt)?;
                    }
                    None => {
                        worksheet.write_number(r, c, *n)?;
                    }
                },
                CellValue::Text(s) => {
                    worksheet.write_string(r, c, s)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(r, c, *b)?;
                }
                CellValue::Date(d) => {
                    worksheet.write_string(r, c, format::date_fr(d))?;
                }
            }
        }
    }
    Ok(())
}
