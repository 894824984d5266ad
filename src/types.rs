use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;

//==============================================================================
// Cell values
//==============================================================================

/// A single cleaned cell of a fleet sheet
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Text used to compare and group cells (plates, directions, categories).
    ///
    /// Integer-valued numbers drop their fractional part so that a plate typed
    /// as `1234` matches the text `"1234"`.
    pub fn to_key(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

//==============================================================================
// Frames
//==============================================================================

/// A cleaned worksheet: ordered columns and rows of cells.
///
/// Rows always have exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Frame {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a frame, padding or truncating rows to the column count
    pub fn with_rows(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// An empty frame with the same name and columns
    pub fn empty_like(&self) -> Self {
        Self::new(self.name.clone(), self.columns.clone())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    pub fn number_at(&self, row: usize, column: &str) -> Option<f64> {
        self.cell(row, column).and_then(CellValue::as_number)
    }

    pub fn date_at(&self, row: usize, column: &str) -> Option<NaiveDateTime> {
        self.cell(row, column).and_then(CellValue::as_date)
    }

    /// Key text of a cell, `None` when the column is missing or the cell empty
    pub fn text_at(&self, row: usize, column: &str) -> Option<String> {
        self.cell(row, column)
            .filter(|c| !c.is_empty())
            .map(CellValue::to_key)
    }

    pub fn column_values<'a>(&'a self, column: &str) -> impl Iterator<Item = &'a CellValue> + 'a {
        let idx = self.column_index(column);
        self.rows
            .iter()
            .filter_map(move |row| idx.and_then(|i| row.get(i)))
    }

    /// Sum of the numeric cells of a column; a missing column sums to 0
    pub fn sum(&self, column: &str) -> f64 {
        self.column_values(column)
            .filter_map(CellValue::as_number)
            .sum()
    }

    /// Distinct non-empty keys of a column, in first-seen order
    pub fn unique_texts(&self, column: &str) -> Vec<String> {
        let mut seen = Vec::new();
        for cell in self.column_values(column) {
            if cell.is_empty() {
                continue;
            }
            let key = cell.to_key();
            if !seen.contains(&key) {
                seen.push(key);
            }
        }
        seen
    }

    pub fn filter_rows<F>(&self, predicate: F) -> Frame
    where
        F: Fn(&[CellValue]) -> bool,
    {
        Frame {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| predicate(row))
                .cloned()
                .collect(),
        }
    }

    /// Rows whose `column` key equals `value`; no rows when the column is missing
    pub fn filter_eq(&self, column: &str, value: &str) -> Frame {
        match self.column_index(column) {
            Some(idx) => self.filter_rows(|row| row[idx].to_key() == value),
            None => self.empty_like(),
        }
    }

    /// Stable sort on a date column; rows without a date go last either way
    pub fn sort_by_date(&self, column: &str, descending: bool) -> Frame {
        let mut sorted = self.clone();
        if let Some(idx) = self.column_index(column) {
            sorted.rows.sort_by(|a, b| {
                match (a[idx].as_date(), b[idx].as_date()) {
                    (Some(x), Some(y)) => {
                        if descending {
                            y.cmp(&x)
                        } else {
                            x.cmp(&y)
                        }
                    }
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            });
        }
        sorted
    }

    /// Sum `value` per distinct `key`, keys in first-seen order.
    ///
    /// Rows with an empty key are skipped. Returns nothing if either column
    /// is missing.
    pub fn group_sum(&self, key: &str, value: &str) -> Vec<(String, f64)> {
        let (Some(k), Some(v)) = (self.column_index(key), self.column_index(value)) else {
            return Vec::new();
        };
        let mut groups: Vec<(String, f64)> = Vec::new();
        for row in &self.rows {
            if row[k].is_empty() {
                continue;
            }
            let label = row[k].to_key();
            let amount = row[v].as_number().unwrap_or(0.0);
            match groups.iter_mut().find(|(l, _)| *l == label) {
                Some((_, total)) => *total += amount,
                None => groups.push((label, amount)),
            }
        }
        groups
    }

    /// Append a column; `values` is padded with empties to the row count
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<CellValue>) {
        self.columns.push(name.into());
        let mut values = values.into_iter();
        for row in &mut self.rows {
            row.push(values.next().unwrap_or(CellValue::Empty));
        }
    }

    /// True if the column has at least one date and nothing but dates/empties
    pub fn is_date_column(&self, idx: usize) -> bool {
        let mut any = false;
        for row in &self.rows {
            match &row[idx] {
                CellValue::Date(_) => any = true,
                cell if cell.is_empty() => {}
                _ => return false,
            }
        }
        any
    }

    /// True if every non-empty cell of the column is a number
    pub fn is_numeric_column(&self, idx: usize) -> bool {
        let mut any = false;
        for row in &self.rows {
            match &row[idx] {
                CellValue::Number(_) => any = true,
                CellValue::Empty => {}
                _ => return false,
            }
        }
        any
    }

    /// Index of the first date-typed column
    pub fn first_date_column(&self) -> Option<usize> {
        (0..self.columns.len()).find(|&idx| self.is_date_column(idx))
    }

    /// Single-row frame for row `idx`
    pub fn row_frame(&self, idx: usize) -> Frame {
        Frame {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self.rows.get(idx).cloned().into_iter().collect(),
        }
    }
}

//==============================================================================
// Loaded workbook
//==============================================================================

/// Row count of a loaded sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetStats {
    pub name: String,
    pub rows: usize,
}

/// Every cleaned sheet of a workbook, in workbook order
#[derive(Debug, Clone, Default)]
pub struct FleetData {
    pub frames: Vec<Frame>,
    /// MD5 hex digest of the workbook bytes
    pub hash: String,
}

impl FleetData {
    pub fn get(&self, sheet: &str) -> Option<&Frame> {
        self.frames.iter().find(|f| f.name == sheet)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.frames.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn stats(&self) -> Vec<SheetStats> {
        self.frames
            .iter()
            .map(|f| SheetStats {
                name: f.name.clone(),
                rows: f.len(),
            })
            .collect()
    }
}
