//! Workbook data structures

/// A single cell value after ingestion.
///
/// Spreadsheet cells collapse to this tagged union; formulas are never kept,
/// only their computed value as decoded from the container.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellScalar {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellScalar {
    pub fn is_null(&self) -> bool {
        matches!(self, CellScalar::Null)
    }

    /// Treated as blank when building rows: missing cell or empty text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellScalar::Null => true,
            CellScalar::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Display-friendly rendering used for prompt context and table output.
    ///
    /// Integral floats print without a trailing `.0` so counts read like
    /// counts, not measurements.
    pub fn render(&self) -> String {
        match self {
            CellScalar::Null => String::new(),
            CellScalar::Bool(b) => b.to_string(),
            CellScalar::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellScalar::Text(s) => s.clone(),
        }
    }
}

/// One data row: an ordered mapping from column name to value.
///
/// Field order always matches the owning sheet's `columns`, and every column
/// is present (missing cells are filled with [`CellScalar::Null`] at
/// ingestion time).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    fields: Vec<(String, CellScalar)>,
}

impl Row {
    pub fn new(fields: Vec<(String, CellScalar)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&CellScalar> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &CellScalar> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellScalar)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when every field is blank; such rows are dropped at ingestion.
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, value)| value.is_blank())
    }
}

/// One named tab of a workbook.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Invariant check: every row carries exactly this sheet's columns,
    /// in order.
    pub fn rows_match_columns(&self) -> bool {
        self.rows
            .iter()
            .all(|row| row.columns().eq(self.columns.iter().map(String::as_str)))
    }
}

/// In-memory model of a parsed spreadsheet.
///
/// Non-empty by construction: ingestion fails with
/// [`IngestError::EmptyWorkbook`] rather than producing a workbook with no
/// sheets.
///
/// [`IngestError::EmptyWorkbook`]: crate::error::IngestError::EmptyWorkbook
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub file_name: String,
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Get a sheet by name
    pub fn get_sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Get all sheet names
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(|s| s.rows.len()).sum()
    }
}
