// 📂 Dataset Loader
// Reads the suburb spreadsheet (xlsx/xls/ods via calamine, csv via csv) into an
// immutable in-memory table. Row order is preserved; trend charts use it as time.

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("data file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("unsupported data file format: {0:?} (expected .xlsx, .xlsm, .xls, .ods or .csv)")]
    UnsupportedFormat(PathBuf),

    #[error("sheet '{sheet}' not found (available: {})", available.join(", "))]
    SheetNotFound { sheet: String, available: Vec<String> },

    #[error("failed to read workbook {path:?}: {message}")]
    Workbook { path: PathBuf, message: String },

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("data has no header row")]
    NoHeader,

    #[error("required column missing: {0:?}")]
    MissingColumn(String),

    #[error("data row {row} has {found} values but the header has {expected} columns")]
    RaggedRow { row: usize, expected: usize, found: usize },
}

// ============================================================================
// CELLS
// ============================================================================

/// One raw spreadsheet value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Parse a CSV field the way a dataframe reader would: numbers become numbers
    pub fn from_field(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_nan() => Cell::Empty,
            Ok(n) => Cell::Number(n),
            Err(_) => Cell::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.trim().is_empty() => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(n) => write!(f, "{}", format_number(*n)),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Integers print without a trailing `.0`
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) if f.is_nan() => Cell::Empty,
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) if s.trim().is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Bool(b) => Cell::Bool(*b),
            other => Cell::Text(other.to_string()),
        }
    }
}

// ============================================================================
// FIELDS (column labels as they appear in the source spreadsheet)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    State,
    Region,
    SubRegion,
    Suburb,
    PropertyType,
    Yield,
    InvestorScore,
    Growth12m,
    Latitude,
    Longitude,
    MedianPriceGrowth,
    DaysOnMarket,
    RentalGrowth,
    SalesTurnover,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::State,
        Field::Region,
        Field::SubRegion,
        Field::Suburb,
        Field::PropertyType,
        Field::Yield,
        Field::InvestorScore,
        Field::Growth12m,
        Field::Latitude,
        Field::Longitude,
        Field::MedianPriceGrowth,
        Field::DaysOnMarket,
        Field::RentalGrowth,
        Field::SalesTurnover,
    ];

    /// Label exactly as written in the original workbook
    pub fn label(&self) -> &'static str {
        match self {
            Field::State => "State",
            Field::Region => "Region\n(SA4)",
            Field::SubRegion => "Sub Region\n(SA3)",
            Field::Suburb => "Suburb",
            Field::PropertyType => "Property\nType",
            Field::Yield => "Yield",
            Field::InvestorScore => "Investor Score (Out Of 100)",
            Field::Growth12m => "12m Growth (%)",
            Field::Latitude => "Latitude",
            Field::Longitude => "Longitude",
            Field::MedianPriceGrowth => "Median Price Growth",
            Field::DaysOnMarket => "Days on Market",
            Field::RentalGrowth => "Rental Growth",
            Field::SalesTurnover => "Sales Turnover",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(
            self,
            Field::State
                | Field::Region
                | Field::SubRegion
                | Field::Suburb
                | Field::Yield
                | Field::InvestorScore
                | Field::Growth12m
        )
    }
}

/// Collapse whitespace runs (including the line breaks in multi-line headers)
pub fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// RECORDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SuburbRecord {
    pub state: Option<String>,
    pub region: Option<String>,
    pub sub_region: Option<String>,
    pub suburb: Option<String>,
    pub property_type: Option<String>,
    pub yield_pct: Option<f64>,
    pub investor_score: Option<f64>,
    pub growth_12m: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub median_price_growth: Option<f64>,
    pub days_on_market: Option<f64>,
    pub rental_growth: Option<f64>,
    pub sales_turnover: Option<f64>,

    /// Every cell of the source row, aligned with `Dataset::columns`
    pub cells: Vec<Cell>,
}

impl SuburbRecord {
    pub fn text(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::State => &self.state,
            Field::Region => &self.region,
            Field::SubRegion => &self.sub_region,
            Field::Suburb => &self.suburb,
            Field::PropertyType => &self.property_type,
            _ => return None,
        };
        value.as_deref()
    }

    pub fn number(&self, field: Field) -> Option<f64> {
        match field {
            Field::Yield => self.yield_pct,
            Field::InvestorScore => self.investor_score,
            Field::Growth12m => self.growth_12m,
            Field::Latitude => self.latitude,
            Field::Longitude => self.longitude,
            Field::MedianPriceGrowth => self.median_price_growth,
            Field::DaysOnMarket => self.days_on_market,
            Field::RentalGrowth => self.rental_growth,
            Field::SalesTurnover => self.sales_turnover,
            _ => None,
        }
    }

    fn set(&mut self, field: Field, cell: &Cell) {
        match field {
            Field::State => self.state = cell.as_text(),
            Field::Region => self.region = cell.as_text(),
            Field::SubRegion => self.sub_region = cell.as_text(),
            Field::Suburb => self.suburb = cell.as_text(),
            Field::PropertyType => self.property_type = cell.as_text(),
            Field::Yield => self.yield_pct = cell.as_f64(),
            Field::InvestorScore => self.investor_score = cell.as_f64(),
            Field::Growth12m => self.growth_12m = cell.as_f64(),
            Field::Latitude => self.latitude = cell.as_f64(),
            Field::Longitude => self.longitude = cell.as_f64(),
            Field::MedianPriceGrowth => self.median_price_growth = cell.as_f64(),
            Field::DaysOnMarket => self.days_on_market = cell.as_f64(),
            Field::RentalGrowth => self.rental_growth = cell.as_f64(),
            Field::SalesTurnover => self.sales_turnover = cell.as_f64(),
        }
    }
}

// ============================================================================
// DATASET
// ============================================================================

#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<SuburbRecord>,
    field_index: HashMap<Field, usize>,
    pub source: PathBuf,
    pub sheet: Option<String>,
    /// SHA-256 of the source bytes
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
}

impl Dataset {
    /// Build a dataset from a header row and raw rows. Short rows are padded
    /// with empty cells and trailing empty cells are dropped; a value past the
    /// last header column is an error. Required columns must be present.
    pub fn from_table(columns: Vec<String>, raw_rows: Vec<Vec<Cell>>) -> Result<Self, DatasetError> {
        let mut field_index = HashMap::new();
        for field in Field::ALL {
            let wanted = normalize_label(field.label());
            if let Some(idx) = columns.iter().position(|c| normalize_label(c) == wanted) {
                field_index.insert(field, idx);
            } else if field.is_required() {
                return Err(DatasetError::MissingColumn(field.label().to_string()));
            }
        }

        let width = columns.len();
        let mut rows = Vec::with_capacity(raw_rows.len());
        for (n, mut cells) in raw_rows.into_iter().enumerate() {
            if cells[width.min(cells.len())..].iter().any(|c| !c.is_empty()) {
                return Err(DatasetError::RaggedRow {
                    row: n + 1,
                    expected: width,
                    found: cells.len(),
                });
            }
            cells.resize(width, Cell::Empty);

            let mut record = SuburbRecord::default();
            for (field, idx) in &field_index {
                record.set(*field, &cells[*idx]);
            }
            record.cells = cells;
            rows.push(record);
        }

        Ok(Dataset {
            columns,
            rows,
            field_index,
            source: PathBuf::new(),
            sheet: None,
            fingerprint: String::new(),
            loaded_at: Utc::now(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[SuburbRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.field_index.contains_key(&field)
    }

    /// Look up a column by its label; multi-line and one-line forms both match
    pub fn column_index(&self, label: &str) -> Option<usize> {
        let wanted = normalize_label(label);
        self.columns.iter().position(|c| normalize_label(c) == wanted)
    }

    /// Non-null values of a numeric field, in row order
    pub fn numbers(&self, field: Field) -> Vec<f64> {
        self.rows.iter().filter_map(|r| r.number(field)).collect()
    }

    /// Distinct non-null values of a categorical field, in first-occurrence order
    pub fn distinct(&self, field: Field) -> Vec<String> {
        distinct_in(self.rows.iter(), field)
    }

    /// All rows of one suburb with their dataset positions, in original order
    pub fn rows_for_suburb(&self, suburb: &str) -> Vec<(usize, &SuburbRecord)> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.suburb.as_deref() == Some(suburb))
            .collect()
    }
}

pub(crate) fn distinct_in<'a, I>(rows: I, field: Field) -> Vec<String>
where
    I: Iterator<Item = &'a SuburbRecord>,
{
    let mut seen = std::collections::HashSet::new();
    let mut values = Vec::new();
    for value in rows.filter_map(|r| r.text(field)) {
        if seen.insert(value) {
            values.push(value.to_string());
        }
    }
    values
}

// ============================================================================
// LOADING
// ============================================================================

/// Load the dataset from `path`. `sheet` selects the worksheet of a workbook.
pub fn load_dataset(path: &Path, sheet: &str) -> Result<Dataset, DatasetError> {
    if !path.exists() {
        return Err(DatasetError::NotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let (mut dataset, sheet_used) = match extension.as_str() {
        "csv" => (load_csv(path)?, None),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => (load_workbook(path, sheet)?, Some(sheet.to_string())),
        _ => return Err(DatasetError::UnsupportedFormat(path.to_path_buf())),
    };

    let bytes = fs::read(path)?;
    dataset.fingerprint = format!("{:x}", Sha256::digest(&bytes));
    dataset.source = path.to_path_buf();
    dataset.sheet = sheet_used;

    info!(
        path = %path.display(),
        rows = dataset.len(),
        columns = dataset.columns().len(),
        fingerprint = %&dataset.fingerprint[..12],
        loaded_at = %dataset.loaded_at.to_rfc3339(),
        "dataset loaded"
    );

    Ok(dataset)
}

pub fn load_csv(csv_path: &Path) -> Result<Dataset, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(csv_path)?;

    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if columns.is_empty() {
        return Err(DatasetError::NoHeader);
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(Cell::from_field).collect());
    }

    Dataset::from_table(columns, rows)
}

pub fn load_workbook(path: &Path, sheet: &str) -> Result<Dataset, DatasetError> {
    let workbook_error = |e: calamine::Error| DatasetError::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;

    let available = workbook.sheet_names();
    if !available.iter().any(|name| name == sheet) {
        return Err(DatasetError::SheetNotFound {
            sheet: sheet.to_string(),
            available,
        });
    }

    let range = workbook.worksheet_range(sheet).map_err(workbook_error)?;
    let mut rows = range.rows();

    let columns: Vec<String> = rows
        .next()
        .ok_or(DatasetError::NoHeader)?
        .iter()
        .map(|c| Cell::from(c).to_string())
        .collect();

    let body = rows.map(|row| row.iter().map(Cell::from).collect()).collect();

    Dataset::from_table(columns, body)
}

// ============================================================================
// CACHE
// ============================================================================

/// Memoised loads keyed by (path, sheet).
///
/// One cache serves the whole process, so every session sees the same
/// `Arc<Dataset>`. There is no per-user partition. Failed loads are not cached.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<(PathBuf, String), Arc<Dataset>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&self, path: &Path, sheet: &str) -> Result<Arc<Dataset>, DatasetError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let key = (path.to_path_buf(), sheet.to_string());

        if let Some(dataset) = entries.get(&key) {
            debug!(path = %path.display(), "dataset cache hit");
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(load_dataset(path, sheet)?);
        entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
