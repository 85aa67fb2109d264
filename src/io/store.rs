//! Flat-file pricing table.
//!
//! The table is a CSV with a fixed header. Reads are header-addressed (so a
//! hand-reordered file still loads), writes always emit the canonical column
//! order with every column present.
//!
//! Appending rewrites the whole file: read everything, push one row, write
//! everything back. That is O(rows) per append and not atomic, so only one
//! writer may touch the table at a time.

use std::collections::HashMap;
use std::fs::File;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use log::debug;

use crate::domain::{BusinessModel, PricingRecord, Product, ValidationStatus};
use crate::error::AppError;

pub const COL_DATE: &str = "Fecha";
pub const COL_SOURCE: &str = "Fuente";
pub const COL_PRODUCT: &str = "Producto";
pub const COL_MODEL: &str = "Modelo_Negocio";
pub const COL_PRICE_MIN: &str = "Precio_Min_USD";
pub const COL_PRICE_MAX: &str = "Precio_Max_USD";
pub const COL_COST_MIN: &str = "Costo_Min_USD";
pub const COL_COST_MAX: &str = "Costo_Max_USD";
pub const COL_ROI_MIN: &str = "ROI_Min_%";
pub const COL_ROI_MAX: &str = "ROI_Max_%";
pub const COL_NOTES: &str = "Notas";
pub const COL_STATUS: &str = "Validado";

/// Canonical column order of the table file.
pub const COLUMNS: [&str; 12] = [
    COL_DATE,
    COL_SOURCE,
    COL_PRODUCT,
    COL_MODEL,
    COL_PRICE_MIN,
    COL_PRICE_MAX,
    COL_COST_MIN,
    COL_COST_MAX,
    COL_ROI_MIN,
    COL_ROI_MAX,
    COL_NOTES,
    COL_STATUS,
];

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct PricingStore {
    path: PathBuf,
}

impl PricingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row in file order.
    ///
    /// A missing file is reported as a `NotFound` error; callers decide
    /// whether that means "empty".
    pub fn read_all(&self) -> Result<Vec<PricingRecord>, AppError> {
        let file = File::open(&self.path).map_err(|e| {
            let message = format!("Failed to open pricing table '{}': {e}", self.path.display());
            if e.kind() == IoErrorKind::NotFound {
                AppError::not_found(message)
            } else {
                AppError::io(message)
            }
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| AppError::parse(format!("Failed to read pricing table headers: {e}")))?
            .clone();
        // A zero-byte file is an empty table; the next append writes the header.
        if headers.is_empty() {
            debug!("Pricing table {} is empty", self.path.display());
            return Ok(Vec::new());
        }
        let header_map = build_header_map(&headers);
        ensure_required_columns_exist(&header_map)?;

        let mut records = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            // records() starts after the header line; lines are 1-based.
            let line = idx + 2;
            let record = result.map_err(|e| AppError::parse(format!("Pricing table line {line}: {e}")))?;
            let row = parse_row(&record, &header_map)
                .map_err(|e| AppError::parse(format!("Pricing table line {line}: {e}")))?;
            records.push(row);
        }

        debug!("Read {} rows from {}", records.len(), self.path.display());
        Ok(records)
    }

    /// Rows for exactly this (product, model) pair, in file order.
    pub fn history_for(&self, product: Product, business_model: BusinessModel) -> Result<Vec<PricingRecord>, AppError> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|r| r.matches(product, business_model))
            .collect())
    }

    /// Append one row by rewriting the full table. A missing file starts a new table.
    pub fn append_row(&self, record: &PricingRecord) -> Result<(), AppError> {
        let mut records = match self.read_all() {
            Ok(records) => records,
            Err(err) if err.is_not_found() => Vec::new(),
            Err(err) => return Err(err),
        };
        records.push(record.clone());
        self.write_all(&records)
    }

    /// Replace the table contents with `records`.
    pub fn write_all(&self, records: &[PricingRecord]) -> Result<(), AppError> {
        let file = File::create(&self.path).map_err(|e| {
            AppError::io(format!("Failed to create pricing table '{}': {e}", self.path.display()))
        })?;
        let mut writer = csv::Writer::from_writer(file);

        writer
            .write_record(COLUMNS)
            .map_err(|e| AppError::io(format!("Failed to write pricing table header: {e}")))?;

        for r in records {
            writer
                .write_record([
                    r.date.format(DATE_FORMAT).to_string(),
                    r.source.clone(),
                    r.product.as_str().to_string(),
                    r.business_model.as_str().to_string(),
                    fmt_opt(r.price_min),
                    fmt_opt(r.price_max),
                    fmt_opt(r.cost_min),
                    fmt_opt(r.cost_max),
                    fmt_opt(r.roi_min),
                    fmt_opt(r.roi_max),
                    r.notes.clone(),
                    r.status.as_str().to_string(),
                ])
                .map_err(|e| AppError::io(format!("Failed to write pricing table row: {e}")))?;
        }

        writer
            .flush()
            .map_err(|e| AppError::io(format!("Failed to flush pricing table '{}': {e}", self.path.display())))?;
        Ok(())
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    for column in COLUMNS {
        if !header_map.contains_key(&normalize_header_name(column)) {
            return Err(AppError::parse(format!("Pricing table is missing column `{column}`")));
        }
    }
    Ok(())
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<PricingRecord, String> {
    let date = parse_date(get_required(record, header_map, COL_DATE)?)?;

    let product_raw = get_required(record, header_map, COL_PRODUCT)?;
    let product = Product::parse(product_raw).ok_or_else(|| format!("Unknown product '{product_raw}'"))?;

    let model_raw = get_required(record, header_map, COL_MODEL)?;
    let business_model =
        BusinessModel::parse(model_raw).ok_or_else(|| format!("Unknown business model '{model_raw}'"))?;

    let status_raw = get_required(record, header_map, COL_STATUS)?;
    let status =
        ValidationStatus::parse(status_raw).ok_or_else(|| format!("Unknown validation status '{status_raw}'"))?;

    Ok(PricingRecord {
        date,
        source: get_text(record, header_map, COL_SOURCE),
        product,
        business_model,
        price_min: parse_opt_f64(record, header_map, COL_PRICE_MIN)?,
        price_max: parse_opt_f64(record, header_map, COL_PRICE_MAX)?,
        cost_min: parse_opt_f64(record, header_map, COL_COST_MIN)?,
        cost_max: parse_opt_f64(record, header_map, COL_COST_MAX)?,
        roi_min: parse_opt_f64(record, header_map, COL_ROI_MIN)?,
        roi_max: parse_opt_f64(record, header_map, COL_ROI_MAX)?,
        notes: get_text(record, header_map, COL_NOTES),
        status,
    })
}

fn column<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(&normalize_header_name(name))?;
    record.get(*idx)
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    column(record, header_map, name)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_text(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> String {
    column(record, header_map, name).unwrap_or_default().to_string()
}

/// Empty cells are `None`; anything else must be a finite number.
fn parse_opt_f64(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Result<Option<f64>, String> {
    let Some(raw) = column(record, header_map, name).map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(format!("Invalid number '{raw}' in `{name}`")),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| format!("Invalid date '{s}'. Expected YYYY-MM-DD."))
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}
