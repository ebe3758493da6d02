use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::columns::{ColumnMap, Field};
use super::record::{Metric, VehicleRecord};
use super::Table;
use crate::error::{Error, Result};

/// Header of the free-text note column; never carried into records
const MISSING_DATA_NOTE: &str = "nota sobre os dados faltantes";

/// How to read the backing table.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub delimiter: u8,
    /// Extra header spellings per field, tried after the built-in ones
    pub extra_columns: HashMap<Field, Vec<String>>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            extra_columns: HashMap::new(),
        }
    }
}

/// Load and resolve the vehicle table at `path`.
///
/// # Errors
///
/// - `Error::NotFound` if the file does not exist
/// - `Error::Parse` if it cannot be read as delimited text
/// - `Error::Schema` if brand, model or year cannot be resolved
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<Table> {
    if !path.exists() {
        return Err(Error::NotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|e| Error::Parse {
        path: path.to_path_buf(),
        cause: e.to_string(),
    })?;

    read_table(file, path, options)
}

/// Parse a vehicle table from any reader. `origin` is only used in errors.
pub fn read_table<R: Read>(reader: R, origin: &Path, options: &LoadOptions) -> Result<Table> {
    let parse_error = |cause: String| Error::Parse {
        path: PathBuf::from(origin),
        cause,
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| parse_error(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let columns = ColumnMap::build(&headers, &options.extra_columns);
    if let Some(field) = columns.missing_mandatory() {
        return Err(Error::Schema {
            field: field.name(),
        });
    }
    for field in Field::ALL {
        if !columns.contains(field) {
            debug!(field = field.name(), "column not resolved");
        }
    }
    if headers.iter().any(|h| h.eq_ignore_ascii_case(MISSING_DATA_NOTE)) {
        debug!("skipping note column '{}'", MISSING_DATA_NOTE);
    }

    let mut rows = Vec::new();
    let mut seen = HashSet::new();
    for (row, result) in csv_reader.records().enumerate() {
        let cells = result.map_err(|e| parse_error(e.to_string()))?;
        let record = build_record(row, &cells, &columns);

        let key = record.key();
        let owned_key = (
            key.0.to_string(),
            key.1.to_string(),
            key.2.to_string(),
            key.3.map(str::to_string),
        );
        if !seen.insert(owned_key) {
            warn!(
                brand = %record.brand,
                model = %record.model,
                year = %record.year_text,
                "duplicate vehicle in table"
            );
        }
        rows.push(record);
    }

    debug!(rows = rows.len(), columns = headers.len(), "vehicle table loaded");
    Ok(Table::new(headers, columns, rows))
}

fn build_record(row: usize, cells: &csv::StringRecord, columns: &ColumnMap) -> VehicleRecord {
    let cell = |field: Field| -> Option<&str> {
        columns
            .get(field)
            .and_then(|c| cells.get(c.index))
            .map(str::trim)
    };
    let text = |field: Field| -> Option<String> {
        cell(field).filter(|s| !s.is_empty()).map(str::to_string)
    };
    let number = |field: Field| -> Option<f64> { cell(field).and_then(parse_number) };

    let year_text = cell(Field::Year).unwrap_or_default().to_uppercase();
    let mut record = VehicleRecord::new(
        row,
        cell(Field::Brand).unwrap_or_default(),
        cell(Field::Model).unwrap_or_default(),
        parse_year(&year_text),
    );
    record.year_text = year_text;

    record.code = text(Field::Code);
    record.trim = text(Field::Trim);
    record.category = text(Field::Category);
    record.engine = text(Field::Engine);
    record.transmission = text(Field::Transmission);
    record.air_conditioning = text(Field::AirConditioning);
    record.power_steering = text(Field::PowerSteering);
    record.fuel = text(Field::Fuel);

    for metric in Metric::ALL {
        record.set_metric(metric, number(metric.field()));
    }
    record.city_ethanol = number(Field::CityEthanol);
    record.highway_ethanol = number(Field::HighwayEthanol);
    record.city_gasoline = number(Field::CityGasoline);
    record.highway_gasoline = number(Field::HighwayGasoline);

    record.final_score = columns
        .final_score()
        .and_then(|c| cells.get(c.index))
        .and_then(parse_number);

    record
}

/// Parse a numeric cell. Accepts `,` as decimal separator; anything that
/// is not a finite number is undefined.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let owned;
    let s = if s.contains(',') && !s.contains('.') {
        owned = s.replace(',', ".");
        owned.as_str()
    } else {
        s
    };
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integer year, tolerating spreadsheet floats like "2023.0"
fn parse_year(raw: &str) -> Option<i32> {
    let s = raw.trim();
    if let Ok(year) = s.parse::<i32>() {
        return Some(year);
    }
    parse_number(s)
        .filter(|v| v.fract() == 0.0 && v.abs() < i32::MAX as f64)
        .map(|v| v as i32)
}
