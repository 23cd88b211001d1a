use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, UInt8Type,
    UInt16Type, UInt32Type, UInt64Type,
};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Frame};

const USER_AGENT: &str = concat!("snap-scope/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Supported source encodings, chosen by the location's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
    Parquet,
}

impl SourceFormat {
    /// Detect the format from a path or URL (query string and fragment ignored).
    pub fn from_location(location: &str) -> Result<Self> {
        let trimmed = location
            .split(['?', '#'])
            .next()
            .unwrap_or(location);
        let ext = Path::new(trimmed)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "parquet" | "pq" => Ok(Self::Parquet),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => bail!("Unsupported source extension: .{other} ({location})"),
        }
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Load one source table from a URL or a local path.
///
/// Remote sources are fetched once with a blocking GET; any transport error or
/// non-success status is returned to the caller. There is no retry.
pub fn load_source(name: &str, location: &str) -> Result<Frame> {
    let format = SourceFormat::from_location(location)?;
    log::info!("Loading {name} from {location}");

    let frame = if is_remote(location) {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("building HTTP client")?;
        let body = client
            .get(location)
            .send()
            .with_context(|| format!("requesting {location}"))?
            .error_for_status()
            .with_context(|| format!("status for {location}"))?
            .bytes()
            .with_context(|| format!("reading body of {location}"))?;

        match format {
            SourceFormat::Csv => parse_csv(name, &body[..])?,
            SourceFormat::Json => parse_json(name, &body[..])?,
            SourceFormat::Parquet => parse_parquet(name, body)?,
        }
    } else {
        let file = std::fs::File::open(location)
            .with_context(|| format!("opening {location}"))?;
        match format {
            SourceFormat::Csv => parse_csv(name, file)?,
            SourceFormat::Json => parse_json(name, file)?,
            SourceFormat::Parquet => parse_parquet(name, file)?,
        }
    };

    log::info!(
        "Loaded {name}: {} rows, {} columns",
        frame.len(),
        frame.columns.len()
    );
    Ok(frame)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Cell types are guessed per value (see [`guess_cell_type`]).
pub fn parse_csv<R: Read>(name: &str, reader: R) -> Result<Frame> {
    let mut reader = csv::Reader::from_reader(reader);
    let columns: Vec<String> = reader
        .headers()
        .with_context(|| format!("reading {name} CSV headers"))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("{name} CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(Frame::new(name, columns, rows))
}

/// Interpret a text cell. Empty and `NA` are missing values (the R-based data
/// providers write `NA`).
pub fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() || s == "NA" {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    // Only numeric-looking text, so names like "Nan" stay strings.
    let numeric_start = s
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.'));
    if numeric_start {
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
    }
    if s == "true" || s == "false" || s == "TRUE" || s == "FALSE" {
        return CellValue::Bool(s.eq_ignore_ascii_case("true"));
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "pfr_id": "AlleJo02", "name": "Josh Allen", "gsis_id": "00-0034857" },
///   ...
/// ]
/// ```
///
/// Columns are the union of keys in first-seen order; absent keys read as null.
pub fn parse_json<R: Read>(name: &str, reader: R) -> Result<Frame> {
    let root: JsonValue =
        serde_json::from_reader(reader).with_context(|| format!("parsing {name} JSON"))?;

    let records = root
        .as_array()
        .with_context(|| format!("{name}: expected top-level JSON array"))?;

    let mut columns: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut objects = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("{name}: row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !index.contains_key(key) {
                index.insert(key.clone(), columns.len());
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .into_iter()
        .map(|obj| {
            let mut row = vec![CellValue::Null; columns.len()];
            for (key, val) in obj {
                row[index[key]] = json_to_cell(val);
            }
            row
        })
        .collect();

    Ok(Frame::new(name, columns, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet table. Every column becomes a frame column; nested or
/// exotic types fall back to their Arrow display string.
///
/// Works with files written by **Pandas**, **Polars** and the nflverse R tooling.
pub fn parse_parquet<R: ChunkReader + 'static>(name: &str, reader: R) -> Result<Frame> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(reader)
        .with_context(|| format!("reading {name} parquet metadata"))?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder
        .build()
        .with_context(|| format!("building {name} parquet reader"))?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.with_context(|| format!("reading {name} record batch"))?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("{name}: decoding row {}", rows.len()))?;
            rows.push(cells);
        }
    }

    Ok(Frame::new(name, columns, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Utf8View => CellValue::String(col.as_string_view().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v).map_or(CellValue::Float(v as f64), CellValue::Integer)
        }
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        // Dictionary-encoded strings, dates, lists...
        _ => CellValue::String(array_value_to_string(col.as_ref(), row)?),
    };
    Ok(cell)
}
