use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{Cell, ContractTable, RawTable};
use super::xlsx;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the base table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx`    – Excel workbook; rows are read from worksheet `sheet`
/// * `.csv`     – header row plus records
/// * `.json`    – `[{ "Provider": "...", "Contract Value": 1200.0, ... }, ...]`
/// * `.parquet` – flat columns named like the workbook headers
///
/// `sheet` only applies to workbooks.
pub fn load_file(path: &Path, sheet: &str) -> Result<ContractTable, LoadError> {
    if !path.is_file() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "xlsx" | "xlsm" => xlsx::read_sheet(path, sheet)?,
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    let table = ContractTable::from_raw(raw)?;
    log::info!(
        "Loaded {} contract rows from {} ({} org types, {} categories, {} ratings)",
        table.len(),
        path.display(),
        table.org_types.len(),
        table.categories.len(),
        table.ratings.len()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with the workbook column names, one contract per record.
/// Empty fields are missing values.
fn read_csv(path: &Path) -> Result<RawTable, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, as written by `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Provider": "Acme Care", "OrgType": "Independent Ltd/LLP/Co.", "Contract Value": 1200.0 },
///   ...
/// ]
/// ```
///
/// Keys missing from an object read as empty cells.
fn read_json(path: &Path) -> Result<RawTable, LoadError> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected top-level JSON array".to_string()))?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Malformed(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(Cell::Empty))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) if s.is_empty() => Cell::Empty,
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => n.as_f64().map(Cell::Number).unwrap_or_else(|| Cell::Text(n.to_string())),
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per workbook header.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn read_parquet(path: &Path) -> Result<RawTable, LoadError> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| arrow_cell(col, row))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(cells);
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> Result<Cell, LoadError> {
    if col.is_null(row) {
        return Ok(Cell::Empty);
    }
    let mismatch = || LoadError::Malformed(format!("column type {:?} does not match its data", col.data_type()));
    let cell = match col.data_type() {
        DataType::Utf8 => {
            let s = col.as_string_opt::<i32>().ok_or_else(mismatch)?.value(row);
            if s.is_empty() { Cell::Empty } else { Cell::Text(s.to_string()) }
        }
        DataType::LargeUtf8 => {
            let s = col.as_string_opt::<i64>().ok_or_else(mismatch)?.value(row);
            if s.is_empty() { Cell::Empty } else { Cell::Text(s.to_string()) }
        }
        DataType::Int32 => Cell::Number(col.as_primitive_opt::<Int32Type>().ok_or_else(mismatch)?.value(row) as f64),
        DataType::Int64 => Cell::Number(col.as_primitive_opt::<Int64Type>().ok_or_else(mismatch)?.value(row) as f64),
        DataType::Float32 => Cell::Number(col.as_primitive_opt::<Float32Type>().ok_or_else(mismatch)?.value(row) as f64),
        DataType::Float64 => Cell::Number(col.as_primitive_opt::<Float64Type>().ok_or_else(mismatch)?.value(row)),
        DataType::Boolean => Cell::Bool(col.as_boolean_opt().ok_or_else(mismatch)?.value(row)),
        _ => Cell::Text(array_value_to_string(col, row)?),
    };
    Ok(cell)
}
