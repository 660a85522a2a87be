use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use super::model::{Dataset, Field, Record};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the `vgsales.csv` layout (recommended)
/// * `.json`    – `[{ "Rank": 1, "Name": "...", ... }, ...]`
/// * `.parquet` – flat columns named like the CSV header
///
/// Validation happens here: the query layer assumes every record it sees
/// has non-negative, finite sales and a positive rank.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            load_csv(file)
        }
        "json" => load_json(&std::fs::read_to_string(path).context("reading JSON file")?),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;
    log::info!(
        "Loaded {} records with columns {:?} from {}",
        dataset.len(),
        dataset.column_names(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// One CSV row before coercion. `Year` and `Publisher` use `N/A` for unknown.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Rank")]
    rank: i64,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Platform")]
    platform: String,
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "Genre")]
    genre: String,
    #[serde(rename = "Publisher")]
    publisher: String,
    #[serde(rename = "NA_Sales")]
    sales_na: f64,
    #[serde(rename = "EU_Sales")]
    sales_eu: f64,
    #[serde(rename = "JP_Sales")]
    sales_jp: f64,
    #[serde(rename = "Other_Sales")]
    sales_other: f64,
    #[serde(rename = "Global_Sales")]
    sales_global: f64,
}

/// Parse a CSV table with the source header from any reader.
pub fn load_csv<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(input);
    let mut records = Vec::new();

    // Row numbers in messages count data rows from 1.
    for (i, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row_no = i + 1;
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let record = Record {
            rank: parse_rank(row.rank, row_no)?,
            year: parse_year(&row.year).with_context(|| format!("CSV row {row_no}"))?,
            publisher: parse_publisher(&row.publisher),
            name: row.name,
            platform: row.platform,
            genre: row.genre,
            sales_na: row.sales_na,
            sales_eu: row.sales_eu,
            sales_jp: row.sales_jp,
            sales_other: row.sales_other,
            sales_global: row.sales_global,
        };
        check_sales(&record, row_no)?;
        records.push(record);
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Shared coercion
// ---------------------------------------------------------------------------

fn is_unknown(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s.eq_ignore_ascii_case("n/a") || s.eq_ignore_ascii_case("nan")
}

/// `2006`, `2006.0` → `Some(2006)`; `N/A` / empty → `None`.
fn parse_year(s: &str) -> Result<Option<i32>> {
    if is_unknown(s) {
        return Ok(None);
    }
    let s = s.trim();
    if let Ok(year) = s.parse::<i32>() {
        return Ok(Some(year));
    }
    match s.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.abs() < f64::from(i32::MAX) => Ok(Some(f as i32)),
        _ => bail!("'{s}' is not a year"),
    }
}

fn parse_publisher(s: &str) -> Option<String> {
    (!is_unknown(s)).then(|| s.trim().to_string())
}

fn parse_rank(rank: i64, row: usize) -> Result<u32> {
    match u32::try_from(rank) {
        Ok(r) if r > 0 => Ok(r),
        _ => bail!("Row {row}: rank {rank} is not a positive integer"),
    }
}

fn check_sales(record: &Record, row: usize) -> Result<()> {
    for field in Field::ALL {
        if let Some(sales) = field.as_sales() {
            let v = record.sales(sales);
            if !v.is_finite() || v < 0.0 {
                bail!("Row {row}: {field} = {v} is not a non-negative number");
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Rank": 1, "Name": "Wii Sports", "Platform": "Wii", "Year": 2006,
///     "Genre": "Sports", "Publisher": "Nintendo", "NA_Sales": 41.49, ... },
///   ...
/// ]
/// ```
///
/// `Year` and `Publisher` may be `null` or `"N/A"`.
pub fn load_json(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let i = idx + 1;
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let rank = obj
            .get(Field::Rank.header())
            .and_then(JsonValue::as_i64)
            .with_context(|| format!("Row {i}: missing or invalid 'Rank'"))?;

        let year = match obj.get(Field::Year.header()) {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::Number(n)) => parse_year(&n.to_string())?,
            Some(JsonValue::String(s)) => parse_year(s).with_context(|| format!("Row {i}"))?,
            Some(other) => bail!("Row {i}: 'Year' has unexpected value {other}"),
        };

        let publisher = match obj.get(Field::Publisher.header()) {
            Some(JsonValue::String(s)) => parse_publisher(s),
            _ => None,
        };

        let record = Record {
            rank: parse_rank(rank, i)?,
            name: json_text(obj, Field::Name, i)?,
            platform: json_text(obj, Field::Platform, i)?,
            year,
            genre: json_text(obj, Field::Genre, i)?,
            publisher,
            sales_na: json_number(obj, Field::SalesNa, i)?,
            sales_eu: json_number(obj, Field::SalesEu, i)?,
            sales_jp: json_number(obj, Field::SalesJp, i)?,
            sales_other: json_number(obj, Field::SalesOther, i)?,
            sales_global: json_number(obj, Field::SalesGlobal, i)?,
        };
        check_sales(&record, i)?;
        records.push(record);
    }

    Ok(Dataset::from_records(records))
}

fn json_text(obj: &Map<String, JsonValue>, field: Field, row: usize) -> Result<String> {
    match obj.get(field.header()) {
        Some(JsonValue::String(s)) => Ok(s.clone()),
        // Numeric-looking titles ("1942") come through as numbers.
        Some(JsonValue::Number(n)) => Ok(n.to_string()),
        _ => bail!("Row {row}: missing or invalid '{field}'"),
    }
}

fn json_number(obj: &Map<String, JsonValue>, field: Field, row: usize) -> Result<f64> {
    obj.get(field.header())
        .and_then(JsonValue::as_f64)
        .with_context(|| format!("Row {row}: missing or invalid '{field}'"))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the sales table.
///
/// Expected schema: one flat column per CSV header. Numeric columns may be any
/// integer or float type and text columns any string type; everything is cast
/// on read. `Year` and `Publisher` may be null.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let offset = records.len();

        let rank = cast_column(&batch, Field::Rank, &DataType::Int64)?;
        let rank = rank.as_primitive::<Int64Type>();
        let year = cast_column(&batch, Field::Year, &DataType::Float64)?;
        let year = year.as_primitive::<Float64Type>();

        let text: Vec<ArrayRef> = [Field::Name, Field::Platform, Field::Genre, Field::Publisher]
            .into_iter()
            .map(|f| cast_column(&batch, f, &DataType::Utf8))
            .collect::<Result<_>>()?;
        let name = text[0].as_string::<i32>();
        let platform = text[1].as_string::<i32>();
        let genre = text[2].as_string::<i32>();
        let publisher = text[3].as_string::<i32>();

        let sales: Vec<ArrayRef> = [
            Field::SalesNa,
            Field::SalesEu,
            Field::SalesJp,
            Field::SalesOther,
            Field::SalesGlobal,
        ]
        .into_iter()
        .map(|f| cast_column(&batch, f, &DataType::Float64))
        .collect::<Result<_>>()?;
        let na = sales[0].as_primitive::<Float64Type>();
        let eu = sales[1].as_primitive::<Float64Type>();
        let jp = sales[2].as_primitive::<Float64Type>();
        let other = sales[3].as_primitive::<Float64Type>();
        let global = sales[4].as_primitive::<Float64Type>();

        for row in 0..batch.num_rows() {
            let row_no = offset + row + 1;
            let required = [
                rank.is_null(row),
                name.is_null(row),
                platform.is_null(row),
                genre.is_null(row),
            ];
            let sales_null = [na, eu, jp, other, global].iter().any(|a| a.is_null(row));
            if required.contains(&true) || sales_null {
                bail!("Row {row_no}: null in a required column");
            }

            let year = if year.is_null(row) {
                None
            } else {
                parse_year(&year.value(row).to_string()).with_context(|| format!("Row {row_no}"))?
            };
            let publisher = if publisher.is_null(row) {
                None
            } else {
                parse_publisher(publisher.value(row))
            };

            let record = Record {
                rank: parse_rank(rank.value(row), row_no)?,
                name: name.value(row).to_string(),
                platform: platform.value(row).to_string(),
                year,
                genre: genre.value(row).to_string(),
                publisher,
                sales_na: na.value(row),
                sales_eu: eu.value(row),
                sales_jp: jp.value(row),
                sales_other: other.value(row),
                sales_global: global.value(row),
            };
            check_sales(&record, row_no)?;
            records.push(record);
        }
    }

    Ok(Dataset::from_records(records))
}

// -- Parquet / Arrow helpers --

/// Look up a column by its CSV header and cast it to `to`.
fn cast_column(batch: &RecordBatch, field: Field, to: &DataType) -> Result<ArrayRef> {
    let col = batch
        .column_by_name(field.header())
        .with_context(|| format!("Parquet file missing '{field}' column"))?;
    cast(col.as_ref(), to).with_context(|| format!("column '{field}' cannot be read as {to:?}"))
}
