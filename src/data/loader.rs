use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray,
    StringArray, UInt32Array, UInt64Array,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CostField, CostRecord, RecordStore, UNIT_COST_ALIASES, UNIT_COST_COLUMN};
use crate::error::DataLoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a cost dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line (UTF-8, BOM tolerated)
/// * `.json`    – `[{ "地区": "...", "所属行业": "...", ... }, ...]`
/// * `.parquet` – flat string / numeric columns
///
/// Every format must carry the region, industry, pollutant type and unit
/// cost columns (English or Chinese headers); anything else is
/// ignored.
pub fn load_file(path: &Path) -> Result<RecordStore, DataLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if !path.exists() {
        return Err(DataLoadError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }

    let table = match ext.as_str() {
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => return Err(DataLoadError::UnsupportedFormat(other.to_string())),
    };

    bind_records(table)
}

// ---------------------------------------------------------------------------
// Raw table – what every format reader produces
// ---------------------------------------------------------------------------

/// A single untyped cell as read from the source file.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Number(f64),
    Null,
}

/// Column names plus rows of cells, before schema validation.
#[derive(Debug, Default)]
struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    fn column_index(&self, aliases: &[&str]) -> Option<usize> {
        self.columns.iter().position(|c| {
            let c = normalize_header(c);
            aliases.iter().any(|a| c.eq_ignore_ascii_case(a))
        })
    }
}

fn normalize_header(h: &str) -> &str {
    h.trim_start_matches('\u{feff}').trim()
}

// ---------------------------------------------------------------------------
// Schema binding: RawTable → RecordStore
// ---------------------------------------------------------------------------

fn bind_records(table: RawTable) -> Result<RecordStore, DataLoadError> {
    let [region_idx, industry_idx, pollutant_idx] = CostField::ALL.map(|field| {
        table
            .column_index(field.header_aliases())
            .ok_or(DataLoadError::MissingColumn(field.name()))
    });
    let (region_idx, industry_idx, pollutant_idx) = (region_idx?, industry_idx?, pollutant_idx?);
    let cost_idx = table
        .column_index(UNIT_COST_ALIASES)
        .ok_or(DataLoadError::MissingColumn(UNIT_COST_COLUMN))?;

    let mut records = Vec::with_capacity(table.rows.len());
    for (row_no, row) in table.rows.iter().enumerate() {
        let cell = |idx: usize| row.get(idx).unwrap_or(&Cell::Null);
        records.push(CostRecord {
            region: label_from_cell(cell(region_idx)),
            industry: label_from_cell(cell(industry_idx)),
            pollutant_type: label_from_cell(cell(pollutant_idx)),
            unit_cost: cost_from_cell(cell(cost_idx), row_no + 1)?,
        });
    }

    Ok(RecordStore::from_records(records))
}

fn label_from_cell(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Text(s) if s.trim().is_empty() => None,
        Cell::Text(s) => Some(s.clone()),
        Cell::Number(v) if v.is_nan() => None,
        Cell::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => Some(format!("{}", *v as i64)),
        Cell::Number(v) => Some(v.to_string()),
        Cell::Null => None,
    }
}

/// Blank and NaN cells are absent costs; anything else must be a finite,
/// non-negative number.
fn cost_from_cell(cell: &Cell, row: usize) -> Result<Option<f64>, DataLoadError> {
    let (value, raw) = match cell {
        Cell::Null => return Ok(None),
        Cell::Number(v) => (*v, v.to_string()),
        Cell::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            let parsed = trimmed.replace(',', "").parse::<f64>().map_err(|_| {
                DataLoadError::InvalidCost {
                    row,
                    value: s.clone(),
                    reason: "not a number",
                }
            })?;
            (parsed, s.clone())
        }
    };

    if value.is_nan() {
        return Ok(None);
    }
    if value.is_infinite() {
        return Err(DataLoadError::InvalidCost {
            row,
            value: raw,
            reason: "not finite",
        });
    }
    if value < 0.0 {
        return Err(DataLoadError::InvalidCost {
            row,
            value: raw,
            reason: "negative",
        });
    }
    Ok(Some(value))
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        rows.push(
            record
                .iter()
                .map(|v| {
                    if v.is_empty() {
                        Cell::Null
                    } else {
                        Cell::Text(v.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable { columns, rows })
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "地区": "浙江", "所属行业": "化工", "污染物类型": "VOCs", "单位治理成本（元/吨）": 1520.5 },
///   ...
/// ]
/// ```
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let objects = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut table = RawTable::default();
    let mut keyed_rows = Vec::with_capacity(objects.len());

    for (i, rec) in objects.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {} is not a JSON object", i + 1))?;
        for key in obj.keys() {
            if !table.columns.contains(key) {
                table.columns.push(key.clone());
            }
        }
        keyed_rows.push(obj);
    }

    for obj in keyed_rows {
        table.rows.push(
            table
                .columns
                .iter()
                .map(|col| obj.get(col).map_or(Cell::Null, json_to_cell))
                .collect(),
        );
    }

    Ok(table)
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => n
            .as_f64()
            .map(Cell::Number)
            .unwrap_or_else(|| Cell::Text(n.to_string())),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a Parquet file of cost records.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`), and by the `generate_sample` binary.
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .enumerate()
                .map(|(col_idx, col)| {
                    extract_cell(col, row)
                        .with_context(|| format!("Row {row}: column '{}'", columns[col_idx]))
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(cells);
        }
    }

    Ok(RawTable { columns, rows })
}

// -- Parquet / Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<Cell> {
    if col.is_null(row) {
        return Ok(Cell::Null);
    }

    fn downcast<T: 'static>(col: &Arc<dyn Array>) -> Result<&T> {
        col.as_any()
            .downcast_ref::<T>()
            .with_context(|| format!("unexpected array for {:?}", col.data_type()))
    }

    let cell = match col.data_type() {
        DataType::Utf8 => Cell::Text(downcast::<StringArray>(col)?.value(row).to_string()),
        DataType::LargeUtf8 => {
            Cell::Text(downcast::<LargeStringArray>(col)?.value(row).to_string())
        }
        DataType::Int32 => Cell::Number(downcast::<Int32Array>(col)?.value(row) as f64),
        DataType::Int64 => Cell::Number(downcast::<Int64Array>(col)?.value(row) as f64),
        DataType::UInt32 => Cell::Number(downcast::<UInt32Array>(col)?.value(row) as f64),
        DataType::UInt64 => Cell::Number(downcast::<UInt64Array>(col)?.value(row) as f64),
        DataType::Float32 => Cell::Number(downcast::<Float32Array>(col)?.value(row) as f64),
        DataType::Float64 => Cell::Number(downcast::<Float64Array>(col)?.value(row)),
        DataType::Boolean => {
            Cell::Text(downcast::<BooleanArray>(col)?.value(row).to_string())
        }
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "abatement_loader_{}_{name}",
            std::process::id()
        ))
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = temp_path(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn csv_with_chinese_headers_and_bom() {
        let path = write_temp(
            "bom.csv",
            "\u{feff}地区,所属行业,污染物类型,单位治理成本（元/吨）,备注\n\
             浙江,化工,VOCs,1520.5,x\n\
             江苏,电力,SOx,,\n",
        );
        let store = load_file(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.records()[0],
            CostRecord::new("浙江", "化工", "VOCs", Some(1520.5))
        );
        // Blank cost stays absent, never zero.
        assert_eq!(store.records()[1].unit_cost, None);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn csv_with_english_headers_in_any_order() {
        let path = write_temp(
            "english.csv",
            "Unit_Cost,pollutant_type,industry,region\n300,NOx,Steel,Hebei\n",
        );
        let store = load_file(&path).unwrap();
        assert_eq!(
            store.records()[0],
            CostRecord::new("Hebei", "Steel", "NOx", Some(300.0))
        );
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn labels_are_kept_verbatim_and_blank_ones_are_absent() {
        let path = write_temp(
            "labels.csv",
            "region,industry,pollutant_type,unit_cost\n 浙江 ,化工,   ,10\n",
        );
        let store = load_file(&path).unwrap();
        let rec = &store.records()[0];
        assert_eq!(rec.region.as_deref(), Some(" 浙江 "));
        assert_eq!(rec.pollutant_type, None);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_cost_column_is_rejected() {
        let path = write_temp("nocost.csv", "region,industry,pollutant_type\nA,B,C\n");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn("unit_cost")));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_label_column_is_rejected() {
        let path = write_temp("noregion.csv", "industry,pollutant_type,unit_cost\nB,C,1\n");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn("region")));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn negative_or_garbage_costs_are_rejected() {
        let path = write_temp("neg.csv", "region,industry,pollutant_type,unit_cost\nA,B,C,-4\n");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::InvalidCost { row: 1, reason: "negative", .. }
        ));
        std::fs::remove_file(path).ok();

        let path = write_temp("text.csv", "region,industry,pollutant_type,unit_cost\nA,B,C,cheap\n");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidCost { reason: "not a number", .. }));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_and_unknown_extension() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::Io { .. }));

        let path = write_temp("data.xlsx", "");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::UnsupportedFormat(ref e) if e == "xlsx"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn json_records_with_nulls() {
        let path = write_temp(
            "records.json",
            r#"[
                {"region": "A", "industry": "X", "pollutant_type": "VOCs", "unit_cost": 12},
                {"region": "B", "industry": null, "pollutant_type": "NOx", "unit_cost": null}
            ]"#,
        );
        let store = load_file(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].unit_cost, Some(12.0));
        assert_eq!(store.records()[1].industry, None);
        assert_eq!(store.records()[1].unit_cost, None);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn json_must_be_an_array() {
        let path = write_temp("object.json", r#"{"region": "A"}"#);
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::Malformed(_)));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn parquet_round_trip_through_loader() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("地区", DataType::Utf8, false),
            Field::new("所属行业", DataType::Utf8, false),
            Field::new("污染物类型", DataType::Utf8, false),
            Field::new("单位治理成本（元/吨）", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["浙江", "广东"])),
                Arc::new(StringArray::from(vec!["化工", "印刷"])),
                Arc::new(StringArray::from(vec!["VOCs", "含VOC废气"])),
                Arc::new(Float64Array::from(vec![Some(800.0), None])),
            ],
        )
        .unwrap();

        let path = temp_path("costs.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let store = load_file(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.records()[0],
            CostRecord::new("浙江", "化工", "VOCs", Some(800.0))
        );
        assert_eq!(store.records()[1].unit_cost, None);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn numeric_labels_render_without_fraction() {
        assert_eq!(label_from_cell(&Cell::Number(3301.0)), Some("3301".to_string()));
        assert_eq!(label_from_cell(&Cell::Text("  ".into())), None);
    }
}
