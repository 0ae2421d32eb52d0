use std::io::ErrorKind;
use std::path::{Component, Path};

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map as JsonMap, Value as JsonValue};
use walkdir::WalkDir;

use super::model::{MethodResults, ResultsPerMethod, RunResult};
use crate::error::ReportError;

/// Extensions `load_file` understands.
const RESULT_EXTENSIONS: &[&str] = &["json", "jsonl", "csv", "parquet", "pq"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Names of the method directories in a results directory, sorted.
///
/// Any directory that is (or contains) one of `exclude` is skipped, so the
/// ArgoUML results and the report output living below the results directory
/// are not mistaken for methods.
pub fn list_methods(dir: &Path, exclude: &[&Path]) -> Result<Vec<String>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ReportError::ResultsNotFound(dir.to_path_buf()).into());
        }
        Err(e) => return Err(e).with_context(|| format!("listing {}", dir.display())),
    };

    let mut methods = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if exclude.iter().any(|ex| ex.starts_with(&path)) {
            log::debug!("Not a method directory: {}", path.display());
            continue;
        }
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => methods.push(name.to_string()),
            None => log::warn!("Skipping non UTF-8 directory {}", path.display()),
        }
    }
    methods.sort();
    Ok(methods)
}

/// Load every result file below `dir/<method>` for each of `methods`.
///
/// Methods whose directory holds no result record get no entry.
pub fn load_results(methods: &[String], dir: &Path) -> Result<ResultsPerMethod> {
    let mut results = ResultsPerMethod::new();

    for method in methods {
        let method_dir = dir.join(method);
        if !method_dir.is_dir() {
            return Err(ReportError::ResultsNotFound(method_dir).into());
        }

        let mut method_results = MethodResults::new(method);
        for entry in WalkDir::new(&method_dir).min_depth(1).sort_by_file_name() {
            let entry = entry.with_context(|| format!("walking {}", method_dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !is_result_file(path) {
                log::debug!("Skipping {}", path.display());
                continue;
            }

            let fallback = fallback_dataset(&method_dir, path);
            let runs = load_file(path).with_context(|| format!("loading {}", path.display()))?;
            for mut run in runs {
                run.finalize(&fallback);
                method_results.push(run);
            }
        }

        if method_results.is_empty() {
            log::warn!("No result records for method {method} in {}", method_dir.display());
            continue;
        }
        log::info!(
            "Loaded {} runs of {} on {} datasets",
            method_results.len(),
            method_results.method,
            method_results.runs_per_dataset.len()
        );
        results.insert(method.clone(), method_results);
    }

    Ok(results)
}

/// Load the runs stored in one result file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json` / `.jsonl` – one JSON array of records, or one record per line
/// * `.csv`             – header row with the record's field names
/// * `.parquet`         – one record per row, columns named like the fields
pub fn load_file(path: &Path) -> Result<Vec<RunResult>> {
    match extension(path).as_str() {
        "json" | "jsonl" => load_json(path),
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(ReportError::UnsupportedFormat(other.to_string()).into()),
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn is_result_file(path: &Path) -> bool {
    RESULT_EXTENSIONS.contains(&extension(path).as_str())
}

/// Dataset name for records that do not carry one: the first directory
/// below the method directory, or the file stem for files directly in it.
fn fallback_dataset(method_dir: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(method_dir).unwrap_or(file);
    let mut components = relative.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(first)), Some(_)) => first.to_string_lossy().into_owned(),
        _ => file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

fn record_from_json(path: &Path, index: usize, value: JsonValue) -> Result<RunResult> {
    serde_json::from_value(value).map_err(|e| {
        anyhow::Error::from(ReportError::InvalidRecord {
            path: path.to_path_buf(),
            index,
            reason: e.to_string(),
        })
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Accepts a top-level array, a single object, or a stream of objects
/// (JSON Lines, as appended by the experiment runner).
fn load_json(path: &Path) -> Result<Vec<RunResult>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;

    let mut records = Vec::new();
    let stream = serde_json::Deserializer::from_str(&text).into_iter::<JsonValue>();
    for (i, value) in stream.enumerate() {
        let value = value.with_context(|| format!("parsing JSON value {i}"))?;
        match value {
            JsonValue::Array(items) => {
                for item in items {
                    let index = records.len();
                    records.push(record_from_json(path, index, item)?);
                }
            }
            other => {
                let index = records.len();
                records.push(record_from_json(path, index, other)?);
            }
        }
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with field names (`dataset,runID,runtime,tp,...`).
/// Empty cells leave optional fields unset.
fn load_csv(path: &Path) -> Result<Vec<RunResult>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;

    reader
        .deserialize::<RunResult>()
        .enumerate()
        .map(|(index, row)| {
            row.map_err(|e| {
                anyhow::Error::from(ReportError::InvalidRecord {
                    path: path.to_path_buf(),
                    index,
                    reason: e.to_string(),
                })
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet export of result records (e.g. `df.to_parquet()` of the
/// collected runs). Columns of unsupported types are ignored.
fn load_parquet(path: &Path) -> Result<Vec<RunResult>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        for field in schema.fields().iter() {
            if !is_supported_column(field.data_type()) {
                log::warn!(
                    "Ignoring column '{}' of type {:?} in {}",
                    field.name(),
                    field.data_type(),
                    path.display()
                );
            }
        }

        for row in 0..batch.num_rows() {
            let mut object = JsonMap::new();
            for (col_idx, field) in schema.fields().iter().enumerate() {
                if let Some(value) = cell_to_json(batch.column(col_idx), row) {
                    object.insert(field.name().clone(), value);
                }
            }
            let index = records.len();
            records.push(record_from_json(path, index, JsonValue::Object(object))?);
        }
    }
    Ok(records)
}

fn is_supported_column(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Utf8
            | DataType::LargeUtf8
            | DataType::Utf8View
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
            | DataType::Boolean
    )
}

/// A single Arrow cell as JSON. `None` for nulls and unsupported types.
fn cell_to_json(col: &ArrayRef, row: usize) -> Option<JsonValue> {
    if col.is_null(row) {
        return None;
    }
    let value = match col.data_type() {
        DataType::Utf8 => JsonValue::from(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => JsonValue::from(col.as_string::<i64>().value(row)),
        DataType::Utf8View => JsonValue::from(col.as_string_view().value(row)),
        DataType::Int8 => JsonValue::from(col.as_primitive::<Int8Type>().value(row)),
        DataType::Int16 => JsonValue::from(col.as_primitive::<Int16Type>().value(row)),
        DataType::Int32 => JsonValue::from(col.as_primitive::<Int32Type>().value(row)),
        DataType::Int64 => JsonValue::from(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => JsonValue::from(col.as_primitive::<UInt8Type>().value(row)),
        DataType::UInt16 => JsonValue::from(col.as_primitive::<UInt16Type>().value(row)),
        DataType::UInt32 => JsonValue::from(col.as_primitive::<UInt32Type>().value(row)),
        DataType::UInt64 => JsonValue::from(col.as_primitive::<UInt64Type>().value(row)),
        DataType::Float32 => {
            JsonValue::from(f64::from(col.as_primitive::<Float32Type>().value(row)))
        }
        DataType::Float64 => JsonValue::from(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => JsonValue::from(col.as_boolean().value(row)),
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int16Array, Int32Array, Int64Array, Int8Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    use crate::data::model::Metric;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn list_methods_skips_files_and_excluded_dirs() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        for d in ["NwM", "RaQuN-Property-Vec", "argouml/NwM", "eval-results/tables"] {
            fs::create_dir_all(root.join(d)).unwrap();
        }
        write(root, "README.txt", "not a method");

        let argo = root.join("argouml");
        let tables = root.join("eval-results").join("tables");
        let methods = list_methods(root, &[&argo, &tables]).unwrap();
        assert_eq!(methods, vec!["NwM", "RaQuN-Property-Vec"]);
    }

    #[test]
    fn missing_results_dir_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = list_methods(&tmp.path().join("argouml"), &[]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::ResultsNotFound(_))
        ));
    }

    #[test]
    fn json_lines_and_arrays() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(
            root,
            "NwM/hospitals/runs.jsonl",
            "{\"runID\":0,\"runtime\":2.0,\"tp\":3,\"fp\":1,\"fn\":0}\n\n{\"runID\":1,\"runtime\":4.0,\"tp\":3,\"fp\":1,\"fn\":0}\n",
        );
        write(
            root,
            "NwM/warehouses.json",
            r#"[{"runtime":1.0,"tp":0}, {"dataset":"ppu","runtime":5.0,"tp":1}]"#,
        );
        write(root, "NwM/notes.md", "# ignored");

        let results = load_results(&["NwM".to_string()], root).unwrap();
        let nwm = &results["NwM"];
        assert_eq!(nwm.len(), 4);
        assert_eq!(nwm.runs("hospitals").len(), 2);
        assert_eq!(nwm.runs("warehouses").len(), 1);
        assert_eq!(nwm.runs("ppu").len(), 1);
        assert_eq!(nwm.mean("hospitals", Metric::Runtime), Some(3.0));
        assert_eq!(nwm.mean("hospitals", Metric::Precision), Some(0.75));
    }

    #[test]
    fn csv_with_empty_optional_cells() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(
            root,
            "RaQuN_k/ppu/results.csv",
            "runID,runtime,tp,fp,fn,weight,k,numberOfComparisons\n\
             0,1.5,10,0,0,3.5,1,\n\
             1,2.5,10,0,0,4.5,2,900\n",
        );

        let results = load_results(&["RaQuN_k".to_string()], root).unwrap();
        let runs = results["RaQuN_k"].runs("ppu");
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].k, Some(1));
        assert_eq!(runs[0].number_of_comparisons, None);
        assert_eq!(runs[1].number_of_comparisons, Some(900));
        assert_eq!(runs[1].f_measure, Some(1.0));
    }

    #[test]
    fn parquet_rows_become_runs() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("PairwiseAsc");
        fs::create_dir_all(&dir).unwrap();

        let schema = Arc::new(Schema::new(vec![
            Field::new("dataset", DataType::Utf8, false),
            Field::new("runID", DataType::Int64, false),
            Field::new("runtime", DataType::Float64, false),
            Field::new("tp", DataType::Float64, false),
            Field::new("fp", DataType::Float64, false),
            Field::new("k", DataType::Int32, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["bcms", "bcs"])),
                Arc::new(Int64Array::from(vec![0, 0])),
                Arc::new(Float64Array::from(vec![0.25, 0.75])),
                Arc::new(Float64Array::from(vec![4.0, 0.0])),
                Arc::new(Float64Array::from(vec![4.0, 2.0])),
                Arc::new(Int32Array::from(vec![Some(3), None])),
            ],
        )
        .unwrap();
        let file = fs::File::create(dir.join("runs.parquet")).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let results = load_results(&["PairwiseAsc".to_string()], tmp.path()).unwrap();
        let pw = &results["PairwiseAsc"];
        assert_eq!(pw.mean("bcms", Metric::Precision), Some(0.5));
        assert_eq!(pw.runs("bcms")[0].k, Some(3));
        assert_eq!(pw.runs("bcs")[0].k, None);
        assert_eq!(pw.mean("bcs", Metric::Runtime), Some(0.75));
    }

    #[test]
    fn parquet_narrow_integer_columns() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("RaQuN_k");
        fs::create_dir_all(&dir).unwrap();

        let schema = Arc::new(Schema::new(vec![
            Field::new("dataset", DataType::Utf8, false),
            Field::new("runID", DataType::Int16, false),
            Field::new("runtime", DataType::Float64, false),
            Field::new("k", DataType::Int8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["ppu", "ppu"])),
                Arc::new(Int16Array::from(vec![0, 1])),
                Arc::new(Float64Array::from(vec![1.0, 2.0])),
                Arc::new(Int8Array::from(vec![Some(2), Some(5)])),
            ],
        )
        .unwrap();
        let file = fs::File::create(dir.join("runs.parquet")).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let results = load_results(&["RaQuN_k".to_string()], tmp.path()).unwrap();
        let runs = results["RaQuN_k"].runs("ppu");
        assert_eq!(runs.iter().map(|r| r.k).collect::<Vec<_>>(), vec![Some(2), Some(5)]);
        assert_eq!(runs[1].run_id, 1);
    }

    #[test]
    fn methods_without_records_are_left_out() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("NwM")).unwrap();
        let results = load_results(&["NwM".to_string()], tmp.path()).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn malformed_record_reports_file() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "NwM/ppu.json", r#"[{"runtime":"fast"}]"#);
        let err = load_results(&["NwM".to_string()], tmp.path()).unwrap_err();
        assert!(format!("{err:#}").contains("ppu.json"));
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("results/NwM/ppu.xlsx")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }
}
