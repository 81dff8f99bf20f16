use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{bail, Context};
use calamine::{open_workbook, DataType, Reader, Xlsx};

use super::model::{CellValue, Column, ColumnKind, Dataset};
use crate::config::DashboardConfig;
use crate::error::{DashError, Result};

/// Tokens read as a missing value, compared after trimming.
const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A", "<NA>",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row followed by delimited records
/// * `.xlsx` – first worksheet, first row is the header
///
/// The size limit is checked from the file metadata before the file is
/// opened for parsing.
pub fn load_file(path: &Path, config: &DashboardConfig) -> Result<Dataset> {
    let metadata = std::fs::metadata(path).map_err(|source| DashError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    check_size(metadata.len(), config)?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => {
            let file = File::open(path).map_err(|source| DashError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(load_csv(BufReader::new(file), &source)?)
        }
        "xlsx" => Ok(load_xlsx(path, &source)?),
        other => Err(DashError::UnsupportedExtension(other.to_string())),
    }
}

/// Reject sizes above the configured limit (in MiB).
pub fn check_size(size_bytes: u64, config: &DashboardConfig) -> Result<()> {
    if size_bytes > config.max_upload_bytes() {
        return Err(DashError::FileTooLarge {
            size_bytes,
            limit_mb: config.max_upload_mb,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Raw cells: what a reader saw, before the column type is decided
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum RawValue {
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    Date,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
struct RawCell {
    value: RawValue,
    /// Source text, kept so mixed columns show what the file contained.
    text: String,
}

impl RawCell {
    fn empty() -> Self {
        RawCell {
            value: RawValue::Empty,
            text: String::new(),
        }
    }

    fn new(value: RawValue, text: impl Into<String>) -> Self {
        RawCell {
            value,
            text: text.into(),
        }
    }
}

fn parse_text_cell(s: &str) -> RawCell {
    let trimmed = s.trim();
    if NA_TOKENS.contains(&trimmed) {
        return RawCell::empty();
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return RawCell::new(RawValue::Int(i), s);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return RawCell::new(RawValue::Float(f), s);
    }
    if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false") {
        return RawCell::new(RawValue::Bool(trimmed.eq_ignore_ascii_case("true")), s);
    }
    RawCell::new(RawValue::Text, s)
}

/// Decide the declared kind of a column and convert its cells.
fn infer_column(name: String, cells: Vec<RawCell>) -> Column {
    let present: Vec<&RawValue> = cells
        .iter()
        .map(|c| &c.value)
        .filter(|v| **v != RawValue::Empty)
        .collect();
    let has_missing = present.len() < cells.len();

    // No rows at all leaves the column untyped text; rows that are all
    // missing read as float.
    let kind = if cells.is_empty() {
        ColumnKind::Text
    } else if present.is_empty() {
        ColumnKind::Float
    } else if present.iter().all(|v| matches!(v, RawValue::Int(_))) {
        if has_missing {
            ColumnKind::Float
        } else {
            ColumnKind::Integer
        }
    } else if present
        .iter()
        .all(|v| matches!(v, RawValue::Int(_) | RawValue::Float(_)))
    {
        ColumnKind::Float
    } else if !has_missing && present.iter().all(|v| matches!(v, RawValue::Bool(_))) {
        ColumnKind::Boolean
    } else if present.iter().all(|v| matches!(v, RawValue::Date)) {
        ColumnKind::DateTime
    } else {
        ColumnKind::Text
    };

    let values = cells
        .into_iter()
        .map(|cell| match (kind, cell.value) {
            (_, RawValue::Empty) => CellValue::Null,
            (ColumnKind::Integer, RawValue::Int(i)) => CellValue::Integer(i),
            (ColumnKind::Float, RawValue::Int(i)) => CellValue::Float(i as f64),
            (ColumnKind::Float, RawValue::Float(f)) => CellValue::Float(f),
            (ColumnKind::Boolean, RawValue::Bool(b)) => CellValue::Bool(b),
            (ColumnKind::DateTime, RawValue::Date) => CellValue::DateTime(cell.text),
            _ => CellValue::Text(cell.text),
        })
        .collect();

    Column::new(name, kind, values)
}

/// Blank header names become `Unnamed: {i}`; repeats get `.1`, `.2`, ...
fn unique_names<I: IntoIterator<Item = String>>(raw: I) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, name)| {
            let base = if name.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                name
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let unique = if *count == 0 {
                base
            } else {
                format!("{base}.{count}")
            };
            *count += 1;
            unique
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per row.
/// Short records are padded with missing values; long records are an error.
pub fn load_csv<R: Read>(reader: R, source: &str) -> anyhow::Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = reader.headers().context("reading CSV headers")?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        bail!("No columns to parse from file");
    }

    let names = unique_names(headers.iter().map(|h| h.to_string()));
    let n_cols = names.len();
    let mut cells: Vec<Vec<RawCell>> = vec![Vec::new(); n_cols];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        if record.len() > n_cols {
            bail!(
                "Error tokenizing data. Expected {n_cols} fields in line {}, saw {}",
                row_no + 2,
                record.len()
            );
        }
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(record.get(idx).map_or_else(RawCell::empty, parse_text_cell));
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| infer_column(name, cells))
        .collect();
    Ok(Dataset::new(source, columns))
}

// ---------------------------------------------------------------------------
// Excel loader
// ---------------------------------------------------------------------------

/// Load the first worksheet of an `.xlsx` workbook.
fn load_xlsx(path: &Path, source: &str) -> anyhow::Result<Dataset> {
    let mut workbook: Xlsx<BufReader<File>> =
        open_workbook(path).context("opening Excel workbook")?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("Workbook has no worksheets")?;
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("reading worksheet '{sheet}'"))?;

    let mut rows = range.rows();
    let header = rows.next().context("No columns to parse from file")?;
    let names = unique_names(header.iter().map(|cell| cell.to_string()));
    let mut cells: Vec<Vec<RawCell>> = vec![Vec::new(); names.len()];

    for row in rows {
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(row.get(idx).map_or_else(RawCell::empty, excel_cell));
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| infer_column(name, cells))
        .collect();
    Ok(Dataset::new(source, columns))
}

fn excel_cell(cell: &DataType) -> RawCell {
    match cell {
        DataType::Empty | DataType::Error(_) => RawCell::empty(),
        DataType::Int(i) => RawCell::new(RawValue::Int(*i), i.to_string()),
        // Spreadsheets store every number as a float; integral ones narrow.
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => {
            RawCell::new(RawValue::Int(*f as i64), cell.to_string())
        }
        DataType::Float(f) => RawCell::new(RawValue::Float(*f), cell.to_string()),
        DataType::Bool(b) => RawCell::new(RawValue::Bool(*b), cell.to_string()),
        DataType::DateTime(_) | DataType::DateTimeIso(_) => {
            let text = cell
                .as_datetime()
                .map(|dt| dt.to_string())
                .unwrap_or_else(|| cell.to_string());
            RawCell::new(RawValue::Date, text)
        }
        other => parse_text_cell(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use calamine::CellErrorType;

    use super::*;
    use crate::data::classify::classify;

    fn csv(text: &str) -> Dataset {
        load_csv(text.as_bytes(), "test.csv").unwrap()
    }

    #[test]
    fn infers_pandas_like_kinds() {
        let ds = csv(
            "id,price,name,flag,score\n\
             1,2.5,apple,true,7\n\
             2,3,pear,False,\n\
             3,4.25,plum,TRUE,9\n",
        );
        let kinds: Vec<ColumnKind> = ds.columns.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ColumnKind::Integer,
                ColumnKind::Float,
                ColumnKind::Text,
                ColumnKind::Boolean,
                ColumnKind::Float,
            ]
        );
        assert_eq!(ds.shape(), (3, 5));
        assert_eq!(ds.column("score").unwrap().values[1], CellValue::Null);
        assert_eq!(ds.column("price").unwrap().values[1], CellValue::Float(3.0));
    }

    #[test]
    fn missing_tokens_are_null() {
        let ds = csv("a,b\nNA,x\nnan,\n5,N/A\n");
        let a = ds.column("a").unwrap();
        assert_eq!(a.kind, ColumnKind::Float);
        assert_eq!(a.missing_count(), 2);
        assert_eq!(ds.column("b").unwrap().missing_count(), 2);
    }

    #[test]
    fn mixed_column_keeps_source_text() {
        let ds = csv("code\n1.50\nA7\n");
        let code = ds.column("code").unwrap();
        assert_eq!(code.kind, ColumnKind::Text);
        assert_eq!(code.values[0], CellValue::Text("1.50".into()));
    }

    #[test]
    fn all_missing_column_is_float() {
        let ds = csv("a,b\n1,\n2,\n");
        assert_eq!(ds.column("b").unwrap().kind, ColumnKind::Float);
    }

    #[test]
    fn header_only_csv_has_text_columns() {
        let ds = csv("region,units\n");
        assert!(ds.is_empty());
        assert!(ds.columns.iter().all(|c| c.kind == ColumnKind::Text));
        let buckets = classify(&ds);
        assert!(buckets.numeric.is_empty());
        assert_eq!(buckets.categorical, vec!["region", "units"]);
    }

    #[test]
    fn header_names_are_made_unique() {
        let ds = csv("x,x,,x\n1,2,3,4\n");
        assert_eq!(ds.column_names(), vec!["x", "x.1", "Unnamed: 2", "x.2"]);
    }

    #[test]
    fn short_rows_are_padded() {
        let ds = csv("a,b,c\n1,2\n3,4,5\n");
        assert_eq!(ds.column("c").unwrap().values[0], CellValue::Null);
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn long_rows_fail_the_load() {
        let err = load_csv("a,b\n1,2,3\n".as_bytes(), "bad.csv").unwrap_err();
        assert!(err.to_string().contains("Expected 2 fields in line 2, saw 3"));
    }

    #[test]
    fn empty_file_has_no_columns() {
        let err = load_csv("".as_bytes(), "empty.csv").unwrap_err();
        assert!(err.to_string().contains("No columns to parse"));
    }

    #[test]
    fn oversized_file_is_rejected_before_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.csv");
        let file = File::create(&path).unwrap();
        // Sparse file: no parser could make sense of 21 MiB of NUL bytes.
        file.set_len(21 * 1024 * 1024).unwrap();

        let err = load_file(&path, &DashboardConfig::default()).unwrap_err();
        match err {
            DashError::FileTooLarge { size_bytes, limit_mb } => {
                assert_eq!(size_bytes, 21 * 1024 * 1024);
                assert_eq!(limit_mb, 20.0);
            }
            other => panic!("expected FileTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn limit_is_inclusive() {
        let config = DashboardConfig::default();
        assert!(check_size(20 * 1024 * 1024, &config).is_ok());
        assert!(check_size(20 * 1024 * 1024 + 1, &config).is_err());
    }

    #[test]
    fn loads_csv_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Sales.CSV");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "region,units").unwrap();
        writeln!(file, "north,4").unwrap();
        drop(file);

        let ds = load_file(&path, &DashboardConfig::default()).unwrap();
        assert_eq!(ds.source, "Sales.CSV");
        assert_eq!(ds.shape(), (1, 2));
    }

    #[test]
    fn unsupported_extension_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "[]").unwrap();

        assert!(matches!(
            load_file(&path, &DashboardConfig::default()),
            Err(DashError::UnsupportedExtension(ext)) if ext == "json"
        ));
    }

    fn sheet_column(name: &str, cells: &[DataType]) -> Column {
        infer_column(name.to_string(), cells.iter().map(excel_cell).collect())
    }

    #[test]
    fn spreadsheet_cells_infer_pandas_like_kinds() {
        let ds = Dataset::new(
            "book.xlsx",
            vec![
                sheet_column("units", &[DataType::Float(3.0), DataType::Int(4)]),
                sheet_column("price", &[DataType::Float(2.5), DataType::Float(4.0)]),
                sheet_column(
                    "gaps",
                    &[
                        DataType::Float(1.0),
                        DataType::Empty,
                        DataType::Error(CellErrorType::NA),
                    ],
                ),
                sheet_column("paid", &[DataType::Bool(true), DataType::Bool(false)]),
                sheet_column(
                    "ordered",
                    &[
                        DataType::DateTime(45292.0),
                        DataType::DateTimeIso("2024-02-01T08:30:00".to_string()),
                    ],
                ),
                sheet_column(
                    "code",
                    &[DataType::String("12".to_string()), DataType::String("7".to_string())],
                ),
                sheet_column(
                    "region",
                    &[DataType::String("north".to_string()), DataType::String("7".to_string())],
                ),
            ],
        );
        let kinds: Vec<ColumnKind> = ds.columns.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ColumnKind::Integer,
                ColumnKind::Float,
                ColumnKind::Float,
                ColumnKind::Boolean,
                ColumnKind::DateTime,
                ColumnKind::Integer,
                ColumnKind::Text,
            ]
        );

        let units = ds.column("units").unwrap();
        assert_eq!(units.values[0], CellValue::Integer(3));
        assert_eq!(ds.column("gaps").unwrap().missing_count(), 2);
        assert_eq!(
            ds.column("ordered").unwrap().values[0],
            CellValue::DateTime("2024-01-01 00:00:00".to_string())
        );

        let buckets = classify(&ds);
        assert_eq!(buckets.numeric, vec!["units", "price", "gaps", "code"]);
        assert_eq!(buckets.categorical, vec!["region"]);
    }

    #[test]
    fn huge_spreadsheet_floats_stay_float() {
        let column = sheet_column("big", &[DataType::Float(1.0e16)]);
        assert_eq!(column.kind, ColumnKind::Float);
    }

    #[test]
    fn malformed_workbook_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, "definitely not a zip archive").unwrap();

        let err = load_file(&path, &DashboardConfig::default()).unwrap_err();
        assert!(matches!(err, DashError::Parse(_)));
        assert!(err.to_string().starts_with("Error: opening Excel workbook"));
    }
}
