use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Rendered timestamp; spreadsheet dates only.
    DateTime(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "NaN"),
            CellValue::Bool(true) => write!(f, "True"),
            CellValue::Bool(false) => write!(f, "False"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.is_nan() => write!(f, "NaN"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Text(s) | CellValue::DateTime(s) => write!(f, "{s}"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell; `None` for missing and non-numeric values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Label view of the cell, used for grouping categorical columns.
    pub fn as_label(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Float(v) if v.is_nan() => None,
            CellValue::Text(s) | CellValue::DateTime(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnKind – the declared type of a column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Text,
    /// Explicit categorical dtype. File readers never produce it; it exists
    /// for datasets assembled in code.
    Category,
    DateTime,
}

impl ColumnKind {
    /// Pandas-style dtype name shown in the summary block.
    pub fn dtype_name(self) -> &'static str {
        match self {
            ColumnKind::Integer => "int64",
            ColumnKind::Float => "float64",
            ColumnKind::Boolean => "bool",
            ColumnKind::Text => "object",
            ColumnKind::Category => "category",
            ColumnKind::DateTime => "datetime64[ns]",
        }
    }
}

// ---------------------------------------------------------------------------
// Column / Dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Per-row numeric values; missing or non-numeric cells are `None`.
    pub fn numbers(&self) -> Vec<Option<f64>> {
        self.values.iter().map(CellValue::as_f64).collect()
    }

    /// Per-row labels; missing cells are `None`.
    pub fn labels(&self) -> Vec<Option<String>> {
        self.values.iter().map(CellValue::as_label).collect()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }
}

/// The full parsed table. All columns have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// File name the table was read from.
    pub source: String,
    pub columns: Vec<Column>,
}

impl Dataset {
    pub fn new(source: impl Into<String>, columns: Vec<Column>) -> Self {
        Dataset {
            source: source.into(),
            columns,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(rows, columns)`, as `DataFrame.shape` reports it.
    pub fn shape(&self) -> (usize, usize) {
        (self.len(), self.columns.len())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// The first `n` rows, cell by cell.
    pub fn head(&self, n: usize) -> Vec<Vec<&CellValue>> {
        (0..self.len().min(n))
            .map(|row| self.columns.iter().map(|c| &c.values[row]).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            "sample.csv",
            vec![
                Column::new(
                    "a",
                    ColumnKind::Integer,
                    vec![CellValue::Integer(1), CellValue::Integer(2), CellValue::Integer(3)],
                ),
                Column::new(
                    "b",
                    ColumnKind::Text,
                    vec![
                        CellValue::Text("x".into()),
                        CellValue::Null,
                        CellValue::Text("y".into()),
                    ],
                ),
            ],
        )
    }

    #[test]
    fn shape_and_head() {
        let ds = sample();
        assert_eq!(ds.shape(), (3, 2));
        let head = ds.head(2);
        assert_eq!(head.len(), 2);
        assert_eq!(head[1][1], &CellValue::Null);
        assert_eq!(ds.head(10).len(), 3);
    }

    #[test]
    fn missing_values_are_counted() {
        let ds = sample();
        assert_eq!(ds.column("a").unwrap().missing_count(), 0);
        assert_eq!(ds.column("b").unwrap().missing_count(), 1);
        assert!(CellValue::Float(f64::NAN).is_missing());
    }

    #[test]
    fn numeric_and_label_views() {
        assert_eq!(CellValue::Integer(4).as_f64(), Some(4.0));
        assert_eq!(CellValue::Text("4".into()).as_f64(), None);
        assert_eq!(CellValue::Bool(true).as_label().as_deref(), Some("True"));
        assert_eq!(CellValue::Null.as_label(), None);
    }
}
