//! Measurement table backed by a polars `DataFrame`.
//!
//! Every spreadsheet column is stored as text exactly as the loader read it,
//! plus a `Source` column holding the vendor label. Numeric views are
//! produced on demand with a non-strict `Float64` cast, so unparsable cells
//! become null instead of failing the whole column.

use std::fmt;

use polars::prelude::*;

/// Name of the vendor tag column.
pub const SOURCE_COLUMN: &str = "Source";

/// A single spreadsheet value, before it is stored in the frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Text stored in the frame; `None` for null cells.
    pub fn into_text(self) -> Option<String> {
        match self {
            Cell::Text(s) => Some(s),
            cell if cell.is_null() => None,
            cell => Some(cell.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("nan"),
            Cell::Number(n) if n.is_nan() => f.write_str("nan"),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Bool(true) => f.write_str("True"),
            Cell::Bool(false) => f.write_str("False"),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Null, Into::into)
    }
}

/// Collects tagged rows and turns them into a [`MeasurementTable`].
#[derive(Debug, Clone)]
pub struct TableBuilder {
    headers: Vec<String>,
    sources: Vec<String>,
    columns: Vec<Vec<Option<String>>>,
}

impl TableBuilder {
    pub fn new(headers: Vec<String>) -> Self {
        let columns = vec![Vec::new(); headers.len()];
        Self {
            headers,
            sources: Vec::new(),
            columns,
        }
    }

    /// Appends a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, source: impl Into<String>, mut cells: Vec<Cell>) {
        cells.resize(self.headers.len(), Cell::Null);
        for (column, cell) in self.columns.iter_mut().zip(cells) {
            column.push(cell.into_text());
        }
        self.sources.push(source.into());
    }

    pub fn build(self) -> PolarsResult<MeasurementTable> {
        let mut series: Vec<Series> = self
            .headers
            .iter()
            .zip(self.columns)
            .map(|(name, values)| Series::new(name, values))
            .collect();
        series.push(Series::new(SOURCE_COLUMN, self.sources));
        DataFrame::new(series).map(MeasurementTable::from_frame)
    }
}

/// Row-oriented measurement samples with a Source tag per row.
#[derive(Debug, Clone)]
pub struct MeasurementTable {
    frame: DataFrame,
}

impl Default for MeasurementTable {
    fn default() -> Self {
        let source = Series::new_empty(SOURCE_COLUMN, &DataType::String);
        Self::from_frame(DataFrame::new(vec![source]).unwrap_or_default())
    }
}

impl MeasurementTable {
    pub fn from_frame(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Spreadsheet headers in column order, without the Source tag.
    pub fn headers(&self) -> Vec<&str> {
        self.frame
            .get_column_names()
            .into_iter()
            .filter(|name| *name != SOURCE_COLUMN)
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        name != SOURCE_COLUMN && self.frame.get_column_index(name).is_some()
    }

    /// One column cast to `Float64`; cells that do not parse are null.
    pub fn numeric(&self, column: &str) -> Option<Float64Chunked> {
        let series = self.frame.column(column).ok()?;
        let cast = series.cast(&DataType::Float64).ok()?;
        cast.f64().ok().cloned()
    }

    /// One column as stored text.
    pub fn text(&self, column: &str) -> Option<StringChunked> {
        let series = self.frame.column(column).ok()?;
        series.str().ok().cloned()
    }

    /// Vendor label of every row, in row order.
    pub fn sources(&self) -> Vec<String> {
        self.text(SOURCE_COLUMN)
            .map(|ca| ca.into_iter().map(|s| s.unwrap_or_default().to_string()).collect())
            .unwrap_or_default()
    }

    /// A new table holding the rows where `predicate` is true.
    pub fn filter(&self, predicate: Expr) -> PolarsResult<MeasurementTable> {
        self.frame
            .clone()
            .lazy()
            .filter(predicate)
            .collect()
            .map(Self::from_frame)
    }

    pub fn for_source(&self, label: &str) -> PolarsResult<MeasurementTable> {
        self.filter(col(SOURCE_COLUMN).eq(lit(label)))
    }

    /// Row-wise concatenation. Headers are the union in first-seen order;
    /// cells missing on either side become null.
    pub fn concat(self, other: MeasurementTable) -> PolarsResult<MeasurementTable> {
        concat_lf_diagonal([self.frame.lazy(), other.frame.lazy()], UnionArgs::default())?
            .collect()
            .map(Self::from_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn texts(table: &MeasurementTable, column: &str) -> Vec<Option<String>> {
        table
            .text(column)
            .unwrap()
            .into_iter()
            .map(|s| s.map(str::to_string))
            .collect()
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(Cell::Number(100.0).into_text().as_deref(), Some("100"));
        assert_eq!(Cell::Number(1651.5).into_text().as_deref(), Some("1651.5"));
        assert_eq!(Cell::Text("64qam".into()).into_text().as_deref(), Some("64qam"));
        assert_eq!(Cell::Bool(true).into_text().as_deref(), Some("True"));
        assert_eq!(Cell::Number(f64::NAN).into_text(), None);
        assert_eq!(Cell::Null.into_text(), None);
    }

    #[test]
    fn test_push_row_pads_to_width() {
        let mut builder = TableBuilder::new(headers(&["a", "b"]));
        builder.push_row("A", vec![Cell::Number(1.0)]);
        let table = builder.build().unwrap();

        assert_eq!(table.headers(), vec!["a", "b"]);
        assert_eq!(texts(&table, "b"), vec![None]);
        assert_eq!(table.sources(), vec!["A"]);
    }

    #[test]
    fn test_numeric_coercion_is_non_strict() {
        let mut builder = TableBuilder::new(headers(&["x"]));
        for cell in [Cell::Number(-90.5), " 12.5 ".into(), "n/a".into(), Cell::Null] {
            builder.push_row("A", vec![cell]);
        }
        let table = builder.build().unwrap();

        let values: Vec<Option<f64>> = table.numeric("x").unwrap().into_iter().collect();
        assert_eq!(values[0], Some(-90.5));
        assert_eq!(values[2], None);
        assert_eq!(values[3], None);
        assert!(table.numeric("missing").is_none());
        assert!(!table.has_column(SOURCE_COLUMN));
    }

    #[test]
    fn test_concat_unions_headers() {
        let mut left = TableBuilder::new(headers(&["x", "y"]));
        left.push_row("A", vec![1.0.into(), 2.0.into()]);
        let mut right = TableBuilder::new(headers(&["y", "z"]));
        right.push_row("B", vec![3.0.into(), 4.0.into()]);

        let merged = left.build().unwrap().concat(right.build().unwrap()).unwrap();
        assert_eq!(merged.headers(), vec!["x", "y", "z"]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.sources(), vec!["A", "B"]);
        assert_eq!(texts(&merged, "x"), vec![Some("1".into()), None]);
        assert_eq!(texts(&merged, "y"), vec![Some("2".into()), Some("3".into())]);
        assert_eq!(texts(&merged, "z"), vec![None, Some("4".into())]);
    }

    #[test]
    fn test_filter_and_for_source() {
        let mut builder = TableBuilder::new(headers(&["x"]));
        builder.push_row("A", vec![1.0.into()]);
        builder.push_row("B", vec![2.0.into()]);
        builder.push_row("A", vec![3.0.into()]);
        let table = builder.build().unwrap();

        let a = table.for_source("A").unwrap();
        assert_eq!(a.len(), 2);
        let values: Vec<f64> = a.numeric("x").unwrap().into_iter().flatten().collect();
        assert_eq!(values, vec![1.0, 3.0]);
        assert!(table.for_source("C").unwrap().is_empty());
        // source table untouched
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_default_is_empty() {
        let table = MeasurementTable::default();
        assert!(table.is_empty());
        assert!(table.headers().is_empty());
        assert!(table.for_source("A").unwrap().is_empty());
    }
}
