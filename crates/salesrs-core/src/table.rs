use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("table has {names} column names but {columns} columns")]
    HeaderMismatch { names: usize, columns: usize },
    #[error("column '{name}' has {len} rows, expected {expected}")]
    LengthMismatch { name: String, len: usize, expected: usize },
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
    #[error("no column named '{0}'")]
    MissingColumn(String),
    #[error("row range {start}..{end} out of bounds for {nrows} rows")]
    RowsOutOfBounds { start: usize, end: usize, nrows: usize },
    #[error("cannot concatenate tables with different columns: {left:?} vs {right:?}")]
    ColumnsDiffer { left: Vec<String>, right: Vec<String> },
}

/// Column-major numeric table. Every column holds the same number of rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Table [{} x {}] ({})", self.nrows(), self.ncols(), self.names.join(", "))
    }
}

impl Table {
    pub fn new(names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self, TableError> {
        if names.len() != columns.len() {
            return Err(TableError::HeaderMismatch { names: names.len(), columns: columns.len() });
        }

        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }

        let table = Self { names, columns };
        table.validate_lengths()?;
        Ok(table)
    }

    /// A table with the given header and zero rows.
    pub fn empty(names: Vec<String>) -> Result<Self, TableError> {
        let columns = vec![Vec::new(); names.len()];
        Self::new(names, columns)
    }

    fn validate_lengths(&self) -> Result<(), TableError> {
        let expected = self.columns.first().map_or(0, Vec::len);
        for (name, col) in self.names.iter().zip(&self.columns) {
            if col.len() != expected {
                return Err(TableError::LengthMismatch {
                    name: name.clone(),
                    len: col.len(),
                    expected,
                });
            }
        }
        Ok(())
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn ncols(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nrows() == 0
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Result<&[f64], TableError> {
        self.column_index(name)
            .map(|i| self.columns[i].as_slice())
            .ok_or_else(|| TableError::MissingColumn(name.to_owned()))
    }

    /// Iterate `(name, values)` pairs in column order.
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names.iter().map(String::as_str).zip(self.columns.iter().map(Vec::as_slice))
    }

    /// Values of one row in column order.
    pub fn row(&self, idx: usize) -> Option<Vec<f64>> {
        if idx >= self.nrows() {
            return None;
        }
        Some(self.columns.iter().map(|col| col[idx]).collect())
    }

    /// Copy of the rows in `range`, keeping the header and row order.
    pub fn slice_rows(&self, range: Range<usize>) -> Result<Self, TableError> {
        let nrows = self.nrows();
        if range.start > range.end || range.end > nrows {
            return Err(TableError::RowsOutOfBounds { start: range.start, end: range.end, nrows });
        }
        let columns = self.columns.iter().map(|col| col[range.clone()].to_vec()).collect();
        Ok(Self { names: self.names.clone(), columns })
    }

    /// Rows of `self` followed by rows of `other`.
    pub fn concat(&self, other: &Table) -> Result<Self, TableError> {
        if self.names != other.names {
            return Err(TableError::ColumnsDiffer {
                left: self.names.clone(),
                right: other.names.clone(),
            });
        }
        let columns = self
            .columns
            .iter()
            .zip(&other.columns)
            .map(|(a, b)| a.iter().chain(b).copied().collect())
            .collect();
        Ok(Self { names: self.names.clone(), columns })
    }

    /// Same header, same shape and every value within `tol`.
    pub fn approx_eq(&self, other: &Table, tol: f64) -> bool {
        self.names == other.names
            && self.nrows() == other.nrows()
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|(a, b)| a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tol))
    }
}
