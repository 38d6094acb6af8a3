use crate::csv_parse::{write_table, WriteError};
use crate::table::{Table, TableError};

use log::{info, warn};
use std::fmt;
use std::path::Path;

/// Train/test proportions expressed as integer parts, 4:1 by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitRatio {
    pub train_parts: usize,
    pub test_parts: usize,
}

impl Default for SplitRatio {
    fn default() -> Self {
        Self { train_parts: 4, test_parts: 1 }
    }
}

impl fmt::Display for SplitRatio {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.train_parts, self.test_parts)
    }
}

impl SplitRatio {
    pub fn new(train_parts: usize, test_parts: usize) -> Self {
        Self { train_parts, test_parts }
    }

    /// Row counts for a table of `n` rows. Both counts are floored and any
    /// rows left over by the rounding go to the training side, so the counts
    /// always add up to `n`. A 0:0 ratio puts everything in training.
    pub fn counts(&self, n: usize) -> (usize, usize) {
        let total = (self.train_parts + self.test_parts).max(1);
        let mut train = n * self.train_parts / total;
        let test = n * self.test_parts / total;
        if train + test < n {
            train += n - (train + test);
        }
        (train, test)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Table,
    pub test: Table,
}

impl Split {
    /// Rows `[0, train)` and `[train, n)` of `table`, order preserved.
    pub fn from_table(table: &Table, ratio: SplitRatio) -> Result<Self, TableError> {
        let n = table.nrows();
        let (train_count, test_count) = ratio.counts(n);

        let train = table.slice_rows(0..train_count)?;
        let test = table.slice_rows(train_count..n)?;
        info!("Split {} rows {} into {} train / {} test", n, ratio, train_count, test_count);
        if test.is_empty() {
            warn!("Test partition is empty");
        }
        if train.is_empty() {
            warn!("Training partition is empty");
        }
        Ok(Self { train, test })
    }

    pub fn persist<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        train_path: P,
        test_path: Q,
    ) -> Result<(), WriteError> {
        write_table(&train_path, &self.train)?;
        write_table(&test_path, &self.test)?;
        info!(
            "Wrote {} and {}",
            train_path.as_ref().display(),
            test_path.as_ref().display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_parse::load_table;
    use tempfile::tempdir;

    fn numbered(n: usize) -> Table {
        let a: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let b: Vec<f64> = (0..n).map(|i| (i * 10) as f64).collect();
        Table::new(vec!["a".to_owned(), "b".to_owned()], vec![a, b]).unwrap()
    }

    #[test]
    fn test_counts_cover_every_remainder() {
        let ratio = SplitRatio::default();
        for n in 1..=53usize {
            let (train, test) = ratio.counts(n);
            assert_eq!(train + test, n, "n = {n}");
            assert_eq!(train, (4 * n).div_ceil(5), "n = {n}");
            assert_eq!(test, n / 5, "n = {n}");
        }
    }

    #[test]
    fn test_counts_known_values() {
        let ratio = SplitRatio::default();
        assert_eq!(ratio.counts(200), (160, 40));
        assert_eq!(ratio.counts(10), (8, 2));
        assert_eq!(ratio.counts(4), (4, 0));
        assert_eq!(ratio.counts(1), (1, 0));
        assert_eq!(ratio.counts(0), (0, 0));
    }

    #[test]
    fn test_zero_ratio_puts_all_in_train() {
        assert_eq!(SplitRatio::new(0, 0).counts(7), (7, 0));
    }

    #[test]
    fn test_split_is_contiguous_and_ordered() {
        let table = numbered(13);
        let split = Split::from_table(&table, SplitRatio::default()).unwrap();

        assert_eq!(split.train.nrows(), 11);
        assert_eq!(split.test.nrows(), 2);
        let train_a: Vec<f64> = (0..11).map(|i| i as f64).collect();
        assert_eq!(split.train.column("a").unwrap(), train_a.as_slice());
        assert_eq!(split.test.column("a").unwrap(), &[11., 12.]);
        assert_eq!(split.train.concat(&split.test).unwrap(), table);
    }

    #[test]
    fn test_small_table_leaves_test_empty() {
        let table = numbered(3);
        let split = Split::from_table(&table, SplitRatio::default()).unwrap();
        assert_eq!(split.train, table);
        assert!(split.test.is_empty());
        assert_eq!(split.test.names(), table.names());
    }

    #[test]
    fn test_persist_writes_both_partitions() {
        let dir = tempdir().unwrap();
        let train_path = dir.path().join("train.csv");
        let test_path = dir.path().join("test.csv");
        let table = numbered(10);

        let split = Split::from_table(&table, SplitRatio::default()).unwrap();
        split.persist(&train_path, &test_path).unwrap();

        let train = load_table(&train_path).unwrap();
        let test = load_table(&test_path).unwrap();
        assert!(train.approx_eq(&split.train, 1e-12));
        assert!(test.approx_eq(&split.test, 1e-12));
        assert_eq!(test.nrows(), 2);
    }
}
