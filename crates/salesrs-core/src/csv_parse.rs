use crate::table::{Table, TableError};

use log::debug;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("could not open {}: {source}", .path.display())]
    Open { path: PathBuf, source: std::io::Error },
    #[error("malformed csv in {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("{} has no header row", .path.display())]
    MissingHeader { path: PathBuf },
    #[error("{}: row {row}, column '{column}': '{value}' is not a number", .path.display())]
    NonNumeric { path: PathBuf, row: usize, column: String, value: String },
    #[error("{}: {source}", .path.display())]
    Table { path: PathBuf, source: TableError },
}

#[derive(thiserror::Error, Debug)]
pub enum WriteError {
    #[error("could not create {}: {source}", .path.display())]
    Create { path: PathBuf, source: std::io::Error },
    #[error("failed writing csv to {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("failed flushing {}: {source}", .path.display())]
    Flush { path: PathBuf, source: std::io::Error },
}

pub fn mk_rdr<P: AsRef<Path>>(filename: P) -> Result<csv::Reader<File>, ParseError> {
    let path = filename.as_ref();
    let file =
        File::open(path).map_err(|source| ParseError::Open { path: path.to_path_buf(), source })?;
    let rdr = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(false)
        .from_reader(file);
    Ok(rdr)
}

/// Read a headered, all-numeric csv file into a [`Table`].
pub fn load_table<P: AsRef<Path>>(filename: P) -> Result<Table, ParseError> {
    let path = filename.as_ref();
    let mut rdr = mk_rdr(path)?;

    let header = rdr
        .headers()
        .map_err(|source| ParseError::Csv { path: path.to_path_buf(), source })?
        .clone();
    if header.is_empty() || header.iter().all(|h| h.trim().is_empty()) {
        return Err(ParseError::MissingHeader { path: path.to_path_buf() });
    }
    let names: Vec<String> = header.iter().map(|h| h.trim().to_owned()).collect();

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    for (i, r) in rdr.records().enumerate() {
        let record = r.map_err(|source| ParseError::Csv { path: path.to_path_buf(), source })?;

        for (j, field) in record.iter().enumerate() {
            let value = field.trim();
            match value.parse::<f64>() {
                Ok(val) if val.is_finite() => columns[j].push(val),
                _ => {
                    return Err(ParseError::NonNumeric {
                        path: path.to_path_buf(),
                        row: i + 1,
                        column: names[j].clone(),
                        value: value.to_owned(),
                    })
                },
            }
        }
    }

    let table = Table::new(names, columns)
        .map_err(|source| ParseError::Table { path: path.to_path_buf(), source })?;
    debug!("Read {} rows x {} columns from {}", table.nrows(), table.ncols(), path.display());
    Ok(table)
}

/// Write `table` with a header row. Values use the shortest representation that
/// parses back to the same `f64`.
pub fn write_table<P: AsRef<Path>>(filename: P, table: &Table) -> Result<(), WriteError> {
    let path = filename.as_ref();
    let file =
        File::create(path).map_err(|source| WriteError::Create { path: path.to_path_buf(), source })?;
    let mut wtr = csv::Writer::from_writer(file);
    let csv_err = |source: csv::Error| WriteError::Csv { path: path.to_path_buf(), source };

    wtr.write_record(table.names()).map_err(csv_err)?;
    for i in 0..table.nrows() {
        let row: Vec<String> =
            table.iter_columns().map(|(_, values)| values[i].to_string()).collect();
        wtr.write_record(&row).map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| WriteError::Flush { path: path.to_path_buf(), source })?;

    debug!("Wrote {} rows to {}", table.nrows(), path.display());
    Ok(())
}
