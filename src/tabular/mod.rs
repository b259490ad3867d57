//! Tabularization: a batch of flattened records unified into one table.
//!
//! The column set is the union of all keys seen across the batch, in
//! first-seen order; absent cells are filled with the `nil` sentinel.
//! Tables round-trip through CSV (header = column union, UTF-8).

pub mod errors;

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde_json::Value;

use crate::flatten::{self, FlattenedRecord, Scalar, SENTINEL};
use self::errors::TabularError;

/// Uniform table: every row has every column, missing cells are `Nil`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Scalar>>,
}

impl Table {
    /// Flatten and unify a raw JSON value into a table.
    ///
    /// Applies the API-envelope unwrap first, then flattens each record,
    /// computes the column union, and fills absent cells with the sentinel.
    /// Pure: identical input yields a byte-identical table.
    pub fn tabulate(value: &Value) -> Table {
        let records: Vec<FlattenedRecord> = flatten::records(value)
            .iter()
            .map(|rec| flatten::flatten(rec, ""))
            .collect();
        Self::from_records(&records)
    }

    /// Unify already-flattened records under their column union.
    pub fn from_records(records: &[FlattenedRecord]) -> Table {
        let mut columns: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for record in records {
            for key in record.keys() {
                if seen.insert(key) {
                    columns.push(key.to_string());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|col| record.get(col).cloned().unwrap_or(Scalar::Nil))
                    .collect()
            })
            .collect();

        Table { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Scalar>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell lookup by row index and column name; absent column reads as `Nil`.
    pub fn cell(&self, row: usize, column: &str) -> &Scalar {
        self.column_index(column)
            .and_then(|i| self.rows.get(row).map(|r| &r[i]))
            .unwrap_or(&Scalar::Nil)
    }

    /// Write the table as delimited text: header row, then one line per
    /// record, `Nil` cells rendered as the literal sentinel.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), TabularError> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(&self.columns)?;
        for row in &self.rows {
            out.write_record(row.iter().map(Scalar::render))?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn to_csv_path<P: AsRef<Path>>(&self, path: P) -> Result<(), TabularError> {
        self.write_csv(File::create(path)?)
    }

    /// Read a table back from delimited text. Cells come back as `Text`,
    /// except the literal sentinel which reads as `Nil`.
    pub fn read_csv<R: Read>(reader: R) -> Result<Table, TabularError> {
        let mut input = csv::Reader::from_reader(reader);
        let columns: Vec<String> = input
            .headers()
            .map_err(|_| TabularError::MissingHeader)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in input.records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|cell| {
                        if cell == SENTINEL {
                            Scalar::Nil
                        } else {
                            Scalar::Text(cell.to_string())
                        }
                    })
                    .collect(),
            );
        }

        Ok(Table { columns, rows })
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Table, TabularError> {
        Self::read_csv(File::open(path)?)
    }
}
