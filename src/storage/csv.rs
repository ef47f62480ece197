//! Delimited-text (CSV) row source and sink
//!
//! # Format
//!
//! One header line naming the 9 columns, then one line per row. Every
//! non-numeric field is quoted (including empty ones), numbers are written
//! bare, and floats use their shortest round-trip form (`1.0`, `0.25`):
//!
//! ```text
//! "src_name","edge_id","rel_name","dst_name","truth","shadow","is_rdf","labels","props"
//! "a",-1,"","",1.0,-1,"true","Recipe","{""minutes"":8}"
//! "a",0,"uses","b",1.0,-1,"true","",""
//! ```

use crate::codec::RawRow;
use crate::consts::COLUMNS;
use crate::error::{GraphError, Result};
use crate::partition::Partition;
use anyhow::Context;
use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::info;

/// Lazy `(row_number, RawRow)` source over CSV text
///
/// Stops after the first error.
pub struct CsvRows<R> {
    reader: csv::Reader<R>,
    headers: StringRecord,
    record: StringRecord,
    row_num: u64,
    failed: bool,
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = Result<(u64, RawRow)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.reader.read_record(&mut self.record) {
            Ok(false) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(GraphError::from(e)))
            }
            Ok(true) => {
                let row_num = self.row_num;
                self.row_num += 1;

                match self.record.deserialize::<RawRow>(Some(&self.headers)) {
                    Ok(raw) => Some(Ok((row_num, raw))),
                    Err(e) => {
                        self.failed = true;
                        let row = self.record.iter().collect::<Vec<_>>().join(",");
                        Some(Err(GraphError::Schema(e.to_string()).at_row(row_num, row)))
                    }
                }
            }
        }
    }
}

/// Start reading rows from CSV text; columns are matched by header name
///
/// # Errors
///
/// Returns [`GraphError::Csv`] if the header line cannot be read
pub fn iter_load_csv<R: Read>(reader: R) -> Result<CsvRows<R>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = reader.headers()?.clone();

    Ok(CsvRows {
        reader,
        headers,
        record: StringRecord::new(),
        row_num: 0,
        failed: false,
    })
}

/// Write a header line and then every row
///
/// # Errors
///
/// Returns the first error yielded by `rows`, or [`GraphError::Csv`] on
/// write failure
pub fn write_csv<W, I>(rows: I, writer: W) -> Result<W>
where
    W: Write,
    I: IntoIterator<Item = Result<RawRow>>,
{
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(writer);

    wtr.write_record(COLUMNS)?;

    for row in rows {
        wtr.serialize(row?)?;
    }

    wtr.flush().map_err(csv::Error::from)?;

    wtr.into_inner()
        .map_err(|e| GraphError::from(csv::Error::from(e.into_error())))
}

impl Partition {
    /// Ingest a CSV file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or any row fails to ingest
    pub fn load_csv<P: AsRef<Path>>(&mut self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

        self.try_parse_rows(iter_load_csv(BufReader::new(file))?)
            .with_context(|| format!("Failed to load {}", path.display()))?;

        info!(path = %path.display(), "loaded CSV");

        Ok(())
    }

    /// Write the partition as a CSV file
    ///
    /// # Errors
    ///
    /// Returns error if file I/O fails or emission hits an internal fault
    pub fn save_file_csv<P: AsRef<Path>>(&self, path: P, sort: bool) -> anyhow::Result<()> {
        let path = path.as_ref();
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

        write_csv(self.iter_gen_raw_rows(sort), BufWriter::new(file))?
            .flush()
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!(path = %path.display(), sort, "saved CSV");

        Ok(())
    }

    /// Render the partition as CSV text
    ///
    /// # Errors
    ///
    /// Returns emission faults
    pub fn to_csv_string(&self, sort: bool) -> Result<String> {
        let bytes = write_csv(self.iter_gen_raw_rows(sort), Vec::new())?;

        String::from_utf8(bytes).map_err(|e| GraphError::Internal(e.to_string()))
    }
}
