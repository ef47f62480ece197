//! Parquet I/O for partition persistence
//!
//! # Format
//!
//! A partition is stored as one Parquet file holding the canonical row
//! stream, one Arrow column per field:
//!
//! | column | Arrow type | nullable |
//! |---|---|---|
//! | `src_name` | Utf8 | no |
//! | `edge_id` | Int64 | no |
//! | `rel_name` | Utf8 | yes |
//! | `dst_name` | Utf8 | yes |
//! | `truth` | Float64 | no |
//! | `shadow` | Int64 | no |
//! | `is_rdf` | Boolean | no |
//! | `labels` | Utf8 | yes |
//! | `props` | Utf8 | no |
//!
//! Readers resolve columns by name and number rows continuously across row
//! groups.

use crate::codec::RawRow;
use crate::error::GraphError;
use crate::partition::Partition;
use anyhow::{Context, Result};
use arrow::array::{Array, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Arrow schema of the canonical row stream
#[must_use]
pub fn row_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("src_name", DataType::Utf8, false),
        Field::new("edge_id", DataType::Int64, false),
        Field::new("rel_name", DataType::Utf8, true),
        Field::new("dst_name", DataType::Utf8, true),
        Field::new("truth", DataType::Float64, false),
        Field::new("shadow", DataType::Int64, false),
        Field::new("is_rdf", DataType::Boolean, false),
        Field::new("labels", DataType::Utf8, true),
        Field::new("props", DataType::Utf8, false),
    ]))
}

/// Convert rows into one Arrow record batch
///
/// # Errors
///
/// Returns error if Arrow rejects the arrays
pub fn rows_to_batch(rows: &[RawRow]) -> Result<RecordBatch> {
    let src_names: StringArray = rows.iter().map(|r| Some(r.src_name.as_str())).collect();
    let edge_ids: Int64Array = rows.iter().map(|r| Some(r.edge_id)).collect();
    let rel_names: StringArray = rows.iter().map(|r| r.rel_name.as_deref()).collect();
    let dst_names: StringArray = rows.iter().map(|r| r.dst_name.as_deref()).collect();
    let truths: Float64Array = rows.iter().map(|r| Some(r.truth)).collect();
    let shadows: Int64Array = rows.iter().map(|r| Some(r.shadow)).collect();
    let is_rdfs: BooleanArray = rows.iter().map(|r| Some(r.is_rdf)).collect();
    let labels: StringArray = rows.iter().map(|r| r.labels.as_deref()).collect();
    let props: StringArray = rows.iter().map(|r| Some(r.props.as_str())).collect();

    RecordBatch::try_new(
        row_schema(),
        vec![
            Arc::new(src_names),
            Arc::new(edge_ids),
            Arc::new(rel_names),
            Arc::new(dst_names),
            Arc::new(truths),
            Arc::new(shadows),
            Arc::new(is_rdfs),
            Arc::new(labels),
            Arc::new(props),
        ],
    )
    .context("Failed to create RecordBatch")
}

/// Write rows to a Parquet file (ZSTD compressed, one row group)
///
/// # Errors
///
/// Returns error if file I/O fails or Arrow conversion fails
pub fn write_rows_parquet<P: AsRef<Path>>(rows: &[RawRow], path: P) -> Result<()> {
    let path = path.as_ref();
    let batch = rows_to_batch(rows)?;

    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::ZSTD(
            parquet::basic::ZstdLevel::try_new(3)?,
        ))
        .build();

    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T, GraphError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| GraphError::Schema(format!("missing column {name}")))?
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| GraphError::Schema(format!("invalid {name} column type")))
}

fn optional_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<Option<&'a StringArray>, GraphError> {
    if batch.column_by_name(name).is_none() {
        return Ok(None);
    }

    column::<StringArray>(batch, name).map(Some)
}

fn required(array: &dyn Array, name: &str, i: usize) -> Result<(), GraphError> {
    if array.is_null(i) {
        return Err(GraphError::Schema(format!("null {name}")));
    }

    Ok(())
}

fn optional_str(array: Option<&StringArray>, i: usize) -> Option<String> {
    array
        .filter(|a| !a.is_null(i))
        .map(|a| a.value(i).to_string())
}

/// Decode one record batch, numbering rows from `first_row`
///
/// # Errors
///
/// Returns [`GraphError::Schema`] for a missing or mistyped column, or
/// [`GraphError::AtRow`] for a null in a required field
pub fn batch_to_rows(batch: &RecordBatch, first_row: u64) -> Result<Vec<(u64, RawRow)>, GraphError> {
    let src_names = column::<StringArray>(batch, "src_name")?;
    let edge_ids = column::<Int64Array>(batch, "edge_id")?;
    let truths = column::<Float64Array>(batch, "truth")?;
    let shadows = column::<Int64Array>(batch, "shadow")?;
    let is_rdfs = column::<BooleanArray>(batch, "is_rdf")?;
    let props = column::<StringArray>(batch, "props")?;
    let rel_names = optional_column(batch, "rel_name")?;
    let dst_names = optional_column(batch, "dst_name")?;
    let labels = optional_column(batch, "labels")?;

    let mut rows = Vec::with_capacity(batch.num_rows());

    for (i, row_num) in (0..batch.num_rows()).zip(first_row..) {
        let checked = [
            (src_names as &dyn Array, "src_name"),
            (edge_ids, "edge_id"),
            (truths, "truth"),
            (shadows, "shadow"),
            (is_rdfs, "is_rdf"),
            (props, "props"),
        ]
        .into_iter()
        .try_for_each(|(array, name)| required(array, name, i));

        if let Err(e) = checked {
            return Err(e.at_row(row_num, format!("row {i} of record batch")));
        }

        rows.push((
            row_num,
            RawRow {
                src_name: src_names.value(i).to_string(),
                edge_id: edge_ids.value(i),
                rel_name: optional_str(rel_names, i),
                dst_name: optional_str(dst_names, i),
                truth: truths.value(i),
                shadow: shadows.value(i),
                is_rdf: is_rdfs.value(i),
                labels: optional_str(labels, i),
                props: props.value(i).to_string(),
            },
        ));
    }

    Ok(rows)
}

/// Read every row of a Parquet file, numbered across row groups
///
/// # Errors
///
/// Returns error if the file doesn't exist, Arrow conversion fails, or a
/// batch violates the row schema
pub fn read_rows_parquet<P: AsRef<Path>>(path: P) -> Result<Vec<(u64, RawRow)>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch: RecordBatch = batch_result?;
        let first_row = rows.len() as u64;

        rows.extend(batch_to_rows(&batch, first_row)?);
    }

    Ok(rows)
}

/// Print the metadata, schema and row-group layout of a Parquet file
///
/// # Errors
///
/// Returns error if the file cannot be opened or parsed
pub fn dump_parquet<P: AsRef<Path>, W: Write>(path: P, out: &mut W) -> Result<()> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let reader = SerializedFileReader::new(file)?;
    let metadata = reader.metadata();
    let file_meta = metadata.file_metadata();

    writeln!(out, "file: {}", path.display())?;
    writeln!(out, "version: {}", file_meta.version())?;
    writeln!(out, "created_by: {}", file_meta.created_by().unwrap_or("unknown"))?;
    writeln!(out, "num_rows: {}", file_meta.num_rows())?;
    writeln!(out, "num_row_groups: {}", metadata.num_row_groups())?;

    writeln!(out, "schema:")?;
    for column in file_meta.schema_descr().columns() {
        writeln!(
            out,
            "  {}: {} (max_def_level={})",
            column.path(),
            column.physical_type(),
            column.max_def_level()
        )?;
    }

    for (i, row_group) in metadata.row_groups().iter().enumerate() {
        writeln!(
            out,
            "row_group {i}: {} rows, {} bytes",
            row_group.num_rows(),
            row_group.total_byte_size()
        )?;
    }

    Ok(())
}

impl Partition {
    /// Write the partition to a Parquet file
    ///
    /// # Errors
    ///
    /// Returns error if emission hits an internal fault, file I/O fails, or
    /// Arrow conversion fails
    #[allow(clippy::unused_async)] // Async API for future I/O operations
    pub async fn save_file_parquet<P: AsRef<Path>>(&self, path: P, sort: bool) -> Result<()> {
        let path = path.as_ref();
        let rows = self
            .iter_gen_raw_rows(sort)
            .collect::<Result<Vec<_>, GraphError>>()?;

        write_rows_parquet(&rows, path)?;

        info!(path = %path.display(), rows = rows.len(), sort, "saved Parquet");

        Ok(())
    }

    /// Ingest a Parquet file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or any row fails to ingest
    #[allow(clippy::unused_async)] // Async API for future I/O operations
    pub async fn load_parquet<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let rows = read_rows_parquet(path)?;

        self.parse_rows(rows)
            .with_context(|| format!("Failed to load {}", path.display()))?;

        info!(path = %path.display(), "loaded Parquet");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BASED_LOCAL, NOT_FOUND};
    use tempfile::tempdir;

    fn sample_rows() -> Vec<RawRow> {
        vec![
            RawRow {
                src_name: "main".to_string(),
                edge_id: NOT_FOUND,
                rel_name: None,
                dst_name: None,
                truth: 1.0,
                shadow: BASED_LOCAL,
                is_rdf: false,
                labels: Some("fn".to_string()),
                props: r#"{"loc":12}"#.to_string(),
            },
            RawRow {
                src_name: "main".to_string(),
                edge_id: 0,
                rel_name: Some("calls".to_string()),
                dst_name: Some("parse_args".to_string()),
                truth: 0.75,
                shadow: BASED_LOCAL,
                is_rdf: false,
                labels: None,
                props: String::new(),
            },
        ]
    }

    #[test]
    fn test_rows_parquet_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.parquet");

        let rows = sample_rows();
        write_rows_parquet(&rows, &path).unwrap();

        let loaded = read_rows_parquet(&path).unwrap();
        let expected: Vec<_> = (0_u64..).zip(rows).collect();
        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_missing_column() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "src_name",
            DataType::Utf8,
            false,
        )]));
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(vec!["a"]))]).unwrap();

        let err = batch_to_rows(&batch, 0).unwrap_err();
        assert!(matches!(err, GraphError::Schema(msg) if msg.contains("edge_id")));
    }

    #[tokio::test]
    async fn test_partition_parquet_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("part.parquet");

        let mut part = Partition::new(0);
        part.parse_rows((0_u64..).zip(sample_rows())).unwrap();
        part.save_file_parquet(&path, true).await.unwrap();

        let mut loaded = Partition::new(1);
        loaded.load_parquet(&path).await.unwrap();

        assert_eq!(loaded.num_nodes(), 2);
        assert_eq!(loaded.num_edges(), 1);
        assert_eq!(
            loaded.to_csv_string(true).unwrap(),
            part.to_csv_string(true).unwrap()
        );
    }

    #[tokio::test]
    async fn test_empty_partition_parquet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.parquet");

        Partition::new(0).save_file_parquet(&path, false).await.unwrap();

        let mut loaded = Partition::new(0);
        loaded.load_parquet(&path).await.unwrap();
        assert_eq!(loaded.num_nodes(), 0);
    }

    #[test]
    fn test_dump_parquet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dump.parquet");
        write_rows_parquet(&sample_rows(), &path).unwrap();

        let mut out = Vec::new();
        dump_parquet(&path, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("num_rows: 2"));
        assert!(text.contains("src_name"));
    }
}
