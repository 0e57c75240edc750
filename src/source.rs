//! Source dataset ingestion.
//!
//! Reads every row of a delimited file into memory as strings, then applies the
//! header and skip settings: `original_headings` always come from the first
//! raw row (or are synthesized as `Column N`), after which the first
//! `skip_rows` rows, plus the header row when present, are dropped.

use std::path::Path;

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::{debug, info};

use crate::{
    cli::{ReadArgs, SourceArgs},
    io_utils,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceOptions {
    pub first_row_is_header: bool,
    pub skip_rows: usize,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            first_row_is_header: true,
            skip_rows: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceData {
    pub original_headings: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceData {
    pub fn from_raw(mut data: Vec<Vec<String>>, options: SourceOptions) -> Self {
        let original_headings = data
            .first()
            .map(|first| {
                first
                    .iter()
                    .enumerate()
                    .map(|(idx, cell)| {
                        if options.first_row_is_header {
                            cell.clone()
                        } else {
                            format!("Column {}", idx + 1)
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        let drop = (options.skip_rows + usize::from(options.first_row_is_header)).min(data.len());
        data.drain(..drop);
        debug!("Dropped {drop} leading row(s); {} row(s) remain", data.len());
        Self {
            original_headings,
            rows: data,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

pub fn read_source(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
    options: SourceOptions,
) -> Result<SourceData> {
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let mut raw = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 1))?;
        let decoded = io_utils::decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {}", row_idx + 1))?;
        raw.push(decoded);
    }
    let source = SourceData::from_raw(raw, options);
    info!(
        "Loaded {} row(s) and {} heading(s) from {:?}",
        source.row_count(),
        source.original_headings.len(),
        path
    );
    Ok(source)
}

/// Reads the source described by command-line arguments, returning it with
/// the delimiter that was used.
pub fn load_from_args(args: &SourceArgs) -> Result<(SourceData, u8)> {
    load_path(&args.input, &args.read)
}

pub fn load_path(path: &Path, read: &ReadArgs) -> Result<(SourceData, u8)> {
    let delimiter = io_utils::resolve_input_delimiter(path, read.delimiter);
    let encoding = io_utils::resolve_encoding(read.input_encoding.as_deref())?;
    let options = SourceOptions {
        first_row_is_header: !read.no_header,
        skip_rows: read.skip_rows,
    };
    let source = read_source(path, delimiter, encoding, options)
        .with_context(|| format!("Reading source {path:?}"))?;
    Ok((source, delimiter))
}
