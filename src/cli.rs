use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Reshape CSV data by grouping on identity columns and aggregating mapped columns",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List source headings with the column indices used by mappings
    Headings(HeadingsArgs),
    /// Build the output table for a CSV file from a mapping preset
    Reshape(ReshapeArgs),
    /// Edit a mapping preset file with ordered directives
    Mapping(MappingArgs),
    /// Manage a library of named mapping presets
    Preset(PresetArgs),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Input CSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    #[command(flatten)]
    pub read: ReadArgs,
}

/// How a source file is read: header handling, skipped rows, delimiter and
/// encoding.
#[derive(Debug, Args)]
pub struct ReadArgs {
    /// Treat the first row as data instead of headings
    #[arg(long = "no-header")]
    pub no_header: bool,
    /// Number of leading rows to drop in addition to the header row
    #[arg(long = "skip-rows", default_value_t = 0)]
    pub skip_rows: usize,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct HeadingsArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args)]
pub struct ReshapeArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Mapping preset JSON file
    #[arg(short = 'm', long = "mapping", conflicts_with = "preset")]
    pub mapping: Option<PathBuf>,
    /// Preset library YAML file used with --preset
    #[arg(short = 'l', long = "library", requires = "preset")]
    pub library: Option<PathBuf>,
    /// Name of a preset stored in --library
    #[arg(short = 'p', long = "preset", requires = "library")]
    pub preset: Option<String>,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output", conflicts_with = "auto_output")]
    pub output: Option<PathBuf>,
    /// Write next to the input as mare-<input name>.csv
    #[arg(long = "auto-output")]
    pub auto_output: bool,
    /// Delimiter to use for output (defaults to input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Render the output as an elastic table on stdout
    #[arg(long = "table", conflicts_with_all = ["output", "auto_output"])]
    pub table: bool,
}

#[derive(Debug, Args)]
pub struct MappingArgs {
    /// Mapping preset JSON file to edit (created when missing)
    #[arg(short = 'm', long = "mapping")]
    pub mapping: PathBuf,
    /// Edit directives applied in order: add-key=K, add-heading[=LABEL[:TYPE]],
    /// map=K:COL:SRC, unmap=K:COL:POS, drop-key=K, drop-heading=IDX,
    /// label=IDX:LABEL, type=IDX:TYPE
    #[arg(long = "op", action = clap::ArgAction::Append)]
    pub ops: Vec<String>,
    /// CSV file to rebuild against and display after editing
    #[arg(long = "preview")]
    pub preview: Option<PathBuf>,
    #[command(flatten)]
    pub read: ReadArgs,
    /// Apply the directives without saving the mapping file
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct PresetArgs {
    /// Preset library YAML file
    #[arg(short = 'l', long = "library", global = true, default_value = "mare-presets.yml")]
    pub library: PathBuf,
    #[command(subcommand)]
    pub command: PresetCommands,
}

#[derive(Debug, Subcommand)]
pub enum PresetCommands {
    /// List stored presets
    List,
    /// Store a mapping file under a name, replacing any preset with that name
    Save {
        #[arg(short = 'n', long = "name")]
        name: String,
        #[arg(short = 'm', long = "mapping")]
        mapping: PathBuf,
    },
    /// Remove a stored preset
    Delete {
        #[arg(short = 'n', long = "name")]
        name: String,
    },
    /// Write a stored preset to a mapping JSON file
    Export {
        #[arg(short = 'n', long = "name")]
        name: String,
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
