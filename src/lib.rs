pub mod aggregate;
pub mod cli;
pub mod edit;
pub mod engine;
pub mod grouping;
pub mod headings;
pub mod io_utils;
pub mod library;
pub mod mapping;
pub mod output;
pub mod preset;
pub mod reshape;
pub mod source;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

pub use crate::{
    aggregate::AggregationType,
    engine::MappingEngine,
    mapping::{Heading, IdentityKey, MappingEntry, MappingError, Mappings},
    output::{OutputRow, OutputTable},
    preset::{MappingPreset, PresetLibrary},
    source::{SourceData, SourceOptions},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_mare", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Headings(args) => headings::execute(&args),
        Commands::Reshape(args) => reshape::execute(&args),
        Commands::Mapping(args) => edit::execute(&args),
        Commands::Preset(args) => library::execute(&args),
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
