//! The `reshape` command: ingest a CSV file, apply a mapping preset and write
//! the rebuilt output table.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{
    cli::ReshapeArgs,
    engine::MappingEngine,
    io_utils,
    output::export_file_name,
    preset::{MappingPreset, PresetLibrary},
    source, table,
};

pub fn execute(args: &ReshapeArgs) -> Result<()> {
    let preset = resolve_preset(args)?;
    let (source, delimiter) = source::load_from_args(&args.source)?;

    let mut engine = MappingEngine::with_source(source);
    engine.load_preset(preset);
    let output = engine.output();
    info!(
        "Reshaped {} source row(s) into {} output row(s) across {} column(s)",
        engine.source().row_count(),
        output.data.len(),
        output.headings.len()
    );

    if args.table {
        table::print_output(engine.output());
        return Ok(());
    }

    let output_path = resolve_output_path(args)?;
    let output_delimiter =
        io_utils::resolve_output_delimiter(output_path.as_deref(), args.output_delimiter, delimiter);
    let mut writer = io_utils::open_csv_writer(output_path.as_deref(), output_delimiter)?;
    io_utils::write_rows(&mut writer, &engine.export_rows())?;
    info!(
        "Wrote output to {} (delimiter '{}')",
        output_path
            .as_ref()
            .map(|p| format!("{p:?}"))
            .unwrap_or_else(|| "stdout".into()),
        crate::printable_delimiter(output_delimiter)
    );
    Ok(())
}

fn resolve_preset(args: &ReshapeArgs) -> Result<MappingPreset> {
    match (&args.mapping, &args.library, &args.preset) {
        (Some(path), _, _) => MappingPreset::load_json(path),
        (None, Some(library_path), Some(name)) => {
            let library = PresetLibrary::load(library_path)?;
            library.require(name, library_path).cloned()
        }
        _ => Err(anyhow!(
            "Provide a mapping file with --mapping or a stored preset with --library and --preset"
        )),
    }
}

fn resolve_output_path(args: &ReshapeArgs) -> Result<Option<PathBuf>> {
    if !args.auto_output {
        return Ok(args.output.clone());
    }
    let input = &args.source.input;
    if io_utils::is_dash(input) {
        return Err(anyhow!("--auto-output requires an input file path, not stdin"));
    }
    let file_name = input
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Input path {input:?} has no usable file name"))?;
    Ok(Some(input.with_file_name(export_file_name(file_name))))
}
