//! The `mapping` command: edits a mapping preset file by replaying ordered
//! directives against a [`MappingEngine`].

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use log::{debug, info};

use crate::{
    aggregate::AggregationType,
    cli::MappingArgs,
    engine::MappingEngine,
    mapping::IdentityKey,
    preset::MappingPreset,
    source, table,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingDirective {
    AddKey(IdentityKey),
    AddHeading {
        label: Option<String>,
        kind: Option<AggregationType>,
    },
    Map {
        key: IdentityKey,
        column: usize,
        source: String,
    },
    Unmap {
        key: IdentityKey,
        column: usize,
        position: usize,
    },
    DropKey(IdentityKey),
    DropHeading(usize),
    Label {
        index: usize,
        label: Option<String>,
    },
    Type {
        index: usize,
        kind: AggregationType,
    },
}

impl MappingDirective {
    pub fn parse(input: &str) -> Result<Self> {
        let (name, argument) = match input.split_once('=') {
            Some((name, argument)) => (name.trim(), argument.trim()),
            None => (input.trim(), ""),
        };
        let directive = match name.to_ascii_lowercase().as_str() {
            "add-key" => MappingDirective::AddKey(parse_index(argument, "identity key")?),
            "add-heading" => parse_heading(argument)?,
            "map" => {
                let [key, column, source] = split_fields::<3>(argument, name)?;
                MappingDirective::Map {
                    key: parse_index(key, "identity key")?,
                    column: parse_index(column, "output column")?,
                    source: source.to_string(),
                }
            }
            "unmap" => {
                let [key, column, position] = split_fields::<3>(argument, name)?;
                MappingDirective::Unmap {
                    key: parse_index(key, "identity key")?,
                    column: parse_index(column, "output column")?,
                    position: parse_index(position, "position")?,
                }
            }
            "drop-key" => MappingDirective::DropKey(parse_index(argument, "identity key")?),
            "drop-heading" => MappingDirective::DropHeading(parse_index(argument, "heading index")?),
            "label" => {
                let (index, label) = argument
                    .split_once(':')
                    .ok_or_else(|| anyhow!("Directive 'label' expects IDX:LABEL"))?;
                let label = label.trim();
                MappingDirective::Label {
                    index: parse_index(index, "heading index")?,
                    label: (!label.is_empty()).then(|| label.to_string()),
                }
            }
            "type" => {
                let (index, kind) = argument
                    .split_once(':')
                    .ok_or_else(|| anyhow!("Directive 'type' expects IDX:TYPE"))?;
                MappingDirective::Type {
                    index: parse_index(index, "heading index")?,
                    kind: kind.parse()?,
                }
            }
            other => return Err(anyhow!("Unknown mapping directive '{other}'")),
        };
        Ok(directive)
    }

    pub fn apply(&self, engine: &mut MappingEngine) -> Result<()> {
        match self {
            MappingDirective::AddKey(key) => {
                engine.add_mapping_key(*key);
            }
            MappingDirective::AddHeading { label, kind } => {
                let index = engine.add_heading().headings.len() - 1;
                if label.is_some() {
                    engine.set_heading_label(index, label.clone())?;
                }
                if let Some(kind) = kind {
                    engine.set_heading_type(index, kind.clone())?;
                }
            }
            MappingDirective::Map {
                key,
                column,
                source,
            } => {
                engine.add_mapping(*key, *column, source)?;
            }
            MappingDirective::Unmap {
                key,
                column,
                position,
            } => {
                engine.delete_mapping(*key, *column, *position)?;
            }
            MappingDirective::DropKey(key) => {
                engine.delete_output_column(*key);
            }
            MappingDirective::DropHeading(index) => {
                engine.delete_output_mapping(*index)?;
            }
            MappingDirective::Label { index, label } => {
                engine.set_heading_label(*index, label.clone())?;
            }
            MappingDirective::Type { index, kind } => {
                engine.set_heading_type(*index, kind.clone())?;
            }
        }
        Ok(())
    }
}

fn parse_index(value: &str, what: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {what} '{}'", value.trim()))
}

fn split_fields<'a, const N: usize>(argument: &'a str, name: &str) -> Result<[&'a str; N]> {
    let fields = argument.splitn(N, ':').map(str::trim).collect::<Vec<_>>();
    fields
        .try_into()
        .map_err(|_| anyhow!("Directive '{name}' expects {N} ':'-separated fields"))
}

/// `LABEL[:TYPE]`; a suffix that is not an aggregation type stays part of the
/// label.
fn parse_heading(argument: &str) -> Result<MappingDirective> {
    if argument.is_empty() {
        return Ok(MappingDirective::AddHeading {
            label: None,
            kind: None,
        });
    }
    if let Some((label, kind)) = argument.rsplit_once(':')
        && let Ok(kind) = kind.parse::<AggregationType>()
    {
        let label = label.trim();
        return Ok(MappingDirective::AddHeading {
            label: (!label.is_empty()).then(|| label.to_string()),
            kind: Some(kind),
        });
    }
    Ok(MappingDirective::AddHeading {
        label: Some(argument.to_string()),
        kind: None,
    })
}

pub fn execute(args: &MappingArgs) -> Result<()> {
    let directives = args
        .ops
        .iter()
        .map(|op| MappingDirective::parse(op).with_context(|| format!("Parsing directive '{op}'")))
        .collect::<Result<Vec<_>>>()?;
    debug!("Mapping directives: {directives:?}");

    let mut engine = MappingEngine::new();
    if let Some(path) = &args.preview {
        let (source, _) = source::load_path(path, &args.read)?;
        engine.load_source(source);
    }
    engine.load_preset(load_or_default(&args.mapping)?);

    for (directive, op) in directives.iter().zip(&args.ops) {
        directive
            .apply(&mut engine)
            .with_context(|| format!("Applying directive '{op}'"))?;
    }

    if args.dry_run {
        info!("Dry run: {:?} left unchanged", args.mapping);
    } else {
        engine
            .export_preset()
            .save_json(&args.mapping)
            .with_context(|| format!("Saving mapping to {:?}", args.mapping))?;
        info!(
            "Applied {} directive(s) to {:?}",
            directives.len(),
            args.mapping
        );
    }

    if args.preview.is_some() {
        table::print_output(engine.output());
    }
    Ok(())
}

fn load_or_default(path: &Path) -> Result<MappingPreset> {
    if path.exists() {
        MappingPreset::load_json(path)
    } else {
        debug!("Mapping file {path:?} does not exist yet; starting from defaults");
        Ok(MappingPreset::default())
    }
}
