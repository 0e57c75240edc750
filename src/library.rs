//! The `preset` command: list, store, remove and export named presets.

use anyhow::Result;
use itertools::Itertools;
use log::info;

use crate::{
    cli::{PresetArgs, PresetCommands},
    preset::{MappingPreset, PresetLibrary},
    table,
};

pub fn execute(args: &PresetArgs) -> Result<()> {
    let path = &args.library;
    let mut library = PresetLibrary::load(path)?;
    match &args.command {
        PresetCommands::List => {
            let rows = library
                .presets
                .iter()
                .map(|(name, preset)| {
                    vec![
                        name.clone(),
                        preset.headings.len().to_string(),
                        preset.mappings.keys().join(","),
                    ]
                })
                .collect::<Vec<_>>();
            let headers = vec![
                "name".to_string(),
                "headings".to_string(),
                "identity keys".to_string(),
            ];
            table::print_table(&headers, &rows);
            info!("Listed {} preset(s) from {:?}", rows.len(), path);
        }
        PresetCommands::Save { name, mapping } => {
            let preset = MappingPreset::load_json(mapping)?;
            if library.insert(name.as_str(), preset).is_some() {
                info!("Replaced preset '{name}'");
            }
            library.save(path)?;
            info!("Saved preset '{name}' to {:?}", path);
        }
        PresetCommands::Delete { name } => {
            library.require(name, path)?;
            library.remove(name);
            library.save(path)?;
            info!("Deleted preset '{name}' from {:?}", path);
        }
        PresetCommands::Export { name, output } => {
            let preset = library.require(name, path)?;
            preset.save_json(output)?;
            info!("Exported preset '{name}' to {:?}", output);
        }
    }
    Ok(())
}
