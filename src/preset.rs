//! Mapping presets and the named preset library.
//!
//! A [`MappingPreset`] is the portable part of an output table: its headings
//! and its mappings. Presets are exchanged as JSON files, for example
//!
//! ```json
//! {"headings":[{"type":"Distinct values","label":"Id"},{"type":"Min number"}],
//!  "mappings":{"0":[null,[1]]}}
//! ```
//!
//! A [`PresetLibrary`] stores presets under names in a single YAML file.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::mapping::{Heading, Mappings};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingPreset {
    #[serde(default = "default_headings")]
    pub headings: Vec<Heading>,
    #[serde(default)]
    pub mappings: Mappings,
}

fn default_headings() -> Vec<Heading> {
    vec![Heading::default()]
}

impl Default for MappingPreset {
    fn default() -> Self {
        Self {
            headings: default_headings(),
            mappings: Mappings::new(),
        }
    }
}

impl MappingPreset {
    pub fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).context("Parsing mapping JSON")
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).context("Serializing mapping JSON")
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening mapping file {path:?}"))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing mapping JSON from {path:?}"))
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating mapping file {path:?}"))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).context("Writing mapping JSON")?;
        writer.flush().context("Flushing mapping JSON")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetLibrary {
    #[serde(default)]
    pub presets: BTreeMap<String, MappingPreset>,
}

impl PresetLibrary {
    /// Loads the library at `path`; a missing file is an empty library.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("Preset library {path:?} does not exist yet; starting empty");
            return Ok(Self::default());
        }
        let file = File::open(path).with_context(|| format!("Opening preset library {path:?}"))?;
        serde_yaml::from_reader(BufReader::new(file)).context("Parsing preset library YAML")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("Creating preset library {path:?}"))?;
        serde_yaml::to_writer(BufWriter::new(file), self).context("Writing preset library YAML")
    }

    /// Stores `preset` under `name`, returning the preset it replaced.
    pub fn insert(&mut self, name: impl Into<String>, preset: MappingPreset) -> Option<MappingPreset> {
        self.presets.insert(name.into(), preset)
    }

    pub fn remove(&mut self, name: &str) -> Option<MappingPreset> {
        self.presets.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&MappingPreset> {
        self.presets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    /// Looks up `name`, failing with the list of stored names when it is absent.
    pub fn require(&self, name: &str, path: &Path) -> Result<&MappingPreset> {
        self.get(name).ok_or_else(|| {
            anyhow!(
                "Preset '{name}' not found in {path:?} (available: {})",
                self.names().join(", ")
            )
        })
    }
}
