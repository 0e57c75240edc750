//! The mapping engine.
//!
//! [`MappingEngine`] owns the source dataset and the output table. Every
//! mutation runs one full rebuild before returning the rebuilt table, so
//! callers never observe a table that is out of date with its mappings.

use log::{debug, info};

use crate::{
    aggregate::{self, AggregationType},
    mapping::{Heading, IdentityKey, MappingEntry, MappingError},
    output::OutputTable,
    preset::MappingPreset,
    source::SourceData,
};

#[derive(Debug, Clone, Default)]
pub struct MappingEngine {
    source: SourceData,
    output: OutputTable,
}

impl MappingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(source: SourceData) -> Self {
        let mut engine = Self::new();
        engine.load_source(source);
        engine
    }

    pub fn source(&self) -> &SourceData {
        &self.source
    }

    pub fn output(&self) -> &OutputTable {
        &self.output
    }

    /// Recomputes the output table with unchanged inputs.
    pub fn update_output(&mut self) -> &OutputTable {
        self.output.rebuild(&self.source.rows);
        &self.output
    }

    pub fn load_source(&mut self, source: SourceData) -> &OutputTable {
        info!(
            "Loaded source with {} row(s) and {} heading(s)",
            source.rows.len(),
            source.original_headings.len()
        );
        self.source = source;
        self.update_output()
    }

    /// Replaces headings and mappings wholesale.
    pub fn load_preset(&mut self, preset: MappingPreset) -> &OutputTable {
        debug!(
            "Loading preset with {} heading(s) and {} identity key(s)",
            preset.headings.len(),
            preset.mappings.len()
        );
        self.output.headings = preset.headings;
        self.output.mappings = preset.mappings;
        self.update_output()
    }

    pub fn export_preset(&self) -> MappingPreset {
        MappingPreset {
            headings: self.output.headings.clone(),
            mappings: self.output.mappings.clone(),
        }
    }

    pub fn export_rows(&self) -> Vec<Vec<String>> {
        self.output.to_export_rows()
    }

    /// Starts an empty mapping entry for `key`, replacing any existing one.
    pub fn add_mapping_key(&mut self, key: IdentityKey) -> &OutputTable {
        self.output.mappings.insert(key, MappingEntry::default());
        self.update_output()
    }

    /// Maps `source_column` onto `output_column` under `key`.
    ///
    /// An empty `source_column` is ignored without rebuilding.
    pub fn add_mapping(
        &mut self,
        key: IdentityKey,
        output_column: usize,
        source_column: &str,
    ) -> Result<&OutputTable, MappingError> {
        if source_column.trim().is_empty() {
            return Ok(&self.output);
        }
        let source_index = aggregate::parse_leading_integer(source_column)
            .and_then(|value| usize::try_from(value).ok())
            .ok_or_else(|| MappingError::InvalidSourceColumn(source_column.to_string()))?;
        self.output
            .mappings
            .get_mut(&key)
            .ok_or(MappingError::UnknownKey(key))?
            .push_source(output_column, source_index);
        Ok(self.update_output())
    }

    /// Removes the contribution at `position` of `output_column` under `key`.
    pub fn delete_mapping(
        &mut self,
        key: IdentityKey,
        output_column: usize,
        position: usize,
    ) -> Result<&OutputTable, MappingError> {
        let removed = self
            .output
            .mappings
            .get_mut(&key)
            .ok_or(MappingError::UnknownKey(key))?
            .remove_source(key, output_column, position)?;
        debug!("Removed source column {removed} from output column {output_column} of key {key}");
        Ok(self.update_output())
    }

    /// Drops the whole mapping entry for `key`. Missing keys are ignored.
    pub fn delete_output_column(&mut self, key: IdentityKey) -> &OutputTable {
        if self.output.mappings.remove(&key).is_none() {
            debug!("No mapping entry for identity key {key}");
        }
        self.update_output()
    }

    pub fn add_heading(&mut self) -> &OutputTable {
        self.output.headings.push(Heading::default());
        self.update_output()
    }

    /// Removes the heading at `index` and clears slot `index` of every mapping
    /// entry.
    ///
    /// Headings after `index` shift left but mapping slots do not, so mappings
    /// that pointed at later columns now line up with the heading to their
    /// right.
    pub fn delete_output_mapping(&mut self, index: usize) -> Result<&OutputTable, MappingError> {
        self.check_heading(index)?;
        self.output.headings.remove(index);
        for entry in self.output.mappings.values_mut() {
            entry.clear_slot(index);
        }
        Ok(self.update_output())
    }

    pub fn set_heading_label(
        &mut self,
        index: usize,
        label: Option<String>,
    ) -> Result<&OutputTable, MappingError> {
        self.check_heading(index)?;
        self.output.headings[index].label = label;
        Ok(self.update_output())
    }

    pub fn set_heading_type(
        &mut self,
        index: usize,
        kind: AggregationType,
    ) -> Result<&OutputTable, MappingError> {
        self.check_heading(index)?;
        self.output.headings[index].kind = kind;
        Ok(self.update_output())
    }

    fn check_heading(&self, index: usize) -> Result<(), MappingError> {
        let len = self.output.headings.len();
        if index < len {
            Ok(())
        } else {
            Err(MappingError::HeadingOutOfRange { index, len })
        }
    }
}
