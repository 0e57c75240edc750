//! Output headings and the column mapping store.
//!
//! A [`Heading`] describes one output column. Column 0 is always the identity
//! column; its aggregation type is never applied.
//!
//! [`Mappings`] is keyed by identity key, which is the index of the source
//! column supplying grouping values. Each [`MappingEntry`] lists, per output
//! column position, the source columns that feed it under that key. Slot 0 is
//! reserved for the identity itself and never contributes values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::AggregationType;

/// Source column index that supplies grouping values.
pub type IdentityKey = usize;

/// Identity key to mapping entry. Keys iterate in ascending order, which is the
/// order identity values are discovered in during a rebuild.
pub type Mappings = BTreeMap<IdentityKey, MappingEntry>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Heading {
    #[serde(rename = "type", default)]
    pub kind: AggregationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Heading {
    pub fn new(label: impl Into<String>, kind: AggregationType) -> Self {
        Self {
            kind,
            label: Some(label.into()),
        }
    }

    pub fn label_or_empty(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("No mapping exists for identity key {0}")]
    UnknownKey(IdentityKey),
    #[error("'{0}' is not a source column index")]
    InvalidSourceColumn(String),
    #[error("Identity key {key} has no sources mapped to output column {column}")]
    MissingSlot { key: IdentityKey, column: usize },
    #[error(
        "Position {position} is out of range for output column {column} of identity key {key} ({len} source(s))"
    )]
    PositionOutOfRange {
        key: IdentityKey,
        column: usize,
        position: usize,
        len: usize,
    },
    #[error("Heading index {index} is out of range ({len} heading(s))")]
    HeadingOutOfRange { index: usize, len: usize },
}

/// Per output column position, the source columns contributing to it.
///
/// Slots may be absent (`None`) and the entry may be shorter than the heading
/// list; both mean "no contribution".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingEntry(Vec<Option<Vec<usize>>>);

impl MappingEntry {
    pub fn from_slots(slots: Vec<Option<Vec<usize>>>) -> Self {
        Self(slots)
    }

    pub fn slots(&self) -> &[Option<Vec<usize>>] {
        &self.0
    }

    /// Source columns feeding `column`; empty for absent slots.
    pub fn sources(&self, column: usize) -> &[usize] {
        self.0
            .get(column)
            .and_then(Option::as_deref)
            .unwrap_or(&[])
    }

    pub fn push_source(&mut self, column: usize, source_column: usize) {
        if self.0.len() <= column {
            self.0.resize(column + 1, None);
        }
        self.0[column]
            .get_or_insert_with(Vec::new)
            .push(source_column);
    }

    pub fn remove_source(
        &mut self,
        key: IdentityKey,
        column: usize,
        position: usize,
    ) -> Result<usize, MappingError> {
        let sources = self
            .0
            .get_mut(column)
            .and_then(Option::as_mut)
            .ok_or(MappingError::MissingSlot { key, column })?;
        if position >= sources.len() {
            return Err(MappingError::PositionOutOfRange {
                key,
                column,
                position,
                len: sources.len(),
            });
        }
        Ok(sources.remove(position))
    }

    /// Marks `column` as having no contribution. Later slots keep their
    /// positions.
    pub fn clear_slot(&mut self, column: usize) {
        if let Some(slot) = self.0.get_mut(column) {
            *slot = None;
        }
    }
}
