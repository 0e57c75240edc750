//! Identity grouping.
//!
//! An identity key names a source column whose raw cell values define groups.
//! [`build_identity_index()`] buckets row indices by that column's value, and
//! [`IdentityGrouper`] runs it for every key of a mapping store while
//! collecting the union of identity values in discovery order.

use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::mapping::{IdentityKey, Mappings};

/// Raw identity value to the indices of the rows holding it, in row order.
pub type IdentityIndex = IndexMap<String, Vec<usize>>;

/// Builds the row buckets for one identity column.
///
/// Values are used exactly as found, so an empty cell is a group of its own.
/// Rows that are too short to reach `source_column` belong to no bucket.
pub fn build_identity_index(rows: &[Vec<String>], source_column: usize) -> IdentityIndex {
    let mut index = IdentityIndex::new();
    for (row_idx, row) in rows.iter().enumerate() {
        match row.get(source_column) {
            Some(value) => index.entry(value.clone()).or_default().push(row_idx),
            None => debug!("Row {row_idx} is too short for identity column {source_column}"),
        }
    }
    index
}

/// Per-key identity indexes plus the union of identity values for one rebuild.
#[derive(Debug, Default)]
pub struct IdentityGrouper {
    indexes: IndexMap<IdentityKey, IdentityIndex>,
    values: IndexSet<String>,
}

impl IdentityGrouper {
    /// Groups `rows` once for every key present in `mappings`, keys in
    /// ascending order.
    pub fn group_all(rows: &[Vec<String>], mappings: &Mappings) -> Self {
        let mut grouper = Self::default();
        for &key in mappings.keys() {
            grouper.add_key(rows, key);
        }
        grouper
    }

    fn add_key(&mut self, rows: &[Vec<String>], key: IdentityKey) {
        let index = build_identity_index(rows, key);
        // IndexSet keeps the first position of a repeated value.
        self.values.extend(index.keys().cloned());
        debug!(
            "Identity key {key} produced {} group(s); {} distinct value(s) overall",
            index.len(),
            self.values.len()
        );
        self.indexes.insert(key, index);
    }

    /// Distinct identity values across all keys, in discovery order.
    pub fn identity_values(&self) -> &IndexSet<String> {
        &self.values
    }

    /// Rows grouped under `value` for `key`; empty when the key never saw it.
    pub fn rows_for(&self, key: IdentityKey, value: &str) -> &[usize] {
        self.indexes
            .get(&key)
            .and_then(|index| index.get(value))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

}
