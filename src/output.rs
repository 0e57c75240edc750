//! Output table construction.
//!
//! [`build_rows()`] performs a full rebuild: identity values are grouped for
//! every key in the mapping store, one output row is emitted per distinct
//! identity value, and every mapped output column is reduced with its
//! heading's aggregation type. Nothing is patched incrementally.

use log::{debug, warn};

use crate::{
    aggregate::{self, ValueSet},
    grouping::IdentityGrouper,
    mapping::{Heading, Mappings},
};

/// One aggregated record. Cell 0 is the identity value; later cells are the
/// reduced values, `None` where nothing was produced.
pub type OutputRow = Vec<Option<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTable {
    pub headings: Vec<Heading>,
    pub mappings: Mappings,
    pub data: Vec<OutputRow>,
}

impl Default for OutputTable {
    fn default() -> Self {
        Self {
            headings: vec![Heading::default()],
            mappings: Mappings::new(),
            data: Vec::new(),
        }
    }
}

impl OutputTable {
    /// Recomputes `data` from `rows` and the current headings and mappings.
    pub fn rebuild(&mut self, rows: &[Vec<String>]) {
        self.data = build_rows(rows, &self.headings, &self.mappings);
    }

    /// Heading labels followed by the data rows, with absent labels and cells
    /// rendered as empty strings.
    pub fn to_export_rows(&self) -> Vec<Vec<String>> {
        let mut rows: Vec<Vec<String>> = Vec::with_capacity(self.data.len() + 1);
        rows.push(
            self.headings
                .iter()
                .map(|heading| heading.label_or_empty().to_string())
                .collect(),
        );
        rows.extend(
            self.data
                .iter()
                .map(|row| row.iter().map(|cell| cell.clone().unwrap_or_default()).collect()),
        );
        rows
    }
}

pub fn build_rows(rows: &[Vec<String>], headings: &[Heading], mappings: &Mappings) -> Vec<OutputRow> {
    let grouper = IdentityGrouper::group_all(rows, mappings);
    let mut data: Vec<OutputRow> = grouper
        .identity_values()
        .iter()
        .map(|value| vec![Some(value.clone())])
        .collect();

    for (column, heading) in headings.iter().enumerate().skip(1) {
        if !heading.kind.is_known() {
            warn!(
                "Unknown aggregation type '{}' for output column {column}; leaving it empty",
                heading.kind
            );
        }
        for (identity, output_row) in grouper.identity_values().iter().zip(data.iter_mut()) {
            let values = collect_values(rows, mappings, &grouper, identity, column);
            output_row.push(aggregate::reduce(&values, &heading.kind));
        }
    }

    debug!(
        "Rebuilt {} output row(s) across {} column(s) from {} source row(s)",
        data.len(),
        headings.len(),
        rows.len()
    );
    data
}

/// Non-empty source cells feeding `column` for the rows grouped under
/// `identity`, across every identity key.
fn collect_values(
    rows: &[Vec<String>],
    mappings: &Mappings,
    grouper: &IdentityGrouper,
    identity: &str,
    column: usize,
) -> ValueSet {
    let mut values = ValueSet::new();
    for (&key, entry) in mappings {
        let sources = entry.sources(column);
        if sources.is_empty() {
            continue;
        }
        let bucket = grouper.rows_for(key, identity);
        for &source_column in sources {
            for &row_idx in bucket {
                if let Some(cell) = rows[row_idx].get(source_column)
                    && !cell.is_empty()
                {
                    values.insert(cell.clone());
                }
            }
        }
    }
    values
}

/// File name used when exporting the output for `input_name`.
pub fn export_file_name(input_name: &str) -> String {
    if input_name.ends_with(".csv") {
        format!("mare-{input_name}")
    } else {
        format!("mare-{input_name}.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{aggregate::AggregationType, mapping::MappingEntry};

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    fn headings(kinds: &[AggregationType]) -> Vec<Heading> {
        std::iter::once(Heading::default())
            .chain(kinds.iter().cloned().map(|kind| Heading { kind, label: None }))
            .collect()
    }

    #[test]
    fn build_rows_collects_sources_for_every_identity() {
        let data = rows(&[&["1", "10", "x"], &["1", "20", "y"], &["2", "5", ""]]);
        let mut mappings = Mappings::new();
        mappings.insert(0, MappingEntry::from_slots(vec![None, Some(vec![1, 2])]));

        let output = build_rows(&data, &headings(&[AggregationType::DistinctValues]), &mappings);
        assert_eq!(
            output,
            vec![
                vec![Some("1".to_string()), Some("10; 20; x; y".to_string())],
                vec![Some("2".to_string()), Some("5".to_string())],
            ]
        );
    }

    #[test]
    fn build_rows_without_mappings_is_empty() {
        let data = rows(&[&["1", "a"]]);
        let output = build_rows(&data, &headings(&[AggregationType::DistinctCount]), &Mappings::new());
        assert!(output.is_empty());
    }

    #[test]
    fn unknown_type_leaves_cells_empty() {
        let data = rows(&[&["k", "v"]]);
        let mut mappings = Mappings::new();
        mappings.insert(0, MappingEntry::from_slots(vec![None, Some(vec![1])]));
        let kinds = [AggregationType::Unknown("Median".into())];
        let output = build_rows(&data, &headings(&kinds), &mappings);
        assert_eq!(output, vec![vec![Some("k".to_string()), None]]);
    }

    #[test]
    fn export_rows_start_with_labels() {
        let mut table = OutputTable::default();
        table.headings[0].label = Some("Id".into());
        table.headings.push(Heading::default());
        table.data = vec![vec![Some("1".into()), None]];
        assert_eq!(
            table.to_export_rows(),
            vec![
                vec!["Id".to_string(), String::new()],
                vec!["1".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn export_file_name_appends_csv_extension_once() {
        assert_eq!(export_file_name("orders.csv"), "mare-orders.csv");
        assert_eq!(export_file_name("orders.xlsx"), "mare-orders.xlsx.csv");
    }
}
