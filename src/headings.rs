//! The `headings` command: lists the source headings with the zero-based
//! column indices that identity keys and mappings refer to.

use anyhow::Result;
use log::info;

use crate::{cli::HeadingsArgs, source, table};

pub fn execute(args: &HeadingsArgs) -> Result<()> {
    let (source, _) = source::load_from_args(&args.source)?;
    if source.original_headings.is_empty() {
        info!("{:?} has no rows to take headings from", args.source.input);
        return Ok(());
    }

    let rows = source
        .original_headings
        .iter()
        .enumerate()
        .map(|(idx, heading)| {
            let sample = source
                .rows
                .iter()
                .filter_map(|row| row.get(idx))
                .find(|cell| !cell.is_empty())
                .cloned()
                .unwrap_or_default();
            vec![idx.to_string(), heading.clone(), sample]
        })
        .collect::<Vec<_>>();
    let headers = vec![
        "column".to_string(),
        "heading".to_string(),
        "sample".to_string(),
    ];
    table::print_table(&headers, &rows);
    info!(
        "Listed {} heading(s) from {:?}",
        rows.len(),
        args.source.input
    );
    Ok(())
}
