mod compress;
mod dump;
mod enumerate;

use anyhow::Result;
use std::sync::Arc;

use crate::config::ExportOptions;

/// Public entry point for the export process: resolves the database list,
/// then dumps (and optionally compresses) every database concurrently.
pub async fn run_export_flow(options: ExportOptions) -> Result<()> {
    let databases = enumerate::resolve_databases(&options).await?;
    if databases.is_empty() {
        println!("No databases selected for export.");
        return Ok(());
    }

    println!("Databases to export: {:?}", databases);

    let summary = dump::dump_all(databases, Arc::new(options)).await?;
    println!(
        "Export finished: {} exported, {} warning(s), {} skipped.",
        summary.exported, summary.warned, summary.skipped
    );
    Ok(())
}
