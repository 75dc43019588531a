// mysqlexport/src/export/dump.rs
use anyhow::{Context, Result};
use futures::future::join_all;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use crate::config::{ExportFormat, ExportOptions};
use crate::errors::ExportError;
use crate::export::compress::compress_dump;
use crate::utils::find_mysqldump_executable;
use crate::utils::fsize::human_size;

/// Per-run totals, one increment per database.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub exported: usize,
    pub warned: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DumpOutcome {
    Exported,
    Warned,
    Skipped,
}

/// Dumps every database in `names`, one task per database, and waits for all
/// of them to settle. A failing database is reported as a warning and does
/// not affect its siblings; there is no ordering between tasks.
pub async fn dump_all(names: Vec<String>, options: Arc<ExportOptions>) -> Result<ExportSummary> {
    let mysqldump = find_mysqldump_executable()?;
    dump_all_with(Arc::new(mysqldump), names, options).await
}

async fn dump_all_with(
    mysqldump: Arc<PathBuf>,
    names: Vec<String>,
    options: Arc<ExportOptions>,
) -> Result<ExportSummary> {
    // An unsupported compress mode is known before any task spawns; the run
    // aborts here, before anything is written.
    if options.compress && options.algorithm == ExportFormat::Sql {
        return Err(ExportError::UnsupportedFormat("sql".to_string()).into());
    }

    fs::create_dir_all(&options.dest).with_context(|| {
        format!(
            "Failed to create destination directory {}",
            options.dest.display()
        )
    })?;

    let handles: Vec<_> = names
        .into_iter()
        .map(|name| {
            let mysqldump = Arc::clone(&mysqldump);
            let options = Arc::clone(&options);
            // dump_one runs an external process and does file I/O, all of it
            // blocking, so it goes on the blocking pool.
            tokio::task::spawn_blocking(move || dump_one(&name, &mysqldump, &options))
        })
        .collect();

    let mut summary = ExportSummary::default();
    for joined in join_all(handles).await {
        match joined {
            Ok(DumpOutcome::Exported) => summary.exported += 1,
            Ok(DumpOutcome::Warned) => summary.warned += 1,
            Ok(DumpOutcome::Skipped) => summary.skipped += 1,
            Err(join_error) => {
                eprintln!("⚠ Export task aborted: {}", join_error);
                summary.warned += 1;
            }
        }
    }
    Ok(summary)
}

/// Dumps a single database to `<dest>/<name>.sql` and, when compression is
/// enabled, hands the file to the compression stage. Every failure here is
/// scoped to this one database and reported as a warning line.
fn dump_one(name: &str, mysqldump: &Path, options: &ExportOptions) -> DumpOutcome {
    let dest = options.dest.join(format!("{}.sql", name));

    // A directory already occupying the destination path means nothing to do.
    if dest.is_dir() {
        return DumpOutcome::Skipped;
    }

    let mut cmd = Command::new(mysqldump);
    cmd.arg("-h")
        .arg(&options.host)
        .arg("-P")
        .arg(options.port.to_string())
        .arg("-u")
        .arg(&options.user)
        .arg(format!("--password={}", options.pass));
    if options.data_only {
        cmd.arg("--no-create-info");
    }
    cmd.arg(name).arg("-r").arg(&dest);

    let output = match cmd.output() {
        Ok(output) => output,
        Err(err) => {
            eprintln!("⚠ Warning: {} failed to launch mysqldump: {}", name, err);
            return DumpOutcome::Warned;
        }
    };

    if !output.status.success() {
        eprintln!(
            "⚠ Warning: {} (exit code {}): {}",
            name,
            output.status.code().unwrap_or(1),
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return DumpOutcome::Warned;
    }

    println!("✓ Exported: {} ({})", dest.display(), human_size(&dest));

    if options.compress {
        if let Err(err) = compress_dump(&dest, options.algorithm, options.level) {
            eprintln!("⚠ Warning: compression failed for {}: {:#}", dest.display(), err);
            return DumpOutcome::Warned;
        }
    }

    DumpOutcome::Exported
}
