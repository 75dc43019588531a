// mysqlexport/src/utils/fsize.rs
//
// Display-only file size reporting and best-effort cleanup. Both operations
// deliberately discard their error variants: a size that cannot be read is
// rendered as zero bytes, and a file that cannot be deleted is left behind.
use std::fs;
use std::path::Path;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Renders a byte count like "1.2 KB". Exact below 1 KB.
pub fn format_bytes(size: u64) -> String {
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", size)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Stats `path` and renders its size. Any stat failure, including a missing
/// path, yields the zero-byte rendering.
pub fn human_size(path: &Path) -> String {
    let size = fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
    format_bytes(size)
}

/// Deletes `path` only if it is a regular file. Deletion errors are ignored.
pub fn remove_file_best_effort(path: &Path) {
    if path.is_file() {
        let _ = fs::remove_file(path);
    }
}
