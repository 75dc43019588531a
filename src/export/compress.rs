// mysqlexport/src/export/compress.rs
use anyhow::{Context, Result};
use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};
use flate2::Compression;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tar::Builder;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::ExportFormat;
use crate::errors::ExportError;
use crate::utils::fsize::{format_bytes, human_size, remove_file_best_effort};

/// Routes a finished dump file through the configured backend and replaces
/// the original with the transformed artifact.
///
/// Streaming formats pipe the file through a flate2 encoder into
/// `<path><suffix>`; archive formats wrap it as a single entry named by its
/// base file name. On success the new size is logged and the original file
/// is removed best-effort. A failure leaves whatever partial state exists on
/// disk and is scoped to this one file; sibling exports are unaffected.
pub fn compress_dump(path: &Path, format: ExportFormat, level: u32) -> Result<()> {
    let target = path_with_suffix(path, format.suffix());
    let compression = Compression::new(level);

    match format {
        ExportFormat::Sql => {
            return Err(ExportError::UnsupportedFormat("sql".to_string()).into());
        }
        ExportFormat::Gzip => {
            let dest = create_target(&target)?;
            pipe_into(path, GzEncoder::new(dest, compression))?
                .finish()
                .with_context(|| format!("Failed to finish gzip stream for {}", target.display()))?;
            report_generated(&target);
        }
        ExportFormat::Deflate => {
            let dest = create_target(&target)?;
            pipe_into(path, ZlibEncoder::new(dest, compression))?
                .finish()
                .with_context(|| format!("Failed to finish deflate stream for {}", target.display()))?;
            report_generated(&target);
        }
        ExportFormat::DeflateRaw => {
            let dest = create_target(&target)?;
            pipe_into(path, DeflateEncoder::new(dest, compression))?
                .finish()
                .with_context(|| format!("Failed to finish raw deflate stream for {}", target.display()))?;
            report_generated(&target);
        }
        ExportFormat::Tar => {
            let total = tar_archive(path, &target, None)?;
            report_archived(&target, total);
        }
        ExportFormat::Tgz => {
            // tgz is tar with gzip wrapping at the configured level.
            let total = tar_archive(path, &target, Some(compression))?;
            report_archived(&target, total);
        }
        ExportFormat::Zip => {
            let total = zip_archive(path, &target, level)?;
            report_archived(&target, total);
        }
    }

    remove_file_best_effort(path);
    Ok(())
}

fn path_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = OsString::from(path.as_os_str());
    raw.push(suffix);
    PathBuf::from(raw)
}

fn create_target(target: &Path) -> Result<File> {
    File::create(target)
        .with_context(|| format!("Failed to create compressed file at {}", target.display()))
}

/// Copies the source file into `encoder` and hands the encoder back so the
/// caller can finish the specific stream type.
fn pipe_into<W: Write>(source: &Path, mut encoder: W) -> Result<W> {
    let mut file = File::open(source)
        .with_context(|| format!("Failed to open dump file {}", source.display()))?;
    io::copy(&mut file, &mut encoder)
        .with_context(|| format!("Failed to compress dump file {}", source.display()))?;
    Ok(encoder)
}

fn entry_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Dump path {} has no usable file name", path.display()))
}

/// Builds a single-entry tar archive at `target`, gzip-wrapped when a
/// compression level is given. Returns the archive's byte count.
fn tar_archive(path: &Path, target: &Path, gzip: Option<Compression>) -> Result<u64> {
    let name = entry_name(path)?;
    let dest = create_target(target)?;

    match gzip {
        Some(level) => {
            let mut builder = Builder::new(GzEncoder::new(dest, level));
            builder
                .append_path_with_name(path, name)
                .with_context(|| format!("Failed to add {} to tar archive", path.display()))?;
            let encoder = builder
                .into_inner()
                .with_context(|| format!("Failed to finalize tar archive {}", target.display()))?;
            encoder
                .finish()
                .with_context(|| format!("Failed to finish gzip wrapping for {}", target.display()))?;
        }
        None => {
            let mut builder = Builder::new(dest);
            builder
                .append_path_with_name(path, name)
                .with_context(|| format!("Failed to add {} to tar archive", path.display()))?;
            builder
                .into_inner()
                .with_context(|| format!("Failed to finalize tar archive {}", target.display()))?;
        }
    }

    archive_len(target)
}

/// Builds a single-entry zip archive at `target` using the deflate method at
/// the configured level. Returns the archive's byte count.
fn zip_archive(path: &Path, target: &Path, level: u32) -> Result<u64> {
    let name = entry_name(path)?;
    let dest = create_target(target)?;

    let mut writer = ZipWriter::new(dest);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(level as i32));

    writer
        .start_file(name, options)
        .with_context(|| format!("Failed to start zip entry {} in {}", name, target.display()))?;
    let mut source = File::open(path)
        .with_context(|| format!("Failed to open dump file {}", path.display()))?;
    io::copy(&mut source, &mut writer)
        .with_context(|| format!("Failed to write zip entry for {}", path.display()))?;
    writer
        .finish()
        .with_context(|| format!("Failed to finalize zip archive {}", target.display()))?;

    archive_len(target)
}

fn archive_len(target: &Path) -> Result<u64> {
    Ok(fs::metadata(target)
        .with_context(|| format!("Failed to stat archive {}", target.display()))?
        .len())
}

fn report_generated(target: &Path) {
    println!("✓ Generated file: {} ({})", target.display(), human_size(target));
}

fn report_archived(target: &Path, total: u64) {
    println!("✓ Archived: {} ({})", target.display(), format_bytes(total));
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
    use std::io::Read;

    const PAYLOAD: &[u8] = b"-- MySQL dump\nINSERT INTO t VALUES (1), (2), (3);\n";

    fn write_dump(dir: &Path) -> Result<PathBuf> {
        let path = dir.join("app.sql");
        fs::write(&path, PAYLOAD)?;
        Ok(path)
    }

    #[test]
    fn test_gzip_round_trip_replaces_original() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let dump = write_dump(dir.path())?;

        compress_dump(&dump, ExportFormat::Gzip, 8)?;

        let compressed = dir.path().join("app.sql.gz");
        assert!(compressed.is_file());
        assert!(!dump.exists(), "original dump must be removed");

        let mut restored = Vec::new();
        GzDecoder::new(File::open(&compressed)?).read_to_end(&mut restored)?;
        assert_eq!(restored, PAYLOAD);
        Ok(())
    }

    #[test]
    fn test_deflate_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let dump = write_dump(dir.path())?;

        compress_dump(&dump, ExportFormat::Deflate, 6)?;

        let compressed = dir.path().join("app.sql.deflate");
        let mut restored = Vec::new();
        ZlibDecoder::new(File::open(&compressed)?).read_to_end(&mut restored)?;
        assert_eq!(restored, PAYLOAD);
        assert!(!dump.exists());
        Ok(())
    }

    #[test]
    fn test_deflate_raw_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let dump = write_dump(dir.path())?;

        compress_dump(&dump, ExportFormat::DeflateRaw, 6)?;

        let compressed = dir.path().join("app.sql.deflateRaw");
        let mut restored = Vec::new();
        DeflateDecoder::new(File::open(&compressed)?).read_to_end(&mut restored)?;
        assert_eq!(restored, PAYLOAD);
        assert!(!dump.exists());
        Ok(())
    }

    #[test]
    fn test_tar_contains_single_entry_named_by_base_name() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let dump = write_dump(dir.path())?;

        compress_dump(&dump, ExportFormat::Tar, 8)?;

        let archive_path = dir.path().join("app.sql.tar");
        let mut archive = tar::Archive::new(File::open(&archive_path)?);
        let mut entries = archive.entries()?;

        let mut entry = entries.next().expect("archive must hold one entry")?;
        assert_eq!(entry.path()?.to_string_lossy(), "app.sql");
        let mut restored = Vec::new();
        entry.read_to_end(&mut restored)?;
        assert_eq!(restored, PAYLOAD);

        assert!(entries.next().is_none(), "exactly one entry expected");
        assert!(!dump.exists());
        Ok(())
    }

    #[test]
    fn test_tgz_is_gzip_wrapped_tar() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let dump = write_dump(dir.path())?;

        compress_dump(&dump, ExportFormat::Tgz, 8)?;

        let archive_path = dir.path().join("app.sql.tar.gz");
        assert!(archive_path.is_file());
        let mut archive = tar::Archive::new(GzDecoder::new(File::open(&archive_path)?));
        let mut entries = archive.entries()?;

        let mut entry = entries.next().expect("archive must hold one entry")?;
        assert_eq!(entry.path()?.to_string_lossy(), "app.sql");
        let mut restored = Vec::new();
        entry.read_to_end(&mut restored)?;
        assert_eq!(restored, PAYLOAD);

        assert!(entries.next().is_none());
        assert!(!dump.exists());
        Ok(())
    }

    #[test]
    fn test_zip_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let dump = write_dump(dir.path())?;

        compress_dump(&dump, ExportFormat::Zip, 8)?;

        let archive_path = dir.path().join("app.sql.zip");
        let mut archive = zip::ZipArchive::new(File::open(&archive_path)?)?;
        assert_eq!(archive.len(), 1);

        let mut entry = archive.by_index(0)?;
        assert_eq!(entry.name(), "app.sql");
        let mut restored = Vec::new();
        entry.read_to_end(&mut restored)?;
        assert_eq!(restored, PAYLOAD);

        assert!(!dump.exists());
        Ok(())
    }

    #[test]
    fn test_sql_format_is_rejected_without_writing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let dump = write_dump(dir.path())?;

        let err = compress_dump(&dump, ExportFormat::Sql, 8).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExportError>(),
            Some(ExportError::UnsupportedFormat(_))
        ));

        assert!(dump.is_file(), "original must be left untouched");
        assert_eq!(fs::read_dir(dir.path())?.count(), 1, "no artifact written");
        Ok(())
    }

    #[test]
    fn test_missing_source_fails() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let missing = dir.path().join("ghost.sql");

        assert!(compress_dump(&missing, ExportFormat::Gzip, 8).is_err());
        Ok(())
    }
}
