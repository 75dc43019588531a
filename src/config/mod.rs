// mysqlexport/src/config/mod.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Sentinel in the `databases` list meaning "discover every database from
/// the server instead of using an explicit list".
pub const WILDCARD: &str = "*";

/// Struct for deserializing config.json as written by the user. Every field
/// is optional; defaults are applied when building [`ExportOptions`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawExportConfig {
    pub user: Option<String>,
    pub pass: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dest: Option<PathBuf>,
    pub compress: Option<bool>,
    pub algorithm: Option<String>,
    pub level: Option<u32>,
    pub data_only: Option<bool>,
    pub forget: Option<Vec<String>>,
    pub databases: Option<Vec<String>>,
}

/// Output format for a finished dump. `Sql` leaves the raw dump file as is;
/// the rest route the file through a streaming compressor or an archive
/// writer. A closed enum so an invalid algorithm name is rejected at config
/// load instead of surfacing mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Sql,
    Gzip,
    Deflate,
    DeflateRaw,
    Tar,
    Tgz,
    Zip,
}

impl ExportFormat {
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "sql" => Ok(ExportFormat::Sql),
            "gzip" => Ok(ExportFormat::Gzip),
            "deflate" => Ok(ExportFormat::Deflate),
            "deflateRaw" => Ok(ExportFormat::DeflateRaw),
            "tar" => Ok(ExportFormat::Tar),
            "tgz" => Ok(ExportFormat::Tgz),
            "zip" => Ok(ExportFormat::Zip),
            other => Err(anyhow::anyhow!(
                "Unsupported export algorithm '{}'. Expected one of: sql, gzip, deflate, deflateRaw, tar, tgz, zip.",
                other
            )),
        }
    }

    /// Suffix appended to the `.sql` dump path. Note the historical quirks:
    /// `gzip` produces `.gz` and `tgz` produces `.tar.gz`.
    pub fn suffix(&self) -> &'static str {
        match self {
            ExportFormat::Sql => "",
            ExportFormat::Gzip => ".gz",
            ExportFormat::Deflate => ".deflate",
            ExportFormat::DeflateRaw => ".deflateRaw",
            ExportFormat::Tar => ".tar",
            ExportFormat::Tgz => ".tar.gz",
            ExportFormat::Zip => ".zip",
        }
    }
}

/// Validated export configuration. Immutable once the export flow starts;
/// every per-database task reads the same shared instance.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub user: String,
    pub pass: String,
    pub host: String,
    pub port: u16,
    pub dest: PathBuf,
    pub compress: bool,
    pub algorithm: ExportFormat,
    pub level: u32,
    pub data_only: bool,
    pub forget: HashSet<String>,
    pub databases: Vec<String>,
}

impl ExportOptions {
    pub fn load_from_json(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;
        let raw: RawExportConfig = serde_json::from_str(&config_content).with_context(|| {
            format!(
                "Failed to parse JSON from config file at {}",
                config_path.display()
            )
        })?;
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: RawExportConfig) -> Result<Self> {
        let algorithm = match raw.algorithm {
            Some(tag) => ExportFormat::parse(&tag)?,
            None => ExportFormat::Zip,
        };

        Ok(ExportOptions {
            user: raw.user.unwrap_or_default(),
            pass: raw.pass.unwrap_or_default(),
            host: raw.host.unwrap_or_else(|| "localhost".to_string()),
            port: raw.port.unwrap_or(3306),
            dest: raw.dest.unwrap_or_else(|| PathBuf::from("exports/")),
            compress: raw.compress.unwrap_or(false),
            algorithm,
            level: raw.level.unwrap_or(8),
            data_only: raw.data_only.unwrap_or(false),
            forget: raw.forget.unwrap_or_default().into_iter().collect(),
            databases: raw.databases.unwrap_or_default(),
        })
    }

    /// True when the requested list contains the wildcard marker and
    /// discovery over a live connection is required.
    pub fn wants_discovery(&self) -> bool {
        self.databases.iter().any(|name| name == WILDCARD)
    }
}
