use thiserror::Error;

/// Errors that abort the whole export run. Per-database failures (a dump
/// command exiting non-zero, a compressor failing on one file) are reported
/// as warnings and never take this form.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to connect to MySQL server at {host}:{port}: {source}")]
    Connection {
        host: String,
        port: u16,
        #[source]
        source: sqlx::Error,
    },

    #[error("Database listing query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Compress mode '{0}' is not supported")]
    UnsupportedFormat(String),
}
