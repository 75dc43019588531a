// mysqlexport/src/export/enumerate.rs
use sqlx::mysql::MySqlConnectOptions;
use sqlx::{Connection, MySqlConnection, Row};
use std::collections::HashSet;

use crate::config::ExportOptions;
use crate::errors::ExportError;

/// Resolves the configured database list into concrete names.
///
/// Without the wildcard marker the configured list is returned as is and no
/// connection is made. With the marker, every database the server reports is
/// collected and the `forget` set is dropped from the result. Order follows
/// the server's own enumeration order; nothing here sorts.
pub async fn resolve_databases(options: &ExportOptions) -> Result<Vec<String>, ExportError> {
    if !options.wants_discovery() {
        return Ok(options.databases.clone());
    }

    let connect_options = MySqlConnectOptions::new()
        .host(&options.host)
        .port(options.port)
        .username(&options.user)
        .password(&options.pass);

    let mut conn = MySqlConnection::connect_with(&connect_options)
        .await
        .map_err(|source| ExportError::Connection {
            host: options.host.clone(),
            port: options.port,
            source,
        })?;

    // Close the connection whether or not the listing succeeded.
    let listed = list_schemas(&mut conn).await;
    let _ = conn.close().await;
    let names = listed?;

    Ok(filter_discovered(names, &options.forget))
}

async fn list_schemas(conn: &mut MySqlConnection) -> Result<Vec<String>, ExportError> {
    let rows = sqlx::query("SHOW DATABASES")
        .fetch_all(conn)
        .await
        .map_err(ExportError::Query)?;

    rows.iter()
        .map(|row| row.try_get::<String, _>(0).map_err(ExportError::Query))
        .collect()
}

fn filter_discovered(names: Vec<String>, forget: &HashSet<String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| !forget.contains(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawExportConfig;
    use serde_json::json;

    fn options_from(value: serde_json::Value) -> ExportOptions {
        let raw: RawExportConfig = serde_json::from_value(value).expect("raw config");
        ExportOptions::from_raw(raw).expect("valid options")
    }

    #[tokio::test]
    async fn test_explicit_list_passes_through_without_connecting() -> anyhow::Result<()> {
        // The host is unroutable; a connection attempt would fail loudly.
        let options = options_from(json!({
            "host": "no-such-host.invalid",
            "databases": ["app", "analytics", "app"]
        }));

        let resolved = resolve_databases(&options).await?;
        assert_eq!(resolved, vec!["app", "analytics", "app"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_list_resolves_to_nothing() -> anyhow::Result<()> {
        let options = options_from(json!({ "host": "no-such-host.invalid" }));
        assert_eq!(resolve_databases(&options).await?, Vec::<String>::new());
        Ok(())
    }

    #[test]
    fn test_filter_drops_forgotten_names_and_keeps_server_order() {
        let names = vec![
            "information_schema".to_string(),
            "app".to_string(),
            "mysql".to_string(),
            "analytics".to_string(),
        ];
        let forget: HashSet<String> = ["information_schema", "mysql"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(filter_discovered(names, &forget), vec!["app", "analytics"]);
    }

    #[test]
    fn test_filter_with_empty_exclusion_set_is_identity() {
        let names = vec!["c".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(
            filter_discovered(names.clone(), &HashSet::new()),
            names,
            "server enumeration order must be preserved"
        );
    }
}
