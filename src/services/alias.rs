use url::Url;

use crate::models::Connection;

/// Derives the human-friendly alias a user is expected to write as a SQL
/// prefix for a connection.
pub trait AliasGenerator: Send + Sync {
    fn generate(&self, connection: &Connection) -> String;
}

/// Default alias scheme: `<database_type>_<database>` when the connection URL
/// names a database, otherwise the connection name; always sanitized to a
/// lowercase SQL-friendly identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAliasGenerator;

impl AliasGenerator for DefaultAliasGenerator {
    fn generate(&self, connection: &Connection) -> String {
        let raw = match database_name(connection) {
            Some(database) => format!("{}_{}", connection.database_type, database),
            None => connection.name.clone(),
        };
        sanitize_alias(&raw)
    }
}

/// Database name from metadata, or from the connection URL path.
///
/// File-backed engines use the file stem of the last path segment; server
/// engines use the first path segment (`postgresql://host/orders`).
fn database_name(connection: &Connection) -> Option<String> {
    if let Some(database) = connection.metadata.get("database") {
        if !database.trim().is_empty() {
            return Some(database.clone());
        }
    }

    let url = Url::parse(&connection.connection_url).ok()?;
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    let segment = match connection.database_type.to_lowercase().as_str() {
        "sqlite" | "duckdb" => {
            let last = segments.last()?;
            last.split('.').next().unwrap_or(last).to_string()
        }
        _ => segments.next()?.to_string(),
    };

    if segment.is_empty() {
        None
    } else {
        Some(segment)
    }
}

/// Lowercase, collapse non-alphanumeric runs to `_`, and make sure the result
/// is a usable bare identifier.
pub fn sanitize_alias(raw: &str) -> String {
    let mut alias = String::with_capacity(raw.len());
    let mut pending_separator = false;

    for c in raw.chars() {
        if c.is_alphanumeric() {
            if pending_separator && !alias.is_empty() {
                alias.push('_');
            }
            pending_separator = false;
            alias.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if alias.is_empty() {
        return "db".to_string();
    }
    if alias.starts_with(|c: char| c.is_ascii_digit()) {
        alias.insert_str(0, "db_");
    }
    alias
}
