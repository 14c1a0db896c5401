use async_trait::async_trait;
use rusqlite::{Connection as SqliteConnection, Result as SqliteResult, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::api::middleware::AppError;
use crate::models::Connection;

/// Read-only source of known external connections.
///
/// Order matters: it is the tie-break order for ambiguous prefixes.
#[async_trait]
pub trait ConnectionCatalog: Send + Sync {
    async fn list_connections(&self) -> Result<Vec<Connection>, AppError>;

    async fn get_connection(&self, id: &str) -> Result<Option<Connection>, AppError> {
        Ok(self
            .list_connections()
            .await?
            .into_iter()
            .find(|c| c.id == id))
    }
}

/// In-memory catalog
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    connections: Vec<Connection>,
}

impl StaticCatalog {
    pub fn new(connections: Vec<Connection>) -> Self {
        Self { connections }
    }
}

#[async_trait]
impl ConnectionCatalog for StaticCatalog {
    async fn list_connections(&self) -> Result<Vec<Connection>, AppError> {
        Ok(self.connections.clone())
    }
}

/// Catalog backed by the SQLite metadata store the connection service writes.
/// Uses tokio::Mutex for async-friendly locking
pub struct SqliteCatalog {
    conn: Arc<Mutex<SqliteConnection>>,
}

const SELECT_CONNECTIONS: &str = "SELECT id, name, connection_url, database_type, metadata_json \
     FROM connections ORDER BY created_at ASC, id ASC";

impl SqliteCatalog {
    /// Open the catalog, accepting plain paths and `sqlite:` URLs
    pub async fn open<P: AsRef<Path>>(db_path: P) -> SqliteResult<Self> {
        let path_str = db_path.as_ref().to_string_lossy();
        let clean_path: &str = if path_str.starts_with("sqlite:") {
            path_str.trim_start_matches("sqlite:").trim_start_matches("//")
        } else {
            path_str.as_ref()
        };

        let conn = SqliteConnection::open(clean_path)?;
        let catalog = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        catalog.init_schema().await?;
        Ok(catalog)
    }

    /// In-memory catalog, mostly for tests
    pub async fn open_in_memory() -> SqliteResult<Self> {
        let catalog = Self {
            conn: Arc::new(Mutex::new(SqliteConnection::open_in_memory()?)),
        };
        catalog.init_schema().await?;
        Ok(catalog)
    }

    /// Make sure the connections table exists so a fresh store reads as empty
    async fn init_schema(&self) -> SqliteResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS connections (
                id TEXT PRIMARY KEY,
                name TEXT,
                connection_url TEXT NOT NULL,
                database_type TEXT NOT NULL,
                metadata_json TEXT,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;
        Ok(())
    }

    /// Get a reference to the connection (for use in async contexts)
    pub fn get_conn(&self) -> Arc<Mutex<SqliteConnection>> {
        self.conn.clone()
    }

    fn row_to_connection(row: &Row<'_>) -> SqliteResult<Connection> {
        let metadata = row
            .get::<_, Option<String>>(4)?
            .and_then(|json| serde_json::from_str::<HashMap<String, String>>(&json).ok())
            .unwrap_or_default();

        Ok(Connection {
            id: row.get(0)?,
            name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            connection_url: row.get(2)?,
            database_type: row.get(3)?,
            metadata,
        })
    }
}

#[async_trait]
impl ConnectionCatalog for SqliteCatalog {
    async fn list_connections(&self) -> Result<Vec<Connection>, AppError> {
        let db_conn = self.conn.lock().await;
        let mut stmt = db_conn.prepare(SELECT_CONNECTIONS)?;
        let rows = stmt.query_map([], Self::row_to_connection)?;

        let mut connections = Vec::new();
        for row in rows {
            connections.push(row?);
        }
        tracing::debug!("Loaded {} connection(s) from catalog", connections.len());
        Ok(connections)
    }

    async fn get_connection(&self, id: &str) -> Result<Option<Connection>, AppError> {
        let db_conn = self.conn.lock().await;
        let mut stmt = db_conn.prepare(
            "SELECT id, name, connection_url, database_type, metadata_json FROM connections WHERE id = ?1",
        )?;

        match stmt.query_row(rusqlite::params![id], Self::row_to_connection) {
            Ok(conn) => Ok(Some(conn)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
