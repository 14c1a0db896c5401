use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A known external database connection, as recorded by the connection
/// service. The planner only ever reads these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Connection {
    pub id: String,
    pub name: String,
    pub database_type: String,
    #[serde(default)]
    pub connection_url: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Connection {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        database_type: impl Into<String>,
        connection_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            database_type: database_type.into(),
            connection_url: connection_url.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Connection as returned to the UI, with the alias the planner would match.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionSummary {
    #[serde(flatten)]
    pub connection: Connection,
    pub alias: String,
}
