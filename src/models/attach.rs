use serde::{Deserialize, Serialize};

use super::connection::Connection;
use super::reference::ParsedTableReference;

/// An external database the execution engine must attach before running a
/// query. Two entries with the same `connection_id` are the same attachment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachDatabase {
    pub alias: String,
    pub connection_id: String,
}

impl AttachDatabase {
    pub fn new(alias: impl Into<String>, connection_id: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            connection_id: connection_id.into(),
        }
    }
}

/// Outcome of resolving one SQL prefix against the connection catalog.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PrefixMatchResult {
    pub connection: Option<Connection>,
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl PrefixMatchResult {
    pub fn unmatched() -> Self {
        Self {
            connection: None,
            matched: false,
            warning: None,
        }
    }

    pub fn matched(connection: Connection, warning: Option<String>) -> Self {
        Self {
            connection: Some(connection),
            matched: true,
            warning,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeAttachDatabasesResult {
    /// Deduplicated by connection id; order is priority order
    pub attach_databases: Vec<AttachDatabase>,
    pub unrecognized_prefixes: Vec<String>,
    pub requires_federated_query: bool,
}

impl MergeAttachDatabasesResult {
    pub fn with_unrecognized_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.unrecognized_prefixes = prefixes;
        self
    }
}

/// Full planning output for one SQL text.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AttachPlan {
    #[serde(flatten)]
    pub merge: MergeAttachDatabasesResult,
    pub references: Vec<ParsedTableReference>,
    /// Ambiguity warnings, one per ambiguous prefix
    pub warnings: Vec<String>,
    /// Prefixes naming local schemas of the primary engine
    pub skipped_prefixes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AttachPlanRequest {
    pub query: String,
    #[serde(default)]
    pub selected_tables: Vec<AttachDatabase>,
    #[serde(default)]
    pub manual_additions: Vec<AttachDatabase>,
}

#[derive(Debug, Deserialize)]
pub struct PrefixMatchRequest {
    pub prefix: String,
}
