use serde::{Deserialize, Serialize};

/// One table mention recovered from SQL text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedTableReference {
    /// Dot-joined qualified name as written
    pub full_name: String,
    /// First segment of a 2- or 3-part name; the candidate connection alias
    pub prefix: Option<String>,
    /// Middle segment, only for 3-part names
    pub schema: Option<String>,
    pub table_name: String,
    pub table_alias: Option<String>,
    /// True if any segment was quote-delimited
    pub is_quoted: bool,
}

#[derive(Debug, Deserialize)]
pub struct ExtractReferencesRequest {
    pub query: String,
}
