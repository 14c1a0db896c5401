// Attach-Database Merge Planner
//
// Combines attachment candidates from three origins into one plan. Priority:
// explicitly selected tables, then SQL-parsed prefixes, then manual additions.
// A connection already present is never overwritten by a later source.

use std::collections::HashSet;

use crate::models::{AttachDatabase, MergeAttachDatabasesResult};

/// Merge attachment candidates, deduplicating by connection id.
///
/// `unrecognized_prefixes` is left empty; the prefix-matching step fills it
/// via [`MergeAttachDatabasesResult::with_unrecognized_prefixes`].
pub fn merge_attach_databases(
    from_selected_tables: &[AttachDatabase],
    from_sql_parsing: &[AttachDatabase],
    manual_additions: &[AttachDatabase],
) -> MergeAttachDatabasesResult {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut attach_databases = Vec::new();

    let sources = [from_selected_tables, from_sql_parsing, manual_additions];
    for candidate in sources.into_iter().flatten() {
        if seen.insert(candidate.connection_id.as_str()) {
            attach_databases.push(candidate.clone());
        }
    }

    MergeAttachDatabasesResult {
        requires_federated_query: !attach_databases.is_empty(),
        attach_databases,
        unrecognized_prefixes: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_tables_win_over_sql_parsing() {
        let result = merge_attach_databases(
            &[AttachDatabase::new("a", "1")],
            &[AttachDatabase::new("b", "1")],
            &[],
        );

        assert_eq!(result.attach_databases, vec![AttachDatabase::new("a", "1")]);
        assert!(result.requires_federated_query);
        assert!(result.unrecognized_prefixes.is_empty());
    }

    #[test]
    fn test_priority_order_is_preserved() {
        let result = merge_attach_databases(
            &[AttachDatabase::new("sel", "3")],
            &[AttachDatabase::new("parsed", "1"), AttachDatabase::new("parsed_dup", "3")],
            &[AttachDatabase::new("manual", "2"), AttachDatabase::new("manual_dup", "1")],
        );

        let aliases: Vec<&str> = result.attach_databases.iter().map(|a| a.alias.as_str()).collect();
        assert_eq!(aliases, vec!["sel", "parsed", "manual"]);
    }

    #[test]
    fn test_duplicates_within_one_source() {
        let result = merge_attach_databases(
            &[],
            &[AttachDatabase::new("x", "1"), AttachDatabase::new("y", "1")],
            &[],
        );
        assert_eq!(result.attach_databases, vec![AttachDatabase::new("x", "1")]);
    }

    #[test]
    fn test_empty_sources() {
        let result = merge_attach_databases(&[], &[], &[]);
        assert!(result.attach_databases.is_empty());
        assert!(!result.requires_federated_query);
    }

    #[test]
    fn test_unrecognized_prefixes_are_not_deduplicated() {
        let result = merge_attach_databases(&[], &[], &[AttachDatabase::new("m", "9")])
            .with_unrecognized_prefixes(vec!["foo".to_string(), "foo".to_string()]);

        assert_eq!(result.unrecognized_prefixes, vec!["foo", "foo"]);
        assert!(result.requires_federated_query);
    }
}
