// Attach Planner
//
// Runs the whole pipeline for one SQL text: extract references, resolve each
// distinct prefix against the connection catalog, then merge with the
// attachments the user selected or added by hand.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::PlannerConfig;
use crate::models::{
    AttachDatabase, AttachPlan, Connection, ParsedTableReference, PrefixMatchResult,
};
use crate::services::alias::{AliasGenerator, DefaultAliasGenerator};
use crate::services::attach_merge::merge_attach_databases;
use crate::services::prefix_matcher::PrefixMatcher;
use crate::services::reference_cache::{CacheStats, ReferenceCache};
use crate::sql::extract_table_references;

/// Result of resolving the prefixes found in SQL
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrefixResolution {
    pub attach_databases: Vec<AttachDatabase>,
    pub unrecognized_prefixes: Vec<String>,
    pub warnings: Vec<String>,
    pub skipped_prefixes: Vec<String>,
}

pub struct AttachPlanner {
    alias_generator: Arc<dyn AliasGenerator>,
    cache: ReferenceCache,
    /// Lowercase prefixes that name schemas of the primary engine
    local_prefixes: HashSet<String>,
}

impl AttachPlanner {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            alias_generator: Arc::new(DefaultAliasGenerator),
            cache: ReferenceCache::new(config.cache_max_entries, config.cache_ttl_secs),
            local_prefixes: config
                .local_prefixes
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn with_alias_generator(mut self, alias_generator: Arc<dyn AliasGenerator>) -> Self {
        self.alias_generator = alias_generator;
        self
    }

    pub fn alias_for(&self, connection: &Connection) -> String {
        self.alias_generator.generate(connection)
    }

    /// Table references in `sql`, served from the cache when possible
    pub fn extract_references(&self, sql: &str) -> Arc<Vec<ParsedTableReference>> {
        self.cache.get_or_insert_with(sql, extract_table_references)
    }

    pub fn match_prefix(&self, prefix: &str, connections: &[Connection]) -> PrefixMatchResult {
        PrefixMatcher::new(connections, self.alias_generator.as_ref()).match_prefix(prefix)
    }

    pub fn is_local_prefix(&self, prefix: &str) -> bool {
        self.local_prefixes.contains(&prefix.to_lowercase())
    }

    /// Match every distinct prefix once, in order of first appearance.
    ///
    /// The alias of a parsed attachment is the prefix as written in the SQL.
    pub fn resolve_prefixes(
        &self,
        references: &[ParsedTableReference],
        connections: &[Connection],
    ) -> PrefixResolution {
        let matcher = PrefixMatcher::new(connections, self.alias_generator.as_ref());
        let mut resolution = PrefixResolution::default();
        let mut seen: HashSet<String> = HashSet::new();

        for prefix in references.iter().filter_map(|r| r.prefix.as_deref()) {
            if !seen.insert(prefix.to_lowercase()) {
                continue;
            }

            if self.is_local_prefix(prefix) {
                tracing::debug!("Skipping local prefix: {}", prefix);
                resolution.skipped_prefixes.push(prefix.to_string());
                continue;
            }

            let result = matcher.match_prefix(prefix);
            match result.connection {
                Some(connection) => {
                    resolution
                        .attach_databases
                        .push(AttachDatabase::new(prefix, connection.id));
                }
                None => {
                    tracing::debug!("Unrecognized database prefix: {}", prefix);
                    resolution.unrecognized_prefixes.push(prefix.to_string());
                }
            }
            if let Some(warning) = result.warning {
                resolution.warnings.push(warning);
            }
        }

        resolution
    }

    /// Build the attachment plan for one SQL text
    pub fn plan(
        &self,
        sql: &str,
        connections: &[Connection],
        selected_tables: &[AttachDatabase],
        manual_additions: &[AttachDatabase],
    ) -> AttachPlan {
        let references = self.extract_references(sql);
        let resolution = self.resolve_prefixes(&references, connections);

        let merge = merge_attach_databases(
            selected_tables,
            &resolution.attach_databases,
            manual_additions,
        )
        .with_unrecognized_prefixes(resolution.unrecognized_prefixes);

        tracing::info!(
            "Planned {} attachment(s) from {} reference(s) ({} unrecognized prefix(es), {} warning(s))",
            merge.attach_databases.len(),
            references.len(),
            merge.unrecognized_prefixes.len(),
            resolution.warnings.len()
        );

        AttachPlan {
            merge,
            references: references.to_vec(),
            warnings: resolution.warnings,
            skipped_prefixes: resolution.skipped_prefixes,
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache(&self) -> &ReferenceCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner() -> AttachPlanner {
        AttachPlanner::new(&PlannerConfig::default())
    }

    fn catalog() -> Vec<Connection> {
        vec![
            Connection::new("c-orders", "Orders", "mysql", "mysql://host:3306/orders"),
            Connection::new("c-crm", "crm", "postgresql", "postgresql://host:5432/crm"),
            Connection::new("c-events", "events", "druid", "http://broker:8082"),
        ]
    }

    #[test]
    fn test_plan_resolves_prefixes() {
        let plan = planner().plan(
            "SELECT * FROM mysql_orders.users u JOIN crm.public.accounts a ON u.id = a.user_id",
            &catalog(),
            &[],
            &[],
        );

        assert_eq!(plan.references.len(), 2);
        assert_eq!(
            plan.merge.attach_databases,
            vec![
                AttachDatabase::new("mysql_orders", "c-orders"),
                AttachDatabase::new("crm", "c-crm"),
            ]
        );
        assert!(plan.merge.requires_federated_query);
        assert!(plan.merge.unrecognized_prefixes.is_empty());
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn test_plan_reports_unrecognized_prefixes() {
        let plan = planner().plan(
            "SELECT * FROM nowhere.t1, nowhere.t2, elsewhere.t3, local_t",
            &catalog(),
            &[],
            &[],
        );

        // Each distinct prefix is matched once
        assert_eq!(plan.merge.unrecognized_prefixes, vec!["nowhere", "elsewhere"]);
        assert!(plan.merge.attach_databases.is_empty());
        assert!(!plan.merge.requires_federated_query);
    }

    #[test]
    fn test_plan_skips_local_prefixes() {
        let plan = planner().plan(
            "SELECT * FROM main.t JOIN information_schema.tables x ON 1 = 1",
            &catalog(),
            &[],
            &[],
        );

        assert_eq!(plan.skipped_prefixes, vec!["main", "information_schema"]);
        assert!(plan.merge.unrecognized_prefixes.is_empty());
        assert!(plan.merge.attach_databases.is_empty());
    }

    #[test]
    fn test_plan_merges_selected_and_manual() {
        let plan = planner().plan(
            "SELECT * FROM crm.accounts JOIN events.clicks ON 1 = 1",
            &catalog(),
            &[AttachDatabase::new("crm_selected", "c-crm")],
            &[AttachDatabase::new("orders_manual", "c-orders")],
        );

        assert_eq!(
            plan.merge.attach_databases,
            vec![
                AttachDatabase::new("crm_selected", "c-crm"),
                AttachDatabase::new("events", "c-events"),
                AttachDatabase::new("orders_manual", "c-orders"),
            ]
        );
    }

    #[test]
    fn test_plan_surfaces_ambiguity_warning() {
        let connections = vec![
            Connection::new("1", "sales", "postgresql", ""),
            Connection::new("2", "sales_archive", "postgresql", ""),
        ];
        let plan = planner().plan("SELECT * FROM sales_archive_2020.t", &connections, &[], &[]);

        assert_eq!(
            plan.merge.attach_databases,
            vec![AttachDatabase::new("sales_archive_2020", "1")]
        );
        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].contains("sales_archive"));
    }

    #[test]
    fn test_prefix_case_variants_are_matched_once() {
        let resolution = planner().resolve_prefixes(
            &extract_table_references("SELECT * FROM CRM.a JOIN crm.b ON 1 = 1"),
            &catalog(),
        );
        assert_eq!(resolution.attach_databases, vec![AttachDatabase::new("CRM", "c-crm")]);
    }

    #[test]
    fn test_plan_uses_cache() {
        let planner = planner();
        let sql = "SELECT * FROM crm.accounts";
        let first = planner.plan(sql, &catalog(), &[], &[]);
        let second = planner.plan(sql, &catalog(), &[], &[]);

        assert_eq!(first, second);
        assert_eq!(planner.cache_stats().hits, 1);
    }

    #[test]
    fn test_custom_alias_generator() {
        struct IdAlias;
        impl AliasGenerator for IdAlias {
            fn generate(&self, connection: &Connection) -> String {
                format!("conn_{}", connection.id)
            }
        }

        let planner = planner().with_alias_generator(Arc::new(IdAlias));
        let connections = vec![Connection::new("42", "Warehouse", "postgresql", "")];
        let result = planner.match_prefix("conn_42", &connections);

        assert!(result.matched);
        assert_eq!(planner.alias_for(&connections[0]), "conn_42");
    }

    #[test]
    fn test_empty_sql() {
        let plan = planner().plan("", &catalog(), &[], &[]);
        assert!(plan.references.is_empty());
        assert!(!plan.merge.requires_federated_query);
    }
}
