// Prefix-to-Connection Matcher
//
// Resolves a database prefix written in SQL (`mysql_orders` in
// `mysql_orders.users`) to one known connection. Ambiguity never blocks: the
// first candidate wins and a warning is attached.

use crate::models::{Connection, PrefixMatchResult};
use crate::services::alias::AliasGenerator;

/// Which rule admitted a connection as a candidate, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchRule {
    /// Connection name equals the prefix
    Name,
    /// Generated alias equals the prefix
    Alias,
    /// Prefix contains the connection name
    Partial,
}

struct MatchEntry<'a> {
    connection: &'a Connection,
    name: String,
    alias: String,
}

/// Matcher over one snapshot of the connection catalog.
///
/// Lowercased names and generated aliases are computed once, so matching
/// many prefixes against the same catalog stays cheap.
pub struct PrefixMatcher<'a> {
    entries: Vec<MatchEntry<'a>>,
}

impl<'a> PrefixMatcher<'a> {
    pub fn new(connections: &'a [Connection], alias_generator: &dyn AliasGenerator) -> Self {
        let entries = connections
            .iter()
            .map(|connection| MatchEntry {
                connection,
                name: connection.name.to_lowercase(),
                alias: alias_generator.generate(connection).to_lowercase(),
            })
            .collect();

        Self { entries }
    }

    /// Candidate connections in priority order, one entry per connection
    pub fn candidates(&self, prefix: &str) -> Vec<(&'a Connection, MatchRule)> {
        let prefix = prefix.to_lowercase();
        let mut found: Vec<(&'a Connection, MatchRule)> = Vec::new();

        if prefix.is_empty() {
            return found;
        }

        for rule in [MatchRule::Name, MatchRule::Alias, MatchRule::Partial] {
            for entry in &self.entries {
                if found.iter().any(|(c, _)| std::ptr::eq(*c, entry.connection)) {
                    continue;
                }
                let hit = match rule {
                    MatchRule::Name => entry.name == prefix,
                    MatchRule::Alias => entry.alias == prefix,
                    // Every string contains the empty string
                    MatchRule::Partial => !entry.name.is_empty() && prefix.contains(&entry.name),
                };
                if hit {
                    found.push((entry.connection, rule));
                }
            }
        }

        found
    }

    pub fn match_prefix(&self, prefix: &str) -> PrefixMatchResult {
        let candidates = self.candidates(prefix);

        match candidates.as_slice() {
            [] => PrefixMatchResult::unmatched(),
            [(connection, rule)] => {
                tracing::debug!(
                    "Prefix '{}' matched connection {} by {:?}",
                    prefix,
                    connection.id,
                    rule
                );
                PrefixMatchResult::matched((*connection).clone(), None)
            }
            [(chosen, rule), ..] => {
                let names: Vec<&str> = candidates.iter().map(|(c, _)| c.name.as_str()).collect();
                let warning = format!(
                    "Database prefix '{}' matches multiple connections ({}); using '{}'",
                    prefix,
                    names.join(", "),
                    chosen.name
                );
                tracing::warn!("{} (matched by {:?})", warning, rule);
                PrefixMatchResult::matched((*chosen).clone(), Some(warning))
            }
        }
    }
}

/// One-shot convenience over [`PrefixMatcher`]
pub fn match_prefix(
    prefix: &str,
    connections: &[Connection],
    alias_generator: &dyn AliasGenerator,
) -> PrefixMatchResult {
    PrefixMatcher::new(connections, alias_generator).match_prefix(prefix)
}
