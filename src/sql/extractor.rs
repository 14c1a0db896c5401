// Table-Reference Extractor
//
// Recovers table references from a token stream in two passes: CTE names are
// collected first so the main walk can suppress them. This is a heuristic,
// not a grammar: anything it cannot make sense of yields no reference rather
// than a wrong one.

use std::collections::HashSet;

use super::keywords::{is_trailing_clause, Keyword};
use super::tokenizer::{tokenize, Token, TokenKind};
use crate::models::ParsedTableReference;

/// Extract table references from raw SQL text
pub fn extract_table_references(sql: &str) -> Vec<ParsedTableReference> {
    let tokens = tokenize(sql);
    extract_from_tokens(&tokens)
}

/// Extract table references from an already tokenized statement
pub fn extract_from_tokens(tokens: &[Token<'_>]) -> Vec<ParsedTableReference> {
    let cte_names = collect_cte_names(tokens);
    let mut walker = ReferenceWalker::new(&cte_names);
    walker.walk(tokens);
    walker.finish()
}

/// Pass 1: lowercase names of every CTE defined in the statement
pub fn collect_cte_names(tokens: &[Token<'_>]) -> HashSet<String> {
    let mut names = HashSet::new();
    let mut in_with = false;
    let mut depth: usize = 0;

    for (idx, token) in tokens.iter().enumerate() {
        if token.is_keyword(Keyword::With) {
            in_with = true;
            depth = 0;
            continue;
        }
        if !in_with {
            continue;
        }

        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::Keyword(Keyword::Select) if depth == 0 => in_with = false,
            _ if depth == 0 && token.is_identifier() => {
                if is_cte_definition(tokens, idx + 1) {
                    names.insert(token.value.to_lowercase());
                }
            }
            _ => {}
        }
    }

    names
}

/// `name AS (` or `name (col, ...) AS (`, looking from the token after `name`
fn is_cte_definition(tokens: &[Token<'_>], next: usize) -> bool {
    match tokens.get(next).map(|t| t.kind) {
        Some(TokenKind::Keyword(Keyword::As)) => true,
        Some(TokenKind::LeftParen) => {
            let mut depth = 0usize;
            for (offset, token) in tokens[next..].iter().enumerate() {
                match token.kind {
                    TokenKind::LeftParen => depth += 1,
                    TokenKind::RightParen => {
                        depth -= 1;
                        if depth == 0 {
                            return tokens
                                .get(next + offset + 1)
                                .is_some_and(|t| t.is_keyword(Keyword::As));
                        }
                    }
                    // A column list holds only names and commas
                    TokenKind::Identifier | TokenKind::Quoted(_) | TokenKind::Comma => {}
                    _ => return false,
                }
            }
            false
        }
        _ => false,
    }
}

/// States of the reference-extraction walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    Initial,
    AfterFromJoin,
    ReadingTable,
    AfterTable,
    AfterAs,
}

#[derive(Debug, Default)]
struct PendingReference {
    segments: Vec<String>,
    alias: Option<String>,
    is_quoted: bool,
}

impl PendingReference {
    fn push_segment(&mut self, token: &Token<'_>) {
        self.segments.push(token.value.to_string());
        self.is_quoted |= token.is_quoted();
    }

    fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Pass 2: finite-state walk over the token stream
struct ReferenceWalker<'c> {
    cte_names: &'c HashSet<String>,
    state: WalkState,
    pending: PendingReference,
    seen: HashSet<String>,
    references: Vec<ParsedTableReference>,
}

impl<'c> ReferenceWalker<'c> {
    fn new(cte_names: &'c HashSet<String>) -> Self {
        Self {
            cte_names,
            state: WalkState::Initial,
            pending: PendingReference::default(),
            seen: HashSet::new(),
            references: Vec::new(),
        }
    }

    fn walk(&mut self, tokens: &[Token<'_>]) {
        let mut idx = 0;
        while idx < tokens.len() {
            idx += self.step(&tokens[idx], tokens.get(idx + 1));
        }
    }

    /// Feed one token, returning how many tokens were consumed
    fn step(&mut self, token: &Token<'_>, next: Option<&Token<'_>>) -> usize {
        match token.kind {
            // A name followed by `(` is a function call or subquery, never a table
            TokenKind::LeftParen => {
                self.pending = PendingReference::default();
                self.state = WalkState::Initial;
                return 1;
            }
            TokenKind::RightParen => return 1,
            _ => {}
        }

        match self.state {
            WalkState::Initial => {
                if starts_table_list(token) {
                    self.state = WalkState::AfterFromJoin;
                }
            }
            WalkState::AfterFromJoin => {
                if token.is_identifier() {
                    self.pending.push_segment(token);
                    self.state = WalkState::ReadingTable;
                } else {
                    self.state = WalkState::Initial;
                }
            }
            WalkState::ReadingTable => match token.kind {
                TokenKind::Dot => match next {
                    Some(segment) if segment.is_identifier() => {
                        self.pending.push_segment(segment);
                        return 2;
                    }
                    _ => self.flush_to(WalkState::Initial),
                },
                TokenKind::Keyword(Keyword::As) => self.state = WalkState::AfterAs,
                TokenKind::Keyword(keyword) if keyword.starts_table_list() => {
                    self.flush_to(WalkState::AfterFromJoin)
                }
                TokenKind::Keyword(keyword) if keyword.excludes_alias() => {
                    self.flush_to(WalkState::Initial)
                }
                TokenKind::Identifier if is_trailing_clause(token.raw) => {
                    self.flush_to(WalkState::Initial)
                }
                TokenKind::Identifier | TokenKind::Quoted(_) => {
                    self.pending.alias = Some(token.value.to_string());
                    self.state = WalkState::AfterTable;
                }
                TokenKind::Comma => self.flush_to(WalkState::AfterFromJoin),
                TokenKind::Keyword(_)
                | TokenKind::Number
                | TokenKind::Other
                | TokenKind::LeftParen
                | TokenKind::RightParen => self.flush_to(WalkState::Initial),
            },
            WalkState::AfterTable => {
                if starts_table_list(token) || token.kind == TokenKind::Comma {
                    self.flush_to(WalkState::AfterFromJoin);
                } else {
                    self.flush_to(WalkState::Initial);
                }
            }
            WalkState::AfterAs => {
                if token.is_identifier() {
                    self.pending.alias = Some(token.value.to_string());
                    self.state = WalkState::AfterTable;
                } else {
                    self.flush_to(WalkState::Initial);
                }
            }
        }

        1
    }

    fn flush_to(&mut self, state: WalkState) {
        self.flush();
        self.state = state;
    }

    /// Turn the pending segments into a reference, unless it names a CTE or
    /// duplicates an earlier reference
    fn flush(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return;
        }

        let PendingReference {
            segments,
            alias,
            is_quoted,
        } = pending;

        let full_name = segments.join(".");
        let table_name = segments[segments.len() - 1].clone();

        if self.cte_names.contains(&table_name.to_lowercase()) {
            tracing::trace!("Skipping CTE reference: {}", full_name);
            return;
        }

        if !self.seen.insert(full_name.to_lowercase()) {
            return;
        }

        let (prefix, schema) = match segments.len() {
            1 => (None, None),
            2 => (Some(segments[0].clone()), None),
            _ => (Some(segments[0].clone()), Some(segments[1].clone())),
        };

        self.references.push(ParsedTableReference {
            full_name,
            prefix,
            schema,
            table_name,
            table_alias: alias,
            is_quoted,
        });
    }

    fn finish(mut self) -> Vec<ParsedTableReference> {
        self.flush();
        self.references
    }
}

fn starts_table_list(token: &Token<'_>) -> bool {
    token.keyword().is_some_and(|k| k.starts_table_list())
}
