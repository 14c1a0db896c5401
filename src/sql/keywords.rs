// SQL keywords relevant to table-reference recognition
//
// Everything else is lexed as an identifier. The set is fixed at compile time.

/// Keywords the extractor cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    From,
    Join,
    Inner,
    Left,
    Right,
    Full,
    Cross,
    Outer,
    Natural,
    On,
    Where,
    Group,
    Having,
    Order,
    Limit,
    Offset,
    Union,
    Intersect,
    Except,
    And,
    Or,
    Not,
    Set,
    Values,
    Into,
    Select,
    As,
    Using,
    With,
}

const KEYWORDS: &[(&str, Keyword)] = &[
    ("FROM", Keyword::From),
    ("JOIN", Keyword::Join),
    ("INNER", Keyword::Inner),
    ("LEFT", Keyword::Left),
    ("RIGHT", Keyword::Right),
    ("FULL", Keyword::Full),
    ("CROSS", Keyword::Cross),
    ("OUTER", Keyword::Outer),
    ("NATURAL", Keyword::Natural),
    ("ON", Keyword::On),
    ("WHERE", Keyword::Where),
    ("GROUP", Keyword::Group),
    ("HAVING", Keyword::Having),
    ("ORDER", Keyword::Order),
    ("LIMIT", Keyword::Limit),
    ("OFFSET", Keyword::Offset),
    ("UNION", Keyword::Union),
    ("INTERSECT", Keyword::Intersect),
    ("EXCEPT", Keyword::Except),
    ("AND", Keyword::And),
    ("OR", Keyword::Or),
    ("NOT", Keyword::Not),
    ("SET", Keyword::Set),
    ("VALUES", Keyword::Values),
    ("INTO", Keyword::Into),
    ("SELECT", Keyword::Select),
    ("AS", Keyword::As),
    ("USING", Keyword::Using),
    ("WITH", Keyword::With),
];

/// Clause words that stay plain identifiers, so `db.window` is still a
/// table name, but are never taken as a bare alias after a table.
const TRAILING_CLAUSES: &[&str] = &[
    "WINDOW",
    "QUALIFY",
    "LATERAL",
    "RETURNING",
    "FETCH",
    "PIVOT",
    "UNPIVOT",
];

/// Whether an unquoted word opens a trailing clause
pub fn is_trailing_clause(word: &str) -> bool {
    TRAILING_CLAUSES
        .iter()
        .any(|clause| clause.eq_ignore_ascii_case(word))
}

impl Keyword {
    /// Case-insensitive lookup of a bare word
    pub fn lookup(word: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(text, _)| text.eq_ignore_ascii_case(word))
            .map(|(_, keyword)| *keyword)
    }

    /// Keywords that start a table list
    pub fn starts_table_list(&self) -> bool {
        matches!(self, Keyword::From | Keyword::Join)
    }

    /// Keywords that can never be a bare table alias.
    ///
    /// `WITH` is the only keyword outside this set.
    pub fn excludes_alias(&self) -> bool {
        !matches!(self, Keyword::With)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(Keyword::lookup("from"), Some(Keyword::From));
        assert_eq!(Keyword::lookup("Join"), Some(Keyword::Join));
        assert_eq!(Keyword::lookup("WITH"), Some(Keyword::With));
        assert_eq!(Keyword::lookup("users"), None);
        assert_eq!(Keyword::lookup(""), None);
    }

    #[test]
    fn test_trailing_clauses_are_not_keywords() {
        for word in ["window", "Fetch", "LATERAL", "pivot"] {
            assert_eq!(Keyword::lookup(word), None);
            assert!(is_trailing_clause(word));
        }
        assert!(!is_trailing_clause("orders"));
    }

    #[test]
    fn test_alias_exclusion_set() {
        for keyword in [
            Keyword::Join,
            Keyword::On,
            Keyword::Where,
            Keyword::Using,
            Keyword::Select,
            Keyword::As,
        ] {
            assert!(keyword.excludes_alias(), "{:?} should exclude alias", keyword);
        }
        assert!(!Keyword::With.excludes_alias());
    }
}
