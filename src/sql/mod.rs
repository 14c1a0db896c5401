// Lightweight SQL analysis
//
// A lexer plus a state-machine walk that recovers table references. Accepts
// any input and never fails.

pub mod extractor;
pub mod keywords;
pub mod tokenizer;

pub use extractor::{collect_cte_names, extract_from_tokens, extract_table_references};
pub use keywords::Keyword;
pub use tokenizer::{tokenize, Token, TokenKind, Tokenizer};
