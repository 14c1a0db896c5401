// Best-effort SQL lexer
//
// Produces just enough structure for table-reference extraction. Never fails:
// malformed input (unterminated quotes or comments, stray characters) degrades
// into whatever tokens can still be recognised.

use std::borrow::Cow;

use super::keywords::Keyword;

/// Lexical category of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare word that is not a recognised keyword
    Identifier,
    Keyword(Keyword),
    /// String literal or quoted identifier, with its delimiter (`"`, `` ` `` or `'`)
    Quoted(char),
    Dot,
    Comma,
    LeftParen,
    RightParen,
    Number,
    /// Operators and any other character the extractor ignores
    Other,
}

/// One lexical unit, borrowing its raw text from the source SQL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Normalized text: quotes stripped and unescaped, original casing kept
    pub value: Cow<'a, str>,
    /// Source text exactly as written, including quote characters
    pub raw: &'a str,
}

impl<'a> Token<'a> {
    /// Bare or quoted identifier; either can name a table
    pub fn is_identifier(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier | TokenKind::Quoted(_))
    }

    pub fn is_quoted(&self) -> bool {
        matches!(self.kind, TokenKind::Quoted(_))
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.keyword() == Some(keyword)
    }
}

/// Tokenize a SQL string
pub fn tokenize(sql: &str) -> Vec<Token<'_>> {
    Tokenizer::new(sql).collect()
}

/// Streaming tokenizer over a SQL string
pub struct Tokenizer<'a> {
    sql: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(sql: &'a str) -> Self {
        Self { sql, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.sql[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn bump_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            let rest = self.rest();
            if rest.starts_with("--") {
                self.pos += rest.find('\n').unwrap_or(rest.len());
            } else if rest.starts_with("/*") {
                self.pos += rest[2..].find("*/").map(|end| end + 4).unwrap_or(rest.len());
            } else if self.peek().is_some_and(char::is_whitespace) {
                self.bump_while(char::is_whitespace);
            } else {
                return;
            }
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token<'a> {
        let raw = &self.sql[start..self.pos];
        Token {
            kind,
            value: Cow::Borrowed(raw),
            raw,
        }
    }

    fn read_word(&mut self, start: usize) -> Token<'a> {
        self.bump_while(is_word_continue);
        let kind = match Keyword::lookup(&self.sql[start..self.pos]) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier,
        };
        self.token(kind, start)
    }

    fn read_number(&mut self, start: usize) -> Token<'a> {
        self.bump_while(|c| c.is_ascii_digit());

        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            self.bump_while(|c| c.is_ascii_digit());
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let rest = self.rest().as_bytes();
            let digit_at = if matches!(rest.get(1), Some(b'+' | b'-')) { 2 } else { 1 };
            if rest.get(digit_at).is_some_and(u8::is_ascii_digit) {
                self.pos += digit_at;
                self.bump_while(|c| c.is_ascii_digit());
            }
        }

        // Names such as `2024_sales` start with a digit but are identifiers
        if self.peek().is_some_and(is_word_continue) {
            self.bump_while(is_word_continue);
            return self.token(TokenKind::Identifier, start);
        }

        self.token(TokenKind::Number, start)
    }

    fn read_quoted(&mut self, start: usize, delimiter: char) -> Token<'a> {
        self.bump();
        let content_start = self.pos;
        let mut escaped = false;

        let content_end = loop {
            match self.rest().find(delimiter) {
                Some(offset) => {
                    let at = self.pos + offset;
                    self.pos = at + delimiter.len_utf8();
                    if self.peek() == Some(delimiter) {
                        // Doubled delimiter is an escaped delimiter
                        self.bump();
                        escaped = true;
                    } else {
                        break at;
                    }
                }
                None => {
                    self.pos = self.sql.len();
                    break self.pos;
                }
            }
        };

        let content = &self.sql[content_start..content_end];
        let value = if escaped {
            let mut doubled = String::with_capacity(2);
            doubled.push(delimiter);
            doubled.push(delimiter);
            Cow::Owned(content.replace(&doubled, &delimiter.to_string()))
        } else {
            Cow::Borrowed(content)
        };

        Token {
            kind: TokenKind::Quoted(delimiter),
            value,
            raw: &self.sql[start..self.pos],
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        self.skip_whitespace_and_comments();

        let start = self.pos;
        let c = self.peek()?;

        let token = match c {
            '(' | ')' | ',' | '.' => {
                self.bump();
                let kind = match c {
                    '(' => TokenKind::LeftParen,
                    ')' => TokenKind::RightParen,
                    ',' => TokenKind::Comma,
                    _ => TokenKind::Dot,
                };
                self.token(kind, start)
            }
            '"' | '`' | '\'' => self.read_quoted(start, c),
            c if c.is_ascii_digit() => self.read_number(start),
            c if is_word_start(c) => self.read_word(start),
            _ => {
                self.bump();
                self.token(TokenKind::Other, start)
            }
        };

        Some(token)
    }
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_word_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
