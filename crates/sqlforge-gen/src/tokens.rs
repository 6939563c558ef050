//! The token stream of a query and the lookups the walker runs against it.
//!
//! Tokens come from the PostgreSQL scanner with their byte offsets; comments
//! stay in the stream so annotations can be found next to the nodes they
//! describe. Every lookup starts with a binary search on token offsets.

use pg_query::protobuf::{KeywordKind, Token as Kind};

use crate::error::Result;
use crate::span::{NodeInfo, Span};

/// A scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Start byte offset.
    pub start: i32,
    /// End byte offset (exclusive).
    pub end: i32,
    kind: i32,
    keyword: i32,
}

impl Token {
    /// Returns true when the token is of `kind`.
    #[must_use]
    pub fn is(&self, kind: Kind) -> bool {
        self.kind == kind as i32
    }

    /// Returns true when the token is any of `kinds`.
    #[must_use]
    pub fn is_any(&self, kinds: &[Kind]) -> bool {
        kinds.iter().any(|k| self.is(*k))
    }

    /// Returns true for identifiers and unreserved keywords.
    #[must_use]
    pub fn is_ident_like(&self) -> bool {
        self.is(Kind::Ident) || self.keyword == KeywordKind::UnreservedKeyword as i32
    }

    /// Returns true when the token is a keyword of `kind`.
    #[must_use]
    pub fn is_keyword(&self, kind: KeywordKind) -> bool {
        self.keyword == kind as i32
    }

    /// The token's span.
    #[must_use]
    pub const fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    const fn info(&self) -> NodeInfo {
        NodeInfo::leaf(self.start, self.end)
    }
}

/// Scanned tokens of one statement.
#[derive(Debug, Clone)]
pub struct TokenStream<'s> {
    input: &'s str,
    tokens: Vec<Token>,
}

impl<'s> TokenStream<'s> {
    /// Scans `input`.
    ///
    /// # Errors
    ///
    /// Returns the scanner's error for unterminated literals and comments.
    pub fn scan(input: &'s str) -> Result<Self> {
        let scanned = pg_query::scan(input)?;
        let tokens = scanned
            .tokens
            .iter()
            .map(|t| Token {
                start: t.start,
                end: t.end,
                kind: t.token,
                keyword: t.keyword_kind,
            })
            .collect();
        Ok(Self { input, tokens })
    }

    /// The scanned input.
    #[must_use]
    pub const fn input(&self) -> &'s str {
        self.input
    }

    /// All tokens, comments included.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The input text under `span`, or an empty string.
    #[must_use]
    pub fn text(&self, span: Span) -> &'s str {
        span.range()
            .and_then(|r| self.input.get(r))
            .unwrap_or_default()
    }

    fn first_starting_at(&self, pos: i32) -> usize {
        self.tokens.partition_point(|t| t.start < pos)
    }

    fn first_ending_after(&self, pos: i32) -> usize {
        self.tokens.partition_point(|t| t.end <= pos)
    }

    /// End of the first token starting at or after `start`.
    #[must_use]
    pub fn end_of(&self, start: i32) -> i32 {
        if start < 0 {
            return -1;
        }
        self.tokens
            .get(self.first_starting_at(start))
            .map_or(-1, |t| t.end)
    }

    /// The first token ending after `pos` that satisfies `pred`.
    pub fn find_after(&self, pos: i32, mut pred: impl FnMut(usize, &Token) -> bool) -> NodeInfo {
        if pos < 0 {
            return NodeInfo::invalid();
        }
        let from = self.first_ending_after(pos);
        self.tokens
            .iter()
            .enumerate()
            .skip(from)
            .find(|(i, t)| pred(*i, t))
            .map_or_else(NodeInfo::invalid, |(_, t)| t.info())
    }

    /// The first token of one of `kinds` ending after `pos`.
    #[must_use]
    pub fn find_token_after(&self, pos: i32, kinds: &[Kind]) -> NodeInfo {
        self.find_after(pos, |_, t| t.is_any(kinds))
    }

    /// The nearest token at or before `pos` that satisfies `pred`.
    pub fn find_before(&self, pos: i32, mut pred: impl FnMut(&Token) -> bool) -> NodeInfo {
        if pos < 0 {
            return NodeInfo::invalid();
        }
        let until = self.tokens.partition_point(|t| t.start <= pos);
        self.tokens[..until]
            .iter()
            .rev()
            .find(|t| pred(t))
            .map_or_else(NodeInfo::invalid, Token::info)
    }

    /// The nearest token of one of `kinds` at or before `pos`.
    #[must_use]
    pub fn find_token_before(&self, pos: i32, kinds: &[Kind]) -> NodeInfo {
        self.find_before(pos, |t| t.is_any(kinds))
    }

    /// The first identifier or unreserved keyword ending after `pos`.
    #[must_use]
    pub fn ident_after(&self, pos: i32) -> NodeInfo {
        self.find_after(pos, |_, t| t.is_ident_like())
    }

    /// Start of the nearest token of `kinds` at or before `start`, or `start`.
    #[must_use]
    pub fn start_of_token_before(&self, start: i32, kinds: &[Kind]) -> i32 {
        let found = self.find_token_before(start, kinds);
        if found.is_valid() {
            found.start
        } else {
            start
        }
    }

    /// End of the first token of `kinds` ending at or after `end`, or `end`.
    #[must_use]
    pub fn end_of_token_after(&self, end: i32, kinds: &[Kind]) -> i32 {
        let from = self.tokens.partition_point(|t| t.end < end);
        self.tokens[from..]
            .iter()
            .find(|t| t.is_any(kinds))
            .map_or(end, |t| t.end)
    }

    /// Widens `info` until the parentheses inside it are balanced.
    #[must_use]
    pub fn balance_parens(&self, mut info: NodeInfo) -> NodeInfo {
        if !info.is_valid() {
            return info;
        }
        let first = self.first_starting_at(info.start);
        if first >= self.tokens.len() {
            return info;
        }

        let mut count = 0_i32;
        let mut idx = first;
        while idx < self.tokens.len() && self.tokens[idx].end <= info.end {
            count += paren_delta(&self.tokens[idx]);
            if self.tokens[idx].end >= info.end {
                break;
            }
            idx += 1;
        }

        for t in self.tokens.iter().skip(idx + 1) {
            if count <= 0 {
                break;
            }
            count += paren_delta(t);
            if count == 0 {
                info.end = t.end;
                return info;
            }
        }

        for t in self.tokens[..first].iter().rev() {
            if count >= 0 {
                break;
            }
            count += paren_delta(t);
            if count == 0 {
                info.start = t.start;
                return info;
            }
        }

        info
    }

    /// Text of the nearest `--` comment before `pos`, without the marker.
    #[must_use]
    pub fn line_comment_before(&self, pos: i32) -> Option<String> {
        let found = self.find_token_before(pos, &[Kind::SqlComment]);
        if !found.is_valid() {
            return None;
        }
        let text = self.text(Span::new(found.start + 2, found.end));
        Some(text.trim().to_string())
    }

    /// Text of the `/* */` comment directly after `end`, or an empty string.
    #[must_use]
    pub fn block_comment_after(&self, end: i32) -> String {
        if end <= 0 {
            return String::new();
        }
        match self.tokens.get(self.first_ending_after(end)) {
            Some(t) if t.is(Kind::CComment) => self
                .text(Span::new(t.start + 2, t.end - 2))
                .trim()
                .to_string(),
            _ => String::new(),
        }
    }

    /// The `foo` of a `-- prefix:foo` comment directly before `pos`.
    #[must_use]
    pub fn prefix_annotation(&self, pos: i32) -> Option<String> {
        let idx = self.first_starting_at(pos).checked_sub(1)?;
        let t = self.tokens.get(idx)?;
        if !t.is(Kind::SqlComment) {
            return None;
        }
        let text = self.text(Span::new(t.start + 2, t.end));
        text.trim()
            .strip_prefix("prefix:")
            .map(|p| p.trim().to_string())
    }
}

fn paren_delta(t: &Token) -> i32 {
    if t.is(Kind::Ascii40) {
        1
    } else if t.is(Kind::Ascii41) {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_of_and_idents() {
        let input = "SELECT name FROM users";
        let ts = TokenStream::scan(input).unwrap();
        assert_eq!(ts.end_of(7), 11);
        let ident = ts.ident_after(11);
        assert_eq!(ts.text(ident.span()), "users");
    }

    #[test]
    fn test_find_token_before_and_after() {
        let ts = TokenStream::scan("SELECT a FROM t ORDER BY a DESC").unwrap();
        let desc = ts.find_token_after(20, &[Kind::Asc, Kind::Desc]);
        assert_eq!(ts.text(desc.span()), "DESC");
        assert_eq!(ts.start_of_token_before(7, &[Kind::Select]), 0);
    }

    #[test]
    fn test_find_before_ignores_tokens_after_pos() {
        let ts = TokenStream::scan("SELECT a FROM t WHERE b").unwrap();
        assert!(!ts.find_token_before(15, &[Kind::Where]).is_valid());
        let found = ts.find_token_before(16, &[Kind::Where]);
        assert_eq!(ts.text(found.span()), "WHERE");
        let from = ts.find_token_before(15, &[Kind::From]);
        assert_eq!(ts.text(from.span()), "FROM");
        assert_eq!(ts.start_of_token_before(15, &[Kind::Where]), 15);
    }

    #[test]
    fn test_balance_parens_extends_right() {
        let input = "SELECT (a + (b)) FROM t";
        let ts = TokenStream::scan(input).unwrap();
        let info = ts.balance_parens(NodeInfo::leaf(7, 13));
        assert_eq!(ts.text(info.span()), "(a + (b))");
    }

    #[test]
    fn test_balance_parens_extends_left() {
        let input = "SELECT (a + b) FROM t";
        let ts = TokenStream::scan(input).unwrap();
        let info = ts.balance_parens(NodeInfo::leaf(8, 14));
        assert_eq!(ts.text(info.span()), "(a + b)");
    }

    #[test]
    fn test_comments() {
        let input = "-- GetUser one:all\nSELECT id /* user_id:int64 */, -- prefix:u_\n name FROM users";
        let ts = TokenStream::scan(input).unwrap();
        assert_eq!(ts.line_comment_before(19).as_deref(), Some("GetUser one:all"));
        assert_eq!(ts.block_comment_after(28), "user_id:int64");
        let name = input.find("name").unwrap();
        assert_eq!(
            ts.prefix_annotation(i32::try_from(name).unwrap()).as_deref(),
            Some("u_")
        );
        assert_eq!(ts.prefix_annotation(26), None);
    }
}
