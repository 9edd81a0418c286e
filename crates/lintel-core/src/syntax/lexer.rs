//! Lossless tokenizer.
//!
//! Every byte of the input ends up in exactly one token's text or trivia.
//! A token's trailing trivia stops before the next line break; the break
//! and everything after it lead the following token.

use super::kind::{Keyword, TokenKind};
use super::tree::TokenData;
use super::trivia::{Trivia, TriviaPiece};
use crate::error::ParseFailure;
use crate::position::AbsolutePosition;

const OPERATOR_CHARS: &[char] = &[
    '/', '=', '-', '+', '!', '*', '%', '<', '>', '&', '|', '^', '~', '?',
];

/// Splits `source` into tokens, ending with an end-of-file token.
///
/// # Errors
///
/// Fails on unterminated string literals and block comments.
pub fn tokenize(source: &str) -> Result<Vec<TokenData>, ParseFailure> {
    Lexer { src: source, pos: 0 }.run()
}

struct Lexer<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Lexer<'s> {
    fn run(mut self) -> Result<Vec<TokenData>, ParseFailure> {
        let mut tokens = Vec::new();
        loop {
            let leading = self.trivia(true)?;
            if self.pos >= self.src.len() {
                tokens.push(TokenData::new(
                    TokenKind::EndOfFile,
                    "",
                    leading,
                    Trivia::new(),
                ));
                return Ok(tokens);
            }
            let start = self.pos;
            let kind = self.token()?;
            let text = &self.src[start..self.pos];
            let trailing = self.trivia(false)?;
            tokens.push(TokenData::new(kind, text, leading, trailing));
        }
    }

    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        self.pos - start
    }

    fn failure(&self, message: &str, at: usize) -> ParseFailure {
        ParseFailure::new(message, AbsolutePosition(at))
    }

    fn trivia(&mut self, allow_newlines: bool) -> Result<Trivia, ParseFailure> {
        let mut trivia = Trivia::new();
        loop {
            let rest = self.rest();
            if rest.starts_with(' ') {
                trivia.push(TriviaPiece::Spaces(self.bump_while(|c| c == ' ')));
            } else if rest.starts_with('\t') {
                trivia.push(TriviaPiece::Tabs(self.bump_while(|c| c == '\t')));
            } else if allow_newlines && rest.starts_with('\n') {
                trivia.push(TriviaPiece::Newlines(self.bump_while(|c| c == '\n')));
            } else if allow_newlines && rest.starts_with("\r\n") {
                self.pos += 2;
                trivia.push(TriviaPiece::CarriageReturnLineFeeds(1));
            } else if rest.starts_with("//") {
                let len = rest.find(['\n', '\r']).unwrap_or(rest.len());
                trivia.push(TriviaPiece::LineComment(rest[..len].to_string()));
                self.pos += len;
            } else if rest.starts_with("/*") {
                let len = self.block_comment_len()?;
                let text = &rest[..len];
                if !allow_newlines && text.contains('\n') {
                    break;
                }
                trivia.push(TriviaPiece::BlockComment(text.to_string()));
                self.pos += len;
            } else if let Some(c) = self
                .peek()
                .filter(|&c| c.is_whitespace() && (allow_newlines || c != '\r') && c != '\n')
            {
                self.pos += c.len_utf8();
                trivia.push(TriviaPiece::Other(c.to_string()));
            } else {
                break;
            }
        }
        Ok(trivia)
    }

    /// Length of the (possibly nested) block comment starting at `pos`.
    fn block_comment_len(&self) -> Result<usize, ParseFailure> {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let mut depth = 0usize;
        let mut i = 0;
        while i + 1 < bytes.len() {
            match (bytes[i], bytes[i + 1]) {
                (b'/', b'*') => {
                    depth += 1;
                    i += 2;
                }
                (b'*', b'/') => {
                    depth -= 1;
                    i += 2;
                    if depth == 0 {
                        return Ok(i);
                    }
                }
                _ => i += 1,
            }
        }
        Err(self.failure("unterminated block comment", self.pos))
    }

    fn token(&mut self) -> Result<TokenKind, ParseFailure> {
        let start = self.pos;
        let Some(c) = self.bump_char() else {
            return Ok(TokenKind::EndOfFile);
        };
        let kind = match c {
            c if c == '_' || c.is_alphabetic() => {
                self.bump_while(|c| c == '_' || c.is_alphanumeric());
                Keyword::from_text(&self.src[start..self.pos])
                    .map_or(TokenKind::Identifier, TokenKind::Keyword)
            }
            '`' => {
                self.bump_while(|c| c != '`' && c != '\n');
                if self.peek() == Some('`') {
                    self.pos += 1;
                }
                TokenKind::Identifier
            }
            '$' | '#' => {
                self.bump_while(|c| c == '_' || c.is_alphanumeric());
                TokenKind::Identifier
            }
            '0'..='9' => self.number(),
            '"' => {
                self.pos = start;
                self.string()?;
                TokenKind::StringLiteral
            }
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '@' => TokenKind::At,
            '.' => {
                if self.peek() == Some('.') {
                    self.bump_while(|c| c == '.');
                    if self.peek() == Some('<') {
                        self.pos += 1;
                    }
                    TokenKind::Operator
                } else {
                    TokenKind::Period
                }
            }
            '-' if self.peek() == Some('>') => {
                self.pos += 1;
                TokenKind::Arrow
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.pos += 1;
                }
                TokenKind::Operator
            }
            c if OPERATOR_CHARS.contains(&c) => {
                while let Some(next) = self.peek() {
                    let rest = self.rest();
                    if !OPERATOR_CHARS.contains(&next)
                        || rest.starts_with("//")
                        || rest.starts_with("/*")
                    {
                        break;
                    }
                    self.pos += 1;
                }
                match &self.src[start..self.pos] {
                    "=" => TokenKind::Equal,
                    "?" => TokenKind::Question,
                    "!" => TokenKind::Exclamation,
                    _ => TokenKind::Operator,
                }
            }
            _ => TokenKind::Unknown,
        };
        Ok(kind)
    }

    fn number(&mut self) -> TokenKind {
        if self.src[..self.pos].ends_with('0') && matches!(self.peek(), Some('x' | 'o' | 'b')) {
            self.pos += 1;
            self.bump_while(|c| c == '_' || c.is_ascii_hexdigit());
            return TokenKind::IntegerLiteral;
        }
        self.bump_while(|c| c == '_' || c.is_ascii_digit());
        let mut kind = TokenKind::IntegerLiteral;
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            self.bump_while(|c| c == '_' || c.is_ascii_digit());
            kind = TokenKind::FloatLiteral;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek_nth(1), Some('+' | '-')));
            if self.peek_nth(1 + sign).is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1 + sign;
                self.bump_while(|c| c.is_ascii_digit());
                kind = TokenKind::FloatLiteral;
            }
        }
        kind
    }

    /// Consumes a string literal starting at `pos`, interpolations included.
    fn string(&mut self) -> Result<(), ParseFailure> {
        let start = self.pos;
        let multiline = self.rest().starts_with("\"\"\"");
        self.pos += if multiline { 3 } else { 1 };
        loop {
            let Some(c) = self.bump_char() else {
                return Err(self.failure("unterminated string literal", start));
            };
            match c {
                '\\' => {
                    if self.peek() == Some('(') {
                        self.pos += 1;
                        self.interpolation(start)?;
                    } else {
                        self.bump_char();
                    }
                }
                '\n' if !multiline => {
                    return Err(self.failure("unterminated string literal", start));
                }
                '"' if !multiline => return Ok(()),
                '"' if self.rest().starts_with("\"\"") => {
                    self.pos += 2;
                    return Ok(());
                }
                _ => {}
            }
        }
    }

    fn interpolation(&mut self, literal_start: usize) -> Result<(), ParseFailure> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.peek() {
                None => return Err(self.failure("unterminated string literal", literal_start)),
                Some('"') => self.string()?,
                Some('(') => {
                    depth += 1;
                    self.pos += 1;
                }
                Some(')') => {
                    depth -= 1;
                    self.pos += 1;
                }
                Some(_) => {
                    self.bump_char();
                }
            }
        }
        Ok(())
    }
}
