//! Whitespace and comments attached to tokens.

use std::fmt;

/// One run of trivia.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TriviaPiece {
    /// `count` consecutive spaces.
    Spaces(usize),
    /// `count` consecutive tabs.
    Tabs(usize),
    /// `count` consecutive `\n`.
    Newlines(usize),
    /// `count` consecutive `\r\n`.
    CarriageReturnLineFeeds(usize),
    /// A `//` comment, without its terminating newline.
    LineComment(String),
    /// A `/* */` comment, delimiters included.
    BlockComment(String),
    /// Any other whitespace character run (`\r`, form feed, ...).
    Other(String),
}

impl TriviaPiece {
    /// Length of the piece in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Spaces(n) | Self::Tabs(n) | Self::Newlines(n) => *n,
            Self::CarriageReturnLineFeeds(n) => n * 2,
            Self::LineComment(text) | Self::BlockComment(text) | Self::Other(text) => text.len(),
        }
    }

    /// Whether the piece has zero length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this piece is a comment.
    #[must_use]
    pub fn is_comment(&self) -> bool {
        matches!(self, Self::LineComment(_) | Self::BlockComment(_))
    }

    /// Whether this piece breaks a line.
    #[must_use]
    pub fn is_newline(&self) -> bool {
        matches!(self, Self::Newlines(_) | Self::CarriageReturnLineFeeds(_))
    }

    /// Whether this piece is horizontal whitespace.
    #[must_use]
    pub fn is_horizontal_whitespace(&self) -> bool {
        matches!(self, Self::Spaces(_) | Self::Tabs(_) | Self::Other(_))
    }

    /// Comment text, if this is a comment.
    #[must_use]
    pub fn comment_text(&self) -> Option<&str> {
        match self {
            Self::LineComment(text) | Self::BlockComment(text) => Some(text),
            _ => None,
        }
    }

    /// Appends the source text of this piece to `out`.
    pub fn write_to(&self, out: &mut String) {
        match self {
            Self::Spaces(n) => out.extend(std::iter::repeat(' ').take(*n)),
            Self::Tabs(n) => out.extend(std::iter::repeat('\t').take(*n)),
            Self::Newlines(n) => out.extend(std::iter::repeat('\n').take(*n)),
            Self::CarriageReturnLineFeeds(n) => {
                for _ in 0..*n {
                    out.push_str("\r\n");
                }
            }
            Self::LineComment(text) | Self::BlockComment(text) | Self::Other(text) => {
                out.push_str(text);
            }
        }
    }
}

/// An ordered sequence of trivia pieces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Trivia(Vec<TriviaPiece>);

impl Trivia {
    /// Empty trivia.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds trivia from pieces, merging adjacent runs of the same kind.
    #[must_use]
    pub fn from_pieces(pieces: impl IntoIterator<Item = TriviaPiece>) -> Self {
        let mut trivia = Self::new();
        for piece in pieces {
            trivia.push(piece);
        }
        trivia
    }

    /// Appends a piece, merging counted runs.
    pub fn push(&mut self, piece: TriviaPiece) {
        if piece.is_empty() {
            return;
        }
        if let Some(last) = self.0.last_mut() {
            match (last, &piece) {
                (TriviaPiece::Spaces(a), TriviaPiece::Spaces(b))
                | (TriviaPiece::Tabs(a), TriviaPiece::Tabs(b))
                | (TriviaPiece::Newlines(a), TriviaPiece::Newlines(b))
                | (
                    TriviaPiece::CarriageReturnLineFeeds(a),
                    TriviaPiece::CarriageReturnLineFeeds(b),
                ) => {
                    *a += *b;
                    return;
                }
                _ => {}
            }
        }
        self.0.push(piece);
    }

    /// The pieces in source order.
    #[must_use]
    pub fn pieces(&self) -> &[TriviaPiece] {
        &self.0
    }

    /// Total length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.iter().map(TriviaPiece::len).sum()
    }

    /// Whether there is no trivia at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any piece is a comment.
    #[must_use]
    pub fn contains_comments(&self) -> bool {
        self.0.iter().any(TriviaPiece::is_comment)
    }

    /// Whether any piece is a line break.
    #[must_use]
    pub fn contains_newlines(&self) -> bool {
        self.0.iter().any(TriviaPiece::is_newline)
    }

    /// Whether the trivia is exactly one space.
    #[must_use]
    pub fn is_single_space(&self) -> bool {
        self.0 == [TriviaPiece::Spaces(1)]
    }

    /// Whether the trivia holds only horizontal whitespace (or nothing).
    #[must_use]
    pub fn is_horizontal_whitespace_only(&self) -> bool {
        self.0.iter().all(TriviaPiece::is_horizontal_whitespace)
    }

    /// Comment pieces in order.
    pub fn comments(&self) -> impl Iterator<Item = &TriviaPiece> {
        self.0.iter().filter(|p| p.is_comment())
    }

    /// Source text of the trivia.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.len());
        self.write_to(&mut out);
        out
    }

    /// Appends the source text to `out`.
    pub fn write_to(&self, out: &mut String) {
        for piece in &self.0 {
            piece.write_to(out);
        }
    }
}

impl fmt::Display for Trivia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_runs_merge() {
        let trivia = Trivia::from_pieces([
            TriviaPiece::Spaces(1),
            TriviaPiece::Spaces(2),
            TriviaPiece::Newlines(1),
            TriviaPiece::Newlines(1),
        ]);
        assert_eq!(
            trivia.pieces(),
            &[TriviaPiece::Spaces(3), TriviaPiece::Newlines(2)]
        );
        assert_eq!(trivia.text(), "   \n\n");
        assert_eq!(trivia.len(), 5);
    }

    #[test]
    fn classification() {
        let trivia = Trivia::from_pieces([
            TriviaPiece::Spaces(1),
            TriviaPiece::LineComment("// note".into()),
        ]);
        assert!(trivia.contains_comments());
        assert!(!trivia.contains_newlines());
        assert!(!trivia.is_single_space());
        assert!(!trivia.is_horizontal_whitespace_only());
        assert!(Trivia::from_pieces([TriviaPiece::Spaces(1)]).is_single_space());
    }

    #[test]
    fn crlf_counts_two_bytes() {
        let trivia = Trivia::from_pieces([TriviaPiece::CarriageReturnLineFeeds(2)]);
        assert_eq!(trivia.len(), 4);
        assert_eq!(trivia.text(), "\r\n\r\n");
    }
}
