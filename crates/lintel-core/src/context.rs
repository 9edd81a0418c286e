//! The parsed file handed to rules.

use crate::error::ParseFailure;
use crate::position::{AbsolutePosition, LineColumn, LineIndex};
use crate::regions::DisabledRegions;
use crate::syntax::{self, SyntaxTree};
use crate::types::Location;
use std::path::{Path, PathBuf};

/// One source file with everything rules need to inspect it.
///
/// The tree, line table and disabled regions are computed once when the
/// file is parsed and never change afterwards. Correcting a file produces
/// a new `LintFile` from the rewritten text.
#[derive(Debug)]
pub struct LintFile {
    path: Option<PathBuf>,
    source: String,
    tree: SyntaxTree,
    lines: LineIndex,
    regions: DisabledRegions,
}

impl LintFile {
    /// Parses `source`, optionally attributed to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFailure`] when the source cannot be tokenized.
    pub fn parse(path: Option<PathBuf>, source: impl Into<String>) -> Result<Self, ParseFailure> {
        let source = source.into();
        let tree = syntax::parse(&source)?;
        let lines = LineIndex::new(&source);
        let regions = DisabledRegions::from_tree(&tree, &lines);
        Ok(Self {
            path,
            source,
            tree,
            lines,
            regions,
        })
    }

    /// Parses in-memory source with no path.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFailure`] when the source cannot be tokenized.
    pub fn from_source(source: impl Into<String>) -> Result<Self, ParseFailure> {
        Self::parse(None, source)
    }

    /// The file path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The syntax tree.
    #[must_use]
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// The line-start table.
    #[must_use]
    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    /// Regions disabled by comment commands.
    #[must_use]
    pub fn regions(&self) -> &DisabledRegions {
        &self.regions
    }

    /// Line and column of `position`.
    #[must_use]
    pub fn line_column(&self, position: AbsolutePosition) -> LineColumn {
        self.lines.line_column(position)
    }

    /// Reporting location of `position`, clamped into the file.
    #[must_use]
    pub fn location(&self, position: AbsolutePosition) -> Location {
        let offset = position.offset().min(self.source.len());
        let LineColumn { line, column } = self.line_column(AbsolutePosition(offset));
        Location::new(self.path.clone(), line, column, offset)
    }

    /// Text of the 1-indexed `line` without its line break.
    #[must_use]
    pub fn line_text(&self, line: usize) -> Option<&str> {
        let start = self.lines.line_start(line)?.offset();
        let end = self.lines.line_end(line)?.offset();
        let text = &self.source[start..end];
        Some(text.strip_suffix('\r').unwrap_or(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_uses_path_and_columns() {
        let file = LintFile::parse(Some(PathBuf::from("A.swift")), "let a = 1\nlet é = 2\n").unwrap();
        let location = file.location(AbsolutePosition(16));
        assert_eq!(location.line, 2);
        assert_eq!(location.column, 6);
        assert_eq!(location.to_string(), "A.swift:2:6");
    }

    #[test]
    fn location_clamps_past_end() {
        let file = LintFile::from_source("abc").unwrap();
        assert_eq!(file.location(AbsolutePosition(99)).offset, 3);
    }

    #[test]
    fn line_text_strips_line_breaks() {
        let file = LintFile::from_source("a\r\nb\n").unwrap();
        assert_eq!(file.line_text(1), Some("a"));
        assert_eq!(file.line_text(2), Some("b"));
        assert_eq!(file.line_text(3), Some(""));
        assert_eq!(file.line_text(4), None);
    }

    #[test]
    fn parse_failures_propagate() {
        assert!(LintFile::from_source("let s = \"open").is_err());
    }

    #[test]
    fn regions_are_built_on_parse() {
        let file = LintFile::from_source("// lintel:disable colon\nlet a: Int = 1\n").unwrap();
        assert!(file.regions().is_disabled("colon", AbsolutePosition(30)));
    }
}
