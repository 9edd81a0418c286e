//! Comment commands that disable rules for a region of a file.
//!
//! Supports commands like:
//! ```text
//! // lintel:disable colon trailing_whitespace - legacy formatting
//! // lintel:enable colon
//! // lintel:disable:next identifier_name
//! let x = 1 // lintel:disable:this identifier_name
//! ```
//!
//! `all` selects every rule. A `disable` without a matching `enable`
//! extends to the end of the file.

use crate::position::{AbsolutePosition, ByteRange, LineIndex};
use crate::syntax::{SyntaxTree, TriviaPiece, ViewMode};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const PREFIX: &str = "lintel:";
const WILDCARD: &str = "all";
const COMMENT_DELIMITER: &str = " - ";

/// What a command does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Re-enable rules.
    Enable,
    /// Disable rules.
    Disable,
}

/// Restricts a command to a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// The line before the command.
    Previous,
    /// The command's own line.
    This,
    /// The line after the command.
    Next,
}

/// A parsed `lintel:` comment command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Enable or disable.
    pub action: Action,
    /// Single-line scope, if any.
    pub modifier: Option<Modifier>,
    /// Selected rule identifiers; may contain `all`.
    pub rule_ids: BTreeSet<String>,
    /// Explanation after ` - `.
    pub trailing_comment: Option<String>,
}

impl Command {
    /// Parses the text of a comment.
    ///
    /// Returns `None` when the comment is not a command at all and
    /// `Some(Err(reason))` when it is a malformed one.
    #[must_use]
    pub fn parse(comment: &str) -> Option<Result<Self, String>> {
        let body = comment
            .strip_prefix("//")
            .map(|rest| rest.trim_start_matches('/'))
            .or_else(|| {
                comment
                    .strip_prefix("/*")
                    .map(|rest| rest.strip_suffix("*/").unwrap_or(rest))
            })?
            .trim();
        let body = body.strip_prefix(PREFIX)?;
        Some(Self::parse_body(body))
    }

    fn parse_body(body: &str) -> Result<Self, String> {
        let (head, rest) = body.split_once(' ').unwrap_or((body, ""));
        let (action, modifier) = match head.split_once(':') {
            Some((action, modifier)) => (action, Some(modifier)),
            None => (head, None),
        };
        let action = match action {
            "enable" => Action::Enable,
            "disable" => Action::Disable,
            other => return Err(format!("unknown action '{other}'")),
        };
        let modifier = match modifier {
            None => None,
            Some("previous") => Some(Modifier::Previous),
            Some("this") => Some(Modifier::This),
            Some("next") => Some(Modifier::Next),
            Some(other) => return Err(format!("unknown modifier '{other}'")),
        };

        let rest = format!(" {rest}");
        let (ids, trailing_comment) = match rest.split_once(COMMENT_DELIMITER) {
            Some((ids, comment)) => (ids.to_string(), Some(comment.trim().to_string())),
            None => (rest, None),
        };
        let rule_ids: BTreeSet<String> = ids
            .split_whitespace()
            .filter(|id| *id != "*/")
            .map(str::to_string)
            .collect();
        if rule_ids.is_empty() {
            return Err("no rule identifiers".to_string());
        }
        Ok(Self {
            action,
            modifier,
            rule_ids,
            trailing_comment,
        })
    }
}

/// Which rules a region disables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSelector {
    /// Every rule except the listed ones.
    All {
        /// Rules re-enabled inside the region.
        except: BTreeSet<String>,
    },
    /// One rule.
    Rule(String),
}

impl RuleSelector {
    /// Whether `rule_id` is selected.
    #[must_use]
    pub fn matches(&self, rule_id: &str) -> bool {
        match self {
            Self::All { except } => !except.contains(rule_id),
            Self::Rule(id) => id == rule_id,
        }
    }

    fn from_id(id: &str) -> Self {
        if id == WILDCARD {
            Self::All {
                except: BTreeSet::new(),
            }
        } else {
            Self::Rule(id.to_string())
        }
    }
}

/// A byte range in which some rules are disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisabledRegion {
    /// Selected rules.
    pub selector: RuleSelector,
    /// Covered bytes; both ends inclusive.
    pub range: ByteRange,
}

/// A `lintel:` comment that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidCommand {
    /// Offset of the comment.
    pub position: AbsolutePosition,
    /// Line of the comment (1-indexed).
    pub line: usize,
    /// The comment text.
    pub text: String,
    /// Why it was rejected.
    pub reason: String,
}

/// The disabled-region table of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisabledRegions {
    regions: Vec<DisabledRegion>,
    invalid: Vec<InvalidCommand>,
}

impl DisabledRegions {
    /// A table with explicit regions.
    #[must_use]
    pub fn new(regions: Vec<DisabledRegion>) -> Self {
        Self {
            regions,
            invalid: Vec::new(),
        }
    }

    /// Builds the table from the command comments in `tree`.
    #[must_use]
    pub fn from_tree(tree: &SyntaxTree, index: &LineIndex) -> Self {
        let mut builder = RegionBuilder::default();
        for token in tree.tokens(ViewMode::SourceAccurate) {
            let mut offset = token.position();
            for piece in token.leading_trivia().pieces() {
                builder.comment(piece, offset, index);
                offset = offset + piece.len();
            }
            let mut offset = token.end_position_before_trailing_trivia();
            for piece in token.trailing_trivia().pieces() {
                builder.comment(piece, offset, index);
                offset = offset + piece.len();
            }
        }
        builder.finish(AbsolutePosition(index.len()))
    }

    /// Whether `rule_id` is disabled at `position`.
    #[must_use]
    pub fn is_disabled(&self, rule_id: &str, position: AbsolutePosition) -> bool {
        self.regions
            .iter()
            .any(|r| r.range.contains(position) && r.selector.matches(rule_id))
    }

    /// Whether any of `rule_ids` is disabled at `position`.
    #[must_use]
    pub fn is_any_disabled(&self, rule_ids: &[&str], position: AbsolutePosition) -> bool {
        rule_ids.iter().any(|id| self.is_disabled(id, position))
    }

    /// The regions in command order.
    #[must_use]
    pub fn regions(&self) -> &[DisabledRegion] {
        &self.regions
    }

    /// Commands that were ignored.
    #[must_use]
    pub fn invalid_commands(&self) -> &[InvalidCommand] {
        &self.invalid
    }

    /// Whether no region exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[derive(Default)]
struct RegionBuilder {
    regions: Vec<DisabledRegion>,
    invalid: Vec<InvalidCommand>,
    open: BTreeMap<String, AbsolutePosition>,
    all: Option<(AbsolutePosition, BTreeSet<String>)>,
}

impl RegionBuilder {
    fn comment(&mut self, piece: &TriviaPiece, at: AbsolutePosition, index: &LineIndex) {
        let Some(text) = piece.comment_text() else {
            return;
        };
        let Some(parsed) = Command::parse(text) else {
            return;
        };
        let line = index.line_column(at).line;
        match parsed {
            Ok(command) => self.apply(&command, at, line, index),
            Err(reason) => {
                tracing::debug!(line, %reason, "ignoring invalid command");
                self.invalid.push(InvalidCommand {
                    position: at,
                    line,
                    text: text.to_string(),
                    reason,
                });
            }
        }
    }

    fn apply(&mut self, command: &Command, at: AbsolutePosition, line: usize, index: &LineIndex) {
        if let Some(modifier) = command.modifier {
            let target = match modifier {
                Modifier::Previous => line.checked_sub(1),
                Modifier::This => Some(line),
                Modifier::Next => Some(line + 1),
            };
            let range = target
                .and_then(|l| Some(ByteRange::new(index.line_start(l)?, index.line_end(l)?)));
            // A single-line `enable` has nothing to punch a hole into.
            if let (Some(range), Action::Disable) = (range, command.action) {
                for id in &command.rule_ids {
                    self.regions.push(DisabledRegion {
                        selector: RuleSelector::from_id(id),
                        range,
                    });
                }
            }
            return;
        }

        for id in &command.rule_ids {
            match (command.action, id == WILDCARD) {
                (Action::Disable, true) => {
                    self.close_all(at);
                    self.all = Some((at, BTreeSet::new()));
                }
                (Action::Disable, false) => {
                    let reenabled =
                        self.all.as_ref().is_some_and(|(_, except)| except.contains(id));
                    if reenabled {
                        let mut except = self.close_all(at).unwrap_or_default();
                        except.remove(id);
                        self.all = Some((at, except));
                    } else {
                        self.open.entry(id.clone()).or_insert(at);
                    }
                }
                (Action::Enable, true) => {
                    self.close_all(at);
                    let open = std::mem::take(&mut self.open);
                    for (id, start) in open {
                        self.push(RuleSelector::Rule(id), start, at);
                    }
                }
                (Action::Enable, false) => {
                    if let Some(start) = self.open.remove(id) {
                        self.push(RuleSelector::Rule(id.clone()), start, at);
                    }
                    if self.all.is_some() {
                        let mut except = self.close_all(at).unwrap_or_default();
                        except.insert(id.clone());
                        self.all = Some((at, except));
                    }
                }
            }
        }
    }

    /// Closes the open `all` region, returning its exceptions.
    fn close_all(&mut self, at: AbsolutePosition) -> Option<BTreeSet<String>> {
        let (start, except) = self.all.take()?;
        self.push(
            RuleSelector::All {
                except: except.clone(),
            },
            start,
            at,
        );
        Some(except)
    }

    fn push(&mut self, selector: RuleSelector, start: AbsolutePosition, end: AbsolutePosition) {
        if end < start {
            return;
        }
        self.regions.push(DisabledRegion {
            selector,
            range: ByteRange::new(start, end),
        });
    }

    fn finish(mut self, end: AbsolutePosition) -> DisabledRegions {
        self.close_all(end);
        for (id, start) in std::mem::take(&mut self.open) {
            self.push(RuleSelector::Rule(id), start, end);
        }
        DisabledRegions {
            regions: self.regions,
            invalid: self.invalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn regions(source: &str) -> DisabledRegions {
        let tree = parse(source).unwrap();
        DisabledRegions::from_tree(&tree, &LineIndex::new(source))
    }

    fn offset_of(source: &str, needle: &str) -> AbsolutePosition {
        AbsolutePosition(source.find(needle).unwrap())
    }

    #[test]
    fn parse_command_with_modifier_and_comment() {
        let command = Command::parse("// lintel:disable:next colon nesting - legacy")
            .unwrap()
            .unwrap();
        assert_eq!(command.action, Action::Disable);
        assert_eq!(command.modifier, Some(Modifier::Next));
        assert_eq!(
            command.rule_ids.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["colon", "nesting"]
        );
        assert_eq!(command.trailing_comment.as_deref(), Some("legacy"));
    }

    #[test]
    fn block_comment_commands() {
        let command = Command::parse("/* lintel:enable all */").unwrap().unwrap();
        assert_eq!(command.action, Action::Enable);
        assert!(command.rule_ids.contains("all"));
    }

    #[test]
    fn ordinary_comments_are_not_commands() {
        assert!(Command::parse("// just a note").is_none());
        assert!(Command::parse("// lintel:disable").unwrap().is_err());
        assert!(Command::parse("// lintel:silence foo").unwrap().is_err());
        assert!(Command::parse("// lintel:disable:later foo").unwrap().is_err());
    }

    #[test]
    fn disable_without_enable_runs_to_end_of_file() {
        let source = "let a = 1\n// lintel:disable colon\nlet b: Int = 2\n";
        let table = regions(source);
        let b = offset_of(source, "b:");
        assert!(table.is_disabled("colon", b));
        assert!(!table.is_disabled("colon", offset_of(source, "a =")));
        assert!(!table.is_disabled("nesting", b));
        assert!(table.is_disabled("colon", AbsolutePosition(source.len())));
    }

    #[test]
    fn enable_closes_region() {
        let source = "// lintel:disable colon\nlet a = 1\n// lintel:enable colon\nlet b = 2\n";
        let table = regions(source);
        assert!(table.is_disabled("colon", offset_of(source, "a =")));
        assert!(!table.is_disabled("colon", offset_of(source, "b =")));
    }

    #[test]
    fn single_line_modifiers() {
        let source = "let a = 1\n// lintel:disable:previous colon\n// lintel:disable:next nesting\nlet b = 2 // lintel:disable:this all\nlet c = 3\n";
        let table = regions(source);
        assert!(table.is_disabled("colon", offset_of(source, "a =")));
        assert!(table.is_disabled("nesting", offset_of(source, "b =")));
        assert!(table.is_disabled("anything", offset_of(source, "b =")));
        assert!(!table.is_disabled("nesting", offset_of(source, "c =")));
        assert!(!table.is_disabled("anything", offset_of(source, "c =")));
    }

    #[test]
    fn enabling_one_rule_inside_disable_all() {
        let source = "// lintel:disable all\nlet a = 1\n// lintel:enable colon\nlet b = 2\n";
        let table = regions(source);
        let b = offset_of(source, "b =");
        assert!(table.is_disabled("colon", offset_of(source, "a =")));
        assert!(!table.is_disabled("colon", b));
        assert!(table.is_disabled("nesting", b));
    }

    #[test]
    fn invalid_commands_are_recorded() {
        let source = "// lintel:disable\nlet a = 1\n";
        let table = regions(source);
        assert!(table.is_empty());
        assert_eq!(table.invalid_commands().len(), 1);
        assert_eq!(table.invalid_commands()[0].line, 1);
    }
}
