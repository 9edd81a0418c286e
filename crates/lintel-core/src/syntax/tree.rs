//! Immutable syntax tree storage and navigation handles.
//!
//! The tree is an arena: every token and composite node is an entry
//! addressed by [`NodeId`]. Parents own their children by construction and
//! nothing mutates the tree after [`TreeBuilder::finish`]. Navigation goes
//! through the copyable [`SyntaxNode`] and [`SyntaxToken`] handles.

use super::kind::{NodeKind, SyntaxKind, TokenKind};
use super::trivia::Trivia;
use crate::position::{AbsolutePosition, ByteRange};

/// Index of an entry in a [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Whether a token came from the source or was synthesized by recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    /// The token text exists in the source.
    Present,
    /// The parser expected the token and inserted a zero-width placeholder.
    Missing,
}

/// Which nodes take part in a traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// Only nodes backed by real source text, including unexpected tokens.
    #[default]
    SourceAccurate,
    /// The repaired tree: missing placeholders included, unexpected nodes left out.
    FixedUp,
    /// Every node.
    All,
}

/// Payload of a token entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenData {
    /// Kind tag.
    pub kind: TokenKind,
    /// Token spelling. For missing tokens this is the expected spelling.
    pub text: String,
    /// Trivia before the token.
    pub leading: Trivia,
    /// Trivia after the token, up to the end of its line.
    pub trailing: Trivia,
    /// Whether the token is real.
    pub presence: Presence,
}

impl TokenData {
    /// A present token.
    #[must_use]
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        leading: Trivia,
        trailing: Trivia,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            leading,
            trailing,
            presence: Presence::Present,
        }
    }

    /// A zero-width placeholder for a token the parser expected.
    #[must_use]
    pub fn missing(kind: TokenKind, expected: impl Into<String>) -> Self {
        Self {
            kind,
            text: expected.into(),
            leading: Trivia::new(),
            trailing: Trivia::new(),
            presence: Presence::Missing,
        }
    }

    /// Number of source bytes covered, trivia included.
    #[must_use]
    pub fn full_len(&self) -> usize {
        match self.presence {
            Presence::Present => self.leading.len() + self.text.len() + self.trailing.len(),
            Presence::Missing => 0,
        }
    }
}

#[derive(Debug)]
struct Entry {
    kind: SyntaxKind,
    parent: Option<NodeId>,
    index_in_parent: usize,
    children: Vec<NodeId>,
    token: Option<TokenData>,
    start: usize,
    len: usize,
    missing: bool,
    in_unexpected: bool,
    token_index: usize,
}

/// An immutable, lossless syntax tree for one file.
#[derive(Debug)]
pub struct SyntaxTree {
    entries: Vec<Entry>,
    root: NodeId,
    token_order: Vec<NodeId>,
}

impl SyntaxTree {
    /// The root node.
    #[must_use]
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode {
            tree: self,
            id: self.root,
        }
    }

    /// Handle for an entry.
    #[must_use]
    pub fn node(&self, id: NodeId) -> SyntaxNode<'_> {
        SyntaxNode { tree: self, id }
    }

    /// Length of the source the tree was built from.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entry(self.root).len
    }

    /// Whether the source was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All tokens in source order that participate in `mode`.
    pub fn tokens(&self, mode: ViewMode) -> impl Iterator<Item = SyntaxToken<'_>> + '_ {
        self.token_order
            .iter()
            .map(move |&id| SyntaxToken {
                node: SyntaxNode { tree: self, id },
            })
            .filter(move |t| t.node.is_visible(mode))
    }

    /// Reconstructs the source by concatenating every token's leading
    /// trivia, text and trailing trivia.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.len());
        for token in self.tokens(ViewMode::SourceAccurate) {
            token.write_to(&mut out);
        }
        out
    }

    fn entry(&self, id: NodeId) -> &Entry {
        &self.entries[id.index()]
    }
}

/// A handle to any entry of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl std::fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?}@{}..{}",
            self.kind(),
            self.position(),
            self.end_position()
        )
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}

impl<'t> SyntaxNode<'t> {
    fn entry(&self) -> &'t Entry {
        self.tree.entry(self.id)
    }

    /// The arena id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The tree this node belongs to.
    #[must_use]
    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    /// Kind discriminator.
    #[must_use]
    pub fn kind(&self) -> SyntaxKind {
        self.entry().kind
    }

    /// Node kind, or `None` for tokens.
    #[must_use]
    pub fn node_kind(&self) -> Option<NodeKind> {
        match self.kind() {
            SyntaxKind::Node(kind) => Some(kind),
            SyntaxKind::Token(_) => None,
        }
    }

    /// Whether this is a composite node of `kind`.
    #[must_use]
    pub fn is(&self, kind: NodeKind) -> bool {
        self.node_kind() == Some(kind)
    }

    /// This entry as a token, if it is one.
    #[must_use]
    pub fn as_token(&self) -> Option<SyntaxToken<'t>> {
        self.entry().token.as_ref().map(|_| SyntaxToken { node: *self })
    }

    /// Whether every token below this node was synthesized.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.entry().missing
    }

    /// Whether this node lies inside an `Unexpected` node (or is one).
    #[must_use]
    pub fn is_unexpected(&self) -> bool {
        self.entry().in_unexpected
    }

    /// Whether this node takes part in a traversal with `mode`.
    #[must_use]
    pub fn is_visible(&self, mode: ViewMode) -> bool {
        match mode {
            ViewMode::SourceAccurate => !self.is_missing(),
            ViewMode::FixedUp => !self.is_unexpected(),
            ViewMode::All => true,
        }
    }

    /// Parent node; `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<SyntaxNode<'t>> {
        self.entry().parent.map(|id| self.tree.node(id))
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode<'t>> {
        std::iter::successors(self.parent(), SyntaxNode::parent)
    }

    /// Direct children in order.
    pub fn children(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        let tree = self.tree;
        self.entry().children.iter().map(move |&id| tree.node(id))
    }

    /// Direct children that are composite nodes.
    pub fn child_nodes(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        self.children().filter(|c| c.node_kind().is_some())
    }

    /// Direct children that are tokens.
    pub fn child_tokens(&self) -> impl Iterator<Item = SyntaxToken<'t>> + 't {
        self.children().filter_map(|c| c.as_token())
    }

    /// First direct child node of `kind`.
    #[must_use]
    pub fn child_of_kind(&self, kind: NodeKind) -> Option<SyntaxNode<'t>> {
        self.children().find(|c| c.is(kind))
    }

    /// First direct child token of `kind`.
    #[must_use]
    pub fn token_of_kind(&self, kind: TokenKind) -> Option<SyntaxToken<'t>> {
        self.child_tokens().find(|t| t.kind() == kind)
    }

    /// Position of this node among its parent's children.
    #[must_use]
    pub fn index_in_parent(&self) -> usize {
        self.entry().index_in_parent
    }

    /// The following sibling, if any.
    #[must_use]
    pub fn next_sibling(&self) -> Option<SyntaxNode<'t>> {
        let parent = self.parent()?;
        parent
            .entry()
            .children
            .get(self.index_in_parent() + 1)
            .map(|&id| self.tree.node(id))
    }

    /// The preceding sibling, if any.
    #[must_use]
    pub fn previous_sibling(&self) -> Option<SyntaxNode<'t>> {
        let parent = self.parent()?;
        let index = self.index_in_parent().checked_sub(1)?;
        parent.entry().children.get(index).map(|&id| self.tree.node(id))
    }

    /// Pre-order descendants, this node included.
    pub fn descendants(&self) -> impl Iterator<Item = SyntaxNode<'t>> {
        let mut stack = vec![*self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.entry().children.iter().rev().map(|&id| node.tree.node(id)));
            Some(node)
        })
    }

    /// Tokens below this node in source order that participate in `mode`.
    pub fn tokens(&self, mode: ViewMode) -> impl Iterator<Item = SyntaxToken<'t>> {
        self.descendants()
            .filter_map(|n| n.as_token())
            .filter(move |t| t.node.is_visible(mode))
    }

    /// First token participating in `mode`.
    #[must_use]
    pub fn first_token(&self, mode: ViewMode) -> Option<SyntaxToken<'t>> {
        self.tokens(mode).next()
    }

    /// Last token participating in `mode`.
    #[must_use]
    pub fn last_token(&self, mode: ViewMode) -> Option<SyntaxToken<'t>> {
        self.tokens(mode).last()
    }

    /// Start position, leading trivia included.
    #[must_use]
    pub fn position(&self) -> AbsolutePosition {
        AbsolutePosition(self.entry().start)
    }

    /// End position, trailing trivia included.
    #[must_use]
    pub fn end_position(&self) -> AbsolutePosition {
        AbsolutePosition(self.entry().start + self.entry().len)
    }

    /// Start of the first real token's text.
    #[must_use]
    pub fn position_after_leading_trivia(&self) -> AbsolutePosition {
        self.first_token(ViewMode::SourceAccurate)
            .map_or(self.position(), |t| t.position_after_leading_trivia())
    }

    /// End of the last real token's text.
    #[must_use]
    pub fn end_position_before_trailing_trivia(&self) -> AbsolutePosition {
        self.last_token(ViewMode::SourceAccurate)
            .map_or(self.end_position(), |t| t.end_position_before_trailing_trivia())
    }

    /// Full range, trivia included.
    #[must_use]
    pub fn range(&self) -> ByteRange {
        ByteRange::new(self.position(), self.end_position())
    }

    /// Range without the leading trivia of the first token and the
    /// trailing trivia of the last.
    #[must_use]
    pub fn trimmed_range(&self) -> ByteRange {
        let start = self.position_after_leading_trivia();
        let end = self.end_position_before_trailing_trivia().max(start);
        ByteRange::new(start, end)
    }

    /// Leading trivia of the first real token.
    #[must_use]
    pub fn leading_trivia(&self) -> Option<&'t Trivia> {
        self.first_token(ViewMode::SourceAccurate)
            .map(|t| t.leading_trivia())
    }

    /// Trailing trivia of the last real token.
    #[must_use]
    pub fn trailing_trivia(&self) -> Option<&'t Trivia> {
        self.last_token(ViewMode::SourceAccurate)
            .map(|t| t.trailing_trivia())
    }

    /// Source text of this node, trivia included.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.entry().len);
        for token in self.tokens(ViewMode::SourceAccurate) {
            token.write_to(&mut out);
        }
        out
    }

    /// Source text without outer trivia.
    #[must_use]
    pub fn trimmed_text(&self) -> String {
        let mut out = String::new();
        let tokens: Vec<_> = self.tokens(ViewMode::SourceAccurate).collect();
        let last = tokens.len().saturating_sub(1);
        for (i, token) in tokens.iter().enumerate() {
            if i > 0 {
                token.leading_trivia().write_to(&mut out);
            }
            out.push_str(token.text());
            if i < last {
                token.trailing_trivia().write_to(&mut out);
            }
        }
        out
    }
}

/// A handle to a token entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxToken<'t> {
    node: SyntaxNode<'t>,
}

impl<'t> SyntaxToken<'t> {
    fn data(&self) -> &'t TokenData {
        // Constructed only for entries that carry token data.
        match &self.node.entry().token {
            Some(data) => data,
            None => unreachable!("SyntaxToken handle over a composite entry"),
        }
    }

    /// The token as a generic node handle.
    #[must_use]
    pub fn as_node(&self) -> SyntaxNode<'t> {
        self.node
    }

    /// Kind tag.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.data().kind
    }

    /// Source text; empty for missing tokens.
    #[must_use]
    pub fn text(&self) -> &'t str {
        match self.data().presence {
            Presence::Present => &self.data().text,
            Presence::Missing => "",
        }
    }

    /// The spelling the token has or was expected to have.
    #[must_use]
    pub fn expected_text(&self) -> &'t str {
        &self.data().text
    }

    /// Presence flag.
    #[must_use]
    pub fn presence(&self) -> Presence {
        self.data().presence
    }

    /// Whether the token was synthesized.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.presence() == Presence::Missing
    }

    /// Leading trivia.
    #[must_use]
    pub fn leading_trivia(&self) -> &'t Trivia {
        &self.data().leading
    }

    /// Trailing trivia.
    #[must_use]
    pub fn trailing_trivia(&self) -> &'t Trivia {
        &self.data().trailing
    }

    /// Parent node.
    #[must_use]
    pub fn parent(&self) -> Option<SyntaxNode<'t>> {
        self.node.parent()
    }

    /// Start position, leading trivia included.
    #[must_use]
    pub fn position(&self) -> AbsolutePosition {
        self.node.position()
    }

    /// Start of the token text.
    #[must_use]
    pub fn position_after_leading_trivia(&self) -> AbsolutePosition {
        self.position() + self.leading_trivia().len()
    }

    /// End of the token text.
    #[must_use]
    pub fn end_position_before_trailing_trivia(&self) -> AbsolutePosition {
        self.position_after_leading_trivia() + self.text().len()
    }

    /// End position, trailing trivia included.
    #[must_use]
    pub fn end_position(&self) -> AbsolutePosition {
        self.node.end_position()
    }

    /// The token text range.
    #[must_use]
    pub fn text_range(&self) -> ByteRange {
        ByteRange::new(
            self.position_after_leading_trivia(),
            self.end_position_before_trailing_trivia(),
        )
    }

    /// Next token in source order participating in `mode`.
    #[must_use]
    pub fn next_token(&self, mode: ViewMode) -> Option<SyntaxToken<'t>> {
        let tree = self.node.tree;
        let start = self.node.entry().token_index + 1;
        tree.token_order[start.min(tree.token_order.len())..]
            .iter()
            .map(|&id| SyntaxToken {
                node: tree.node(id),
            })
            .find(|t| t.node.is_visible(mode))
    }

    /// Previous token in source order participating in `mode`.
    #[must_use]
    pub fn previous_token(&self, mode: ViewMode) -> Option<SyntaxToken<'t>> {
        let tree = self.node.tree;
        let end = self.node.entry().token_index;
        tree.token_order[..end]
            .iter()
            .rev()
            .map(|&id| SyntaxToken {
                node: tree.node(id),
            })
            .find(|t| t.node.is_visible(mode))
    }

    fn write_to(&self, out: &mut String) {
        if self.is_missing() {
            return;
        }
        self.leading_trivia().write_to(out);
        out.push_str(self.text());
        self.trailing_trivia().write_to(out);
    }
}

/// Marker for wrapping already-built children in a new node.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint(usize);

struct Frame {
    kind: NodeKind,
    children: Vec<NodeId>,
    start: usize,
}

/// Bottom-up builder used by the parser.
#[derive(Default)]
pub struct TreeBuilder {
    entries: Vec<Entry>,
    stack: Vec<Frame>,
    offset: usize,
    root: Option<NodeId>,
}

impl TreeBuilder {
    /// An empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a composite node.
    pub fn start_node(&mut self, kind: NodeKind) {
        self.stack.push(Frame {
            kind,
            children: Vec::new(),
            start: self.offset,
        });
    }

    /// Bytes of source consumed so far.
    #[must_use]
    pub fn offset(&self) -> AbsolutePosition {
        AbsolutePosition(self.offset)
    }

    /// Records the current child count of the open node.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.stack.last().map_or(0, |f| f.children.len()))
    }

    /// Opens a node that adopts every child added since `checkpoint`.
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: NodeKind) {
        let (children, start) = match self.stack.last_mut() {
            Some(parent) => {
                let at = checkpoint.0.min(parent.children.len());
                let children = parent.children.split_off(at);
                let start = children
                    .first()
                    .map_or(self.offset, |&id| self.entries[id.index()].start);
                (children, start)
            }
            None => (Vec::new(), self.offset),
        };
        self.stack.push(Frame {
            kind,
            children,
            start,
        });
    }

    /// Appends a token to the open node.
    pub fn token(&mut self, data: TokenData) {
        let len = data.full_len();
        let missing = data.presence == Presence::Missing;
        let id = self.push_entry(Entry {
            kind: SyntaxKind::Token(data.kind),
            parent: None,
            index_in_parent: 0,
            children: Vec::new(),
            token: Some(data),
            start: self.offset,
            len,
            missing,
            in_unexpected: false,
            token_index: 0,
        });
        self.offset += len;
        self.attach(id);
    }

    /// Closes the innermost open node.
    pub fn finish_node(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let missing = !frame.children.is_empty()
            && frame
                .children
                .iter()
                .all(|&id| self.entries[id.index()].missing);
        let id = self.push_entry(Entry {
            kind: SyntaxKind::Node(frame.kind),
            parent: None,
            index_in_parent: 0,
            children: Vec::new(),
            token: None,
            start: frame.start,
            len: self.offset - frame.start,
            missing,
            in_unexpected: false,
            token_index: 0,
        });
        for (index, &child) in frame.children.iter().enumerate() {
            let entry = &mut self.entries[child.index()];
            entry.parent = Some(id);
            entry.index_in_parent = index;
        }
        self.entries[id.index()].children = frame.children;
        self.attach(id);
    }

    /// Closes any open nodes and produces the tree.
    #[must_use]
    pub fn finish(mut self) -> SyntaxTree {
        while !self.stack.is_empty() {
            self.finish_node();
        }
        let root = match self.root {
            Some(root) => root,
            None => {
                self.start_node(NodeKind::SourceFile);
                self.finish_node();
                self.root.unwrap_or(NodeId(0))
            }
        };

        let mut token_order = Vec::new();
        let mut stack = vec![(root, false)];
        while let Some((id, inherited)) = stack.pop() {
            let entry = &mut self.entries[id.index()];
            let unexpected = inherited || entry.kind == SyntaxKind::Node(NodeKind::Unexpected);
            entry.in_unexpected = unexpected;
            if entry.token.is_some() {
                entry.token_index = token_order.len();
                token_order.push(id);
            }
            stack.extend(entry.children.iter().rev().map(|&c| (c, unexpected)));
        }

        SyntaxTree {
            entries: self.entries,
            root,
            token_order,
        }
    }

    fn push_entry(&mut self, entry: Entry) -> NodeId {
        let id = NodeId(u32::try_from(self.entries.len()).unwrap_or(u32::MAX));
        self.entries.push(entry);
        id
    }

    fn attach(&mut self, id: NodeId) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(id),
            None => self.root = Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::trivia::TriviaPiece;

    fn spaces(n: usize) -> Trivia {
        Trivia::from_pieces([TriviaPiece::Spaces(n)])
    }

    /// Builds `foo (x)` by hand: call(ident, "(", ident, ")"), then EOF.
    fn sample() -> SyntaxTree {
        let mut b = TreeBuilder::new();
        b.start_node(NodeKind::SourceFile);
        let cp = b.checkpoint();
        b.start_node(NodeKind::IdentifierExpr);
        b.token(TokenData::new(TokenKind::Identifier, "foo", Trivia::new(), spaces(1)));
        b.finish_node();
        b.start_node_at(cp, NodeKind::FunctionCallExpr);
        b.token(TokenData::new(TokenKind::LeftParen, "(", Trivia::new(), Trivia::new()));
        b.start_node(NodeKind::IdentifierExpr);
        b.token(TokenData::new(TokenKind::Identifier, "x", Trivia::new(), Trivia::new()));
        b.finish_node();
        b.token(TokenData::missing(TokenKind::RightParen, ")"));
        b.finish_node();
        b.token(TokenData::new(TokenKind::EndOfFile, "", Trivia::new(), Trivia::new()));
        b.finish_node();
        b.finish()
    }

    #[test]
    fn positions_account_for_trivia() {
        let tree = sample();
        assert_eq!(tree.text(), "foo (x");
        let call = tree.root().child_of_kind(NodeKind::FunctionCallExpr).unwrap();
        assert_eq!(call.position(), AbsolutePosition(0));
        assert_eq!(call.end_position(), AbsolutePosition(6));
        let callee = call.child_of_kind(NodeKind::IdentifierExpr).unwrap();
        assert_eq!(callee.end_position_before_trailing_trivia(), AbsolutePosition(3));
        assert_eq!(callee.end_position(), AbsolutePosition(4));
    }

    #[test]
    fn missing_tokens_are_hidden_in_source_accurate_view() {
        let tree = sample();
        let accurate: Vec<_> = tree
            .tokens(ViewMode::SourceAccurate)
            .map(|t| t.expected_text())
            .collect();
        assert_eq!(accurate, vec!["foo", "(", "x", ""]);
        let fixed: Vec<_> = tree.tokens(ViewMode::FixedUp).map(|t| t.expected_text()).collect();
        assert_eq!(fixed, vec!["foo", "(", "x", ")", ""]);
    }

    #[test]
    fn sibling_navigation() {
        let tree = sample();
        let call = tree.root().child_of_kind(NodeKind::FunctionCallExpr).unwrap();
        let callee = call.children().next().unwrap();
        let paren = callee.next_sibling().unwrap();
        assert_eq!(paren.as_token().unwrap().kind(), TokenKind::LeftParen);
        assert_eq!(paren.previous_sibling(), Some(callee));
        assert_eq!(callee.parent(), Some(call));
        assert!(callee.previous_sibling().is_none());
    }

    #[test]
    fn token_neighbors_respect_view_mode() {
        let tree = sample();
        let x = tree
            .tokens(ViewMode::All)
            .find(|t| t.text() == "x")
            .unwrap();
        let next = x.next_token(ViewMode::SourceAccurate).unwrap();
        assert_eq!(next.kind(), TokenKind::EndOfFile);
        let next = x.next_token(ViewMode::FixedUp).unwrap();
        assert_eq!(next.kind(), TokenKind::RightParen);
        assert_eq!(
            next.previous_token(ViewMode::All).map(|t| t.text()),
            Some("x")
        );
    }
}
