//! Recovering recursive-descent parser.
//!
//! The parser never rejects a token stream. Tokens it cannot place are
//! wrapped in `Unexpected` nodes and tokens it needs but does not find are
//! inserted as zero-width missing placeholders, so the tree always spans
//! the whole input.
//!
//! The one structural limit is nesting depth: input nested deeper than
//! [`MAX_NESTING_DEPTH`] is rejected with a [`ParseFailure`].

use super::kind::{Keyword, NodeKind, TokenKind};
use super::tree::{Checkpoint, SyntaxNode, SyntaxTree, TokenData, TreeBuilder};
use crate::error::ParseFailure;
use crate::position::AbsolutePosition;

/// Deepest node nesting below the source file node that a tree may have.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Builds a tree from a token stream ending in `EndOfFile`.
pub fn parse_tokens(tokens: Vec<TokenData>) -> Result<SyntaxTree, ParseFailure> {
    let mut parser = Parser::new(tokens);
    parser.source_file();
    if let Some(position) = parser.too_deep {
        return Err(nesting_failure(position));
    }
    let tree = parser.builder.finish();
    // Postfix chains nest by wrapping, without recursion in the parser.
    if let Some(node) = beyond_nesting_limit(&tree) {
        return Err(nesting_failure(node.position()));
    }
    Ok(tree)
}

fn nesting_failure(position: AbsolutePosition) -> ParseFailure {
    ParseFailure::new(
        format!("nesting exceeds {MAX_NESTING_DEPTH} levels"),
        position,
    )
}

fn beyond_nesting_limit(tree: &SyntaxTree) -> Option<SyntaxNode<'_>> {
    let mut stack = vec![(tree.root(), 0)];
    while let Some((node, depth)) = stack.pop() {
        if depth > MAX_NESTING_DEPTH {
            return Some(node);
        }
        stack.extend(node.child_nodes().map(|child| (child, depth + 1)));
    }
    None
}

struct Parser {
    kinds: Vec<TokenKind>,
    tokens: Vec<Option<TokenData>>,
    pos: usize,
    /// Whether the previously consumed token had trailing trivia.
    prev_trailing: bool,
    builder: TreeBuilder,
    depth: usize,
    /// Set once nesting passes the limit; the rest of the input reads as ended.
    too_deep: Option<AbsolutePosition>,
}

impl Parser {
    fn new(tokens: Vec<TokenData>) -> Self {
        Self {
            kinds: tokens.iter().map(|t| t.kind).collect(),
            tokens: tokens.into_iter().map(Some).collect(),
            pos: 0,
            prev_trailing: false,
            builder: TreeBuilder::new(),
            depth: 0,
            too_deep: None,
        }
    }

    // ---- token cursor ----

    fn nth(&self, n: usize) -> TokenKind {
        if self.too_deep.is_some() {
            return TokenKind::EndOfFile;
        }
        self.kinds
            .get(self.pos + n)
            .copied()
            .unwrap_or(TokenKind::EndOfFile)
    }

    fn current(&self) -> TokenKind {
        self.nth(0)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        self.current().is_keyword(keyword)
    }

    fn at_eof(&self) -> bool {
        self.at(TokenKind::EndOfFile)
    }

    fn current_text(&self) -> &str {
        self.tokens
            .get(self.pos)
            .and_then(Option::as_ref)
            .map_or("", |t| t.text.as_str())
    }

    /// Whether a line break separates the current token from the previous one.
    fn newline_before(&self) -> bool {
        self.tokens
            .get(self.pos)
            .and_then(Option::as_ref)
            .is_some_and(|t| t.leading.contains_newlines())
    }

    /// Whether the current token touches the previous one.
    fn attached(&self) -> bool {
        !self.prev_trailing
            && self
                .tokens
                .get(self.pos)
                .and_then(Option::as_ref)
                .is_some_and(|t| t.leading.is_empty())
    }

    fn bump(&mut self) {
        if self.at_eof() {
            return;
        }
        if let Some(token) = self.tokens.get_mut(self.pos).and_then(Option::take) {
            self.prev_trailing = !token.trailing.is_empty();
            self.builder.token(token);
        }
        self.pos += 1;
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, text: &str) {
        if !self.eat(kind) {
            self.missing(kind, text);
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword, text: &str) {
        self.expect(TokenKind::Keyword(keyword), text);
    }

    fn missing(&mut self, kind: TokenKind, text: &str) {
        self.builder.token(TokenData::missing(kind, text));
    }

    /// Consumes a name: an identifier, or a keyword used as one.
    fn name(&mut self) {
        if matches!(self.current(), TokenKind::Identifier | TokenKind::Keyword(_)) {
            self.bump();
        } else {
            self.missing(TokenKind::Identifier, "<#identifier#>");
        }
    }

    fn node(&mut self, kind: NodeKind, f: impl FnOnce(&mut Self)) {
        self.builder.start_node(kind);
        self.nested(f);
        self.builder.finish_node();
    }

    fn wrap(&mut self, at: Checkpoint, kind: NodeKind, f: impl FnOnce(&mut Self)) {
        self.builder.start_node_at(at, kind);
        self.nested(f);
        self.builder.finish_node();
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        if self.depth >= MAX_NESTING_DEPTH {
            if self.too_deep.is_none() {
                self.too_deep = Some(self.builder.offset());
            }
            return;
        }
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn unexpected_token(&mut self) {
        self.node(NodeKind::Unexpected, Self::bump);
    }

    // ---- items ----

    fn source_file(&mut self) {
        self.builder.start_node(NodeKind::SourceFile);
        self.statements(TokenKind::EndOfFile);
        // A stray `}` at top level cannot close anything.
        while !self.at_eof() {
            self.unexpected_token();
            self.statements(TokenKind::EndOfFile);
        }
        if let Some(eof) = self.tokens.get_mut(self.pos).and_then(Option::take) {
            self.builder.token(eof);
        }
        self.builder.finish_node();
    }

    fn statements(&mut self, terminator: TokenKind) {
        while !self.at(terminator) && !self.at_eof() {
            if self.at(TokenKind::RightBrace) {
                return;
            }
            let before = self.pos;
            self.statement();
            if self.pos == before {
                self.unexpected_token();
            }
        }
    }

    fn statement(&mut self) {
        match self.current() {
            TokenKind::Semicolon => self.bump(),
            TokenKind::At => self.declaration(),
            TokenKind::Keyword(k) if k.is_modifier() => self.declaration(),
            TokenKind::Keyword(
                Keyword::Import
                | Keyword::Func
                | Keyword::Init
                | Keyword::Class
                | Keyword::Struct
                | Keyword::Enum
                | Keyword::Protocol
                | Keyword::Extension
                | Keyword::Let
                | Keyword::Var
                | Keyword::Case,
            ) => self.declaration(),
            TokenKind::Keyword(Keyword::Return) => self.node(NodeKind::ReturnStmt, |p| {
                p.bump();
                if !p.newline_before()
                    && !matches!(
                        p.current(),
                        TokenKind::RightBrace | TokenKind::Semicolon | TokenKind::EndOfFile
                    )
                {
                    p.expr(true);
                }
            }),
            TokenKind::Keyword(Keyword::If) => self.if_stmt(),
            TokenKind::Keyword(Keyword::Guard) => self.node(NodeKind::GuardStmt, |p| {
                p.bump();
                p.conditions();
                p.expect_keyword(Keyword::Else, "else");
                p.code_block();
            }),
            TokenKind::Keyword(Keyword::For) => self.node(NodeKind::ForStmt, |p| {
                p.bump();
                p.eat(TokenKind::Keyword(Keyword::Case));
                p.postfix_expr(false);
                p.expect_keyword(Keyword::In, "in");
                p.expr(false);
                p.code_block();
            }),
            TokenKind::Keyword(Keyword::While) => self.node(NodeKind::WhileStmt, |p| {
                p.bump();
                p.conditions();
                p.code_block();
            }),
            _ if self.starts_expression() => {
                self.node(NodeKind::ExpressionStmt, |p| p.expr(true));
            }
            _ => {}
        }
    }

    fn starts_expression(&self) -> bool {
        match self.current() {
            TokenKind::Identifier
            | TokenKind::IntegerLiteral
            | TokenKind::FloatLiteral
            | TokenKind::StringLiteral
            | TokenKind::LeftParen
            | TokenKind::LeftBracket
            | TokenKind::LeftBrace
            | TokenKind::Period
            | TokenKind::Exclamation
            | TokenKind::Operator => true,
            TokenKind::Keyword(k) => matches!(
                k,
                Keyword::SelfValue
                    | Keyword::Super
                    | Keyword::True
                    | Keyword::False
                    | Keyword::Nil
                    | Keyword::Try
                    | Keyword::Await
                    | Keyword::Init
            ),
            _ => false,
        }
    }

    fn if_stmt(&mut self) {
        self.node(NodeKind::IfStmt, |p| {
            p.bump();
            p.conditions();
            p.code_block();
            if p.eat(TokenKind::Keyword(Keyword::Else)) {
                if p.at_keyword(Keyword::If) {
                    p.if_stmt();
                } else {
                    p.code_block();
                }
            }
        });
    }

    fn conditions(&mut self) {
        loop {
            if matches!(
                self.current(),
                TokenKind::Keyword(Keyword::Let | Keyword::Var | Keyword::Case)
            ) {
                self.node(NodeKind::PatternBinding, |p| {
                    p.bump();
                    p.pattern();
                    if p.at(TokenKind::Colon) {
                        p.type_annotation();
                    }
                    if p.at(TokenKind::Equal) {
                        p.node(NodeKind::Initializer, |p| {
                            p.bump();
                            p.expr(false);
                        });
                    }
                });
            } else {
                self.expr(false);
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
    }

    fn code_block(&mut self) {
        self.node(NodeKind::CodeBlock, |p| {
            p.expect(TokenKind::LeftBrace, "{");
            p.statements(TokenKind::RightBrace);
            p.expect(TokenKind::RightBrace, "}");
        });
    }

    // ---- declarations ----

    fn declaration(&mut self) {
        let start = self.builder.checkpoint();
        while self.at(TokenKind::At) {
            self.attribute();
        }
        if self.at_modifier() {
            self.node(NodeKind::ModifierList, |p| {
                while p.at_modifier() {
                    p.bump();
                    if p.at(TokenKind::LeftParen) && p.attached() {
                        // `private(set)`
                        p.balanced(TokenKind::LeftParen, TokenKind::RightParen);
                    }
                }
            });
        }
        let TokenKind::Keyword(keyword) = self.current() else {
            self.wrap(start, NodeKind::Unexpected, |_| {});
            return;
        };
        match keyword {
            Keyword::Import => self.wrap(start, NodeKind::ImportDecl, |p| {
                p.bump();
                if matches!(
                    p.current(),
                    TokenKind::Keyword(
                        Keyword::Class
                            | Keyword::Struct
                            | Keyword::Enum
                            | Keyword::Protocol
                            | Keyword::Func
                            | Keyword::Var
                            | Keyword::Let
                    )
                ) {
                    p.bump();
                }
                p.name();
                while p.at(TokenKind::Period) {
                    p.bump();
                    p.name();
                }
            }),
            Keyword::Func => self.wrap(start, NodeKind::FunctionDecl, |p| {
                p.bump();
                match p.current() {
                    TokenKind::Identifier
                    | TokenKind::Keyword(_)
                    | TokenKind::Operator
                    | TokenKind::Exclamation
                    | TokenKind::Question => p.bump(),
                    _ => p.missing(TokenKind::Identifier, "<#identifier#>"),
                }
                p.function_signature();
                if p.at(TokenKind::LeftBrace) {
                    p.code_block();
                }
            }),
            Keyword::Init => self.wrap(start, NodeKind::InitializerDecl, |p| {
                p.bump();
                if p.attached()
                    && matches!(p.current(), TokenKind::Question | TokenKind::Exclamation)
                {
                    p.bump();
                }
                p.function_signature();
                if p.at(TokenKind::LeftBrace) {
                    p.code_block();
                }
            }),
            Keyword::Class
            | Keyword::Struct
            | Keyword::Enum
            | Keyword::Protocol
            | Keyword::Extension => {
                let kind = match keyword {
                    Keyword::Class => NodeKind::ClassDecl,
                    Keyword::Struct => NodeKind::StructDecl,
                    Keyword::Enum => NodeKind::EnumDecl,
                    Keyword::Protocol => NodeKind::ProtocolDecl,
                    _ => NodeKind::ExtensionDecl,
                };
                self.wrap(start, kind, |p| {
                    p.bump();
                    if kind == NodeKind::ExtensionDecl {
                        p.type_();
                    } else {
                        p.name();
                        p.generic_parameter_clause();
                    }
                    if p.at(TokenKind::Colon) {
                        p.node(NodeKind::InheritanceClause, |p| {
                            p.bump();
                            p.type_();
                            while p.eat(TokenKind::Comma) {
                                p.type_();
                            }
                        });
                    }
                    p.member_block();
                });
            }
            Keyword::Let | Keyword::Var => self.wrap(start, NodeKind::VariableDecl, |p| {
                p.bump();
                loop {
                    p.pattern_binding();
                    if !p.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }),
            Keyword::Case => self.wrap(start, NodeKind::EnumCaseDecl, |p| {
                p.bump();
                loop {
                    p.name();
                    if p.at(TokenKind::LeftParen) {
                        p.parameter_clause();
                    }
                    if p.at(TokenKind::Equal) {
                        p.node(NodeKind::Initializer, |p| {
                            p.bump();
                            p.expr(true);
                        });
                    }
                    if !p.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }),
            _ => self.wrap(start, NodeKind::Unexpected, |_| {}),
        }
    }

    fn at_modifier(&self) -> bool {
        match self.current() {
            TokenKind::Keyword(k) if k.is_modifier() => true,
            // `class func`, `class var`
            TokenKind::Keyword(Keyword::Class) => matches!(
                self.nth(1),
                TokenKind::Keyword(
                    Keyword::Func | Keyword::Var | Keyword::Let | Keyword::Override | Keyword::Final
                )
            ),
            _ => false,
        }
    }

    fn attribute(&mut self) {
        self.node(NodeKind::Attribute, |p| {
            p.bump();
            p.name();
            if p.at(TokenKind::LeftParen) && p.attached() {
                p.balanced(TokenKind::LeftParen, TokenKind::RightParen);
            }
        });
    }

    /// Consumes a bracketed token run verbatim.
    fn balanced(&mut self, open: TokenKind, close: TokenKind) {
        let mut depth = 0usize;
        loop {
            let kind = self.current();
            if kind == TokenKind::EndOfFile {
                self.missing(close, ")");
                return;
            }
            self.bump();
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return;
                }
            }
        }
    }

    fn function_signature(&mut self) {
        self.generic_parameter_clause();
        self.parameter_clause();
        while matches!(
            self.current(),
            TokenKind::Keyword(Keyword::Async | Keyword::Throws | Keyword::Rethrows)
        ) {
            self.bump();
        }
        if self.at(TokenKind::Arrow) {
            self.node(NodeKind::ReturnClause, |p| {
                p.bump();
                p.type_();
            });
        }
    }

    fn generic_parameter_clause(&mut self) {
        if !(self.at(TokenKind::Operator) && self.current_text() == "<") {
            return;
        }
        self.node(NodeKind::GenericParameterClause, |p| {
            p.bump();
            loop {
                p.name();
                if p.at(TokenKind::Colon) {
                    p.bump();
                    p.type_();
                }
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            p.expect_closing_angle();
        });
    }

    fn expect_closing_angle(&mut self) {
        if self.at(TokenKind::Operator) && self.current_text() == ">" {
            self.bump();
        } else {
            self.missing(TokenKind::Operator, ">");
        }
    }

    fn parameter_clause(&mut self) {
        self.node(NodeKind::ParameterClause, |p| {
            p.expect(TokenKind::LeftParen, "(");
            while !p.at(TokenKind::RightParen) && !p.at_eof() {
                let before = p.pos;
                p.parameter();
                if p.pos == before {
                    break;
                }
            }
            p.expect(TokenKind::RightParen, ")");
        });
    }

    fn parameter(&mut self) {
        let is_name = |k: TokenKind| matches!(k, TokenKind::Identifier | TokenKind::Keyword(_));
        self.node(NodeKind::Parameter, |p| {
            let labeled = (is_name(p.nth(0)) && p.nth(1) == TokenKind::Colon)
                || (is_name(p.nth(0)) && is_name(p.nth(1)) && p.nth(2) == TokenKind::Colon);
            if labeled {
                while is_name(p.current()) {
                    p.bump();
                }
                p.bump();
            }
            p.type_();
            if p.at(TokenKind::Operator) && p.current_text() == "..." {
                p.bump();
            }
            if p.at(TokenKind::Equal) {
                p.node(NodeKind::Initializer, |p| {
                    p.bump();
                    p.expr(true);
                });
            }
            p.eat(TokenKind::Comma);
        });
    }

    fn pattern_binding(&mut self) {
        self.node(NodeKind::PatternBinding, |p| {
            p.pattern();
            let typed = p.at(TokenKind::Colon);
            if typed {
                p.type_annotation();
            }
            if p.at(TokenKind::Equal) {
                p.node(NodeKind::Initializer, |p| {
                    p.bump();
                    p.expr(true);
                });
            }
            if typed && p.at(TokenKind::LeftBrace) && !p.newline_before() {
                p.node(NodeKind::AccessorBlock, |p| {
                    p.bump();
                    p.statements(TokenKind::RightBrace);
                    p.expect(TokenKind::RightBrace, "}");
                });
            }
        });
    }

    fn pattern(&mut self) {
        if self.at(TokenKind::LeftParen) {
            self.primary(false);
        } else {
            self.name();
        }
    }

    fn type_annotation(&mut self) {
        self.node(NodeKind::TypeAnnotation, |p| {
            p.bump();
            p.type_();
        });
    }

    fn member_block(&mut self) {
        self.node(NodeKind::MemberBlock, |p| {
            p.expect(TokenKind::LeftBrace, "{");
            p.statements(TokenKind::RightBrace);
            p.expect(TokenKind::RightBrace, "}");
        });
    }

    // ---- types ----

    fn type_(&mut self) {
        let start = self.builder.checkpoint();
        while self.at(TokenKind::At) {
            self.attribute();
        }
        match self.current() {
            TokenKind::LeftParen => {
                self.node(NodeKind::TupleType, |p| {
                    p.bump();
                    while !p.at(TokenKind::RightParen) && !p.at_eof() {
                        let before = p.pos;
                        p.parameter();
                        if p.pos == before {
                            break;
                        }
                    }
                    p.expect(TokenKind::RightParen, ")");
                });
                if matches!(
                    self.current(),
                    TokenKind::Arrow | TokenKind::Keyword(Keyword::Async | Keyword::Throws)
                ) {
                    self.wrap(start, NodeKind::FunctionType, |p| {
                        while p.eat(TokenKind::Keyword(Keyword::Async))
                            || p.eat(TokenKind::Keyword(Keyword::Throws))
                        {}
                        p.expect(TokenKind::Arrow, "->");
                        p.type_();
                    });
                }
            }
            TokenKind::LeftBracket => self.node(NodeKind::ArrayType, |p| {
                p.bump();
                p.type_();
                if p.eat(TokenKind::Colon) {
                    p.type_();
                }
                p.expect(TokenKind::RightBracket, "]");
            }),
            _ => self.node(NodeKind::IdentifierType, |p| {
                while p.at(TokenKind::Identifier)
                    && matches!(p.current_text(), "inout" | "some" | "any")
                    && p.nth(1) == TokenKind::Identifier
                {
                    p.bump();
                }
                loop {
                    p.name();
                    if p.at(TokenKind::Operator) && p.current_text() == "<" && p.attached() {
                        p.bump();
                        loop {
                            p.type_();
                            if !p.eat(TokenKind::Comma) {
                                break;
                            }
                        }
                        p.expect_closing_angle();
                    }
                    if !(p.at(TokenKind::Period) && p.attached()) {
                        break;
                    }
                    p.bump();
                }
            }),
        }
        while matches!(self.current(), TokenKind::Question | TokenKind::Exclamation)
            && self.attached()
        {
            self.wrap(start, NodeKind::OptionalType, Self::bump);
        }
    }

    // ---- expressions ----

    fn expr(&mut self, allow_closure: bool) {
        let start = self.builder.checkpoint();
        self.prefix_expr(allow_closure);
        if !self.at_binary_operator() {
            return;
        }
        self.wrap(start, NodeKind::SequenceExpr, |p| {
            while p.at_binary_operator() {
                if p.at(TokenKind::Question) {
                    p.bump();
                    p.prefix_expr(allow_closure);
                    p.expect(TokenKind::Colon, ":");
                } else {
                    p.bump();
                }
                p.prefix_expr(allow_closure);
            }
        });
    }

    fn at_binary_operator(&self) -> bool {
        match self.current() {
            TokenKind::Operator | TokenKind::Equal | TokenKind::Arrow => true,
            TokenKind::Question => !self.attached(),
            _ => false,
        }
    }

    fn prefix_expr(&mut self, allow_closure: bool) {
        match self.current() {
            TokenKind::Operator | TokenKind::Exclamation => self.node(NodeKind::PrefixExpr, |p| {
                p.bump();
                p.prefix_expr(allow_closure);
            }),
            TokenKind::Keyword(Keyword::Try | Keyword::Await) => {
                self.node(NodeKind::PrefixExpr, |p| {
                    p.bump();
                    if p.attached()
                        && matches!(p.current(), TokenKind::Question | TokenKind::Exclamation)
                    {
                        p.bump();
                    }
                    p.prefix_expr(allow_closure);
                });
            }
            _ => self.postfix_expr(allow_closure),
        }
    }

    fn postfix_expr(&mut self, allow_closure: bool) {
        let start = self.builder.checkpoint();
        self.primary(allow_closure);
        loop {
            match self.current() {
                TokenKind::LeftParen if !self.newline_before() => {
                    self.wrap(start, NodeKind::FunctionCallExpr, |p| {
                        p.bump();
                        p.argument_list(TokenKind::RightParen);
                        p.expect(TokenKind::RightParen, ")");
                    });
                }
                TokenKind::LeftBracket if !self.newline_before() => {
                    self.wrap(start, NodeKind::SubscriptExpr, |p| {
                        p.bump();
                        p.argument_list(TokenKind::RightBracket);
                        p.expect(TokenKind::RightBracket, "]");
                    });
                }
                TokenKind::LeftBrace if allow_closure && !self.newline_before() => {
                    self.wrap(start, NodeKind::FunctionCallExpr, Self::closure);
                }
                TokenKind::Period => self.wrap(start, NodeKind::MemberAccessExpr, |p| {
                    p.bump();
                    if p.at(TokenKind::IntegerLiteral) {
                        p.bump();
                    } else {
                        p.name();
                    }
                }),
                TokenKind::Question | TokenKind::Exclamation if self.attached() => {
                    self.wrap(start, NodeKind::PostfixExpr, Self::bump);
                }
                _ => break,
            }
        }
    }

    fn primary(&mut self, allow_closure: bool) {
        match self.current() {
            TokenKind::Identifier
            | TokenKind::Keyword(Keyword::SelfValue | Keyword::Super | Keyword::Init) => {
                self.node(NodeKind::IdentifierExpr, Self::bump);
            }
            TokenKind::IntegerLiteral
            | TokenKind::FloatLiteral
            | TokenKind::Keyword(Keyword::True | Keyword::False | Keyword::Nil) => {
                self.node(NodeKind::LiteralExpr, Self::bump);
            }
            TokenKind::StringLiteral => self.node(NodeKind::StringLiteralExpr, Self::bump),
            TokenKind::LeftParen => self.node(NodeKind::TupleExpr, |p| {
                p.bump();
                p.argument_list(TokenKind::RightParen);
                p.expect(TokenKind::RightParen, ")");
            }),
            TokenKind::LeftBracket => self.node(NodeKind::ArrayExpr, |p| {
                p.bump();
                while !p.at(TokenKind::RightBracket) && !p.at_eof() {
                    let before = p.pos;
                    p.expr(true);
                    if p.eat(TokenKind::Colon) {
                        p.expr(true);
                    }
                    p.eat(TokenKind::Comma);
                    if p.pos == before {
                        break;
                    }
                }
                p.expect(TokenKind::RightBracket, "]");
            }),
            TokenKind::LeftBrace if allow_closure => self.closure(),
            TokenKind::Period => self.node(NodeKind::MemberAccessExpr, |p| {
                p.bump();
                p.name();
            }),
            _ => self.node(NodeKind::IdentifierExpr, |p| {
                p.missing(TokenKind::Identifier, "<#expression#>");
            }),
        }
    }

    fn closure(&mut self) {
        self.node(NodeKind::ClosureExpr, |p| {
            p.bump();
            if p.closure_has_signature() {
                p.node(NodeKind::ParameterClause, |p| {
                    while !p.at_keyword(Keyword::In) && !p.at_eof() {
                        p.bump();
                    }
                    p.bump();
                });
            }
            p.statements(TokenKind::RightBrace);
            p.expect(TokenKind::RightBrace, "}");
        });
    }

    /// Looks ahead from just inside `{` for an `in` that ends a closure signature.
    fn closure_has_signature(&self) -> bool {
        let mut depth = 0usize;
        for &kind in self.kinds.get(self.pos..).unwrap_or_default() {
            match kind {
                TokenKind::EndOfFile => return false,
                TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => depth += 1,
                TokenKind::RightParen | TokenKind::RightBracket => depth = depth.saturating_sub(1),
                TokenKind::RightBrace => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                }
                TokenKind::Keyword(Keyword::In) if depth == 0 => return true,
                TokenKind::Keyword(
                    Keyword::For
                    | Keyword::Let
                    | Keyword::Var
                    | Keyword::Func
                    | Keyword::Return
                    | Keyword::If
                    | Keyword::Guard
                    | Keyword::While,
                ) if depth == 0 => return false,
                _ => {}
            }
        }
        false
    }

    fn argument_list(&mut self, close: TokenKind) {
        self.node(NodeKind::ArgumentList, |p| {
            while !p.at(close) && !p.at_eof() {
                let before = p.pos;
                p.node(NodeKind::Argument, |p| {
                    if matches!(p.current(), TokenKind::Identifier | TokenKind::Keyword(_))
                        && p.nth(1) == TokenKind::Colon
                    {
                        p.bump();
                        p.bump();
                    }
                    p.expr(true);
                    p.eat(TokenKind::Comma);
                });
                if p.pos == before {
                    break;
                }
            }
        });
    }
}
