//! Typed views over composite nodes.
//!
//! Each node kind has a wrapper that only exists for nodes of that kind.
//! Wrappers for the kinds rules inspect carry named accessors for their
//! optional children.

use super::kind::{Keyword, NodeKind, TokenKind};
use super::tree::{SyntaxNode, SyntaxToken, ViewMode};

/// A typed view over a [`SyntaxNode`].
pub trait AstNode<'t>: Sized + Copy {
    /// The node kind this view wraps.
    const KIND: NodeKind;

    /// Wraps `node` if it has the right kind.
    fn cast(node: SyntaxNode<'t>) -> Option<Self>;

    /// The underlying untyped node.
    fn syntax(&self) -> SyntaxNode<'t>;
}

macro_rules! ast_nodes {
    ($($name:ident),* $(,)?) => {
        $(
            #[doc = concat!("A `", stringify!($name), "` node.")]
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name<'t>(SyntaxNode<'t>);

            impl<'t> $name<'t> {
                pub(crate) fn new_unchecked(node: SyntaxNode<'t>) -> Self {
                    debug_assert!(node.is(NodeKind::$name));
                    Self(node)
                }
            }

            impl<'t> AstNode<'t> for $name<'t> {
                const KIND: NodeKind = NodeKind::$name;

                fn cast(node: SyntaxNode<'t>) -> Option<Self> {
                    node.is(NodeKind::$name).then_some(Self(node))
                }

                fn syntax(&self) -> SyntaxNode<'t> {
                    self.0
                }
            }
        )*
    };
}

ast_nodes! {
    SourceFile, CodeBlock, MemberBlock, ImportDecl, FunctionDecl, InitializerDecl,
    ClassDecl, StructDecl, EnumDecl, ProtocolDecl, ExtensionDecl, VariableDecl,
    EnumCaseDecl, ModifierList, Attribute, GenericParameterClause, InheritanceClause,
    ParameterClause, Parameter, ReturnClause, TypeAnnotation, PatternBinding,
    Initializer, AccessorBlock, IdentifierType, OptionalType, ArrayType, TupleType,
    FunctionType, ReturnStmt, IfStmt, GuardStmt, ForStmt, WhileStmt, ExpressionStmt,
    IdentifierExpr, LiteralExpr, StringLiteralExpr, MemberAccessExpr, FunctionCallExpr,
    ArgumentList, Argument, SubscriptExpr, ClosureExpr, TupleExpr, ArrayExpr,
    PrefixExpr, PostfixExpr, SequenceExpr, Unexpected,
}

fn is_name(token: &SyntaxToken<'_>) -> bool {
    matches!(token.kind(), TokenKind::Identifier | TokenKind::Keyword(_))
}

impl<'t> FunctionCallExpr<'t> {
    /// The expression being called.
    #[must_use]
    pub fn called_expression(&self) -> Option<SyntaxNode<'t>> {
        self.0.children().next().filter(|c| c.node_kind().is_some())
    }

    /// The opening parenthesis; absent for a bare trailing closure call.
    #[must_use]
    pub fn left_paren(&self) -> Option<SyntaxToken<'t>> {
        self.0.token_of_kind(TokenKind::LeftParen)
    }

    /// The closing parenthesis.
    #[must_use]
    pub fn right_paren(&self) -> Option<SyntaxToken<'t>> {
        self.0.token_of_kind(TokenKind::RightParen)
    }

    /// The argument list between the parentheses.
    #[must_use]
    pub fn arguments(&self) -> Option<ArgumentList<'t>> {
        self.0
            .child_of_kind(NodeKind::ArgumentList)
            .map(ArgumentList::new_unchecked)
    }

    /// A trailing closure.
    #[must_use]
    pub fn trailing_closure(&self) -> Option<ClosureExpr<'t>> {
        self.0
            .child_of_kind(NodeKind::ClosureExpr)
            .map(ClosureExpr::new_unchecked)
    }
}

impl<'t> ArgumentList<'t> {
    /// The arguments in order.
    pub fn arguments(&self) -> impl Iterator<Item = Argument<'t>> {
        self.0.child_nodes().filter_map(Argument::cast)
    }
}

impl<'t> Argument<'t> {
    /// The `label:` colon, when the argument is labeled.
    #[must_use]
    pub fn colon(&self) -> Option<SyntaxToken<'t>> {
        self.0.token_of_kind(TokenKind::Colon)
    }

    /// The label token.
    #[must_use]
    pub fn label(&self) -> Option<SyntaxToken<'t>> {
        self.colon()?;
        self.0.child_tokens().next().filter(is_name)
    }
}

impl<'t> MemberAccessExpr<'t> {
    /// The base expression; absent for implicit member expressions (`.foo`).
    #[must_use]
    pub fn base(&self) -> Option<SyntaxNode<'t>> {
        self.0.children().next().filter(|c| c.node_kind().is_some())
    }

    /// The `.` token.
    #[must_use]
    pub fn period(&self) -> Option<SyntaxToken<'t>> {
        self.0.token_of_kind(TokenKind::Period)
    }

    /// The member name.
    #[must_use]
    pub fn name(&self) -> Option<SyntaxToken<'t>> {
        self.0
            .child_tokens()
            .find(|t| t.kind() != TokenKind::Period)
    }
}

impl<'t> ImportDecl<'t> {
    /// The `import` keyword.
    #[must_use]
    pub fn import_keyword(&self) -> Option<SyntaxToken<'t>> {
        self.0.token_of_kind(TokenKind::Keyword(Keyword::Import))
    }

    /// The dotted module path, e.g. `Foundation.NSString`.
    #[must_use]
    pub fn path(&self) -> String {
        let mut path = String::new();
        let mut seen_import = false;
        for token in self.0.child_tokens() {
            if token.is_missing() {
                continue;
            }
            match token.kind() {
                TokenKind::Keyword(Keyword::Import) => seen_import = true,
                TokenKind::Period if seen_import => path.push('.'),
                TokenKind::Identifier if seen_import => path.push_str(token.text()),
                _ => {}
            }
        }
        path
    }

    /// Attributes such as `@testable`.
    pub fn attributes(&self) -> impl Iterator<Item = Attribute<'t>> {
        self.0.child_nodes().filter_map(Attribute::cast)
    }
}

impl<'t> Attribute<'t> {
    /// The attribute name without `@`.
    #[must_use]
    pub fn name(&self) -> Option<SyntaxToken<'t>> {
        self.0.child_tokens().find(is_name)
    }
}

impl<'t> ModifierList<'t> {
    /// The modifier keywords.
    pub fn keywords(&self) -> impl Iterator<Item = Keyword> + 't {
        self.0.child_tokens().filter_map(|t| match t.kind() {
            TokenKind::Keyword(k) => Some(k),
            _ => None,
        })
    }
}

/// Shared accessors for declarations.
pub trait DeclSyntax<'t>: AstNode<'t> {
    /// Declaration modifiers.
    fn modifiers(&self) -> Option<ModifierList<'t>> {
        self.syntax()
            .child_of_kind(NodeKind::ModifierList)
            .map(ModifierList::new_unchecked)
    }

    /// Whether `keyword` is among the modifiers.
    fn has_modifier(&self, keyword: Keyword) -> bool {
        self.modifiers()
            .is_some_and(|m| m.keywords().any(|k| k == keyword))
    }
}

macro_rules! named_decls {
    ($($name:ident => $keyword:ident),* $(,)?) => {
        $(
            impl<'t> DeclSyntax<'t> for $name<'t> {}

            impl<'t> $name<'t> {
                /// The introducing keyword.
                #[must_use]
                pub fn keyword(&self) -> Option<SyntaxToken<'t>> {
                    self.0.token_of_kind(TokenKind::Keyword(Keyword::$keyword))
                }

                /// The declared name: the first name token after the keyword.
                #[must_use]
                pub fn name(&self) -> Option<SyntaxToken<'t>> {
                    self.0
                        .child_tokens()
                        .skip_while(|t| t.kind() != TokenKind::Keyword(Keyword::$keyword))
                        .nth(1)
                }
            }
        )*
    };
}

named_decls! {
    FunctionDecl => Func,
    ClassDecl => Class,
    StructDecl => Struct,
    EnumDecl => Enum,
    ProtocolDecl => Protocol,
}

impl<'t> DeclSyntax<'t> for VariableDecl<'t> {}
impl<'t> DeclSyntax<'t> for InitializerDecl<'t> {}
impl<'t> DeclSyntax<'t> for ExtensionDecl<'t> {}
impl<'t> DeclSyntax<'t> for EnumCaseDecl<'t> {}
impl<'t> DeclSyntax<'t> for ImportDecl<'t> {}

impl<'t> FunctionDecl<'t> {
    /// The parameter clause.
    #[must_use]
    pub fn parameters(&self) -> Option<ParameterClause<'t>> {
        self.0
            .child_of_kind(NodeKind::ParameterClause)
            .map(ParameterClause::new_unchecked)
    }

    /// The body; protocol requirements have none.
    #[must_use]
    pub fn body(&self) -> Option<CodeBlock<'t>> {
        self.0
            .child_of_kind(NodeKind::CodeBlock)
            .map(CodeBlock::new_unchecked)
    }
}

impl<'t> ParameterClause<'t> {
    /// The parameters in order.
    pub fn parameters(&self) -> impl Iterator<Item = Parameter<'t>> {
        self.0.child_nodes().filter_map(Parameter::cast)
    }
}

impl<'t> Parameter<'t> {
    /// External and internal names, in source order.
    pub fn names(&self) -> impl Iterator<Item = SyntaxToken<'t>> {
        let labeled = self.colon().is_some();
        self.0
            .child_tokens()
            .take_while(|t| t.kind() != TokenKind::Colon)
            .filter(move |t| labeled && is_name(t))
    }

    /// The `:` between names and type.
    #[must_use]
    pub fn colon(&self) -> Option<SyntaxToken<'t>> {
        self.0.token_of_kind(TokenKind::Colon)
    }
}

impl<'t> VariableDecl<'t> {
    /// `let` or `var`.
    #[must_use]
    pub fn binding_keyword(&self) -> Option<SyntaxToken<'t>> {
        self.0
            .child_tokens()
            .find(|t| matches!(t.kind(), TokenKind::Keyword(Keyword::Let | Keyword::Var)))
    }

    /// Whether this declares variables with `var`.
    #[must_use]
    pub fn is_var(&self) -> bool {
        self.binding_keyword()
            .is_some_and(|t| t.kind() == TokenKind::Keyword(Keyword::Var))
    }

    /// The bindings in order.
    pub fn bindings(&self) -> impl Iterator<Item = PatternBinding<'t>> {
        self.0.child_nodes().filter_map(PatternBinding::cast)
    }
}

impl<'t> PatternBinding<'t> {
    /// The bound name for simple identifier patterns.
    #[must_use]
    pub fn name(&self) -> Option<SyntaxToken<'t>> {
        self.0
            .child_tokens()
            .find(|t| t.kind() == TokenKind::Identifier)
    }

    /// The `: Type` annotation.
    #[must_use]
    pub fn type_annotation(&self) -> Option<TypeAnnotation<'t>> {
        self.0
            .child_of_kind(NodeKind::TypeAnnotation)
            .map(TypeAnnotation::new_unchecked)
    }

    /// The `= value` initializer.
    #[must_use]
    pub fn initializer(&self) -> Option<Initializer<'t>> {
        self.0
            .child_of_kind(NodeKind::Initializer)
            .map(Initializer::new_unchecked)
    }

    /// A computed-property or protocol accessor block.
    #[must_use]
    pub fn accessor_block(&self) -> Option<AccessorBlock<'t>> {
        self.0
            .child_of_kind(NodeKind::AccessorBlock)
            .map(AccessorBlock::new_unchecked)
    }
}

impl<'t> TypeAnnotation<'t> {
    /// The `:` token.
    #[must_use]
    pub fn colon(&self) -> Option<SyntaxToken<'t>> {
        self.0.token_of_kind(TokenKind::Colon)
    }

    /// The annotated type.
    #[must_use]
    pub fn type_node(&self) -> Option<SyntaxNode<'t>> {
        self.0.child_nodes().next()
    }

    /// Whether the annotated type is `T?` or `T!`.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.type_node().is_some_and(|t| t.is(NodeKind::OptionalType))
    }
}

impl<'t> Initializer<'t> {
    /// The `=` token.
    #[must_use]
    pub fn equal(&self) -> Option<SyntaxToken<'t>> {
        self.0.token_of_kind(TokenKind::Equal)
    }

    /// The value expression.
    #[must_use]
    pub fn value(&self) -> Option<SyntaxNode<'t>> {
        self.0.child_nodes().next()
    }
}

impl<'t> EnumCaseDecl<'t> {
    /// Names of the declared cases.
    pub fn element_names(&self) -> impl Iterator<Item = SyntaxToken<'t>> {
        self.0
            .child_tokens()
            .filter(|t| t.kind() == TokenKind::Identifier && !t.is_missing())
    }
}

impl<'t> LiteralExpr<'t> {
    /// Whether this is the `nil` literal.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0
            .first_token(ViewMode::SourceAccurate)
            .is_some_and(|t| t.kind() == TokenKind::Keyword(Keyword::Nil))
    }
}

impl<'t> IdentifierExpr<'t> {
    /// The identifier token.
    #[must_use]
    pub fn identifier(&self) -> Option<SyntaxToken<'t>> {
        self.0.child_tokens().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn first<'t, N: AstNode<'t>>(tree: &'t crate::syntax::SyntaxTree) -> N {
        tree.root().descendants().find_map(N::cast).unwrap()
    }

    #[test]
    fn call_accessors() {
        let tree = parse("foo(a: 1, b)").unwrap();
        let call: FunctionCallExpr<'_> = first(&tree);
        assert_eq!(call.called_expression().unwrap().trimmed_text(), "foo");
        assert_eq!(call.left_paren().unwrap().text(), "(");
        let labels: Vec<_> = call
            .arguments()
            .unwrap()
            .arguments()
            .map(|a| a.label().map(|t| t.text()))
            .collect();
        assert_eq!(labels, vec![Some("a"), None]);
    }

    #[test]
    fn member_access_accessors() {
        let tree = parse("a.b").unwrap();
        let access: MemberAccessExpr<'_> = first(&tree);
        assert_eq!(access.base().unwrap().trimmed_text(), "a");
        assert_eq!(access.name().unwrap().text(), "b");

        let tree = parse("x = .none").unwrap();
        let access: MemberAccessExpr<'_> = first(&tree);
        assert!(access.base().is_none());
    }

    #[test]
    fn import_path_skips_kind_keyword() {
        let tree = parse("@testable import struct Foundation.Date").unwrap();
        let import: ImportDecl<'_> = first(&tree);
        assert_eq!(import.path(), "Foundation.Date");
        assert_eq!(import.attributes().count(), 1);
    }

    #[test]
    fn declaration_names_and_modifiers() {
        let tree = parse("private static func run() {}").unwrap();
        let function: FunctionDecl<'_> = first(&tree);
        assert_eq!(function.name().unwrap().text(), "run");
        assert!(function.has_modifier(Keyword::Static));
        assert!(!function.has_modifier(Keyword::Public));
        assert!(function.body().is_some());
    }

    #[test]
    fn variable_binding_parts() {
        let tree = parse("var name: String? = nil").unwrap();
        let decl: VariableDecl<'_> = first(&tree);
        assert!(decl.is_var());
        let binding = decl.bindings().next().unwrap();
        assert_eq!(binding.name().unwrap().text(), "name");
        assert!(binding.type_annotation().unwrap().is_optional());
        let value = binding.initializer().unwrap().value().unwrap();
        assert!(LiteralExpr::cast(value).unwrap().is_nil());
    }

    #[test]
    fn parameter_names() {
        let tree = parse("func f(_ a: Int, b: Int) {}").unwrap();
        let function: FunctionDecl<'_> = first(&tree);
        let names: Vec<Vec<&str>> = function
            .parameters()
            .unwrap()
            .parameters()
            .map(|p| p.names().map(|t| t.text()).collect())
            .collect();
        assert_eq!(names, vec![vec!["_", "a"], vec!["b"]]);
    }
}
