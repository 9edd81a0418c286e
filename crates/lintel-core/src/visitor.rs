//! Depth-first tree walker with per-kind callbacks.
//!
//! [`walk`] calls an entry callback before a node's children and an exit
//! callback after them, left to right. An entry callback can prune the
//! subtree with [`VisitAction::SkipChildren`]; the exit callback still
//! runs. Kinds listed in [`SyntaxVisitor::skippable_declarations`] are
//! never entered at all, and nodes outside the visitor's [`ViewMode`] are
//! invisible.

use crate::syntax::ast;
use crate::syntax::{NodeKind, SyntaxNode, SyntaxToken, ViewMode};

/// Whether to descend into a node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitAction {
    /// Visit the children.
    VisitChildren,
    /// Do not visit the children.
    SkipChildren,
}

impl VisitAction {
    fn and(self, other: Self) -> Self {
        if self == Self::SkipChildren || other == Self::SkipChildren {
            Self::SkipChildren
        } else {
            Self::VisitChildren
        }
    }
}

macro_rules! syntax_visitor {
    ($($kind:ident => $enter:ident, $exit:ident;)*) => {
        /// Callbacks invoked by [`walk`].
        ///
        /// Every method has a default that continues the descent, so an
        /// implementation only overrides the kinds it cares about.
        pub trait SyntaxVisitor {
            /// Which nodes take part in the walk.
            fn view_mode(&self) -> ViewMode {
                ViewMode::SourceAccurate
            }

            /// Declaration kinds whose whole subtree is skipped.
            fn skippable_declarations(&self) -> &'static [NodeKind] {
                &[]
            }

            /// Called for every visible node before its kind-specific callback.
            fn visit_node(&mut self, _node: SyntaxNode<'_>) -> VisitAction {
                VisitAction::VisitChildren
            }

            /// Called for every visible node after its kind-specific exit callback.
            fn visit_post_node(&mut self, _node: SyntaxNode<'_>) {}

            /// Called for every visible token.
            fn visit_token(&mut self, _token: SyntaxToken<'_>) {}

            $(
                #[doc = concat!("Entry callback for `", stringify!($kind), "`.")]
                fn $enter(&mut self, _node: ast::$kind<'_>) -> VisitAction {
                    VisitAction::VisitChildren
                }

                #[doc = concat!("Exit callback for `", stringify!($kind), "`.")]
                fn $exit(&mut self, _node: ast::$kind<'_>) {}
            )*
        }

        fn enter<V: SyntaxVisitor + ?Sized>(
            visitor: &mut V,
            kind: NodeKind,
            node: SyntaxNode<'_>,
        ) -> VisitAction {
            match kind {
                $(NodeKind::$kind => visitor.$enter(ast::$kind::new_unchecked(node)),)*
            }
        }

        fn exit<V: SyntaxVisitor + ?Sized>(visitor: &mut V, kind: NodeKind, node: SyntaxNode<'_>) {
            match kind {
                $(NodeKind::$kind => visitor.$exit(ast::$kind::new_unchecked(node)),)*
            }
        }
    };
}

syntax_visitor! {
    SourceFile => visit_source_file, visit_post_source_file;
    CodeBlock => visit_code_block, visit_post_code_block;
    MemberBlock => visit_member_block, visit_post_member_block;
    ImportDecl => visit_import_decl, visit_post_import_decl;
    FunctionDecl => visit_function_decl, visit_post_function_decl;
    InitializerDecl => visit_initializer_decl, visit_post_initializer_decl;
    ClassDecl => visit_class_decl, visit_post_class_decl;
    StructDecl => visit_struct_decl, visit_post_struct_decl;
    EnumDecl => visit_enum_decl, visit_post_enum_decl;
    ProtocolDecl => visit_protocol_decl, visit_post_protocol_decl;
    ExtensionDecl => visit_extension_decl, visit_post_extension_decl;
    VariableDecl => visit_variable_decl, visit_post_variable_decl;
    EnumCaseDecl => visit_enum_case_decl, visit_post_enum_case_decl;
    ModifierList => visit_modifier_list, visit_post_modifier_list;
    Attribute => visit_attribute, visit_post_attribute;
    GenericParameterClause => visit_generic_parameter_clause, visit_post_generic_parameter_clause;
    InheritanceClause => visit_inheritance_clause, visit_post_inheritance_clause;
    ParameterClause => visit_parameter_clause, visit_post_parameter_clause;
    Parameter => visit_parameter, visit_post_parameter;
    ReturnClause => visit_return_clause, visit_post_return_clause;
    TypeAnnotation => visit_type_annotation, visit_post_type_annotation;
    PatternBinding => visit_pattern_binding, visit_post_pattern_binding;
    Initializer => visit_initializer, visit_post_initializer;
    AccessorBlock => visit_accessor_block, visit_post_accessor_block;
    IdentifierType => visit_identifier_type, visit_post_identifier_type;
    OptionalType => visit_optional_type, visit_post_optional_type;
    ArrayType => visit_array_type, visit_post_array_type;
    TupleType => visit_tuple_type, visit_post_tuple_type;
    FunctionType => visit_function_type, visit_post_function_type;
    ReturnStmt => visit_return_stmt, visit_post_return_stmt;
    IfStmt => visit_if_stmt, visit_post_if_stmt;
    GuardStmt => visit_guard_stmt, visit_post_guard_stmt;
    ForStmt => visit_for_stmt, visit_post_for_stmt;
    WhileStmt => visit_while_stmt, visit_post_while_stmt;
    ExpressionStmt => visit_expression_stmt, visit_post_expression_stmt;
    IdentifierExpr => visit_identifier_expr, visit_post_identifier_expr;
    LiteralExpr => visit_literal_expr, visit_post_literal_expr;
    StringLiteralExpr => visit_string_literal_expr, visit_post_string_literal_expr;
    MemberAccessExpr => visit_member_access_expr, visit_post_member_access_expr;
    FunctionCallExpr => visit_function_call_expr, visit_post_function_call_expr;
    ArgumentList => visit_argument_list, visit_post_argument_list;
    Argument => visit_argument, visit_post_argument;
    SubscriptExpr => visit_subscript_expr, visit_post_subscript_expr;
    ClosureExpr => visit_closure_expr, visit_post_closure_expr;
    TupleExpr => visit_tuple_expr, visit_post_tuple_expr;
    ArrayExpr => visit_array_expr, visit_post_array_expr;
    PrefixExpr => visit_prefix_expr, visit_post_prefix_expr;
    PostfixExpr => visit_postfix_expr, visit_post_postfix_expr;
    SequenceExpr => visit_sequence_expr, visit_post_sequence_expr;
    Unexpected => visit_unexpected, visit_post_unexpected;
}

/// Walks `node` and its subtree with `visitor`.
pub fn walk<V: SyntaxVisitor + ?Sized>(visitor: &mut V, node: SyntaxNode<'_>) {
    let mode = visitor.view_mode();
    let skipped = visitor.skippable_declarations();
    walk_node(visitor, node, mode, skipped);
}

fn walk_node<V: SyntaxVisitor + ?Sized>(
    visitor: &mut V,
    node: SyntaxNode<'_>,
    mode: ViewMode,
    skipped: &[NodeKind],
) {
    if !node.is_visible(mode) {
        return;
    }
    if let Some(token) = node.as_token() {
        visitor.visit_token(token);
        return;
    }
    let Some(kind) = node.node_kind() else {
        return;
    };
    if skipped.contains(&kind) {
        return;
    }

    let action = visitor.visit_node(node).and(enter(visitor, kind, node));
    if action == VisitAction::VisitChildren {
        for child in node.children() {
            walk_node(visitor, child, mode, skipped);
        }
    }
    exit(visitor, kind, node);
    visitor.visit_post_node(node);
}
