//! Token and node kind tags.

use std::fmt;

/// Reserved words recognized by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Keyword {
    Import,
    Func,
    Class,
    Struct,
    Enum,
    Protocol,
    Extension,
    Init,
    Let,
    Var,
    Case,
    Return,
    If,
    Else,
    Guard,
    For,
    In,
    While,
    SelfValue,
    Super,
    True,
    False,
    Nil,
    Try,
    Await,
    Throws,
    Rethrows,
    Async,
    Public,
    Private,
    Fileprivate,
    Internal,
    Open,
    Static,
    Final,
    Override,
    Mutating,
    Lazy,
    Weak,
}

impl Keyword {
    /// Looks up a keyword by its source spelling.
    #[must_use]
    pub fn from_text(text: &str) -> Option<Self> {
        let keyword = match text {
            "import" => Self::Import,
            "func" => Self::Func,
            "class" => Self::Class,
            "struct" => Self::Struct,
            "enum" => Self::Enum,
            "protocol" => Self::Protocol,
            "extension" => Self::Extension,
            "init" => Self::Init,
            "let" => Self::Let,
            "var" => Self::Var,
            "case" => Self::Case,
            "return" => Self::Return,
            "if" => Self::If,
            "else" => Self::Else,
            "guard" => Self::Guard,
            "for" => Self::For,
            "in" => Self::In,
            "while" => Self::While,
            "self" => Self::SelfValue,
            "super" => Self::Super,
            "true" => Self::True,
            "false" => Self::False,
            "nil" => Self::Nil,
            "try" => Self::Try,
            "await" => Self::Await,
            "throws" => Self::Throws,
            "rethrows" => Self::Rethrows,
            "async" => Self::Async,
            "public" => Self::Public,
            "private" => Self::Private,
            "fileprivate" => Self::Fileprivate,
            "internal" => Self::Internal,
            "open" => Self::Open,
            "static" => Self::Static,
            "final" => Self::Final,
            "override" => Self::Override,
            "mutating" => Self::Mutating,
            "lazy" => Self::Lazy,
            "weak" => Self::Weak,
            _ => return None,
        };
        Some(keyword)
    }

    /// Whether this keyword is a declaration modifier.
    #[must_use]
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Self::Public
                | Self::Private
                | Self::Fileprivate
                | Self::Internal
                | Self::Open
                | Self::Static
                | Self::Final
                | Self::Override
                | Self::Mutating
                | Self::Lazy
                | Self::Weak
        )
    }
}

/// The kind of a leaf token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A reserved word.
    Keyword(Keyword),
    /// A plain, backticked or `$0`-style identifier.
    Identifier,
    /// An integer literal.
    IntegerLiteral,
    /// A floating point literal.
    FloatLiteral,
    /// A complete string literal including its delimiters.
    StringLiteral,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `.`
    Period,
    /// `->`
    Arrow,
    /// `@`
    At,
    /// `=`
    Equal,
    /// A lone `?`.
    Question,
    /// A lone `!`.
    Exclamation,
    /// Any other operator spelling.
    Operator,
    /// A character the lexer does not understand.
    Unknown,
    /// End of input; owns the trailing trivia of the file.
    EndOfFile,
}

impl TokenKind {
    /// Whether this is the given keyword.
    #[must_use]
    pub fn is_keyword(self, keyword: Keyword) -> bool {
        self == Self::Keyword(keyword)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(k) => write!(f, "keyword {k:?}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// The kind of a composite node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum NodeKind {
    SourceFile,
    CodeBlock,
    MemberBlock,
    ImportDecl,
    FunctionDecl,
    InitializerDecl,
    ClassDecl,
    StructDecl,
    EnumDecl,
    ProtocolDecl,
    ExtensionDecl,
    VariableDecl,
    EnumCaseDecl,
    ModifierList,
    Attribute,
    GenericParameterClause,
    InheritanceClause,
    ParameterClause,
    Parameter,
    ReturnClause,
    TypeAnnotation,
    PatternBinding,
    Initializer,
    AccessorBlock,
    IdentifierType,
    OptionalType,
    ArrayType,
    TupleType,
    FunctionType,
    ReturnStmt,
    IfStmt,
    GuardStmt,
    ForStmt,
    WhileStmt,
    ExpressionStmt,
    IdentifierExpr,
    LiteralExpr,
    StringLiteralExpr,
    MemberAccessExpr,
    FunctionCallExpr,
    ArgumentList,
    Argument,
    SubscriptExpr,
    ClosureExpr,
    TupleExpr,
    ArrayExpr,
    PrefixExpr,
    PostfixExpr,
    SequenceExpr,
    Unexpected,
}

impl NodeKind {
    /// Whether this kind is a declaration.
    #[must_use]
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            Self::ImportDecl
                | Self::FunctionDecl
                | Self::InitializerDecl
                | Self::ClassDecl
                | Self::StructDecl
                | Self::EnumDecl
                | Self::ProtocolDecl
                | Self::ExtensionDecl
                | Self::VariableDecl
                | Self::EnumCaseDecl
        )
    }

    /// Whether this kind declares a nominal type or extends one.
    #[must_use]
    pub fn is_type_declaration(self) -> bool {
        matches!(
            self,
            Self::ClassDecl
                | Self::StructDecl
                | Self::EnumDecl
                | Self::ProtocolDecl
                | Self::ExtensionDecl
        )
    }
}

/// Either a token kind or a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// A leaf token.
    Token(TokenKind),
    /// A composite node.
    Node(NodeKind),
}
