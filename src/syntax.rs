use crate::source_location::SourceSpan;
use crate::token::TokenKind;
use internment::Intern;

/// Interned identifier text. Names are compared and hashed by pointer.
pub type Name = Intern<String>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Real(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Num {
    pub value: Number,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    pub name: Name,
    pub span: SourceSpan,
}

impl Var {
    pub fn new(name: &str, span: SourceSpan) -> Self {
        Var {
            name: Intern::new(name.to_string()),
            span,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinOp {
    pub left: Box<Expression>,
    pub op: TokenKind,
    pub op_span: SourceSpan,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOp {
    pub op: TokenKind,
    pub op_span: SourceSpan,
    pub operand: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    BinOp(BinOp),
    UnaryOp(UnaryOp),
    Num(Num),
    Var(Var),
}

impl Expression {
    pub fn source_span(&self) -> SourceSpan {
        match self {
            Expression::BinOp(b) => b.left.source_span().merge(&b.right.source_span()),
            Expression::UnaryOp(u) => u.op_span.merge(&u.operand.source_span()),
            Expression::Num(n) => n.span,
            Expression::Var(v) => v.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    // always a plain variable, never an arbitrary expression
    pub target: Var,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    // source order
    pub children: Vec<Statement>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Compound(Compound),
    Assign(Assign),
    NoOp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeSpec {
    /// Either `TokenKind::Integer` or `TokenKind::Real`.
    pub kind: TokenKind,
    pub span: SourceSpan,
}

impl TypeSpec {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub var: Var,
    pub type_spec: TypeSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: Option<Var>,
    // empty when the program has no VAR section
    pub declarations: Vec<VarDecl>,
    pub body: Compound,
}

impl Program {
    pub fn has_declarations(&self) -> bool {
        !self.declarations.is_empty()
    }
}
