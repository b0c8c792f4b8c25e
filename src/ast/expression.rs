use lachs::Span;

use super::statement::Statement;

/// An expression is the top of the precedence tower.
///
/// Each binary level below is left-factored as `left (op next)?` where
/// `next` recurses into the same level, so chains of one operator hang off
/// to the right of the tree.
#[derive(Debug, Clone)]
pub struct Expr {
    pub assignment: Assignment,
    pub position: Span,
}

/// `'let'? logic_or ('=' logic_or)?`
#[derive(Debug, Clone)]
pub struct Assignment {
    pub is_let: bool,
    pub target: LogicOr,
    pub value: Option<LogicOr>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct LogicOr {
    pub left: LogicAnd,
    pub rest: Option<Box<LogicOr>>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct LogicAnd {
    pub left: Equality,
    pub rest: Option<Box<LogicAnd>>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct Equality {
    pub left: Comparison,
    pub rest: Option<(EqualityOp, Box<Equality>)>,
    pub position: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqualityOp {
    Equal,
    NotEqual,
}

impl EqualityOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            EqualityOp::Equal => "==",
            EqualityOp::NotEqual => "!=",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Comparison {
    pub left: Addition,
    pub rest: Option<(ComparisonOp, Box<Comparison>)>,
    pub position: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl ComparisonOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Less => "<",
            ComparisonOp::LessEqual => "<=",
            ComparisonOp::Greater => ">",
            ComparisonOp::GreaterEqual => ">=",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Addition {
    pub left: Multiplication,
    pub rest: Option<(AdditionOp, Box<Addition>)>,
    pub position: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone)]
pub struct Multiplication {
    pub left: Unary,
    pub rest: Option<(MultiplicationOp, Box<Multiplication>)>,
    pub position: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiplicationOp {
    Star,
    Slash,
    Percent,
}

impl MultiplicationOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            MultiplicationOp::Star => "*",
            MultiplicationOp::Slash => "/",
            MultiplicationOp::Percent => "%",
        }
    }
}

/// `('!' | '-') unary | primary`
#[derive(Debug, Clone)]
pub enum Unary {
    Op {
        op: UnaryOp,
        operand: Box<Unary>,
        position: Span,
    },
    Primary(Primary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Bang,
    Minus,
}

/// The leaf level: literals, identifiers, calls, and parenthesized
/// subexpressions.
#[derive(Debug, Clone)]
pub enum Primary {
    Func(FuncLiteral),
    List(ListLiteral),
    Dict(DictLiteral),
    Call(Call),
    SubExpression(SubExpression),
    Number(NumberLiteral),
    Str(StringLiteral),
    Bool(BoolLiteral),
    Undefined(UndefinedLiteral),
    Ident(Ident),
}

/// `func (a, b) { … }` - evaluates to a function value closing over the
/// frame in effect at the literal.
#[derive(Debug, Clone)]
pub struct FuncLiteral {
    pub params: Vec<Ident>,
    pub block: Vec<Statement>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct ListLiteral {
    pub items: Vec<Expr>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct DictLiteral {
    pub entries: Vec<DictEntry>,
    pub position: Span,
}

/// One `key: value` pair of a dict literal.
#[derive(Debug, Clone)]
pub struct DictEntry {
    pub key: DictKey,
    pub value: Expr,
    pub position: Span,
}

/// A dict key is either an expression that must evaluate to a string, or a
/// quoted identifier `'name'` whose spelling is the key itself.
#[derive(Debug, Clone)]
pub enum DictKey {
    Expr(Box<Expr>),
    Literal(Ident),
}

/// An identifier followed by at least one postfix operation,
/// e.g. `f(1)`, `l[0]`, `d.k.pop()`.
#[derive(Debug, Clone)]
pub struct Call {
    pub ident: Ident,
    pub chain: CallChain,
    pub position: Span,
}

/// `( expr )` with an optional postfix chain.
#[derive(Debug, Clone)]
pub struct SubExpression {
    pub expr: Box<Expr>,
    pub chain: Option<CallChain>,
    pub position: Span,
}

/// A linked list of postfix operations. Each link is an argument tuple, an
/// index, or a property access, with an optional continuation.
#[derive(Debug, Clone)]
pub struct CallChain {
    pub op: ChainOp,
    pub next: Option<Box<CallChain>>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub enum ChainOp {
    Args(Vec<Expr>),
    Index(Box<Expr>),
    Property(Ident),
}

#[derive(Debug, Clone)]
pub struct NumberLiteral {
    pub value: f64,
    pub position: Span,
}

/// A string literal; `value` still carries the surrounding quote marks
/// exactly as lexed. The evaluator strips them.
#[derive(Debug, Clone)]
pub struct StringLiteral {
    pub value: String,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct BoolLiteral {
    pub value: bool,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct UndefinedLiteral {
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct Ident {
    pub value: String,
    pub position: Span,
}
