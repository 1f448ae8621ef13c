//! Expression and statement nodes.
//!
//! Every node carries the location it was created at. Expressions also
//! carry a type tag: `Some` when the builder already knows the type
//! (literals, instance creation, casts, struct initializers) and `None`
//! when it is left to semantic analysis.

use serde::Serialize;

use crate::literal::Literal;
use crate::location::NodeLocation;
use crate::model::VariableDecl;
use crate::symbol::SymbolName;
use crate::types::Type;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Option<Type>,
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExprKind {
    Literal(Literal),

    /// Plain variable reference: `a`.
    VariableRef(SymbolName),

    /// Array or map element: `a[1]`, `m["key"]`.
    ArrayMapAccess {
        name: SymbolName,
        base: Box<Expr>,
        index: Box<Expr>,
    },

    /// One link of a struct field chain: `person.address.city`.
    StructFieldAccess(FieldAccess),

    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    FunctionInvocation(Invocation),
    ActionInvocation(Invocation),

    /// `new T` for a non-struct type; the type is in `Expr::ty`.
    InstanceCreation,

    /// `new S` for a user struct, possibly declared later in the file.
    StructInit { name: SymbolName },

    ArrayInit(Vec<Expr>),

    /// Entries are `KeyValue` expressions.
    MapInit(Vec<Expr>),

    KeyValue { key: String, value: Box<Expr> },

    TypeCast { target: Type, expr: Box<Expr> },

    /// Backtick template, kept uninterpreted.
    Template(String),
}

/// Call of a function or action with its arguments in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invocation {
    pub name: SymbolName,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldAccess {
    pub name: SymbolName,
    pub reference: Box<Expr>,
    pub field: Option<Box<Expr>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Equal,
    NotEqual,
    GreaterEqual,
    GreaterThan,
    LessThan,
    LessEqual,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 12] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Equal,
        BinaryOp::NotEqual,
        BinaryOp::GreaterEqual,
        BinaryOp::GreaterThan,
        BinaryOp::LessThan,
        BinaryOp::LessEqual,
    ];

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            "==" => BinaryOp::Equal,
            "!=" => BinaryOp::NotEqual,
            ">=" => BinaryOp::GreaterEqual,
            ">" => BinaryOp::GreaterThan,
            "<" => BinaryOp::LessThan,
            "<=" => BinaryOp::LessEqual,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::LessThan => "<",
            BinaryOp::LessEqual => "<=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Add,
    Sub,
    Not,
}

impl UnaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(UnaryOp::Add),
            "-" => Some(UnaryOp::Sub),
            "!" => Some(UnaryOp::Not),
            _ => None,
        }
    }
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Option<Type>, location: NodeLocation) -> Self {
        Expr { kind, ty, location }
    }

    /// Name of the referenced variable, for reference expressions only.
    pub fn reference_name(&self) -> Option<&SymbolName> {
        match &self.kind {
            ExprKind::VariableRef(name) => Some(name),
            ExprKind::ArrayMapAccess { name, .. } => Some(name),
            ExprKind::StructFieldAccess(access) => Some(&access.name),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.kind {
            ExprKind::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: NodeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StmtKind {
    /// Local variable declaration; any initializer follows as a separate
    /// `Assign`.
    VariableDef(VariableDecl),

    /// `a, b = expr;`
    Assign { targets: Vec<Expr>, value: Expr },

    /// `return;` carries no values.
    Return(Vec<Expr>),

    Reply(Expr),

    While { condition: Expr, body: Block },

    IfElse(IfElse),

    Block(Block),

    FunctionInvocation(Invocation),
    ActionInvocation(Invocation),
}

/// Ordered sequence of statements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub location: NodeLocation,
}

impl Block {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }
}

/// `if` / `else if` chain.
///
/// `branches[0]` is the primary `if`; the remaining branches are the
/// `else if` clauses in source order. They are evaluated in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfElse {
    pub branches: Vec<IfBranch>,
    pub else_body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfBranch {
    pub condition: Expr,
    pub body: Block,
    pub location: NodeLocation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_symbols_round_trip() {
        for op in BinaryOp::ALL {
            assert_eq!(BinaryOp::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(BinaryOp::from_symbol("%"), None);
        assert_eq!(BinaryOp::from_symbol("<>"), None);
    }

    #[test]
    fn unary_symbols() {
        assert_eq!(UnaryOp::from_symbol("!"), Some(UnaryOp::Not));
        assert_eq!(UnaryOp::from_symbol("-"), Some(UnaryOp::Sub));
        assert_eq!(UnaryOp::from_symbol("~"), None);
    }

    #[test]
    fn only_references_have_reference_names() {
        let at = NodeLocation::new("refs.bal", 4);
        let var = Expr::new(ExprKind::VariableRef(SymbolName::new("a")), None, at.clone());
        assert_eq!(var.reference_name().map(SymbolName::name), Some("a"));

        let lit = Expr::new(ExprKind::Literal(Literal::Int(1)), Some(Type::Int), at);
        assert!(lit.reference_name().is_none());
        assert_eq!(lit.as_literal(), Some(&Literal::Int(1)));
    }
}
