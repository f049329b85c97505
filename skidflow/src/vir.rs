//! Verilog IR.

use std::fmt;

use itertools::Itertools;

use crate::utils::indent;
use crate::Bits;

const INDENT: usize = 4;

/// Module.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Module {
    /// Module name.
    pub name: String,

    /// Port declarations.
    pub port_decls: Vec<PortDeclaration>,

    /// Module items.
    pub module_items: Vec<ModuleItem>,
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`timescale 1ns / 1ps\n\nmodule {}\n(\n{}\n);\n\n{}\n\nendmodule",
            self.name,
            indent(self.port_decls.iter().join(",\n"), INDENT),
            self.module_items.iter().join("\n\n"),
        )
    }
}

/// Module item.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ModuleItem {
    /// Declarations.
    Declarations(Vec<Declaration>),

    /// Continuous assignments.
    ContinuousAssigns(Vec<ContinuousAssign>),

    /// Always construct.
    AlwaysConstruct(String, Vec<Statement>),

    /// Comment followed by module items.
    Commented(String, Vec<ModuleItem>),
}

impl fmt::Display for ModuleItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declarations(decls) => write!(f, "{}", decls.iter().join("\n")),
            Self::ContinuousAssigns(conts) => write!(f, "{}", conts.iter().join("\n")),
            Self::AlwaysConstruct(event, stmts) => {
                write!(f, "{} begin\n{}\nend", event, indent(stmts.iter().join("\n"), INDENT))
            }
            Self::Commented(comment, items) => write!(f, "// {}\n{}", comment, items.iter().join("\n\n")),
        }
    }
}

/// Port declaration.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum PortDeclaration {
    /// Input declaration.
    Input(usize, String),

    /// Output declaration.
    Output(usize, String),
}

impl PortDeclaration {
    /// Creates new input port declaration.
    pub fn input(width: usize, ident: &str) -> Self { Self::Input(width, ident.to_string()) }

    /// Creates new output port declaration.
    pub fn output(width: usize, ident: &str) -> Self { Self::Output(width, ident.to_string()) }
}

impl fmt::Display for PortDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (direction, width, ident) = match self {
            Self::Input(width, ident) => ("input", width, ident),
            Self::Output(width, ident) => ("output", width, ident),
        };
        if *width > 1 {
            write!(f, "{} wire [{}-1:0] {}", direction, width, ident)
        } else {
            write!(f, "{} wire {}", direction, ident)
        }
    }
}

/// Declaration.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Declaration {
    /// Net declaration.
    Net(usize, String),

    /// Reg declaration, with its power-on value.
    Reg(usize, String, Option<Bits>),
}

impl Declaration {
    /// Net declaration.
    #[inline]
    pub fn net(width: usize, ident: &str) -> Self { Declaration::Net(width, ident.to_string()) }

    /// Reg declaration with an all-zero power-on value.
    #[inline]
    pub fn reg_zeroed(width: usize, ident: &str) -> Self {
        Declaration::Reg(width, ident.to_string(), Some(Bits::zero(width)))
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, width, ident) = match self {
            Self::Net(width, ident) => ("wire", width, ident),
            Self::Reg(width, ident, _) => ("reg", width, ident),
        };
        if *width > 1 {
            write!(f, "{} [{}-1:0] {}", kind, width, ident)?;
        } else {
            write!(f, "{} {}", kind, ident)?;
        }
        if let Self::Reg(_, _, Some(init)) = self {
            write!(f, " = {}", init)?;
        }
        write!(f, ";")
    }
}

/// Continuous assign.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ContinuousAssign(pub Expression, pub Expression);

impl ContinuousAssign {
    /// Creates new continuous assign.
    pub fn new(lvalue: Expression, expr: Expression) -> Self { Self(lvalue, expr) }
}

impl fmt::Display for ContinuousAssign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "assign {} = {};", self.0, self.1) }
}

/// Statement.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Statement {
    /// Conditional statement.
    Conditional(Expression, Vec<Statement>, Vec<Statement>),

    /// Nonblocking assignment.
    NonblockingAssignment(Expression, Expression),
}

impl Statement {
    /// Nonblocking assignment.
    #[inline]
    pub fn nonblocking_assignment(lvalue: Expression, expr: Expression) -> Self {
        assert!(lvalue.is_identifier(), "lvalue should be identifier");
        Statement::NonblockingAssignment(lvalue, expr)
    }

    /// Builds an `if` / `else if` chain; the first arm whose condition holds is taken.
    pub fn priority(arms: Vec<(Expression, Vec<Statement>)>) -> Vec<Statement> {
        arms.into_iter()
            .rev()
            .fold(Vec::new(), |else_stmt, (cond, then_stmt)| vec![Statement::Conditional(cond, then_stmt, else_stmt)])
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conditional(cond, then_stmt, else_stmt) => {
                write!(f, "if ({}) begin\n{}\nend", cond, indent(then_stmt.iter().join("\n"), INDENT))?;
                match else_stmt.as_slice() {
                    [] => Ok(()),
                    [chained @ Self::Conditional(..)] => write!(f, " else {}", chained),
                    _ => write!(f, " else begin\n{}\nend", indent(else_stmt.iter().join("\n"), INDENT)),
                }
            }
            Self::NonblockingAssignment(lvalue, expr) => write!(f, "{} <= {};", lvalue, expr),
        }
    }
}

/// Unary operator.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum UnaryOp {
    /// Logical negation.
    Not,
}

/// Binary operator.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum BinaryOp {
    /// Logical and.
    And,

    /// Logical or.
    Or,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Not => write!(f, "!"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "&&"),
            Self::Or => write!(f, "||"),
        }
    }
}

/// Expression.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Expression {
    /// Number.
    Number(String),

    /// Identifier.
    Ident(String),

    /// Unary expression.
    Unary(UnaryOp, Box<Expression>),

    /// Binary expression.
    Binary(Box<Expression>, BinaryOp, Box<Expression>),

    /// Conditional expression.
    Conditional(Box<Expression>, Box<Expression>, Box<Expression>),
}

impl Expression {
    /// Number.
    pub fn number(bits: &Bits) -> Self { Self::Number(bits.to_string()) }

    /// Identifier.
    pub fn ident(ident: &str) -> Self { Self::Ident(ident.to_string()) }

    /// Logical negation.
    pub fn not(expr: Self) -> Self { Self::Unary(UnaryOp::Not, Box::new(expr)) }

    /// Logical and.
    pub fn and(lhs: Self, rhs: Self) -> Self { Self::Binary(Box::new(lhs), BinaryOp::And, Box::new(rhs)) }

    /// Logical or.
    pub fn or(lhs: Self, rhs: Self) -> Self { Self::Binary(Box::new(lhs), BinaryOp::Or, Box::new(rhs)) }

    /// Conditional expression.
    pub fn conditional(cond: Self, then_expr: Self, else_expr: Self) -> Self {
        Self::Conditional(Box::new(cond), Box::new(then_expr), Box::new(else_expr))
    }

    /// Returns `true` if the expression is primary.
    pub fn is_primary(&self) -> bool { matches!(self, Self::Number(_) | Self::Ident(_)) }

    /// Returns `true` if the expression is identifier.
    pub fn is_identifier(&self) -> bool { matches!(self, Self::Ident(_)) }

    /// Wraps non-primary operands in parentheses.
    fn operand(&self) -> String {
        if self.is_primary() {
            self.to_string()
        } else {
            format!("({})", self)
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(num) => write!(f, "{}", num),
            Self::Ident(ident) => write!(f, "{}", ident),
            Self::Unary(op, inner) => write!(f, "{}{}", op, inner.operand()),
            Self::Binary(lhs, op, rhs) => write!(f, "{} {} {}", lhs.operand(), op, rhs.operand()),
            Self::Conditional(cond, then_expr, else_expr) => {
                write!(f, "{} ? {} : {}", cond.operand(), then_expr.operand(), else_expr.operand())
            }
        }
    }
}
