//! Árbol sintáctico abstracto.
//!
//! El parser construye el árbol una sola vez y el generador de código
//! lo recorre en modo de solo lectura. Todo nodo tiene exactamente un
//! padre. Las constantes enteras ya se encuentran dentro del rango de
//! `int` (32 bits con signo) al momento de construirse.

use std::fmt::{self, Display};

/// Un programa completo: una única función.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub function: Function,
}

/// Una función `int <name>()` cuyo cuerpo es una sola sentencia.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub body: Statement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Return(Expr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Integer(i32),
    Unary(UnaryOp, Box<Expr>),
    Binary(Box<Expr>, BinOp, Box<Expr>),
}

impl Expr {
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary(op, Box::new(operand))
    }

    pub fn binary(left: Expr, op: BinOp, right: Expr) -> Self {
        Expr::Binary(Box::new(left), op, Box::new(right))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Negate,

    /// `~`
    Complement,

    /// `!`
    Not,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    And,
    Or,
}

// Los operadores se muestran por nombre en el árbol impreso

impl Display for UnaryOp {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            UnaryOp::Negate => "negation",
            UnaryOp::Complement => "bitwiseComplement",
            UnaryOp::Not => "logicalNegation",
        };

        fmt.write_str(string)
    }
}

impl Display for BinOp {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinOp::*;

        let string = match self {
            Add => "add",
            Sub => "minus",
            Mul => "multiply",
            Div => "divide",
            Equal => "equal",
            NotEqual => "notEqual",
            Less => "lessThan",
            LessOrEqual => "lessThanOrEqual",
            Greater => "greaterThan",
            GreaterOrEqual => "greaterThanOrEqual",
            And => "and",
            Or => "or",
        };

        fmt.write_str(string)
    }
}

// Impresión legible del árbol, para depuración desde la CLI

impl Display for Program {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.function.fmt(fmt)
    }
}

impl Display for Function {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(fmt, "FUNC INT {}:", self.name)?;
        writeln!(fmt, "    params: ()")?;
        writeln!(fmt, "    body:")?;
        writeln!(fmt, "        {}", self.body)
    }
}

impl Display for Statement {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Return(expr) => write!(fmt, "RETURN {}", expr),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Integer(value) => write!(fmt, "Int<{}>", value),
            Expr::Unary(op, operand) => write!(fmt, "UnaryOp<{},{}>", op, operand),
            Expr::Binary(left, op, right) => write!(fmt, "BinaryOp<{},{},{}>", op, left, right),
        }
    }
}
