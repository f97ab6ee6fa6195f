//! Generación de código.
//!
//! Recorre el AST y emite ensamblador x86-64 como una máquina de pila
//! con acumulador: evaluar cualquier expresión deja su resultado en
//! `%eax`. Los operandos pendientes de una operación binaria se guardan
//! en la pila mientras se evalúa el otro operando y se recuperan en
//! `%rcx` justo antes de combinarse.
//!
//! Resta y división no conmutan, por lo cual en esos casos se evalúa
//! primero el operando derecho. Así el izquierdo termina en el
//! acumulador y el derecho en `%ecx`, que es justamente la forma que
//! esperan `subl` e `idivl`.
//!
//! El generador asume un árbol válido; las restricciones de rango y
//! de gramática ya fueron verificadas por el parser.

use crate::ast::{BinOp, Expr, Function, Program, Statement, UnaryOp};
use log::debug;
use std::io::{self, Write};

mod x86_64;

pub use x86_64::symbol;
use x86_64::{Cond, Reg};

/// Traduce un programa completo a ensamblador.
pub fn emit<W: Write>(program: &Program, output: &mut W) -> io::Result<()> {
    Generator::new(output).program(program)
}

/// Estado de una pasada de generación de código.
///
/// El contador de etiquetas pertenece a la instancia. Dos generadores
/// independientes nunca comparten estado.
pub struct Generator<'a, W> {
    output: &'a mut W,
    scope: String,
    next_label: u32,
}

impl<'a, W: Write> Generator<'a, W> {
    pub fn new(output: &'a mut W) -> Self {
        Generator {
            output,
            scope: String::new(),
            next_label: 0,
        }
    }

    pub fn program(&mut self, program: &Program) -> io::Result<()> {
        self.function(&program.function)
    }

    pub fn function(&mut self, function: &Function) -> io::Result<()> {
        debug!("Emitting function `{}`", function.name);

        let name = symbol(&function.name);
        writeln!(self.output, ".global {0}\n{0}:", name)?;

        self.scope = function.name.clone();
        self.statement(&function.body)
    }

    pub fn statement(&mut self, statement: &Statement) -> io::Result<()> {
        match statement {
            Statement::Return(expr) => {
                self.expr(expr)?;
                emit!(self, "ret")
            }
        }
    }

    pub fn expr(&mut self, expr: &Expr) -> io::Result<()> {
        match expr {
            Expr::Integer(value) => emit!(self, "movl", "${}, %{}", value, Reg::Eax),

            Expr::Unary(op, operand) => {
                self.expr(operand)?;

                match op {
                    UnaryOp::Negate => emit!(self, "negl", "%{}", Reg::Eax),
                    UnaryOp::Complement => emit!(self, "notl", "%{}", Reg::Eax),
                    UnaryOp::Not => {
                        self.compare_zero()?;
                        self.set(Cond::Equal)
                    }
                }
            }

            Expr::Binary(left, op, right) => self.binary(left, *op, right),
        }
    }

    fn binary(&mut self, left: &Expr, op: BinOp, right: &Expr) -> io::Result<()> {
        use BinOp::*;

        let cond = match op {
            Add => {
                self.operands(left, right)?;
                return emit!(self, "addl", "%{}, %{}", Reg::Ecx, Reg::Eax);
            }

            Mul => {
                self.operands(left, right)?;
                return emit!(self, "imull", "%{}, %{}", Reg::Ecx, Reg::Eax);
            }

            Sub => {
                self.operands(right, left)?;
                return emit!(self, "subl", "%{}, %{}", Reg::Ecx, Reg::Eax);
            }

            Div => {
                // %edx:%eax / %ecx, el cociente queda en %eax
                self.operands(right, left)?;
                emit!(self, "cdq")?;
                return emit!(self, "idivl", "%{}", Reg::Ecx);
            }

            Or => return self.logical_or(left, right),
            And => return self.logical_and(left, right),

            Equal => Cond::Equal,
            NotEqual => Cond::NotEqual,
            Less => Cond::Less,
            LessOrEqual => Cond::LessOrEqual,
            Greater => Cond::Greater,
            GreaterOrEqual => Cond::GreaterOrEqual,
        };

        // `cmpl %eax, %ecx` compara %ecx - %eax, es decir, izquierdo - derecho
        self.operands(left, right)?;
        emit!(self, "cmpl", "%{}, %{}", Reg::Eax, Reg::Ecx)?;
        self.set(cond)
    }

    /// `left || right`
    ///
    /// Si el operando izquierdo es distinto de cero el resultado es 1
    /// y el derecho nunca se evalúa.
    fn logical_or(&mut self, left: &Expr, right: &Expr) -> io::Result<()> {
        let second = self.label();
        let end = self.label();

        self.expr(left)?;
        self.compare_zero()?;
        emit!(self, Cond::Equal.jump(), "{}", second)?;
        emit!(self, "movl", "$1, %{}", Reg::Eax)?;
        emit!(self, "jmp", "{}", end)?;

        self.emit_label(&second)?;
        self.expr(right)?;
        self.compare_zero()?;
        self.set(Cond::NotEqual)?;

        self.emit_label(&end)
    }

    /// `left && right`
    ///
    /// Si el operando izquierdo es cero el acumulador ya contiene el
    /// resultado y se salta directamente al final.
    fn logical_and(&mut self, left: &Expr, right: &Expr) -> io::Result<()> {
        let second = self.label();
        let end = self.label();

        self.expr(left)?;
        self.compare_zero()?;
        emit!(self, Cond::NotEqual.jump(), "{}", second)?;
        emit!(self, "jmp", "{}", end)?;

        self.emit_label(&second)?;
        self.expr(right)?;
        self.compare_zero()?;
        self.set(Cond::NotEqual)?;

        self.emit_label(&end)
    }

    /// Evalúa `first` y `second` en ese orden. Al terminar, `second`
    /// se encuentra en `%eax` y `first` en `%ecx`.
    fn operands(&mut self, first: &Expr, second: &Expr) -> io::Result<()> {
        self.expr(first)?;
        emit!(self, "pushq", "%{}", Reg::Rax)?;

        self.expr(second)?;
        emit!(self, "popq", "%{}", Reg::Rcx)
    }

    fn compare_zero(&mut self) -> io::Result<()> {
        emit!(self, "cmpl", "$0, %{}", Reg::Eax)
    }

    /// Deja 1 en el acumulador si se cumple la condición, 0 si no.
    ///
    /// `setcc` solo escribe `%al`, así que el registro completo se limpia
    /// antes. Se usa `movl` en vez de `xorl` para no alterar las banderas.
    fn set(&mut self, cond: Cond) -> io::Result<()> {
        emit!(self, "movl", "$0, %{}", Reg::Eax)?;
        emit!(self, cond.set(), "%{}", Reg::Al)
    }

    /// Reserva una etiqueta local nueva, única dentro de esta instancia.
    fn label(&mut self) -> String {
        let label = format!(".L{}.{}", self.scope, self.next_label);
        self.next_label += 1;
        label
    }

    fn emit_label(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.output, "{}:", label)
    }
}
