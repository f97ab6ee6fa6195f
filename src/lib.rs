//! Compilador para un subconjunto mínimo de C.
//!
//! # Front end
//! Cada programa deriva de un único archivo de código fuente, el cual
//! contiene una sola función `int` cuyo cuerpo es una sola sentencia
//! `return`. El texto fuente se somete primero a análisis léxico en
//! [`lex`], de lo cual se obtiene un flujo de tokens. El flujo de tokens
//! se dispone en un AST ([`ast`]) por medio de análisis sintáctico en
//! [`parse`].
//!
//! # Back end
//! El AST se traduce directamente a ensamblador x86-64 en sintaxis AT&T
//! en [`codegen`]. El ensamblado y enlazado del resultado se delegan a la
//! toolchain de C del sistema por medio de [`link`].
//!
//! Cada fase es una transformación pura sobre su entrada; ninguna guarda
//! estado entre compilaciones distintas.

#[macro_use]
mod macros;

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lex;
pub mod link;
pub mod parse;
pub mod source;

use std::io::{self, Write};
use thiserror::Error;

use crate::{
    lex::Lexer,
    parse::{Parse, ParserError},
    source::Located,
};

/// Error de alguna de las fases de una traducción completa.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Syntax error")]
    Syntax(#[from] Located<ParserError>),

    #[error("Failed to emit assembly")]
    Output(#[from] io::Error),
}

/// Fases delanteras: texto fuente a AST.
pub fn parse_str(source: &str) -> Parse<ast::Program> {
    parse::parse(Lexer::new(source.chars().peekable()))
}

/// Traduce texto fuente a ensamblador, escribiéndolo en `output`.
///
/// No se escribe nada si el programa no es sintácticamente válido.
pub fn translate<W: Write>(source: &str, output: &mut W) -> Result<(), CompileError> {
    let program = parse_str(source)?;
    codegen::emit(&program, output)?;

    Ok(())
}
