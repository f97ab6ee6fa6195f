//! Rastreo de ubicaciones originales en código fuente.
//!
//! Los tokens y los errores que produce el compilador llevan cuenta
//! de la posición línea-columna en la que se originaron, lo cual
//! permite señalar con exactitud dónde ocurre un error sintáctico.

use std::{
    fmt::{self, Debug, Display, Formatter},
    iter::Peekable,
};

/// Un flujo de entrada, carácter por carácter, con un carácter de lookahead.
pub trait CharSource {
    /// Consume y retorna el siguiente carácter.
    fn next_char(&mut self) -> Option<char>;

    /// Observa el siguiente carácter sin consumirlo.
    fn peek_char(&mut self) -> Option<char>;
}

impl<I: Iterator<Item = char>> CharSource for Peekable<I> {
    fn next_char(&mut self) -> Option<char> {
        self.next()
    }

    fn peek_char(&mut self) -> Option<char> {
        self.peek().copied()
    }
}

/// Un objeto cualquiera con una posición original asociada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<T> {
    position: Position,
    value: T,
}

impl<T> Located<T> {
    /// Obtiene el valor.
    pub fn val(&self) -> &T {
        &self.value
    }

    /// Obtiene la posición.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Descarta la posición y toma ownership del valor.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Descompone y toma ownership de las dos partes.
    pub fn split(self) -> (Position, T) {
        (self.position, self.value)
    }

    /// Construye a partir de un valor y una posición.
    pub fn at(value: T, position: Position) -> Self {
        Located { value, position }
    }
}

impl<T> AsRef<T> for Located<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

impl<T: Display> Display for Located<T> {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", self.position, self.value)
    }
}

/// Una posición línea-columna en un archivo.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Position {
    line: u32,
    column: u32,
}

impl Position {
    /// Construye una posición arbitraria.
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }

    /// Obtiene el número de línea.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Obtiene el número de columna.
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Incrementa el número de columna.
    pub fn advance(self) -> Position {
        Position {
            line: self.line,
            column: self.column + 1,
        }
    }

    /// Incrementa el número de línea y retorna a la columna 1.
    pub fn newline(self) -> Position {
        Position {
            line: self.line + 1,
            column: 1,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl Display for Position {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.line, self.column)
    }
}

impl Debug for Position {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        <Self as Display>::fmt(self, formatter)
    }
}

/// Nombre de origen y contenido completo de un archivo fuente.
pub struct SourceFile {
    name: String,
    text: String,
}

impl SourceFile {
    pub fn new<S: Into<String>, T: Into<String>>(name: S, text: T) -> Self {
        SourceFile {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Nombre con el que se reporta el archivo en diagnósticos.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Flujo de caracteres listo para el lexer.
    pub fn chars(&self) -> Peekable<std::str::Chars<'_>> {
        self.text.chars().peekable()
    }

    /// Obtiene una línea por su número (a partir de 1), sin el fin de línea.
    pub fn line(&self, line_number: u32) -> Option<&str> {
        let index = (line_number as usize).checked_sub(1)?;
        self.text.lines().nth(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peekable_chars_are_a_char_source() {
        let mut source = "ab".chars().peekable();

        assert_eq!(source.peek_char(), Some('a'));
        assert_eq!(source.next_char(), Some('a'));
        assert_eq!(source.peek_char(), Some('b'));
        assert_eq!(source.next_char(), Some('b'));
        assert_eq!(source.peek_char(), None);
        assert_eq!(source.next_char(), None);
    }

    #[test]
    fn positions_advance_and_wrap() {
        let position = Position::default().advance().advance();
        assert_eq!((position.line(), position.column()), (1, 3));

        let position = position.newline();
        assert_eq!((position.line(), position.column()), (2, 1));
        assert_eq!(position.to_string(), "2:1");
    }

    #[test]
    fn source_lines_are_one_based() {
        let file = SourceFile::new("test.c", "int main() {\n  return 0;\n}\n");

        assert_eq!(file.line(0), None);
        assert_eq!(file.line(2), Some("  return 0;"));
        assert_eq!(file.line(3), Some("}"));
        assert_eq!(file.line(4), None);
    }
}
