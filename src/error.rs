use crate::source::{Located, Position, SourceFile};
use std::{
    error::Error,
    fmt::{self, Debug, Display},
};

mod sealed {
    pub trait Sealed {}
}

pub trait LocatedError: sealed::Sealed {
    fn source(&self) -> &dyn Error;
    fn position(&self) -> Position;
}

/// Reporte legible de errores, señalando la línea y columna de origen.
pub struct Diagnostics<'a> {
    kind: &'static str,
    file: &'a SourceFile,
    errors: Vec<Box<dyn 'a + LocatedError>>,
}

impl<'a> Diagnostics<'a> {
    pub fn new(file: &'a SourceFile) -> Self {
        Diagnostics {
            kind: "error",
            file,
            errors: Default::default(),
        }
    }

    pub fn kind(self, kind: &'static str) -> Self {
        Diagnostics { kind, ..self }
    }

    pub fn push<E: 'a + LocatedError>(mut self, error: E) -> Self {
        self.errors.push(Box::new(error));
        self
    }
}

impl Display for Diagnostics<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Diagnostics { kind, file, errors } = self;

        if errors.is_empty() {
            return writeln!(fmt, "No errors were reported");
        }

        for error in errors {
            writeln!(fmt, "{}: {}", kind, error.source())?;

            let position = error.position();
            writeln!(fmt, " --> {}:{}", file.name(), position)?;

            let digits = position.line().to_string().chars().count();
            writeln!(fmt, "{:digits$} |", "", digits = digits)?;

            // Al final de la entrada la línea puede no existir
            let line = file.line(position.line()).unwrap_or("");
            writeln!(fmt, "{:>digits$} | {}", position.line(), line, digits = digits)?;

            let skip = position.column().saturating_sub(1) as usize;
            writeln!(
                fmt,
                "{:digits$} | {:skip$}^",
                "",
                "",
                digits = digits,
                skip = skip
            )?;

            writeln!(fmt)?;
        }

        let error_or_errors = if errors.len() == 1 { "error" } else { "errors" };
        writeln!(
            fmt,
            "Build failed with {} {}",
            errors.len(),
            error_or_errors
        )
    }
}

impl<E: Error> sealed::Sealed for Located<E> {}

impl<E: Error> LocatedError for Located<E> {
    fn source(&self) -> &dyn Error {
        self.as_ref()
    }

    fn position(&self) -> Position {
        Located::position(self)
    }
}

impl<E: Error> Error for Located<E> where Located<E>: Debug + Display {}
