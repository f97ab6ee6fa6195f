//! Vocabulario de x86-64 en sintaxis AT&T.

use std::fmt;

/// Registros que utiliza el generador.
///
/// `%eax` es el acumulador: toda expresión deja su resultado ahí.
/// `%ecx` recibe el operando que se guardó en la pila y `%edx` es
/// la mitad alta del dividendo en divisiones.
#[derive(Copy, Clone)]
pub enum Reg {
    Rax,
    Rcx,
    Eax,
    Ecx,
    Al,
}

impl fmt::Display for Reg {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Reg::*;

        let name = match self {
            Rax => "rax",
            Rcx => "rcx",
            Eax => "eax",
            Ecx => "ecx",
            Al => "al",
        };

        formatter.write_str(name)
    }
}

/// Condiciones de comparación con signo.
#[derive(Copy, Clone)]
pub enum Cond {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Cond {
    /// Instrucción `setcc` que escribe 1 o 0 en un registro de un byte.
    pub fn set(self) -> &'static str {
        use Cond::*;

        match self {
            Equal => "sete",
            NotEqual => "setne",
            Less => "setl",
            LessOrEqual => "setle",
            Greater => "setg",
            GreaterOrEqual => "setge",
        }
    }

    /// Salto condicional.
    pub fn jump(self) -> &'static str {
        use Cond::*;

        match self {
            Equal => "je",
            NotEqual => "jne",
            Less => "jl",
            LessOrEqual => "jle",
            Greater => "jg",
            GreaterOrEqual => "jge",
        }
    }
}

/// Nombre del símbolo de enlazado para una función.
///
/// Mach-O antepone `_` a los símbolos de C; ELF los usa tal cual.
pub fn symbol(name: &str) -> String {
    if cfg!(target_os = "macos") {
        format!("_{}", name)
    } else {
        name.to_string()
    }
}
