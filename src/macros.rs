/// Emite una instrucción como una línea de ensamblador, con el mnemónico
/// alineado a una columna fija.
macro_rules! emit {
    ($context:expr, $opcode:expr) => {
        writeln!($context.output, "\t{}", $opcode)
    };

    ($context:expr, $opcode:expr, $($format:tt)*) => {{
        write!($context.output, "\t{:8}", $opcode)?;
        writeln!($context.output, $($format)*)
    }};
}
