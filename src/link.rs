//! Construcción de ejecutables.
//!
//! Una vez que se ha emitido código ensamblador, este debe ser
//! ensamblado y enlazado para producir un binario ejecutable. Ambas
//! operaciones se delegan al compilador de C del sistema, el cual
//! también aporta el código de arranque que invoca a `main`.

use std::{
    env,
    ffi::OsString,
    io::{self, BufWriter},
    path::Path,
    process::{Child, ChildStdin, Command, ExitStatus, Stdio},
};

use bitflags::bitflags;
use log::info;
use thiserror::Error;

/// Comando de enlazado si `CC` no está definido.
const DEFAULT_CC: &str = "gcc";

bitflags! {
    /// Opciones a aplicar durante el enlazado.
    pub struct LinkOptions: u32 {
        /// Remover símbolos de depuración del ejecutable final.
        const STRIP = 0x01;
    }
}

/// Un error de ensamblado o enlazado.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LinkerError {
    /// Ocurrió un evento de error de E/S durante la invocación
    /// de comandos externos.
    #[error("I/O error")]
    Io(#[from] io::Error),

    /// El enlazador inició su ejecución, pero falló en enlazar.
    #[error("Linker exited with status code {0:?}")]
    Failed(ExitStatus),
}

/// Instancia del enlazador para un ejecutable definido.
pub struct Linker {
    child: Child,
    stdin: BufWriter<ChildStdin>,
}

impl Linker {
    /// Inicia una instancia del enlazador.
    ///
    /// El enlazador tratará de emitir un ejecutable y escribirlo a
    /// la ruta indicada por `output`. El comando se toma de la variable
    /// de entorno `CC`, o en su defecto es `gcc`.
    pub fn spawn<O>(output: &O, opts: LinkOptions) -> Result<Self, LinkerError>
    where
        O: AsRef<Path>,
    {
        let cc = env::var_os("CC").unwrap_or_else(|| OsString::from(DEFAULT_CC));
        info!("Linking {} with {:?}", output.as_ref().display(), cc);

        // El ensamblador se recibe por stdin, sin archivos intermedios
        let mut command = Command::new(&cc);
        command
            .arg("-o")
            .arg(output.as_ref())
            .args(&["-xassembler", "-"])
            .stdin(Stdio::piped());

        if opts.contains(LinkOptions::STRIP) {
            command.arg("-s");
        }

        let mut child = command.spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "linker stdin is closed"))?;

        Ok(Linker {
            child,
            stdin: BufWriter::new(stdin),
        })
    }

    /// Obtiene la entrada estándar del proceso que espera recibir ensamblador.
    pub fn stdin(&mut self) -> &mut BufWriter<ChildStdin> {
        &mut self.stdin
    }

    /// Indica el fin del flujo de código y finaliza el enlazado.
    pub fn finish(self) -> Result<(), LinkerError> {
        let Linker { mut child, stdin } = self;

        stdin.into_inner().map_err(io::IntoInnerError::into_error)?;

        let status = child.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(LinkerError::Failed(status))
        }
    }
}
