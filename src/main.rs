//! Punto de entrada ("driver").
//!
//! Este módulo orquesta las diferentes fases del proceso de
//! compilación y expone una CLI.

use anyhow::{self, bail, Context};
use clap::{crate_version, Arg, ArgMatches, Command};
use clanger::{
    ast::Program,
    codegen,
    error::Diagnostics,
    lex::Lexer,
    link::{LinkOptions, Linker},
    parse_str,
    source::SourceFile,
};
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use thiserror::Error;

use std::{fs, io::Write, path::Path, process};

/// Los errores ya fueron reportados como diagnósticos.
#[derive(Error, Debug)]
#[error("Build failed")]
struct BuildFailed;

fn main() -> anyhow::Result<()> {
    match run() {
        Err(error) if error.is::<BuildFailed>() => process::exit(1),
        result => result,
    }
}

fn run() -> anyhow::Result<()> {
    let input = || {
        Arg::new("input")
            .required(true)
            .value_name("FILE")
            .help("C source file")
    };

    // Parsing de CLI
    let args = Command::new("clanger")
        .version(crate_version!())
        .about("Compiler for a small subset of C")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .multiple_occurrences(true)
                .help("Increase logging verbosity"),
        )
        .subcommand(
            Command::new("compile")
                .about("Compiles the given C file")
                .arg(input())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("out")
                        .takes_value(true)
                        .value_name("FILE")
                        .default_value("out")
                        .help("Output file ('-' along with -S for stdout)"),
                )
                .arg(
                    Arg::new("asm")
                        .short('S')
                        .help("Generate assembly instead of linking"),
                )
                .arg(Arg::new("strip").short('s').help("Strip executables")),
        )
        .subcommand(
            Command::new("ast")
                .about("Pretty-prints the syntax tree of the given C file")
                .arg(input()),
        )
        .subcommand(
            Command::new("tokens")
                .about("Lists the tokens of the given C file")
                .arg(input()),
        )
        .get_matches();

    let level = match args.occurrences_of("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    SimpleLogger::new()
        .with_level(level)
        .env()
        .init()
        .context("Failed to initialize logging")?;

    match args.subcommand() {
        Some(("compile", args)) => compile(args),
        Some(("ast", args)) => {
            let program = front_end(args)?;
            print!("{}", program);
            Ok(())
        }

        Some(("tokens", args)) => {
            let file = read_source(args)?;
            for token in Lexer::new(file.chars()) {
                println!("{}\t{}", token.position(), token.val());
            }

            Ok(())
        }

        _ => bail!("Missing subcommand"),
    }
}

fn compile(args: &ArgMatches) -> anyhow::Result<()> {
    let program = front_end(args)?;

    // Se extraen argumentos necesarios
    let asm = args.is_present("asm");
    let output = args.value_of("output").unwrap_or("out");

    match (asm, output) {
        // Salida a stdout sin enlazado
        (true, "-") => {
            let stdout = std::io::stdout();
            let mut stdout = stdout.lock();

            codegen::emit(&program, &mut stdout).context("Failed to emit to stdout")?;
            stdout.flush().context("Failed to emit to stdout")?;
        }

        // Salida a archivo sin enlazado
        (true, path) => {
            let mut file = fs::File::create(path)
                .with_context(|| format!("Failed to open for writing: {}", path))?;

            codegen::emit(&program, &mut file)
                .with_context(|| format!("Failed to emit to file: {}", path))?;
        }

        // Salida a stdout con enlazado
        (false, "-") => bail!("Refusing to write executable to stdout"),

        // Salida a archivo con enlazado
        (false, path) => {
            let mut options = LinkOptions::empty();
            if args.is_present("strip") {
                options |= LinkOptions::STRIP;
            }

            let mut linker = Linker::spawn(&path, options).context("Failed to link")?;
            codegen::emit(&program, linker.stdin())
                .context("Failed to emit assembly to assembler")?;

            linker
                .finish()
                .with_context(|| format!("Failed to generate executable: {}", path))?;
        }
    };

    info!("Wrote {}", output);
    Ok(())
}

/// Lee y analiza el archivo fuente indicado en `args`.
fn front_end(args: &ArgMatches) -> anyhow::Result<Program> {
    let file = read_source(args)?;
    syntax(&file)
}

/// Los errores de sintaxis se reportan en stderr y resultan en [`BuildFailed`].
fn syntax(file: &SourceFile) -> anyhow::Result<Program> {
    match parse_str(file.text()) {
        Ok(program) => Ok(program),
        Err(error) => {
            eprint!("{}", Diagnostics::new(file).kind("Syntax error").push(error));
            Err(BuildFailed.into())
        }
    }
}

fn read_source(args: &ArgMatches) -> anyhow::Result<SourceFile> {
    let path = args.value_of("input").context("Missing input file")?;
    if !Path::new(path).is_file() {
        bail!("No such file at '{}'", path);
    }

    info!("Reading {}", path);
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;

    Ok(SourceFile::new(path, text))
}
