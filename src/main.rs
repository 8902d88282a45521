//! Command-line driver for `minic`.
//!
//! `minic <command> [source_file] [output_file]`. If no source file is
//! given, source is read from stdin. All errors are fatal: a diagnostic is
//! written to stderr and the process exits 1. `-h`/`--help` exits 0.

use clap::{Parser, Subcommand};
use minic::CompilerOptions;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "minic", about = "Ahead-of-time compiler for a small expression language")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print generated x86-64 assembly to stdout
    Asm {
        /// Source file to compile; reads stdin if omitted
        source_file: Option<PathBuf>,
    },
    /// Compile to a standalone executable
    Compile {
        /// Source file to compile; reads stdin if omitted
        source_file: Option<PathBuf>,
        /// Output executable path (default: compiled_program)
        output_file: Option<PathBuf>,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                print!("{e}");
                std::process::exit(0);
            }
            eprint!("{e}");
            std::process::exit(1);
        }
    };
    std::process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    let (name, result) = match cli.command {
        Commands::Asm { source_file } => {
            let name = display_name(source_file.as_deref());
            let result = read_source(source_file.as_deref()).and_then(|source| {
                let asm = minic::compile_to_assembly(&source)?;
                print!("{asm}");
                Ok(())
            });
            (name, result)
        }
        Commands::Compile {
            source_file,
            output_file,
        } => {
            let name = display_name(source_file.as_deref());
            let output = output_file.unwrap_or_else(|| PathBuf::from("compiled_program"));
            let result = read_source(source_file.as_deref())
                .and_then(|source| minic::compile_file(&source, &output, &CompilerOptions::default()));
            (name, result)
        }
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            match e.location() {
                Some(location) => eprintln!("{name}:{location}: error: {e}"),
                None => eprintln!("{name}: error: {e}"),
            }
            1
        }
    }
}

fn display_name(path: Option<&Path>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "<stdin>".to_string(),
    }
}

fn read_source(path: Option<&Path>) -> Result<String, minic::CompileError> {
    match path {
        Some(p) => Ok(std::fs::read_to_string(p)?),
        None => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}
