//! `minic` — an ahead-of-time compiler for a small expression-oriented
//! language, targeting x86-64 System V assembly.
//!
//! The pipeline is a linear, single-pass sequence of stages, each owning
//! only the previous stage's output:
//!
//! ```text
//! source text -> tokens -> AST -> typed AST -> IR -> assembly text
//! ```
//!
//! [`compile_to_assembly`] runs the pipeline up through assembly text.
//! [`compile_file`] additionally invokes the system assembler/linker to
//! produce a standalone executable.

pub mod assemble;
pub mod ast;
pub mod codegen;
pub mod errors;
pub mod ir;
pub mod ir_gen;
pub mod lexer;
pub mod location;
pub mod parser;
pub mod token;
pub mod typechecker;
pub mod types;

use std::path::Path;

pub use assemble::CompilerOptions;
pub use errors::CompileError;

/// Run the full front-end pipeline (lex, parse, type check, IR generation,
/// assembly generation) over `source`, returning the generated assembly
/// text.
pub fn compile_to_assembly(source: &str) -> Result<String, CompileError> {
    let tokens = lexer::tokenize(source)?;
    let program = parser::parse(tokens)?;
    typechecker::typecheck(&program)?;
    let instructions = ir_gen::generate(&program)?;
    let asm = codegen::generate_assembly(&instructions)?;
    Ok(asm)
}

/// Compile `source` all the way to a standalone executable at
/// `output_path`, using `options` to control the assembler/linker
/// invocation.
pub fn compile_file(
    source: &str,
    output_path: &Path,
    options: &CompilerOptions,
) -> Result<(), CompileError> {
    let asm = compile_to_assembly(source)?;
    assemble::assemble(&asm, output_path, options)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_rejects_unrecognized_byte() {
        assert!(matches!(
            compile_to_assembly("1 @ 2"),
            Err(CompileError::Lex(_))
        ));
    }

    #[test]
    fn pipeline_rejects_bad_syntax() {
        assert!(matches!(
            compile_to_assembly("(var a = 1)"),
            Err(CompileError::Parse(_))
        ));
    }

    #[test]
    fn pipeline_rejects_type_errors() {
        assert!(matches!(
            compile_to_assembly("1 - true"),
            Err(CompileError::Type(_))
        ));
    }

    #[test]
    fn pipeline_produces_assembly_for_valid_program() {
        let asm = compile_to_assembly("1 + 2").unwrap();
        assert!(asm.contains("main:"));
        assert!(asm.contains(".global main"));
    }
}
