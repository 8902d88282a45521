//! Per-stage error types.
//!
//! Every stage (lex, parse, type check, IR generation, codegen, assemble)
//! gets its own error enum so callers can match on error kind, not just a
//! formatted string. [`CompileError`] aggregates all of them via `From`
//! impls for the CLI boundary.

use crate::location::Location;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    UnrecognizedByte { byte: u8, location: Location },
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnrecognizedByte { byte, .. } => {
                write!(f, "unrecognized byte {byte:#04x}")
            }
        }
    }
}

impl std::error::Error for LexError {}

impl LexError {
    pub fn location(&self) -> &Location {
        match self {
            LexError::UnrecognizedByte { location, .. } => location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    EndOfInputExpected { found: String, location: Location },
    ExpectedLiteral {
        expected: String,
        found: String,
        location: Location,
    },
    ExpectedOneOf {
        expected: Vec<String>,
        found: String,
        location: Location,
    },
    WrongToken { found: String, location: Location },
    MissingSemicolon { location: Location },
    VariableCannotBeDeclaredHere { location: Location },
    MissingType { location: Location },
    UnknownType { found: String, location: Location },
    WrongScope { keyword: String, location: Location },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EndOfInputExpected { found, .. } => {
                write!(f, "expected end of input, got {found:?}")
            }
            ParseError::ExpectedLiteral { expected, found, .. } => {
                write!(f, "expected {expected:?}, got {found:?}")
            }
            ParseError::ExpectedOneOf { expected, found, .. } => write!(
                f,
                "expected one of {}, got {found:?}",
                expected.join(", ")
            ),
            ParseError::WrongToken { found, .. } => {
                write!(f, "wrong token, got {found:?}")
            }
            ParseError::MissingSemicolon { .. } => write!(f, "missing semicolon"),
            ParseError::VariableCannotBeDeclaredHere { .. } => {
                write!(f, "variable cannot be declared here")
            }
            ParseError::MissingType { .. } => write!(f, "expected a type after ':'"),
            ParseError::UnknownType { found, .. } => write!(f, "unknown type {found:?}"),
            ParseError::WrongScope { keyword, .. } => write!(
                f,
                "'{keyword}' statement must be used inside a while loop"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    pub fn location(&self) -> &Location {
        match self {
            ParseError::EndOfInputExpected { location, .. }
            | ParseError::ExpectedLiteral { location, .. }
            | ParseError::ExpectedOneOf { location, .. }
            | ParseError::WrongToken { location, .. }
            | ParseError::MissingSemicolon { location }
            | ParseError::VariableCannotBeDeclaredHere { location }
            | ParseError::MissingType { location }
            | ParseError::UnknownType { location, .. }
            | ParseError::WrongScope { location, .. } => location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    UnknownType { found: String },
    UnknownOperator { op: String },
    UnknownIdentifier { name: String },
    IncompatibleType { expected: String, found: String },
    WrongNumberOfArguments {
        function: String,
        expected: usize,
        found: usize,
    },
    DuplicateIdentifier { name: String, location: Location },
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::UnknownType { found } => write!(f, "unknown type: {found}"),
            TypeError::UnknownOperator { op } => write!(f, "unknown operator: {op}"),
            TypeError::UnknownIdentifier { name } => write!(f, "unknown identifier: {name}"),
            TypeError::IncompatibleType { expected, found } => {
                write!(f, "incompatible types. expected {expected}, got {found}")
            }
            TypeError::WrongNumberOfArguments {
                function,
                expected,
                found,
            } => write!(
                f,
                "wrong number of arguments for '{function}': expected {expected}, got {found}"
            ),
            TypeError::DuplicateIdentifier { name, .. } => {
                write!(f, "'{name}' is already declared in this scope")
            }
        }
    }
}

impl std::error::Error for TypeError {}

impl TypeError {
    pub fn location(&self) -> Option<&Location> {
        match self {
            TypeError::DuplicateIdentifier { location, .. } => Some(location),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    BreakOutsideLoop,
    ContinueOutsideLoop,
    UnsupportedExpression { what: String },
}

impl fmt::Display for IrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrError::BreakOutsideLoop => write!(f, "break used outside of a while loop"),
            IrError::ContinueOutsideLoop => write!(f, "continue used outside of a while loop"),
            IrError::UnsupportedExpression { what } => {
                write!(f, "unsupported expression: {what}")
            }
        }
    }
}

impl std::error::Error for IrError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    TooManyArguments { function: String, count: usize },
    WrongNumberOfArguments {
        function: String,
        expected: usize,
        found: usize,
    },
    UnknownFunction { name: String },
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodegenError::TooManyArguments { function, count } => write!(
                f,
                "too many arguments for function call '{function}': {count} (max 6)"
            ),
            CodegenError::WrongNumberOfArguments {
                function,
                expected,
                found,
            } => write!(
                f,
                "wrong number of arguments for function call '{function}': expected {expected}, got {found}"
            ),
            CodegenError::UnknownFunction { name } => write!(f, "unknown function: {name}"),
        }
    }
}

impl std::error::Error for CodegenError {}

#[derive(Debug)]
pub enum AssembleError {
    Spawn(std::io::Error),
    Failed { status: Option<i32>, stderr: String },
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssembleError::Spawn(e) => write!(f, "failed to invoke assembler/linker: {e}"),
            AssembleError::Failed { status, stderr } => {
                write!(f, "assembler/linker failed (status {status:?}):\n{stderr}")
            }
        }
    }
}

impl std::error::Error for AssembleError {}

/// Aggregate error type spanning the whole pipeline, used at the CLI
/// boundary and by [`crate::compile_to_assembly`] / [`crate::compile_file`].
#[derive(Debug)]
pub enum CompileError {
    Io(std::io::Error),
    Lex(LexError),
    Parse(ParseError),
    Type(TypeError),
    Ir(IrError),
    Codegen(CodegenError),
    Assemble(AssembleError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Io(e) => write!(f, "{e}"),
            CompileError::Lex(e) => write!(f, "{e}"),
            CompileError::Parse(e) => write!(f, "{e}"),
            CompileError::Type(e) => write!(f, "{e}"),
            CompileError::Ir(e) => write!(f, "{e}"),
            CompileError::Codegen(e) => write!(f, "{e}"),
            CompileError::Assemble(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CompileError {}

impl CompileError {
    /// The source location this error refers to, if the stage that raised
    /// it tracks one.
    pub fn location(&self) -> Option<&Location> {
        match self {
            CompileError::Io(_) => None,
            CompileError::Lex(e) => Some(e.location()),
            CompileError::Parse(e) => Some(e.location()),
            CompileError::Type(e) => e.location(),
            CompileError::Ir(_) => None,
            CompileError::Codegen(_) => None,
            CompileError::Assemble(_) => None,
        }
    }
}

impl From<std::io::Error> for CompileError {
    fn from(e: std::io::Error) -> Self {
        CompileError::Io(e)
    }
}

impl From<LexError> for CompileError {
    fn from(e: LexError) -> Self {
        CompileError::Lex(e)
    }
}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        CompileError::Parse(e)
    }
}

impl From<TypeError> for CompileError {
    fn from(e: TypeError) -> Self {
        CompileError::Type(e)
    }
}

impl From<IrError> for CompileError {
    fn from(e: IrError) -> Self {
        CompileError::Ir(e)
    }
}

impl From<CodegenError> for CompileError {
    fn from(e: CodegenError) -> Self {
        CompileError::Codegen(e)
    }
}

impl From<AssembleError> for CompileError {
    fn from(e: AssembleError) -> Self {
        CompileError::Assemble(e)
    }
}
