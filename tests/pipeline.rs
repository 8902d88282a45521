//! End-to-end pipeline tests: source text to either a rejected `CompileError`
//! or an executable whose stdout matches expectations.

use minic::errors::{CompileError, ParseError, TypeError};
use minic::{compile_file, CompilerOptions};
use std::process::Command;

/// Compiles `source` to a temporary executable and returns its captured
/// stdout, or `None` if no working `cc` driver is available to link with.
fn run(source: &str) -> Option<String> {
    if !minic::assemble::cc_available() {
        return None;
    }
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("program");
    compile_file(source, &output_path, &CompilerOptions::default()).unwrap();
    let output = Command::new(&output_path).output().unwrap();
    assert!(output.status.success(), "program exited with {:?}", output.status);
    Some(String::from_utf8(output.stdout).unwrap())
}

#[test]
fn prints_a_single_integer() {
    let Some(stdout) = run("1") else { return };
    assert_eq!(stdout, "1\n");
}

#[test]
fn subtraction_can_go_negative() {
    let Some(stdout) = run("1 - 2") else { return };
    assert_eq!(stdout, "-1\n");
}

#[test]
fn logical_and_short_circuits_to_false() {
    let Some(stdout) = run("true and false") else { return };
    assert_eq!(stdout, "false\n");
}

#[test]
fn variable_use_after_declaration() {
    let Some(stdout) = run("var a = 1; a + 1") else { return };
    assert_eq!(stdout, "2\n");
}

#[test]
fn unary_not_and_negation_compose() {
    let Some(stdout) = run("if not true then -10 else 0") else { return };
    assert_eq!(stdout, "0\n");
}

#[test]
fn assignment_inside_short_circuited_or_operand_is_skipped() {
    let Some(stdout) = run("var a = true; true or { a = false; a }; a") else { return };
    assert_eq!(stdout, "true\n");
}

#[test]
fn while_loop_with_conditional_break() {
    let Some(stdout) = run(
        "var a = 10; while a > 0 do { a = a - 1; if a == 5 then break; print_int(a); }",
    ) else {
        return;
    };
    assert_eq!(stdout, "9\n8\n7\n6\n");
}

#[test]
fn multiplication_overflows_into_a_wide_int() {
    let Some(stdout) = run("var a = 8589934593; var b = 2; a * b") else { return };
    assert_eq!(stdout, "17179869186\n");
}

#[test]
fn trailing_garbage_after_an_expression_is_end_of_input_expected() {
    let err = minic::compile_to_assembly("a + b c").unwrap_err();
    assert!(matches!(
        err,
        CompileError::Parse(ParseError::EndOfInputExpected { .. })
    ));
}

#[test]
fn a_declaration_inside_parens_is_rejected() {
    let err = minic::compile_to_assembly("(var a = 1)").unwrap_err();
    assert!(matches!(
        err,
        CompileError::Parse(ParseError::VariableCannotBeDeclaredHere { .. })
    ));
}

#[test]
fn subtracting_a_bool_from_an_int_is_incompatible() {
    let err = minic::compile_to_assembly("1 - true").unwrap_err();
    assert!(matches!(err, CompileError::Type(TypeError::IncompatibleType { .. })));
}

#[test]
fn print_int_rejects_a_bool_argument() {
    let err = minic::compile_to_assembly("print_int(true)").unwrap_err();
    assert!(matches!(err, CompileError::Type(TypeError::IncompatibleType { .. })));
}

#[test]
fn assigning_to_an_undeclared_name_is_unknown_identifier() {
    let err = minic::compile_to_assembly("a = 1").unwrap_err();
    assert!(matches!(err, CompileError::Type(TypeError::UnknownIdentifier { .. })));
}

#[test]
fn break_at_top_level_is_wrong_scope() {
    let err = minic::compile_to_assembly("break").unwrap_err();
    assert!(matches!(
        err,
        CompileError::Parse(ParseError::WrongScope { .. })
    ));
}

#[test]
fn reassigning_a_const_is_incompatible_type() {
    let err = minic::compile_to_assembly("const a = 1; a = 2").unwrap_err();
    assert!(matches!(err, CompileError::Type(TypeError::IncompatibleType { .. })));
}

#[test]
fn redeclaring_a_name_at_the_same_level_is_a_duplicate_identifier() {
    let err = minic::compile_to_assembly("{ var a = 1; var a = true; a }").unwrap_err();
    assert!(matches!(
        err,
        CompileError::Type(TypeError::DuplicateIdentifier { .. })
    ));
}
