//! Intrinsic operator emission.
//!
//! An intrinsic is a built-in operator whose `Call` lowers to inline
//! x86-64 rather than an external function call. Each handler is given the
//! already-resolved operand locations and the destination location and
//! writes straight-line AT&T assembly for it.

use crate::errors::CodegenError;
use std::fmt::Write as _;

const ARITHMETIC: &[&str] = &["+", "-", "*", "/", "%"];
const COMPARISON: &[&str] = &["<", "<=", ">", ">=", "==", "!="];
const LOGICAL: &[&str] = &["and", "or"];
const UNARY: &[&str] = &["unary_-", "unary_not"];

pub fn is_intrinsic(name: &str) -> bool {
    ARITHMETIC.contains(&name) || COMPARISON.contains(&name) || LOGICAL.contains(&name) || UNARY.contains(&name)
}

/// Emit code for `name` given its argument operands and destination
/// operand (each already formatted as an AT&T memory operand, e.g.
/// `-8(%rbp)`), appending to `out`.
pub fn emit(name: &str, args: &[String], dest: &str, out: &mut String) -> Result<(), CodegenError> {
    if UNARY.contains(&name) {
        return emit_unary(name, args, dest, out);
    }
    emit_binary(name, args, dest, out)
}

fn emit_unary(name: &str, args: &[String], dest: &str, out: &mut String) -> Result<(), CodegenError> {
    let [operand] = args else {
        return Err(CodegenError::WrongNumberOfArguments {
            function: name.to_string(),
            expected: 1,
            found: args.len(),
        });
    };
    writeln!(out, "    movq {operand}, %rax").unwrap();
    match name {
        "unary_-" => writeln!(out, "    negq %rax").unwrap(),
        "unary_not" => writeln!(out, "    xorq $1, %rax").unwrap(),
        _ => unreachable!("checked by is_intrinsic"),
    }
    writeln!(out, "    movq %rax, {dest}").unwrap();
    Ok(())
}

fn emit_binary(name: &str, args: &[String], dest: &str, out: &mut String) -> Result<(), CodegenError> {
    let [left, right] = args else {
        return Err(CodegenError::WrongNumberOfArguments {
            function: name.to_string(),
            expected: 2,
            found: args.len(),
        });
    };

    match name {
        "+" => {
            writeln!(out, "    movq {left}, %rax").unwrap();
            writeln!(out, "    addq {right}, %rax").unwrap();
            writeln!(out, "    movq %rax, {dest}").unwrap();
        }
        "-" => {
            writeln!(out, "    movq {left}, %rax").unwrap();
            writeln!(out, "    subq {right}, %rax").unwrap();
            writeln!(out, "    movq %rax, {dest}").unwrap();
        }
        "*" => {
            writeln!(out, "    movq {left}, %rax").unwrap();
            writeln!(out, "    imulq {right}, %rax").unwrap();
            writeln!(out, "    movq %rax, {dest}").unwrap();
        }
        "/" => {
            writeln!(out, "    movq {left}, %rax").unwrap();
            writeln!(out, "    cqto").unwrap();
            writeln!(out, "    idivq {right}").unwrap();
            writeln!(out, "    movq %rax, {dest}").unwrap();
        }
        "%" => {
            writeln!(out, "    movq {left}, %rax").unwrap();
            writeln!(out, "    cqto").unwrap();
            writeln!(out, "    idivq {right}").unwrap();
            writeln!(out, "    movq %rdx, {dest}").unwrap();
        }
        "and" => {
            writeln!(out, "    movq {left}, %rax").unwrap();
            writeln!(out, "    andq {right}, %rax").unwrap();
            writeln!(out, "    movq %rax, {dest}").unwrap();
        }
        "or" => {
            writeln!(out, "    movq {left}, %rax").unwrap();
            writeln!(out, "    orq {right}, %rax").unwrap();
            writeln!(out, "    movq %rax, {dest}").unwrap();
        }
        _ if COMPARISON.contains(&name) => emit_comparison(name, left, right, dest, out),
        _ => unreachable!("checked by is_intrinsic"),
    }
    Ok(())
}

fn emit_comparison(op: &str, left: &str, right: &str, dest: &str, out: &mut String) {
    let set = match op {
        "<" => "setl",
        "<=" => "setle",
        ">" => "setg",
        ">=" => "setge",
        "==" => "sete",
        "!=" => "setne",
        _ => unreachable!("checked by caller"),
    };
    writeln!(out, "    movq {left}, %rax").unwrap();
    writeln!(out, "    cmpq {right}, %rax").unwrap();
    writeln!(out, "    {set} %al").unwrap();
    writeln!(out, "    movzbq %al, %rax").unwrap();
    writeln!(out, "    movq %rax, {dest}").unwrap();
}
