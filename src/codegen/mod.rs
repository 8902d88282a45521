//! Assembly generator: IR to x86-64 System V assembly (GNU AT&T syntax).
//!
//! One externally visible function, `main`. Every `IRVar` lives in its own
//! stack slot for the whole function; there is no register allocation
//! beyond the scratch use of `%rax`/`%rdx` within a single instruction's
//! expansion.

mod intrinsics;
mod slots;

use crate::errors::CodegenError;
use crate::ir::Instruction;
use slots::SlotAllocator;
use std::fmt::Write as _;

const MAX_CALL_ARGS: usize = 6;

pub fn generate_assembly(instructions: &[Instruction]) -> Result<String, CodegenError> {
    let slots = SlotAllocator::allocate(instructions);
    let mut out = String::new();

    writeln!(out, ".extern print_int").unwrap();
    writeln!(out, ".extern print_bool").unwrap();
    writeln!(out, ".extern read_int").unwrap();
    writeln!(out, ".global main").unwrap();
    writeln!(out, ".type main, @function").unwrap();
    writeln!(out, ".section .text").unwrap();
    writeln!(out, "main:").unwrap();
    writeln!(out, "    pushq %rbp").unwrap();
    writeln!(out, "    movq %rsp, %rbp").unwrap();
    writeln!(out, "    subq ${}, %rsp", slots.frame_bytes()).unwrap();

    for instruction in instructions {
        emit_instruction(instruction, &slots, &mut out)?;
    }

    Ok(out)
}

fn emit_instruction(
    instruction: &Instruction,
    slots: &SlotAllocator,
    out: &mut String,
) -> Result<(), CodegenError> {
    match instruction {
        Instruction::Label(name) => {
            writeln!(out, ".L{name}:").unwrap();
        }
        Instruction::LoadIntConst { value, dest } => {
            let dest = slots.operand(dest);
            if (i32::MIN as i64..=i32::MAX as i64).contains(value) {
                writeln!(out, "    movq ${value}, {dest}").unwrap();
            } else {
                writeln!(out, "    movabsq ${value}, %rax").unwrap();
                writeln!(out, "    movq %rax, {dest}").unwrap();
            }
        }
        Instruction::LoadBoolConst { value, dest } => {
            let dest = slots.operand(dest);
            writeln!(out, "    movq ${}, {dest}", if *value { 1 } else { 0 }).unwrap();
        }
        Instruction::Copy { source, dest } => {
            let source = slots.operand(source);
            let dest = slots.operand(dest);
            writeln!(out, "    movq {source}, %rax").unwrap();
            writeln!(out, "    movq %rax, {dest}").unwrap();
        }
        Instruction::Jump(label) => {
            writeln!(out, "    jmp .L{label}").unwrap();
        }
        Instruction::CondJump {
            cond,
            then_label,
            else_label,
        } => {
            let cond = slots.operand(cond);
            writeln!(out, "    cmpq $0, {cond}").unwrap();
            writeln!(out, "    jne .L{then_label}").unwrap();
            writeln!(out, "    jmp .L{else_label}").unwrap();
        }
        Instruction::Call { fun, args, dest } => {
            emit_call(fun.0.as_str(), args, dest, slots, out)?;
        }
        Instruction::Return => {
            writeln!(out, "    movq $0, %rax").unwrap();
            writeln!(out, "    movq %rbp, %rsp").unwrap();
            writeln!(out, "    popq %rbp").unwrap();
            writeln!(out, "    ret").unwrap();
        }
    }
    Ok(())
}

fn emit_call(
    name: &str,
    args: &[crate::ir::IRVar],
    dest: &crate::ir::IRVar,
    slots: &SlotAllocator,
    out: &mut String,
) -> Result<(), CodegenError> {
    if args.len() > MAX_CALL_ARGS {
        return Err(CodegenError::TooManyArguments {
            function: name.to_string(),
            count: args.len(),
        });
    }

    let arg_operands: Vec<String> = args.iter().map(|a| slots.operand(a)).collect();
    let dest_operand = slots.operand(dest);

    if intrinsics::is_intrinsic(name) {
        return intrinsics::emit(name, &arg_operands, &dest_operand, out);
    }

    match name {
        "print_int" | "print_bool" => {
            if arg_operands.len() != 1 {
                return Err(CodegenError::WrongNumberOfArguments {
                    function: name.to_string(),
                    expected: 1,
                    found: arg_operands.len(),
                });
            }
            writeln!(out, "    movq {}, %rdi", arg_operands[0]).unwrap();
            writeln!(out, "    call {name}").unwrap();
            writeln!(out, "    movq %rax, {dest_operand}").unwrap();
            Ok(())
        }
        "read_int" => {
            if !arg_operands.is_empty() {
                return Err(CodegenError::WrongNumberOfArguments {
                    function: name.to_string(),
                    expected: 0,
                    found: arg_operands.len(),
                });
            }
            writeln!(out, "    call read_int").unwrap();
            writeln!(out, "    movq %rax, {dest_operand}").unwrap();
            Ok(())
        }
        _ => Err(CodegenError::UnknownFunction {
            name: name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::IRVar;

    #[test]
    fn header_and_main_label_are_present() {
        let asm = generate_assembly(&[Instruction::Return]).unwrap();
        assert!(asm.contains(".extern print_int"));
        assert!(asm.contains(".global main"));
        assert!(asm.contains("main:"));
    }

    #[test]
    fn small_int_const_uses_movq_immediate() {
        let asm = generate_assembly(&[Instruction::LoadIntConst {
            value: 42,
            dest: IRVar::new("v0"),
        }])
        .unwrap();
        assert!(asm.contains("movq $42,"));
        assert!(!asm.contains("movabsq"));
    }

    #[test]
    fn large_int_const_uses_movabsq() {
        let asm = generate_assembly(&[Instruction::LoadIntConst {
            value: 8589934593,
            dest: IRVar::new("v0"),
        }])
        .unwrap();
        assert!(asm.contains("movabsq $8589934593, %rax"));
    }

    #[test]
    fn more_than_six_arguments_is_an_error() {
        let args: Vec<IRVar> = (0..7).map(|i| IRVar::new(format!("v{i}"))).collect();
        let instructions = vec![Instruction::Call {
            fun: IRVar::new("print_int"),
            args,
            dest: IRVar::new("v99"),
        }];
        let err = generate_assembly(&instructions).unwrap_err();
        assert!(matches!(err, CodegenError::TooManyArguments { .. }));
    }

    #[test]
    fn unknown_function_is_an_error() {
        let instructions = vec![Instruction::Call {
            fun: IRVar::new("mystery"),
            args: vec![],
            dest: IRVar::new("v0"),
        }];
        let err = generate_assembly(&instructions).unwrap_err();
        assert!(matches!(err, CodegenError::UnknownFunction { .. }));
    }

    #[test]
    fn print_int_with_wrong_arity_is_an_error() {
        let instructions = vec![Instruction::Call {
            fun: IRVar::new("print_int"),
            args: vec![IRVar::new("v0"), IRVar::new("v1")],
            dest: IRVar::new("v2"),
        }];
        let err = generate_assembly(&instructions).unwrap_err();
        assert!(matches!(err, CodegenError::WrongNumberOfArguments { .. }));
    }

    #[test]
    fn distinct_vars_get_distinct_memory_operands() {
        let asm = generate_assembly(&[
            Instruction::LoadIntConst {
                value: 1,
                dest: IRVar::new("v0"),
            },
            Instruction::LoadIntConst {
                value: 2,
                dest: IRVar::new("v1"),
            },
        ])
        .unwrap();
        assert!(asm.contains("-8(%rbp)"));
        assert!(asm.contains("-16(%rbp)"));
    }
}
