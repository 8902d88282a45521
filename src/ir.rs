//! The flat three-address IR produced between the typed AST and assembly.
//!
//! Instructions are plain value objects; the list is append-only once
//! generation finishes and is handed to the assembly generator unmodified.

use crate::types::Type;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IRVar(pub String);

impl IRVar {
    pub fn new(name: impl Into<String>) -> Self {
        IRVar(name.into())
    }
}

impl fmt::Display for IRVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Label(String),
    LoadIntConst { value: i64, dest: IRVar },
    LoadBoolConst { value: bool, dest: IRVar },
    Copy { source: IRVar, dest: IRVar },
    Call { fun: IRVar, args: Vec<IRVar>, dest: IRVar },
    Jump(String),
    CondJump { cond: IRVar, then_label: String, else_label: String },
    Return,
}

impl Instruction {
    /// Every `IRVar` this instruction reads or writes, in field order. Used
    /// by the stack-slot allocator to collect variables in first-occurrence
    /// order without caring which field they came from.
    pub fn vars(&self) -> Vec<&IRVar> {
        match self {
            Instruction::Label(_) | Instruction::Jump(_) | Instruction::Return => Vec::new(),
            Instruction::LoadIntConst { dest, .. } => vec![dest],
            Instruction::LoadBoolConst { dest, .. } => vec![dest],
            Instruction::Copy { source, dest } => vec![source, dest],
            Instruction::Call { fun, args, dest } => {
                let mut vars = vec![fun];
                vars.extend(args.iter());
                vars.push(dest);
                vars
            }
            Instruction::CondJump { cond, .. } => vec![cond],
        }
    }
}

/// A variable's static type, recorded alongside `IRVar`s that the IR
/// generator creates so codegen never has to re-derive it.
pub type VarType = Type;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Primitive;

    #[test]
    fn vars_collects_every_field_in_order() {
        let call = Instruction::Call {
            fun: IRVar::new("+"),
            args: vec![IRVar::new("v0"), IRVar::new("v1")],
            dest: IRVar::new("v2"),
        };
        let vars: Vec<String> = call.vars().into_iter().map(|v| v.0.clone()).collect();
        assert_eq!(vars, vec!["+", "v0", "v1", "v2"]);
    }

    #[test]
    fn label_and_jump_have_no_vars() {
        assert!(Instruction::Label("L0".into()).vars().is_empty());
        assert!(Instruction::Jump("L0".into()).vars().is_empty());
        assert!(Instruction::Return.vars().is_empty());
    }

    #[test]
    fn var_type_is_reexported_from_types() {
        let _: VarType = Type::Prim(Primitive::Int);
    }
}
