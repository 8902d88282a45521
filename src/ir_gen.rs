//! IR generator: typed AST to a flat three-address instruction list.
//!
//! Bracketed by `Label("Start")` and a trailing `Return`. Variable and
//! label names are generated from monotonically increasing counters
//! (`v0, v1, …` and `L0, L1, …`); identifiers resolve through a scope-chain
//! symbol table that mirrors the type checker's block scoping.

use crate::ast::{Expression, ExpressionKind, Literal};
use crate::errors::IrError;
use crate::ir::{IRVar, Instruction};
use crate::types::{Primitive, Type};
use std::collections::HashMap;

struct LoopState {
    start_label: String,
    end_label: String,
}

pub struct Generator {
    instructions: Vec<Instruction>,
    var_counter: usize,
    label_counter: usize,
    var_types: HashMap<IRVar, Type>,
    symbols: Vec<HashMap<String, IRVar>>,
    loop_stack: Vec<LoopState>,
}

pub fn generate(program: &Expression) -> Result<Vec<Instruction>, IrError> {
    let mut gen = Generator::new();
    gen.emit(Instruction::Label("Start".to_string()));
    let result_var = gen.visit(program)?;
    gen.emit_terminal_print(program, result_var)?;
    gen.emit(Instruction::Return);
    Ok(gen.instructions)
}

const BUILTIN_NAMES: &[&str] = &[
    "=", "+", "-", "*", "/", "%", "<", "<=", ">", ">=", "==", "!=", "and", "or", "unary_-",
    "unary_not", "print_int", "print_bool", "read_int",
];

impl Generator {
    fn new() -> Self {
        let mut var_types = HashMap::new();
        for name in BUILTIN_NAMES {
            var_types.insert(IRVar::new(*name), Type::Prim(Primitive::Unit));
        }
        Generator {
            instructions: Vec::new(),
            var_counter: 0,
            label_counter: 0,
            var_types,
            symbols: vec![HashMap::new()],
            loop_stack: Vec::new(),
        }
    }

    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    fn fresh_var(&mut self, ty: Type) -> IRVar {
        let var = IRVar::new(format!("v{}", self.var_counter));
        self.var_counter += 1;
        self.var_types.insert(var.clone(), ty);
        var
    }

    fn fresh_label(&mut self) -> String {
        let label = format!("L{}", self.label_counter);
        self.label_counter += 1;
        label
    }

    fn unit_var(&self) -> IRVar {
        IRVar::new("unit")
    }

    fn push_scope(&mut self) {
        self.symbols.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.symbols.pop();
    }

    fn require(&self, name: &str) -> Result<IRVar, IrError> {
        self.symbols
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .cloned()
            .ok_or_else(|| IrError::UnsupportedExpression {
                what: format!("unbound identifier '{name}'"),
            })
    }

    fn bind(&mut self, name: String, var: IRVar) -> Result<(), IrError> {
        let scope = self
            .symbols
            .last_mut()
            .expect("generator always has at least one scope");
        if scope.contains_key(&name) {
            return Err(IrError::UnsupportedExpression {
                what: format!("'{name}' already declared in this scope"),
            });
        }
        scope.insert(name, var);
        Ok(())
    }

    fn visit(&mut self, expr: &Expression) -> Result<IRVar, IrError> {
        match &expr.kind {
            ExpressionKind::Literal(Literal::Int(value)) => {
                let dest = self.fresh_var(expr.ty());
                self.emit(Instruction::LoadIntConst {
                    value: *value,
                    dest: dest.clone(),
                });
                Ok(dest)
            }
            ExpressionKind::Literal(Literal::Bool(value)) => {
                let dest = self.fresh_var(expr.ty());
                self.emit(Instruction::LoadBoolConst {
                    value: *value,
                    dest: dest.clone(),
                });
                Ok(dest)
            }
            ExpressionKind::Literal(Literal::Unit) => Ok(self.unit_var()),
            ExpressionKind::Identifier(name) => self.require(name),
            ExpressionKind::UnaryOp { op, operand } => self.visit_unary(op, operand, expr),
            ExpressionKind::BinaryOp { op, left, right } if op == "=" => {
                self.visit_assignment(left, right)
            }
            ExpressionKind::BinaryOp { op, left, right } if op == "and" || op == "or" => {
                self.visit_short_circuit(op, left, right, expr)
            }
            ExpressionKind::BinaryOp { op, left, right } => self.visit_binary(op, left, right, expr),
            ExpressionKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.visit_if(condition, then_branch, else_branch.as_deref(), expr),
            ExpressionKind::FunctionCall { name, arguments } => {
                self.visit_call(name, arguments, expr)
            }
            ExpressionKind::Block { statements, result } => self.visit_block(statements, result),
            ExpressionKind::VariableDeclaration { name, value, .. } => {
                self.visit_var_decl(name, value, expr)
            }
            ExpressionKind::While { condition, body } => self.visit_while(condition, body),
            ExpressionKind::Break => {
                let end_label = self
                    .loop_stack
                    .last()
                    .map(|s| s.end_label.clone())
                    .ok_or(IrError::BreakOutsideLoop)?;
                self.emit(Instruction::Jump(end_label));
                Ok(self.unit_var())
            }
            ExpressionKind::Continue => {
                let start_label = self
                    .loop_stack
                    .last()
                    .map(|s| s.start_label.clone())
                    .ok_or(IrError::ContinueOutsideLoop)?;
                self.emit(Instruction::Jump(start_label));
                Ok(self.unit_var())
            }
        }
    }

    fn visit_unary(
        &mut self,
        op: &str,
        operand: &Expression,
        expr: &Expression,
    ) -> Result<IRVar, IrError> {
        let operand_var = self.visit(operand)?;
        let dest = self.fresh_var(expr.ty());
        self.emit(Instruction::Call {
            fun: IRVar::new(format!("unary_{op}")),
            args: vec![operand_var],
            dest: dest.clone(),
        });
        Ok(dest)
    }

    fn visit_assignment(&mut self, left: &Expression, right: &Expression) -> Result<IRVar, IrError> {
        let ExpressionKind::Identifier(name) = &left.kind else {
            return Err(IrError::UnsupportedExpression {
                what: "assignment target must be an identifier".to_string(),
            });
        };
        let right_var = self.visit(right)?;
        let left_var = self.require(name)?;
        self.emit(Instruction::Copy {
            source: right_var,
            dest: left_var.clone(),
        });
        Ok(left_var)
    }

    /// `and`/`or` require control flow: a fresh `result` temp is set to the
    /// short-circuit constant on one branch (`false` for `and`, `true` for
    /// `or`) without evaluating the right operand, or to the right
    /// operand's value on the other.
    fn visit_short_circuit(
        &mut self,
        op: &str,
        left: &Expression,
        right: &Expression,
        expr: &Expression,
    ) -> Result<IRVar, IrError> {
        let skip_label = self.fresh_label();
        let right_label = self.fresh_label();
        let end_label = self.fresh_label();

        let left_var = self.visit(left)?;
        let result = self.fresh_var(expr.ty());

        let (then_label, else_label) = if op == "and" {
            (right_label.clone(), skip_label.clone())
        } else {
            (skip_label.clone(), right_label.clone())
        };
        self.emit(Instruction::CondJump {
            cond: left_var,
            then_label,
            else_label,
        });

        self.emit(Instruction::Label(skip_label));
        self.emit(Instruction::LoadBoolConst {
            value: op != "and",
            dest: result.clone(),
        });
        self.emit(Instruction::Jump(end_label.clone()));

        self.emit(Instruction::Label(right_label));
        let right_var = self.visit(right)?;
        self.emit(Instruction::Copy {
            source: right_var,
            dest: result.clone(),
        });
        self.emit(Instruction::Jump(end_label.clone()));

        self.emit(Instruction::Label(end_label));
        Ok(result)
    }

    fn visit_binary(
        &mut self,
        op: &str,
        left: &Expression,
        right: &Expression,
        expr: &Expression,
    ) -> Result<IRVar, IrError> {
        let left_var = self.visit(left)?;
        let right_var = self.visit(right)?;
        let dest = self.fresh_var(expr.ty());
        self.emit(Instruction::Call {
            fun: IRVar::new(op),
            args: vec![left_var, right_var],
            dest: dest.clone(),
        });
        Ok(dest)
    }

    fn visit_if(
        &mut self,
        condition: &Expression,
        then_branch: &Expression,
        else_branch: Option<&Expression>,
        expr: &Expression,
    ) -> Result<IRVar, IrError> {
        match else_branch {
            Some(else_branch) => {
                let then_label = self.fresh_label();
                let else_label = self.fresh_label();
                let end_label = self.fresh_label();

                let cond_var = self.visit(condition)?;
                self.emit(Instruction::CondJump {
                    cond: cond_var,
                    then_label: then_label.clone(),
                    else_label: else_label.clone(),
                });

                let result = self.fresh_var(expr.ty());

                self.emit(Instruction::Label(then_label));
                let then_var = self.visit(then_branch)?;
                self.emit(Instruction::Copy {
                    source: then_var,
                    dest: result.clone(),
                });
                self.emit(Instruction::Jump(end_label.clone()));

                self.emit(Instruction::Label(else_label));
                let else_var = self.visit(else_branch)?;
                self.emit(Instruction::Copy {
                    source: else_var,
                    dest: result.clone(),
                });

                self.emit(Instruction::Label(end_label));
                Ok(result)
            }
            None => {
                let then_label = self.fresh_label();
                let end_label = self.fresh_label();

                let cond_var = self.visit(condition)?;
                self.emit(Instruction::CondJump {
                    cond: cond_var,
                    then_label: then_label.clone(),
                    else_label: end_label.clone(),
                });

                self.emit(Instruction::Label(then_label));
                self.visit(then_branch)?;

                self.emit(Instruction::Label(end_label));
                Ok(self.unit_var())
            }
        }
    }

    fn visit_call(
        &mut self,
        name: &str,
        arguments: &[Expression],
        expr: &Expression,
    ) -> Result<IRVar, IrError> {
        let mut arg_vars = Vec::with_capacity(arguments.len());
        for argument in arguments {
            arg_vars.push(self.visit(argument)?);
        }
        let dest = self.fresh_var(expr.ty());
        self.emit(Instruction::Call {
            fun: IRVar::new(name),
            args: arg_vars,
            dest: dest.clone(),
        });
        Ok(dest)
    }

    fn visit_block(&mut self, statements: &[Expression], result: &Expression) -> Result<IRVar, IrError> {
        self.push_scope();
        let outcome = (|| {
            for statement in statements {
                self.visit(statement)?;
            }
            self.visit(result)
        })();
        self.pop_scope();
        outcome
    }

    fn visit_var_decl(
        &mut self,
        name: &str,
        value: &Expression,
        expr: &Expression,
    ) -> Result<IRVar, IrError> {
        let value_var = self.visit(value)?;
        let dest = self.fresh_var(expr.ty());
        self.emit(Instruction::Copy {
            source: value_var,
            dest: dest.clone(),
        });
        self.bind(name.to_string(), dest.clone())?;
        Ok(dest)
    }

    fn visit_while(&mut self, condition: &Expression, body: &Expression) -> Result<IRVar, IrError> {
        let start_label = self.fresh_label();
        let body_label = self.fresh_label();
        let end_label = self.fresh_label();

        self.emit(Instruction::Label(start_label.clone()));
        let cond_var = self.visit(condition)?;
        self.emit(Instruction::CondJump {
            cond: cond_var,
            then_label: body_label.clone(),
            else_label: end_label.clone(),
        });

        self.emit(Instruction::Label(body_label));
        self.loop_stack.push(LoopState {
            start_label: start_label.clone(),
            end_label: end_label.clone(),
        });
        let body_outcome = self.visit(body);
        self.loop_stack.pop();
        body_outcome?;

        self.emit(Instruction::Jump(start_label));
        self.emit(Instruction::Label(end_label));
        Ok(self.unit_var())
    }

    /// Emit a trailing `print_int`/`print_bool` call iff the program's
    /// final value is an `Int` or `Bool` and isn't already fully consumed
    /// by a `while` loop or bare variable declaration at the top level.
    fn emit_terminal_print(&mut self, program: &Expression, result_var: IRVar) -> Result<(), IrError> {
        let ExpressionKind::Block { result: tail, .. } = &program.kind else {
            return Ok(());
        };
        let excluded = matches!(
            tail.kind,
            ExpressionKind::While { .. } | ExpressionKind::VariableDeclaration { .. }
        );
        if excluded {
            return Ok(());
        }
        let tail_ty = tail.ty();
        let fun_name = if tail_ty.is_int() {
            "print_int"
        } else if tail_ty.is_bool() {
            "print_bool"
        } else {
            return Ok(());
        };
        let dest = self.fresh_var(tail_ty);
        self.emit(Instruction::Call {
            fun: IRVar::new(fun_name),
            args: vec![result_var],
            dest,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use crate::typechecker::typecheck;

    fn generate_source(source: &str) -> Vec<Instruction> {
        let program = parse(tokenize(source).unwrap()).unwrap();
        typecheck(&program).unwrap();
        generate(&program).unwrap()
    }

    #[test]
    fn starts_with_start_label_and_ends_with_return() {
        let instructions = generate_source("1");
        assert_eq!(instructions.first(), Some(&Instruction::Label("Start".to_string())));
        assert_eq!(instructions.last(), Some(&Instruction::Return));
    }

    #[test]
    fn bare_int_literal_gets_implicit_print() {
        let instructions = generate_source("1");
        let has_print = instructions.iter().any(|i| {
            matches!(i, Instruction::Call { fun, .. } if fun.0 == "print_int")
        });
        assert!(has_print);
    }

    #[test]
    fn while_loop_as_tail_has_no_implicit_print() {
        let instructions = generate_source("var a = 10; while a > 0 do { a = a - 1; }");
        let has_print = instructions.iter().any(|i| {
            matches!(i, Instruction::Call { fun, .. } if fun.0 == "print_int" || fun.0 == "print_bool")
        });
        assert!(!has_print);
    }

    #[test]
    fn bare_var_decl_as_tail_has_no_implicit_print() {
        let instructions = generate_source("var a = 1");
        let has_print = instructions.iter().any(|i| {
            matches!(i, Instruction::Call { fun, .. } if fun.0 == "print_int")
        });
        assert!(!has_print);
    }

    #[test]
    fn break_outside_loop_is_defensive_error() {
        // parser forbids this syntactically; construct the AST directly to
        // exercise the IR generator's own defensive check.
        use crate::location::Location;
        let root = Expression::new(
            ExpressionKind::Block {
                statements: vec![],
                result: Box::new(Expression::new(ExpressionKind::Break, Location::new(1, 1))),
            },
            Location::new(1, 1),
        );
        root.set_type(Type::Prim(Primitive::Unit));
        if let ExpressionKind::Block { result, .. } = &root.kind {
            result.set_type(Type::Prim(Primitive::Unit));
        }
        assert!(matches!(generate(&root), Err(IrError::BreakOutsideLoop)));
    }

    #[test]
    fn and_short_circuits_via_labels() {
        let instructions = generate_source("true and false");
        assert!(instructions.iter().any(|i| matches!(i, Instruction::CondJump { .. })));
    }

    #[test]
    fn shadowed_block_scope_reuses_same_ir_var_name_space_without_clash() {
        let instructions = generate_source("{ var a = 1; a }; var a = 2; a");
        // two independent declarations of "a" must bind distinct IRVars
        let decl_vars: Vec<_> = instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::Copy { dest, .. } => Some(dest.clone()),
                _ => None,
            })
            .collect();
        let unique: std::collections::HashSet<_> = decl_vars.iter().collect();
        assert_eq!(decl_vars.len(), unique.len());
    }
}
