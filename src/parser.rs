//! Parser: token cursor to AST.
//!
//! Pratt / precedence-climbing over the binary-operator ladder (low to
//! high): `or`, `and`, equality, relational, additive, multiplicative.
//! Assignment is right-associative and binds looser than `or`. Unary `-`
//! and `not` bind tighter than any binary operator.
//!
//! A scope stack tracks where `var`/`const` declarations and `break`/
//! `continue` are legal, pushed and popped around every lexical region
//! (parens, blocks, while-bodies) on every exit path, including errors —
//! each push has a matching pop in the same function, so a `?` bailing out
//! mid-block still unwinds the stack via the caller's own pop.

use crate::ast::{Expression, ExpressionKind, Literal, TypeExpression};
use crate::errors::ParseError;
use crate::location::Location;
use crate::token::{Cursor, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    TopLevel,
    TopLevelExpression,
    Block,
    Local,
    While,
}

pub struct Parser {
    cursor: Cursor,
    scopes: Vec<Scope>,
}

pub fn parse(tokens: Vec<Token>) -> Result<Expression, ParseError> {
    let mut parser = Parser {
        cursor: Cursor::new(tokens),
        scopes: vec![Scope::TopLevel],
    };
    let start_location = parser.cursor.peek().location;
    let (statements, result) = parser.parse_top_level_sequence()?;
    let end = parser.cursor.peek();
    if end.kind != TokenKind::End {
        return Err(ParseError::EndOfInputExpected {
            found: end.text,
            location: end.location,
        });
    }
    Ok(Expression::new(
        ExpressionKind::Block {
            statements,
            result: Box::new(result),
        },
        start_location,
    ))
}

impl Parser {
    fn declarations_allowed(&self) -> bool {
        matches!(
            self.scopes.last(),
            Some(Scope::TopLevel) | Some(Scope::TopLevelExpression) | Some(Scope::Block)
        )
    }

    fn in_loop(&self) -> bool {
        self.scopes.iter().any(|s| *s == Scope::While)
    }

    /// `expr (';' expr)* ';'?` at the top level. Unlike block parsing, a
    /// non-compound expression not followed by `;` simply ends the
    /// sequence — any leftover tokens are caught by the caller's final
    /// `peek() == End` check, which raises `end-of-input`.
    fn parse_top_level_sequence(
        &mut self,
    ) -> Result<(Vec<Expression>, Expression), ParseError> {
        let mut statements = Vec::new();
        loop {
            let tok = self.cursor.peek();
            if tok.kind == TokenKind::End {
                return Ok((statements, unit_literal(tok.location)));
            }
            let expr = self.parse_expression()?;
            if self.cursor.peek().text == ";" {
                self.cursor.advance();
                statements.push(expr);
                if self.scopes.last() == Some(&Scope::TopLevel) {
                    *self.scopes.last_mut().unwrap() = Scope::TopLevelExpression;
                }
                continue;
            }
            return Ok((statements, expr));
        }
    }

    /// `'{' (expr ';' | expr)* '}'`. Compound expressions (block, function
    /// call, if) may be followed directly by another statement with no
    /// semicolon; any other expression must be followed by `;` or `}`.
    fn parse_block_sequence(&mut self) -> Result<(Vec<Expression>, Expression), ParseError> {
        let mut statements = Vec::new();
        loop {
            if self.cursor.peek().text == "}" {
                return Ok((statements, unit_literal(self.cursor.peek().location)));
            }
            let expr = self.parse_expression()?;
            let is_compound = matches!(
                expr.kind,
                ExpressionKind::Block { .. }
                    | ExpressionKind::FunctionCall { .. }
                    | ExpressionKind::If { .. }
            );
            if self.cursor.peek().text == "}" {
                return Ok((statements, expr));
            }
            if self.cursor.peek().text == ";" {
                self.cursor.advance();
                statements.push(expr);
                continue;
            }
            if is_compound {
                statements.push(expr);
                continue;
            }
            return Err(ParseError::MissingSemicolon {
                location: self.cursor.peek().location,
            });
        }
    }

    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expression, ParseError> {
        let left = self.parse_or()?;
        if self.cursor.peek().text == "=" {
            self.cursor.advance();
            let right = self.parse_assignment()?;
            let location = left.location.clone();
            return Ok(Expression::new(
                ExpressionKind::BinaryOp {
                    op: "=".to_string(),
                    left: Box::new(left),
                    right: Box::new(right),
                },
                location,
            ));
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expression, ParseError> {
        self.parse_left_assoc(&["or"], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Expression, ParseError> {
        self.parse_left_assoc(&["and"], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<Expression, ParseError> {
        self.parse_left_assoc(&["==", "!="], Self::parse_relational)
    }

    fn parse_relational(&mut self) -> Result<Expression, ParseError> {
        self.parse_left_assoc(&["<", "<=", ">", ">="], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> Result<Expression, ParseError> {
        self.parse_left_assoc(&["+", "-"], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, ParseError> {
        self.parse_left_assoc(&["*", "/", "%"], Self::parse_unary)
    }

    fn parse_left_assoc(
        &mut self,
        ops: &[&str],
        next: fn(&mut Parser) -> Result<Expression, ParseError>,
    ) -> Result<Expression, ParseError> {
        let mut left = next(self)?;
        loop {
            let tok = self.cursor.peek();
            if !ops.contains(&tok.text.as_str()) {
                break;
            }
            self.cursor.advance();
            let right = next(self)?;
            let location = left.location.clone();
            left = Expression::new(
                ExpressionKind::BinaryOp {
                    op: tok.text,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                location,
            );
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        let tok = self.cursor.peek();
        if tok.text == "-" || tok.text == "not" {
            self.cursor.advance();
            let operand = self.parse_unary()?;
            return Ok(Expression::new(
                ExpressionKind::UnaryOp {
                    op: tok.text,
                    operand: Box::new(operand),
                },
                tok.location,
            ));
        }
        self.parse_leaf()
    }

    fn parse_leaf(&mut self) -> Result<Expression, ParseError> {
        let tok = self.cursor.peek();
        match tok.kind {
            TokenKind::IntLiteral => {
                self.cursor.advance();
                let value: i64 = tok.text.parse().map_err(|_| ParseError::WrongToken {
                    found: tok.text.clone(),
                    location: tok.location.clone(),
                })?;
                Ok(Expression::new(
                    ExpressionKind::Literal(Literal::Int(value)),
                    tok.location,
                ))
            }
            TokenKind::BoolLiteral => {
                self.cursor.advance();
                Ok(Expression::new(
                    ExpressionKind::Literal(Literal::Bool(tok.text == "true")),
                    tok.location,
                ))
            }
            TokenKind::Punctuation if tok.text == "(" => self.parse_parenthesized(),
            TokenKind::Punctuation if tok.text == "{" => self.parse_block(),
            TokenKind::Identifier if tok.text == "if" => self.parse_if(),
            TokenKind::Identifier if tok.text == "while" => self.parse_while(),
            TokenKind::Identifier if tok.text == "var" || tok.text == "const" => {
                self.parse_var_decl()
            }
            TokenKind::Identifier if tok.text == "break" => {
                self.cursor.advance();
                if !self.in_loop() {
                    return Err(ParseError::WrongScope {
                        keyword: "break".to_string(),
                        location: tok.location,
                    });
                }
                Ok(Expression::new(ExpressionKind::Break, tok.location))
            }
            TokenKind::Identifier if tok.text == "continue" => {
                self.cursor.advance();
                if !self.in_loop() {
                    return Err(ParseError::WrongScope {
                        keyword: "continue".to_string(),
                        location: tok.location,
                    });
                }
                Ok(Expression::new(ExpressionKind::Continue, tok.location))
            }
            TokenKind::Identifier => {
                if self.cursor.peek_next().text == "(" {
                    self.parse_function_call()
                } else {
                    self.cursor.advance();
                    Ok(Expression::new(
                        ExpressionKind::Identifier(tok.text),
                        tok.location,
                    ))
                }
            }
            _ => Err(ParseError::WrongToken {
                found: tok.text,
                location: tok.location,
            }),
        }
    }

    fn parse_parenthesized(&mut self) -> Result<Expression, ParseError> {
        self.cursor.consume("(")?;
        self.scopes.push(Scope::Local);
        let inner = self.parse_expression();
        self.scopes.pop();
        let inner = inner?;
        self.cursor.consume(")")?;
        Ok(inner)
    }

    fn parse_block(&mut self) -> Result<Expression, ParseError> {
        let open = self.cursor.consume("{")?;
        self.scopes.push(Scope::Block);
        let sequence = self.parse_block_sequence();
        self.scopes.pop();
        let (statements, result) = sequence?;
        self.cursor.consume("}")?;
        Ok(Expression::new(
            ExpressionKind::Block {
                statements,
                result: Box::new(result),
            },
            open.location,
        ))
    }

    fn parse_if(&mut self) -> Result<Expression, ParseError> {
        let if_tok = self.cursor.consume("if")?;
        let condition = self.parse_expression()?;
        self.cursor.consume("then")?;
        let then_branch = self.parse_expression()?;
        let else_branch = if self.cursor.peek().text == "else" {
            self.cursor.advance();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        Ok(Expression::new(
            ExpressionKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch,
            },
            if_tok.location,
        ))
    }

    fn parse_while(&mut self) -> Result<Expression, ParseError> {
        let while_tok = self.cursor.consume("while")?;
        let condition = self.parse_expression()?;
        self.cursor.consume("do")?;
        self.scopes.push(Scope::While);
        let body = self.parse_block();
        self.scopes.pop();
        let body = body?;
        Ok(Expression::new(
            ExpressionKind::While {
                condition: Box::new(condition),
                body: Box::new(body),
            },
            while_tok.location,
        ))
    }

    fn parse_var_decl(&mut self) -> Result<Expression, ParseError> {
        let kw = self.cursor.advance();
        if !self.declarations_allowed() {
            return Err(ParseError::VariableCannotBeDeclaredHere {
                location: kw.location,
            });
        }
        let is_const = kw.text == "const";
        let name_tok = self.expect_identifier()?;
        let declared_type = if self.cursor.peek().text == ":" {
            self.cursor.advance();
            Some(self.parse_type_annotation()?)
        } else {
            None
        };
        self.cursor.consume("=")?;
        let value = self.parse_expression()?;
        Ok(Expression::new(
            ExpressionKind::VariableDeclaration {
                name: name_tok.text,
                is_const,
                declared_type,
                value: Box::new(value),
            },
            kw.location,
        ))
    }

    fn parse_type_annotation(&mut self) -> Result<TypeExpression, ParseError> {
        let tok = self.cursor.peek();
        if tok.kind == TokenKind::Type {
            self.cursor.advance();
            return Ok(match tok.text.as_str() {
                "Int" => TypeExpression::Int,
                "Bool" => TypeExpression::Bool,
                _ => unreachable!("lexer only emits Int/Bool as Type tokens"),
            });
        }
        if tok.kind == TokenKind::End || tok.text == "=" {
            return Err(ParseError::MissingType {
                location: tok.location,
            });
        }
        self.cursor.advance();
        Err(ParseError::UnknownType {
            found: tok.text,
            location: tok.location,
        })
    }

    fn parse_function_call(&mut self) -> Result<Expression, ParseError> {
        let name_tok = self.cursor.advance();
        self.cursor.consume("(")?;
        let mut arguments = Vec::new();
        if self.cursor.peek().text != ")" {
            loop {
                arguments.push(self.parse_expression()?);
                if self.cursor.peek().text == "," {
                    self.cursor.advance();
                    if self.cursor.peek().text == ")" {
                        return Err(ParseError::WrongToken {
                            found: ")".to_string(),
                            location: self.cursor.peek().location,
                        });
                    }
                    continue;
                }
                break;
            }
        }
        self.cursor.consume(")")?;
        Ok(Expression::new(
            ExpressionKind::FunctionCall {
                name: name_tok.text,
                arguments,
            },
            name_tok.location,
        ))
    }

    fn expect_identifier(&mut self) -> Result<Token, ParseError> {
        let tok = self.cursor.peek();
        if tok.kind != TokenKind::Identifier {
            return Err(ParseError::WrongToken {
                found: tok.text,
                location: tok.location,
            });
        }
        Ok(self.cursor.advance())
    }
}

fn unit_literal(location: Location) -> Expression {
    Expression::new(ExpressionKind::Literal(Literal::Unit), location)
}
