//! Infix expression compiler front end.
//!
//! Turns text such as `"(1 + 2) * 3.5"` into an [`Ast`] using precedence
//! climbing. Only numeric literals, the four binary operators and
//! parentheses are accepted; anything else (unary signs, identifiers,
//! function calls) is a [`CoreError::Syntax`] naming the offending fragment.
//!
//! The AST is flattened into an arena-backed [`Graph`](crate::graph::Graph)
//! by [`compile`](crate::graph::compile).

use crate::error::CoreError;
use crate::operator::Operator;

/// Maximum parenthesis / operator nesting accepted by the compiler.
pub const MAX_DEPTH: usize = 256;

/// Maximum number of tokens in one expression. Bounds the depth of
/// left-leaning operator chains, which do not count towards [`MAX_DEPTH`].
pub const MAX_TOKENS: usize = 4096;

/// Parsed expression tree. Leaves are literals, inner nodes binary operators.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Number(f64),
    Binary {
        op: Operator,
        left: Box<Ast>,
        right: Box<Ast>,
    },
}

impl Ast {
    /// Evaluate locally, respecting operand order. Reference for tests.
    #[cfg(test)]
    pub(crate) fn evaluate(&self) -> Option<f64> {
        match self {
            Ast::Number(v) => Some(*v),
            Ast::Binary { op, left, right } => op.apply(left.evaluate()?, right.evaluate()?).ok(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Op(Operator),
    LParen,
    RParen,
}

/// A token with the byte offset it started at, for error messages.
#[derive(Debug, Clone, Copy)]
struct Spanned {
    token: Token,
    pos: usize,
}

/// Parse an infix arithmetic expression.
pub fn parse(input: &str) -> Result<Ast, CoreError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(CoreError::syntax("expression is empty"));
    }

    let mut parser = Parser {
        tokens: &tokens,
        cursor: 0,
        depth: 0,
    };
    let ast = parser.expression(0)?;

    if let Some(extra) = parser.peek() {
        return Err(CoreError::syntax(format!(
            "unexpected {} at position {}",
            describe(extra.token),
            extra.pos
        )));
    }
    Ok(ast)
}

fn tokenize(input: &str) -> Result<Vec<Spanned>, CoreError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_ascii_whitespace() {
            chars.next();
            continue;
        }

        let token = if let Some(op) = Operator::from_symbol(c) {
            chars.next();
            Token::Op(op)
        } else if c == '(' {
            chars.next();
            Token::LParen
        } else if c == ')' {
            chars.next();
            Token::RParen
        } else if c.is_ascii_digit() || c == '.' {
            let mut end = pos;
            let mut prev = c;
            while let Some(&(i, d)) = chars.peek() {
                let exponent_sign = (d == '+' || d == '-') && (prev == 'e' || prev == 'E');
                if d.is_ascii_digit() || d == '.' || d == 'e' || d == 'E' || exponent_sign {
                    end = i + d.len_utf8();
                    prev = d;
                    chars.next();
                } else {
                    break;
                }
            }
            let text = &input[pos..end];
            match text.parse::<f64>() {
                Ok(v) if v.is_finite() => Token::Number(v),
                _ => return Err(CoreError::syntax(format!("invalid number '{text}'"))),
            }
        } else {
            let fragment: String = input[pos..]
                .chars()
                .take_while(|ch| ch.is_alphanumeric() || *ch == '_')
                .collect();
            let fragment = if fragment.is_empty() {
                c.to_string()
            } else {
                fragment
            };
            return Err(CoreError::syntax(format!(
                "unsupported token '{fragment}' at position {pos}"
            )));
        };

        tokens.push(Spanned { token, pos });
        if tokens.len() > MAX_TOKENS {
            return Err(CoreError::syntax(format!(
                "expression longer than {MAX_TOKENS} tokens"
            )));
        }
    }

    Ok(tokens)
}

fn describe(token: Token) -> String {
    match token {
        Token::Number(v) => format!("number {v}"),
        Token::Op(op) => format!("operator '{op}'"),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
    }
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    cursor: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Spanned> {
        self.tokens.get(self.cursor).copied()
    }

    fn advance(&mut self) -> Option<Spanned> {
        let next = self.peek();
        if next.is_some() {
            self.cursor += 1;
        }
        next
    }

    /// Precedence climbing: parse operands joined by operators binding at
    /// least as tightly as `min_power`. All operators are left-associative.
    fn expression(&mut self, min_power: u8) -> Result<Ast, CoreError> {
        self.enter()?;
        let mut lhs = self.operand()?;

        while let Some(Spanned {
            token: Token::Op(op),
            ..
        }) = self.peek()
        {
            let power = op.binding_power();
            if power < min_power {
                break;
            }
            self.advance();
            let rhs = self.expression(power + 1)?;
            lhs = Ast::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
            };
        }

        self.depth -= 1;
        Ok(lhs)
    }

    fn operand(&mut self) -> Result<Ast, CoreError> {
        match self.advance() {
            Some(Spanned {
                token: Token::Number(v),
                ..
            }) => Ok(Ast::Number(v)),
            Some(Spanned {
                token: Token::LParen,
                pos,
            }) => {
                if let Some(Spanned {
                    token: Token::RParen,
                    ..
                }) = self.peek()
                {
                    return Err(CoreError::syntax(format!(
                        "empty parentheses at position {pos}"
                    )));
                }
                let inner = self.expression(0)?;
                match self.advance() {
                    Some(Spanned {
                        token: Token::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(CoreError::syntax(format!(
                        "expected ')' but found {} at position {}",
                        describe(other.token),
                        other.pos
                    ))),
                    None => Err(CoreError::syntax(format!(
                        "unclosed '(' at position {pos}"
                    ))),
                }
            }
            Some(Spanned {
                token: Token::Op(op),
                pos,
            }) => Err(CoreError::syntax(format!(
                "unary operator '{op}' at position {pos} is not supported"
            ))),
            Some(Spanned {
                token: Token::RParen,
                pos,
            }) => Err(CoreError::syntax(format!("unexpected ')' at position {pos}"))),
            None => Err(CoreError::syntax("expression ends where an operand was expected")),
        }
    }

    fn enter(&mut self) -> Result<(), CoreError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CoreError::syntax(format!(
                "expression nested deeper than {MAX_DEPTH} levels"
            )));
        }
        Ok(())
    }
}
