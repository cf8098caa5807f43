//! Restricted arithmetic over numeric literals
//!
//! Numeric parameters may be written as small expressions (`1*5`,
//! `0.5*0.5`, `(3 + 1) / 2`). Only literals, `+ - * /`, unary signs and
//! parentheses are accepted; names, calls, attribute access and strings
//! are rejected as unsafe before anything is evaluated.
//!
//! Integer literals stay integral under `+ - *`. Division always produces
//! a float.

use crate::error::{Error, Result};

/// Deepest parenthesis / unary-sign nesting accepted.
const MAX_DEPTH: usize = 64;

/// The result of evaluating an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(Number),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

/// Evaluate a restricted arithmetic expression.
///
/// Errors carry no path; callers attach the location.
pub fn evaluate(expression: &str) -> Result<Number> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(unsafe_expression(expression, "empty expression"));
    }

    let mut parser = Parser {
        expression,
        tokens: &tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(unsafe_expression(
            expression,
            format!("unexpected {} after complete expression", describe(token)),
        ));
    }
    Ok(value)
}

fn unsafe_expression(expression: &str, reason: impl Into<String>) -> Error {
    Error::UnsafeExpression {
        expression: expression.to_string(),
        reason: reason.into(),
        path: String::new(),
    }
}

fn failed(expression: &str, reason: impl Into<String>) -> Error {
    Error::EvaluationFailed {
        expression: expression.to_string(),
        reason: reason.into(),
        path: String::new(),
    }
}

fn describe(token: Token) -> String {
    match token {
        Token::Number(Number::Int(i)) => format!("number {i}"),
        Token::Number(Number::Float(f)) => format!("number {f}"),
        Token::Plus => "'+'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::Star => "'*'".to_string(),
        Token::Slash => "'/'".to_string(),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
    }
}

fn tokenize(expression: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = expression.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' | '-' | '/' | '(' | ')' => {
                chars.next();
                tokens.push(match ch {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '/' => Token::Slash,
                    '(' => Token::LParen,
                    _ => Token::RParen,
                });
            }
            '*' => {
                chars.next();
                if matches!(chars.peek(), Some((_, '*'))) {
                    return Err(unsafe_expression(expression, "operator '**' is not allowed"));
                }
                tokens.push(Token::Star);
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = start;
                let mut seen_exponent = false;
                while let Some(&(idx, c)) = chars.peek() {
                    let is_exponent_sign = seen_exponent
                        && (c == '+' || c == '-')
                        && matches!(expression[..idx].chars().last(), Some('e' | 'E'));
                    if c.is_ascii_digit() || c == '.' || is_exponent_sign {
                        end = idx + c.len_utf8();
                        chars.next();
                    } else if (c == 'e' || c == 'E') && !seen_exponent {
                        seen_exponent = true;
                        end = idx + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(parse_number(expression, &expression[start..end])?));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut end = start;
                while let Some(&(idx, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        end = idx + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                return Err(unsafe_expression(
                    expression,
                    format!("names are not allowed: '{}'", &expression[start..end]),
                ));
            }
            '\'' | '"' => {
                return Err(unsafe_expression(expression, "string literals are not allowed"));
            }
            other => {
                return Err(unsafe_expression(
                    expression,
                    format!("unexpected character '{other}'"),
                ));
            }
        }
    }

    Ok(tokens)
}

fn parse_number(expression: &str, literal: &str) -> Result<Number> {
    let is_float = literal.contains(['.', 'e', 'E']);
    if !is_float {
        return literal
            .parse::<i64>()
            .map(Number::Int)
            .map_err(|_| failed(expression, format!("integer literal out of range: {literal}")));
    }

    let value = literal
        .parse::<f64>()
        .map_err(|_| unsafe_expression(expression, format!("malformed number '{literal}'")))?;
    if value.is_finite() {
        Ok(Number::Float(value))
    } else {
        Err(failed(expression, format!("float literal out of range: {literal}")))
    }
}

struct Parser<'a> {
    expression: &'a str,
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(unsafe_expression(self.expression, "expression nested too deeply"));
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<Number> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = self.apply(op, value, rhs)?;
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<Number> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = self.apply(op, value, rhs)?;
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<Number> {
        match self.peek() {
            Some(Token::Plus) => {
                self.pos += 1;
                self.enter()?;
                let value = self.unary();
                self.depth -= 1;
                value
            }
            Some(Token::Minus) => {
                self.pos += 1;
                self.enter()?;
                let value = self.unary()?;
                self.depth -= 1;
                match value {
                    Number::Int(i) => i
                        .checked_neg()
                        .map(Number::Int)
                        .ok_or_else(|| failed(self.expression, "integer overflow")),
                    Number::Float(f) => Ok(Number::Float(-f)),
                }
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Number> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                self.enter()?;
                let value = self.expr()?;
                self.depth -= 1;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    Some(token) => Err(unsafe_expression(
                        self.expression,
                        format!("expected ')' but found {}", describe(token)),
                    )),
                    None => Err(unsafe_expression(self.expression, "unclosed '('")),
                }
            }
            Some(token) => Err(unsafe_expression(
                self.expression,
                format!("unexpected {}", describe(token)),
            )),
            None => Err(unsafe_expression(self.expression, "unexpected end of expression")),
        }
    }

    fn apply(&self, op: Token, lhs: Number, rhs: Number) -> Result<Number> {
        let overflow = || failed(self.expression, "integer overflow");

        if op == Token::Slash {
            let divisor = rhs.as_f64();
            if divisor == 0.0 {
                return Err(failed(self.expression, "division by zero"));
            }
            return finite(self.expression, lhs.as_f64() / divisor);
        }

        match (lhs, rhs) {
            (Number::Int(a), Number::Int(b)) => {
                let result = match op {
                    Token::Plus => a.checked_add(b),
                    Token::Minus => a.checked_sub(b),
                    _ => a.checked_mul(b),
                };
                result.map(Number::Int).ok_or_else(overflow)
            }
            (a, b) => {
                let (a, b) = (a.as_f64(), b.as_f64());
                let result = match op {
                    Token::Plus => a + b,
                    Token::Minus => a - b,
                    _ => a * b,
                };
                finite(self.expression, result)
            }
        }
    }
}

fn finite(expression: &str, value: f64) -> Result<Number> {
    if value.is_finite() {
        Ok(Number::Float(value))
    } else {
        Err(failed(expression, "result is not finite"))
    }
}
