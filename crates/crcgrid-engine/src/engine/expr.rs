//! Arithmetic expression evaluator for byte formulas.
//!
//! A small recursive descent parser that evaluates while it parses. The
//! grammar is deliberately closed: numeric literals, `+ - * /` with the usual
//! precedence, unary signs, parentheses and the two functions `abs` and
//! `round`. Any other name, operator or character is an error.
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | NAME '(' args ')' | '(' expr ')'
//! NUMBER  := '0X' HEX+ | (DIGIT+ ('.' DIGIT*)? | '.' DIGIT+) EXP?
//! EXP     := 'E' ('+' | '-')? DIGIT+
//! ```

use thiserror::Error;

/// Maximum depth of nested parentheses and unary signs.
pub const MAX_NESTING: usize = 200;

/// Result type for expression evaluation
pub type ExprResult<T> = std::result::Result<T, ExprError>;

/// Errors raised while parsing or evaluating an expression.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprError {
    #[error("Parse error at {pos}: {message}")]
    Parse { pos: usize, message: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Integer overflow")]
    Overflow,

    #[error("Result is not a finite number")]
    NotFinite,

    #[error("Unknown name: {0}")]
    UnknownName(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Wrong number of arguments for {function}: expected 1, got {actual}")]
    ArgumentCount { function: String, actual: usize },

    #[error("Expression nested too deeply")]
    TooDeep,
}

/// A value produced by an expression.
///
/// Integers stay exact through `+ - *`; `/` always produces a float.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    fn checked_add(self, rhs: Number) -> ExprResult<Number> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => {
                a.checked_add(b).map(Number::Int).ok_or(ExprError::Overflow)
            }
            _ => Ok(Number::Float(self.as_f64() + rhs.as_f64())),
        }
    }

    fn checked_sub(self, rhs: Number) -> ExprResult<Number> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => {
                a.checked_sub(b).map(Number::Int).ok_or(ExprError::Overflow)
            }
            _ => Ok(Number::Float(self.as_f64() - rhs.as_f64())),
        }
    }

    fn checked_mul(self, rhs: Number) -> ExprResult<Number> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => {
                a.checked_mul(b).map(Number::Int).ok_or(ExprError::Overflow)
            }
            _ => Ok(Number::Float(self.as_f64() * rhs.as_f64())),
        }
    }

    fn checked_div(self, rhs: Number) -> ExprResult<Number> {
        let divisor = rhs.as_f64();
        if divisor == 0.0 {
            return Err(ExprError::DivisionByZero);
        }
        Ok(Number::Float(self.as_f64() / divisor))
    }

    fn checked_neg(self) -> ExprResult<Number> {
        match self {
            Number::Int(v) => v.checked_neg().map(Number::Int).ok_or(ExprError::Overflow),
            Number::Float(v) => Ok(Number::Float(-v)),
        }
    }

    fn checked_abs(self) -> ExprResult<Number> {
        match self {
            Number::Int(v) => v.checked_abs().map(Number::Int).ok_or(ExprError::Overflow),
            Number::Float(v) => Ok(Number::Float(v.abs())),
        }
    }

    /// Round to the nearest integer, ties to even (`2.5 -> 2`, `3.5 -> 4`).
    pub fn round(self) -> ExprResult<i128> {
        match self {
            Number::Int(v) => Ok(v),
            Number::Float(v) if !v.is_finite() => Err(ExprError::NotFinite),
            Number::Float(v) => {
                let rounded = v.round_ties_even();
                if rounded < i128::MIN as f64 || rounded >= i128::MAX as f64 {
                    return Err(ExprError::Overflow);
                }
                Ok(rounded as i128)
            }
        }
    }

    /// Round, then keep the low 8 bits (two's complement for negatives).
    pub fn to_byte(self) -> ExprResult<u8> {
        Ok(self.round()?.rem_euclid(0x100) as u8)
    }

    /// Round, then keep the low 16 bits (two's complement for negatives).
    pub fn to_word(self) -> ExprResult<u16> {
        Ok(self.round()?.rem_euclid(0x1_0000) as u16)
    }
}

/// Evaluate an arithmetic expression.
///
/// # Example
/// ```
/// use crcgrid_engine::engine::{Number, eval_expression};
///
/// assert_eq!(eval_expression("10+0XFF*2").unwrap(), Number::Int(520));
/// assert_eq!(eval_expression("7/2").unwrap(), Number::Float(3.5));
/// assert!(eval_expression("2**3").is_err());
/// ```
pub fn eval_expression(src: &str) -> ExprResult<Number> {
    let tokens = tokenize(src)?;
    let mut parser = ExprParser::new(tokens);
    let value = parser.parse_expression()?;

    if !parser.is_at_end() {
        return Err(parser.error("Unexpected input after expression"));
    }

    Ok(value)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Number),
    Name(String),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
    Comma,
    Eof,
}

fn tokenize(src: &str) -> ExprResult<Vec<(usize, Token)>> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        let start = pos;

        let token = match c {
            ' ' | '\t' | '\r' | '\n' => {
                pos += 1;
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            ',' => Token::Comma,
            '0'..='9' | '.' => {
                let (number, end) = scan_number(&chars, pos)?;
                pos = end;
                tokens.push((start, Token::Number(number)));
                continue;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                while pos < chars.len()
                    && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_')
                {
                    pos += 1;
                }
                tokens.push((start, Token::Name(chars[start..pos].iter().collect())));
                continue;
            }
            other => {
                return Err(ExprError::Parse {
                    pos,
                    message: format!("Unexpected character '{}'", other),
                });
            }
        };

        tokens.push((start, token));
        pos += 1;
    }

    tokens.push((chars.len(), Token::Eof));
    Ok(tokens)
}

fn scan_number(chars: &[char], start: usize) -> ExprResult<(Number, usize)> {
    let parse_error = |pos: usize, message: &str| ExprError::Parse {
        pos,
        message: message.to_string(),
    };

    // Hex literal: 0X1A2B
    if chars[start] == '0' && matches!(chars.get(start + 1), Some('x' | 'X')) {
        let digits_start = start + 2;
        let mut pos = digits_start;
        while pos < chars.len() && chars[pos].is_ascii_hexdigit() {
            pos += 1;
        }
        if pos == digits_start {
            return Err(parse_error(start, "Invalid hexadecimal literal"));
        }
        let digits: String = chars[digits_start..pos].iter().collect();
        let value = i128::from_str_radix(&digits, 16).map_err(|_| ExprError::Overflow)?;
        return Ok((Number::Int(value), pos));
    }

    let mut pos = start;
    while pos < chars.len() && chars[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_end = pos;

    let mut is_float = false;
    if pos < chars.len() && chars[pos] == '.' {
        pos += 1;
        while pos < chars.len() && chars[pos].is_ascii_digit() {
            pos += 1;
        }
        if int_end == start && pos == start + 1 {
            return Err(parse_error(start, "Invalid number"));
        }
        is_float = true;
    }

    // Exponent: 1E3, 2.5E-1. Without digits the `E` is left for the next token.
    if pos < chars.len() && matches!(chars[pos], 'e' | 'E') {
        let mut exp = pos + 1;
        if exp < chars.len() && matches!(chars[exp], '+' | '-') {
            exp += 1;
        }
        let exp_digits = exp;
        while exp < chars.len() && chars[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > exp_digits {
            pos = exp;
            is_float = true;
        }
    }

    if is_float {
        let text: String = chars[start..pos].iter().collect();
        let value = text.parse::<f64>().map_err(|_| parse_error(start, "Invalid number"))?;
        return Ok((Number::Float(value), pos));
    }

    let digits: String = chars[start..int_end].iter().collect();
    if digits.len() > 1 && digits.starts_with('0') && digits.bytes().any(|b| b != b'0') {
        return Err(parse_error(start, "Leading zeros are not permitted in integers"));
    }
    let value = digits.parse::<i128>().map_err(|_| ExprError::Overflow)?;
    Ok((Number::Int(value), int_end))
}

/// Expression parser
struct ExprParser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    depth: usize,
}

impl ExprParser {
    fn new(tokens: Vec<(usize, Token)>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> &Token {
        // The token list always ends with Eof and the parser never advances past it.
        &self.tokens[self.pos].1
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        *self.peek() == Token::Eof
    }

    fn error(&self, message: &str) -> ExprError {
        ExprError::Parse {
            pos: self.tokens[self.pos].0,
            message: message.to_string(),
        }
    }

    fn expect(&mut self, expected: Token, message: &str) -> ExprResult<()> {
        if *self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ExprResult<T>) -> ExprResult<T> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ExprError::TooDeep);
        }
        let result = f(self);
        self.depth -= 1;
        result
    }

    // === Grammar ===

    fn parse_expression(&mut self) -> ExprResult<Number> {
        let mut lhs = self.parse_term()?;
        loop {
            match self.peek() {
                Token::Plus => {
                    self.advance();
                    lhs = lhs.checked_add(self.parse_term()?)?;
                }
                Token::Minus => {
                    self.advance();
                    lhs = lhs.checked_sub(self.parse_term()?)?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_term(&mut self) -> ExprResult<Number> {
        let mut lhs = self.parse_unary()?;
        loop {
            match self.peek() {
                Token::Star => {
                    self.advance();
                    lhs = lhs.checked_mul(self.parse_unary()?)?;
                }
                Token::Slash => {
                    self.advance();
                    lhs = lhs.checked_div(self.parse_unary()?)?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_unary(&mut self) -> ExprResult<Number> {
        match self.peek() {
            Token::Minus => {
                self.advance();
                self.nested(|p| p.parse_unary())?.checked_neg()
            }
            Token::Plus => {
                self.advance();
                self.nested(|p| p.parse_unary())
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> ExprResult<Number> {
        match self.peek().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(n)
            }
            Token::LeftParen => {
                self.advance();
                let value = self.nested(|p| p.parse_expression())?;
                self.expect(Token::RightParen, "Expected ')'")?;
                Ok(value)
            }
            Token::Name(name) => {
                self.advance();
                if *self.peek() != Token::LeftParen {
                    return Err(ExprError::UnknownName(name));
                }
                self.advance();
                let args = self.nested(|p| p.parse_arguments())?;
                call_function(&name, &args)
            }
            Token::Eof => Err(self.error("Unexpected end of expression")),
            _ => Err(self.error("Unexpected token")),
        }
    }

    fn parse_arguments(&mut self) -> ExprResult<Vec<Number>> {
        let mut args = Vec::new();
        if *self.peek() == Token::RightParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            match self.peek() {
                Token::Comma => self.advance(),
                Token::RightParen => {
                    self.advance();
                    return Ok(args);
                }
                _ => return Err(self.error("Expected ',' or ')'")),
            }
        }
    }
}

fn call_function(name: &str, args: &[Number]) -> ExprResult<Number> {
    let upper = name.to_ascii_uppercase();
    let arg = match (upper.as_str(), args) {
        ("ABS" | "ROUND", [arg]) => *arg,
        ("ABS" | "ROUND", _) => {
            return Err(ExprError::ArgumentCount {
                function: upper,
                actual: args.len(),
            });
        }
        _ => return Err(ExprError::UnknownFunction(name.to_string())),
    };

    match upper.as_str() {
        "ABS" => arg.checked_abs(),
        _ => arg.round().map(Number::Int),
    }
}
