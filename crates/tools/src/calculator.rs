//! Calculator tool — restricted arithmetic over free-form input.
//!
//! Input passes a character allow-list (digits, `+ - * / ( ) .`, spaces)
//! and is then evaluated by a recursive-descent parser over exactly that
//! grammar. There is no general-purpose evaluator behind the filter — the
//! allow-list names the rule for the user, the grammar enforces it.

use async_trait::async_trait;
use cornerman_core::tool::{Tool, ToolOutcome};
use tracing::debug;

/// Characters an expression may contain (whitespace checked separately).
const ALLOWED_CHARS: &str = "0123456789+-*/(). ";

pub struct CalculatorTool;

/// Tool name used by the marker protocol.
pub const CALCULATOR_TOOL_NAME: &str = "calcular";

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        CALCULATOR_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Calculadora para operaciones básicas: +, -, *, / y paréntesis"
    }

    async fn run(&self, input: &str) -> ToolOutcome {
        debug!(expression = %input, "calculator invoked");

        if !input
            .chars()
            .all(|c| ALLOWED_CHARS.contains(c) || c.is_whitespace())
        {
            return ToolOutcome::failed(
                "Error: Expresión no válida. Solo números y operadores básicos (+, -, *, /, (), .)",
            );
        }

        match evaluate(input) {
            Ok(value) => ToolOutcome::ok(format!("El resultado de '{input}' es: {value:?}")),
            Err(EvalError::DivisionByZero) => {
                ToolOutcome::failed("Error: División por cero no permitida.")
            }
            Err(EvalError::Syntax(reason)) => {
                ToolOutcome::failed(format!("Error al calcular '{input}': {reason}"))
            }
        }
    }
}

// ── Recursive-descent expression evaluator ────────────────────────────────

#[derive(Debug, PartialEq)]
pub enum EvalError {
    DivisionByZero,
    Syntax(String),
}

/// Evaluate an arithmetic expression: `+ - * /`, parentheses, unary
/// negation, decimal literals.
pub fn evaluate(expr: &str) -> Result<f64, EvalError> {
    let tokens = tokenize(expr)?;
    let mut cursor = Cursor { tokens, pos: 0 };
    let value = cursor.expression()?;
    if cursor.pos < cursor.tokens.len() {
        return Err(EvalError::Syntax(format!(
            "símbolo inesperado: {}",
            cursor.tokens[cursor.pos]
        )));
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Open,
    Close,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Open => write!(f, "("),
            Token::Close => write!(f, ")"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value: f64 = literal
                    .parse()
                    .map_err(|_| EvalError::Syntax(format!("número inválido: {literal}")))?;
                tokens.push(Token::Number(value));
            }
            other => {
                return Err(EvalError::Syntax(format!("carácter inesperado: '{other}'")));
            }
        }
    }

    Ok(tokens)
}

struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    // expression = term (('+' | '-') term)*
    fn expression(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.next();
                    value += self.term()?;
                }
                Token::Minus => {
                    self.next();
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // term = unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.unary()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.next();
                    value *= self.unary()?;
                }
                Token::Slash => {
                    self.next();
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // unary = '-' unary | primary
    fn unary(&mut self) -> Result<f64, EvalError> {
        if let Some(Token::Minus) = self.peek() {
            self.next();
            return Ok(-self.unary()?);
        }
        self.primary()
    }

    // primary = NUMBER | '(' expression ')'
    fn primary(&mut self) -> Result<f64, EvalError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::Open) => {
                let value = self.expression()?;
                match self.next() {
                    Some(Token::Close) => Ok(value),
                    _ => Err(EvalError::Syntax("falta un paréntesis de cierre".into())),
                }
            }
            Some(token) => Err(EvalError::Syntax(format!("símbolo inesperado: {token}"))),
            None => Err(EvalError::Syntax("expresión incompleta".into())),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
