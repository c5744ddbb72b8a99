//! Filter expressions over quote fields.
//!
//! ```text
//! expr       := and ( "||" and )*
//! and        := unary ( "&&" unary )*
//! unary      := "!" unary | "(" expr ")" | comparison
//! comparison := operand ( "<" | "<=" | ">" | ">=" | "==" | "!=" ) operand
//! operand    := number | "-" number | field
//! ```
//!
//! Field names are case-insensitive: `last`, `change`, `changePercent`,
//! `open`, `low`, `high`, `low52`, `high52`, `volume`, `avgVolume`, `pe`,
//! `marketCap` (plus a few aliases, see [`field_column`]).
//!
//! `(` and `!` nest at most [`MAX_DEPTH`] levels deep.
//!
//! Compiled once when the filter is set, evaluated for every quote on render.

use thiserror::Error;

use super::{Column, Quote};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },

    #[error("invalid number '{text}' at position {pos}")]
    InvalidNumber { pos: usize, text: String },

    #[error("unknown field '{name}' at position {pos}")]
    UnknownField { pos: usize, name: String },

    #[error("expected {expected} at position {pos}")]
    Expected { pos: usize, expected: &'static str },

    #[error("unexpected end of expression, expected {0}")]
    UnexpectedEnd(&'static str),

    #[error("expression nested too deeply at position {pos}")]
    TooDeep { pos: usize },
}

/// Deepest `(`/`!` nesting accepted.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CmpOp {
    fn apply(self, left: f64, right: f64) -> bool {
        match self {
            CmpOp::Lt => left < right,
            CmpOp::Le => left <= right,
            CmpOp::Gt => left > right,
            CmpOp::Ge => left >= right,
            CmpOp::Eq => left == right,
            CmpOp::Ne => left != right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Field(Column),
    Number(f64),
}

impl Operand {
    fn eval(self, quote: &Quote) -> f64 {
        match self {
            Operand::Field(column) => quote.value(column).unwrap_or(0.0),
            Operand::Number(n) => n,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Compare {
        left: Operand,
        op: CmpOp,
        right: Operand,
    },
    /// Every term holds. Chains of `&&` stay flat.
    And(Vec<Expr>),
    /// Some term holds.
    Or(Vec<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    fn eval(&self, quote: &Quote) -> bool {
        match self {
            Expr::Compare { left, op, right } => op.apply(left.eval(quote), right.eval(quote)),
            Expr::And(terms) => terms.iter().all(|t| t.eval(quote)),
            Expr::Or(terms) => terms.iter().any(|t| t.eval(quote)),
            Expr::Not(e) => !e.eval(quote),
        }
    }
}

/// A compiled filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpr {
    root: Expr,
}

impl FilterExpr {
    pub fn parse(source: &str) -> Result<Self, FilterError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let root = parser.expr()?;
        if let Some(tok) = parser.peek() {
            return Err(FilterError::Expected {
                pos: tok.pos,
                expected: "'&&', '||' or end of expression",
            });
        }
        Ok(Self { root })
    }

    pub fn matches(&self, quote: &Quote) -> bool {
        self.root.eval(quote)
    }
}

/// Map a field name to the column it reads. Case-insensitive.
pub fn field_column(name: &str) -> Option<Column> {
    let column = match name.to_ascii_lowercase().as_str() {
        "last" | "lasttrade" | "price" => Column::Last,
        "change" => Column::Change,
        "changepercent" | "changepct" => Column::ChangePercent,
        "open" => Column::Open,
        "low" => Column::Low,
        "high" => Column::High,
        "low52" => Column::Low52,
        "high52" => Column::High52,
        "volume" => Column::Volume,
        "avgvolume" => Column::AvgVolume,
        "pe" | "peratio" => Column::PeRatio,
        "marketcap" | "mktcap" => Column::MarketCap,
        _ => return None,
    };
    Some(column)
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Ident(String),
    Cmp(CmpOp),
    And,
    Or,
    Not,
    Minus,
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, FilterError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let pos = i;
        let next = chars.get(i + 1).copied();

        let (kind, len) = match ch {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '(' => (TokenKind::LParen, 1),
            ')' => (TokenKind::RParen, 1),
            '-' => (TokenKind::Minus, 1),
            '&' if next == Some('&') => (TokenKind::And, 2),
            '|' if next == Some('|') => (TokenKind::Or, 2),
            '<' if next == Some('=') => (TokenKind::Cmp(CmpOp::Le), 2),
            '<' => (TokenKind::Cmp(CmpOp::Lt), 1),
            '>' if next == Some('=') => (TokenKind::Cmp(CmpOp::Ge), 2),
            '>' => (TokenKind::Cmp(CmpOp::Gt), 1),
            '=' if next == Some('=') => (TokenKind::Cmp(CmpOp::Eq), 2),
            '!' if next == Some('=') => (TokenKind::Cmp(CmpOp::Ne), 2),
            '!' => (TokenKind::Not, 1),
            c if c.is_ascii_digit() || c == '.' => {
                let end = scan(&chars, i, |c| c.is_ascii_digit() || c == '.');
                let text: String = chars[i..end].iter().collect();
                let n = text
                    .parse::<f64>()
                    .map_err(|_| FilterError::InvalidNumber { pos, text })?;
                (TokenKind::Number(n), end - i)
            }
            c if c.is_ascii_alphabetic() => {
                let end = scan(&chars, i, |c| c.is_ascii_alphanumeric() || c == '_');
                let text: String = chars[i..end].iter().collect();
                (TokenKind::Ident(text), end - i)
            }
            c => return Err(FilterError::UnexpectedChar { pos, ch: c }),
        };

        tokens.push(Token { kind, pos });
        i += len;
    }

    Ok(tokens)
}

fn scan(chars: &[char], start: usize, accept: impl Fn(char) -> bool) -> usize {
    let mut end = start;
    while end < chars.len() && accept(chars[end]) {
        end += 1;
    }
    end
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Open `(` and `!` around the current position.
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().map(|t| &t.kind) == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<Expr, FilterError> {
        let mut terms = vec![self.and()?];
        while self.eat(&TokenKind::Or) {
            terms.push(self.and()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expr::Or(terms)
        })
    }

    fn and(&mut self) -> Result<Expr, FilterError> {
        let mut terms = vec![self.unary()?];
        while self.eat(&TokenKind::And) {
            terms.push(self.unary()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expr::And(terms)
        })
    }

    fn unary(&mut self) -> Result<Expr, FilterError> {
        let nested = matches!(
            self.peek().map(|t| &t.kind),
            Some(TokenKind::Not | TokenKind::LParen)
        );
        if !nested {
            return self.comparison();
        }
        if self.depth == MAX_DEPTH {
            let pos = self.peek().map_or(0, |t| t.pos);
            return Err(FilterError::TooDeep { pos });
        }
        self.depth += 1;
        let expr = self.nested();
        self.depth -= 1;
        expr
    }

    /// `!` operand or parenthesised expression.
    fn nested(&mut self) -> Result<Expr, FilterError> {
        if self.eat(&TokenKind::Not) {
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }
        if self.eat(&TokenKind::LParen) {
            let inner = self.expr()?;
            return match self.bump() {
                Some(Token {
                    kind: TokenKind::RParen,
                    ..
                }) => Ok(inner),
                Some(tok) => Err(FilterError::Expected {
                    pos: tok.pos,
                    expected: "')'",
                }),
                None => Err(FilterError::UnexpectedEnd("')'")),
            };
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, FilterError> {
        let left = self.operand()?;
        let op = match self.bump() {
            Some(Token {
                kind: TokenKind::Cmp(op),
                ..
            }) => op,
            Some(tok) => {
                return Err(FilterError::Expected {
                    pos: tok.pos,
                    expected: "comparison operator",
                })
            }
            None => return Err(FilterError::UnexpectedEnd("comparison operator")),
        };
        let right = self.operand()?;
        Ok(Expr::Compare { left, op, right })
    }

    fn operand(&mut self) -> Result<Operand, FilterError> {
        let tok = self
            .bump()
            .ok_or(FilterError::UnexpectedEnd("number or field name"))?;
        match tok.kind {
            TokenKind::Number(n) => Ok(Operand::Number(n)),
            TokenKind::Minus => match self.bump() {
                Some(Token {
                    kind: TokenKind::Number(n),
                    ..
                }) => Ok(Operand::Number(-n)),
                Some(tok) => Err(FilterError::Expected {
                    pos: tok.pos,
                    expected: "number after '-'",
                }),
                None => Err(FilterError::UnexpectedEnd("number after '-'")),
            },
            TokenKind::Ident(name) => field_column(&name)
                .map(Operand::Field)
                .ok_or(FilterError::UnknownField { pos: tok.pos, name }),
            _ => Err(FilterError::Expected {
                pos: tok.pos,
                expected: "number or field name",
            }),
        }
    }
}
