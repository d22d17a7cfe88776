//! Pratt parser producing an [`Expr`] tree.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr    := expr ('+' | '-') expr        (left assoc)
//!          | expr ('*' | '/') expr        (left assoc)
//!          | ('-' | '+') expr             (prefix)
//!          | primary
//! primary := number | '[' text ']' | ident | call | '(' expr ')'
//! call    := ['Math' '.'] function '(' [expr (',' expr)*] ')'
//! ```
//!
//! There is no assignment, member access, string, or statement syntax, so a
//! parsed formula can only ever compute a number.

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::error::FormulaError;
use super::functions::{Function, QUALIFIER};
use super::lexer::{Token, TokenKind, tokenize};

/// Words that never belong in a formula. Kept as a diagnostic: the grammar
/// cannot execute them anyway, but an author who typed one wrote something
/// that will never evaluate, and that is worth surfacing.
pub const DENYLIST: &[&str] = &[
    "import", "require", "eval", "window", "document", "alert", "console",
];

const PREFIX_BP: u8 = 5;

/// Deepest expression tree a formula may produce. Bounds the recursion of
/// parsing, evaluation, and dropping the tree.
pub const MAX_NESTING: usize = 256;

/// Expression with the height of its tree.
type Node = (Expr, usize);

pub fn parse(src: &str) -> Result<Expr, FormulaError> {
    if src.trim().is_empty() {
        return Err(FormulaError::Empty);
    }
    let tokens = tokenize(src)?;
    let mut parser = Parser {
        tokens: &tokens,
        idx: 0,
        end: src.len(),
        depth: 0,
    };
    let (expr, _) = parser.expr(0)?;
    if let Some(tok) = parser.peek() {
        return Err(FormulaError::malformed(tok.pos, "unexpected trailing input"));
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    idx: usize,
    end: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.idx)
    }

    fn peek_kind(&self) -> Option<&'a TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn next(&mut self) -> Result<&'a Token, FormulaError> {
        let tok = self
            .tokens
            .get(self.idx)
            .ok_or_else(|| FormulaError::malformed(self.end, "unexpected end of formula"))?;
        self.idx += 1;
        Ok(tok)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), FormulaError> {
        let tok = self.next()?;
        if tok.kind == kind {
            Ok(())
        } else {
            Err(FormulaError::malformed(tok.pos, format!("expected {}", what)))
        }
    }

    fn expr(&mut self, min_bp: u8) -> Result<Node, FormulaError> {
        self.depth += 1;
        let result = self.expr_inner(min_bp);
        self.depth -= 1;
        result
    }

    fn expr_inner(&mut self, min_bp: u8) -> Result<Node, FormulaError> {
        if self.depth > MAX_NESTING {
            let pos = self.peek().map_or(self.end, |t| t.pos);
            return Err(too_deep(pos));
        }
        let (mut lhs, mut height) = self.prefix()?;

        loop {
            let (op, l_bp, r_bp) = match self.peek_kind() {
                Some(TokenKind::Plus) => (BinaryOp::Add, 1, 2),
                Some(TokenKind::Minus) => (BinaryOp::Sub, 1, 2),
                Some(TokenKind::Star) => (BinaryOp::Mul, 3, 4),
                Some(TokenKind::Slash) => (BinaryOp::Div, 3, 4),
                _ => break,
            };
            if l_bp < min_bp {
                break;
            }
            let pos = self.tokens[self.idx].pos;
            self.idx += 1;
            let (rhs, rhs_height) = self.expr(r_bp)?;
            height = checked_height(height.max(rhs_height), pos)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok((lhs, height))
    }

    fn prefix(&mut self) -> Result<Node, FormulaError> {
        let tok = self.next()?;
        match &tok.kind {
            TokenKind::Number(n) => Ok((Expr::Number(*n), 1)),
            TokenKind::Reference(name) => Ok((
                Expr::Reference {
                    name: name.clone(),
                    pos: tok.pos,
                },
                1,
            )),
            TokenKind::Minus => self.unary(UnaryOp::Neg, tok.pos),
            TokenKind::Plus => self.unary(UnaryOp::Plus, tok.pos),
            TokenKind::LParen => {
                let inner = self.expr(0)?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Ident(name) => self.identifier(name, tok.pos),
            _ => Err(FormulaError::malformed(tok.pos, "expected a value")),
        }
    }

    fn unary(&mut self, op: UnaryOp, pos: usize) -> Result<Node, FormulaError> {
        let (expr, height) = self.expr(PREFIX_BP)?;
        Ok((
            Expr::Unary {
                op,
                expr: Box::new(expr),
            },
            checked_height(height, pos)?,
        ))
    }

    fn identifier(&mut self, name: &str, pos: usize) -> Result<Node, FormulaError> {
        check_denylist(name)?;

        if name == QUALIFIER && self.peek_kind() == Some(&TokenKind::Dot) {
            self.idx += 1;
            let tok = self.next()?;
            let TokenKind::Ident(fname) = &tok.kind else {
                return Err(FormulaError::malformed(tok.pos, "expected function name after 'Math.'"));
            };
            check_denylist(fname)?;
            if Function::lookup(fname).is_none() {
                return Err(FormulaError::UnknownFunction(fname.clone()));
            }
            if self.peek_kind() != Some(&TokenKind::LParen) {
                return Err(FormulaError::malformed(tok.pos, "expected '(' after function name"));
            }
            return self.call(fname, tok.pos);
        }

        if self.peek_kind() == Some(&TokenKind::LParen) {
            return self.call(name, pos);
        }

        Ok((
            Expr::Identifier {
                name: name.to_string(),
                pos,
            },
            1,
        ))
    }

    fn call(&mut self, name: &str, pos: usize) -> Result<Node, FormulaError> {
        let builtin =
            Function::lookup(name).ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;
        self.expect(TokenKind::LParen, "'('")?;

        let mut args = Vec::new();
        let mut height = 0;
        if self.peek_kind() != Some(&TokenKind::RParen) {
            loop {
                let (arg, arg_height) = self.expr(0)?;
                height = height.max(arg_height);
                args.push(arg);
                match self.peek_kind() {
                    Some(TokenKind::Comma) => self.idx += 1,
                    _ => break,
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;

        if !builtin.arity.accepts(args.len()) {
            return Err(FormulaError::malformed(
                pos,
                format!("{} does not take {} argument(s)", builtin.name, args.len()),
            ));
        }

        Ok((
            Expr::Call {
                function: builtin.function,
                args,
            },
            checked_height(height, pos)?,
        ))
    }
}

fn too_deep(pos: usize) -> FormulaError {
    FormulaError::malformed(pos, "formula nested too deeply")
}

/// Height of a node over children of height `child`.
fn checked_height(child: usize, pos: usize) -> Result<usize, FormulaError> {
    let height = child + 1;
    if height > MAX_NESTING {
        return Err(too_deep(pos));
    }
    Ok(height)
}

fn check_denylist(ident: &str) -> Result<(), FormulaError> {
    match DENYLIST.iter().find(|word| ident.contains(*word)) {
        Some(word) => Err(FormulaError::unsafe_content(*word)),
        None => Ok(()),
    }
}
