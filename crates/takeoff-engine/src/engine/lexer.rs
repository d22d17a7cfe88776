//! Formula tokenizer.

use super::error::FormulaError;

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Ident(String),
    /// Text between `[` and `]`, untrimmed.
    Reference(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
    Dot,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub pos: usize,
}

/// Split a formula into tokens.
///
/// Anything outside the formula vocabulary (assignment, statement
/// separators, string literals, operators other than `+ - * /`) is rejected
/// here with the offending character's position.
pub fn tokenize(src: &str) -> Result<Vec<Token>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        let kind = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '0'..='9' => lex_number(src, pos, &mut chars)?,
            '.' => {
                // `.5` is a number; a lone dot only appears in `Math.fn`.
                let next_is_digit = src[pos + 1..].starts_with(|c: char| c.is_ascii_digit());
                if next_is_digit {
                    lex_number(src, pos, &mut chars)?
                } else {
                    chars.next();
                    TokenKind::Dot
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                let mut end = pos;
                while let Some(&(i, ch)) = chars.peek() {
                    if ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' {
                        end = i + ch.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                TokenKind::Ident(src[pos..end].to_string())
            }
            '[' => {
                chars.next();
                let start = pos + 1;
                let mut end = None;
                for (i, ch) in chars.by_ref() {
                    match ch {
                        ']' => {
                            end = Some(i);
                            break;
                        }
                        '[' => {
                            return Err(FormulaError::malformed(i, "nested '[' in reference"));
                        }
                        _ => {}
                    }
                }
                let Some(end) = end else {
                    return Err(FormulaError::malformed(pos, "unterminated '['"));
                };
                if src[start..end].trim().is_empty() {
                    return Err(FormulaError::malformed(pos, "empty reference '[]'"));
                }
                TokenKind::Reference(src[start..end].to_string())
            }
            '+' => single(&mut chars, TokenKind::Plus),
            '-' => single(&mut chars, TokenKind::Minus),
            '*' => single(&mut chars, TokenKind::Star),
            '/' => single(&mut chars, TokenKind::Slash),
            '(' => single(&mut chars, TokenKind::LParen),
            ')' => single(&mut chars, TokenKind::RParen),
            ',' => single(&mut chars, TokenKind::Comma),
            '=' => return Err(FormulaError::unsafe_content("=")),
            other => {
                return Err(FormulaError::malformed(
                    pos,
                    format!("unexpected character '{}'", other),
                ));
            }
        };
        tokens.push(Token { kind, pos });
    }

    Ok(tokens)
}

fn single(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    kind: TokenKind,
) -> TokenKind {
    chars.next();
    kind
}

fn lex_number(
    src: &str,
    start: usize,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Result<TokenKind, FormulaError> {
    let mut end = start;
    let mut seen_dot = false;
    let mut seen_exp = false;
    let mut prev = '\0';

    while let Some(&(i, ch)) = chars.peek() {
        let accept = match ch {
            '0'..='9' => true,
            '.' if !seen_dot && !seen_exp => {
                seen_dot = true;
                true
            }
            'e' | 'E' if !seen_exp => {
                // Only an exponent when digits (optionally signed) follow.
                let rest = &src[i + 1..];
                let rest = rest.strip_prefix(['+', '-']).unwrap_or(rest);
                if rest.starts_with(|c: char| c.is_ascii_digit()) {
                    seen_exp = true;
                    true
                } else {
                    false
                }
            }
            '+' | '-' if matches!(prev, 'e' | 'E') => true,
            _ => false,
        };
        if !accept {
            break;
        }
        prev = ch;
        end = i + ch.len_utf8();
        chars.next();
    }

    // `2x` is not a number followed by an identifier.
    if let Some(&(i, ch)) = chars.peek() {
        if ch.is_ascii_alphabetic() || ch == '_' || ch == '$' {
            return Err(FormulaError::malformed(i, "identifier directly after number"));
        }
    }

    src[start..end]
        .parse::<f64>()
        .map(TokenKind::Number)
        .map_err(|_| FormulaError::malformed(start, format!("invalid number '{}'", &src[start..end])))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("12"), vec![TokenKind::Number(12.0)]);
        assert_eq!(kinds("1.5"), vec![TokenKind::Number(1.5)]);
        assert_eq!(kinds(".5"), vec![TokenKind::Number(0.5)]);
        assert_eq!(kinds("1."), vec![TokenKind::Number(1.0)]);
        assert_eq!(kinds("1e3"), vec![TokenKind::Number(1000.0)]);
        assert_eq!(kinds("2.5E-2"), vec![TokenKind::Number(0.025)]);
    }

    #[test]
    fn test_reference_keeps_inner_text() {
        assert_eq!(
            kinds("[Wall Height] * 2"),
            vec![
                TokenKind::Reference("Wall Height".to_string()),
                TokenKind::Star,
                TokenKind::Number(2.0),
            ]
        );
    }

    #[test]
    fn test_reference_may_contain_operators() {
        assert_eq!(
            kinds("[Cost ($/sf)]"),
            vec![TokenKind::Reference("Cost ($/sf)".to_string())]
        );
    }

    #[test]
    fn test_math_qualifier() {
        assert_eq!(
            kinds("Math.ceil(qty)"),
            vec![
                TokenKind::Ident("Math".to_string()),
                TokenKind::Dot,
                TokenKind::Ident("ceil".to_string()),
                TokenKind::LParen,
                TokenKind::Ident("qty".to_string()),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_rejects_assignment_and_statements() {
        assert!(matches!(tokenize("qty = 1"), Err(FormulaError::Unsafe { .. })));
        assert!(matches!(tokenize("qty; 1"), Err(FormulaError::Malformed { .. })));
        assert!(matches!(tokenize("\"text\""), Err(FormulaError::Malformed { .. })));
        assert!(matches!(tokenize("qty % 2"), Err(FormulaError::Malformed { .. })));
    }

    #[test]
    fn test_rejects_bad_brackets() {
        assert!(tokenize("[open").is_err());
        assert!(tokenize("[a[b]]").is_err());
        assert!(tokenize("[ ]").is_err());
    }

    #[test]
    fn test_rejects_number_glued_to_identifier() {
        assert!(tokenize("2qty").is_err());
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("qty + [x]").unwrap();
        let positions: Vec<usize> = tokens.iter().map(|t| t.pos).collect();
        assert_eq!(positions, vec![0, 4, 6]);
    }
}
