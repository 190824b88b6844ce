//! Compiles raw user input into FTS5 query syntax.
//!
//! Input with no operator syntax becomes a single quoted phrase. Input that
//! uses operators keeps its structure, and only the operands that would trip
//! the FTS5 parser are quoted:
//! - "gpt-2 model" → `"gpt-2 model"`
//! - "BRCA1 AND NM_007294.4" → `BRCA1 AND "NM_007294.4"`
//! - "test*" → `test*`
//! - "NM_007294.*" → `"NM_007294."`

use super::scanner::{scan, Token};

/// Characters that force an operand to be quoted.
pub const SPECIAL_CHARS: [char; 28] = [
    '.', ':', '(', ')', '[', ']', '{', '}', '+', '-', '/', '\\', '@', '#', '$', '%', '&', '=',
    '<', '>', '|', '~', '^', '`', '!', '?', ',', ';',
];

/// How the compiler treats a raw term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// No operator syntax; the whole term is one quoted phrase.
    Literal,
    /// Operators present; structure is preserved.
    Structured,
}

/// True if `s` contains any reserved special character.
pub fn has_special_chars(s: &str) -> bool {
    s.chars().any(|c| SPECIAL_CHARS.contains(&c))
}

/// True if `s` has an odd number of double quotes.
fn has_unbalanced_quote(s: &str) -> bool {
    s.chars().filter(|&c| c == '"').count() % 2 == 1
}

/// Whether an operand must be quoted to reach FTS5 as a plain string.
fn needs_quoting(operand: &str) -> bool {
    has_special_chars(operand) || has_unbalanced_quote(operand)
}

/// Wrap `s` in double quotes, doubling any quotes inside.
pub fn quote_literal(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// True if `s` is exactly one double-quoted string.
///
/// `"a b"` and `"say ""hi"""` qualify; `"a" "b"` does not.
pub fn is_quoted_phrase(s: &str) -> bool {
    let Some(inner) = s.strip_prefix('"') else {
        return false;
    };
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
            } else {
                return chars.peek().is_none();
            }
        }
    }
    false
}

/// Classify a raw term.
pub fn detect_mode(raw: &str) -> QueryMode {
    let has_operator_token = scan(raw)
        .iter()
        .any(|t| matches!(t, Token::Keyword(_) | Token::Near(_)));

    if has_operator_token
        || has_prefix_star(raw)
        || has_quoted_phrase(raw)
        || has_standalone_plus(raw)
    {
        QueryMode::Structured
    } else {
        QueryMode::Literal
    }
}

/// A `*` directly after a non-space character and followed by a space or the end.
fn has_prefix_star(raw: &str) -> bool {
    let chars: Vec<char> = raw.chars().collect();
    chars.iter().enumerate().any(|(i, &c)| {
        c == '*'
            && i > 0
            && !chars[i - 1].is_whitespace()
            && chars.get(i + 1).map_or(true, |n| n.is_whitespace())
    })
}

/// Two double quotes with at least one other character between them.
fn has_quoted_phrase(raw: &str) -> bool {
    let mut open: Option<usize> = None;
    for (i, c) in raw.char_indices() {
        if c != '"' {
            continue;
        }
        match open {
            Some(start) if i > start + 1 => return true,
            _ => open = Some(i),
        }
    }
    false
}

/// A `+` standing alone between whitespace.
fn has_standalone_plus(raw: &str) -> bool {
    raw.split_whitespace().any(|word| word == "+")
}

/// Compile a raw search term into an FTS5 query string.
///
/// Never fails: a blank term compiles to the empty phrase `""`.
pub fn compile_term(raw: &str) -> String {
    match detect_mode(raw) {
        QueryMode::Literal => quote_literal(raw.trim()),
        QueryMode::Structured => compile_structured(raw),
    }
}

fn compile_structured(raw: &str) -> String {
    scan(raw)
        .into_iter()
        .filter_map(|token| match token {
            Token::Keyword(op) => Some(op.as_str().to_string()),
            Token::Near(group) => Some(group.trim().to_string()),
            Token::Text(text) => compile_operand(text),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compile one operand between keywords. Blank operands are dropped.
fn compile_operand(text: &str) -> Option<String> {
    let operand = text.trim();
    if operand.is_empty() {
        return None;
    }

    if is_quoted_phrase(operand) {
        return Some(operand.to_string());
    }

    if let Some(base) = operand.strip_suffix('*') {
        // A base that needs quoting loses its prefix star.
        return Some(if needs_quoting(base) {
            quote_literal(base)
        } else {
            operand.to_string()
        });
    }

    if needs_quoting(operand) {
        Some(quote_literal(operand))
    } else {
        Some(operand.to_string())
    }
}

/// True if `name` can appear unquoted in an FTS5 column filter.
pub(crate) fn is_bareword(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii())
        && !matches!(name, "AND" | "OR" | "NOT" | "NEAR")
}
