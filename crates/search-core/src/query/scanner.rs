//! Hand-written scanner for FTS5 search input.
//!
//! Splits raw input on the boolean keywords `AND`, `OR` and `NOT` (whole word,
//! case-sensitive) and lifts out `NEAR(...)` groups. Double-quoted regions are
//! opaque: keywords inside a phrase are not operators. A `"` with no closing
//! quote after it is plain text and does not hide later keywords.

/// Boolean operator keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
    Not,
}

impl BoolOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoolOp::And => "AND",
            BoolOp::Or => "OR",
            BoolOp::Not => "NOT",
        }
    }

    const ALL: [BoolOp; 3] = [BoolOp::And, BoolOp::Or, BoolOp::Not];
}

/// A piece of scanned input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A boolean keyword.
    Keyword(BoolOp),
    /// A `NEAR(...)` group, verbatim.
    Near(&'a str),
    /// Text between keywords and NEAR groups, untrimmed.
    Text(&'a str),
}

/// Word characters for boundary checks: letters, digits and underscore.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Scan `input` into keyword, NEAR and text tokens.
///
/// Text tokens are returned exactly as they appear, including surrounding
/// whitespace, and may be empty or blank.
pub fn scan(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut segment_start = 0;
    let mut pos = 0;
    let mut in_quotes = false;
    let mut prev: Option<char> = None;

    while pos < input.len() {
        let rest = &input[pos..];
        let Some(c) = rest.chars().next() else {
            break;
        };

        if c == '"' {
            in_quotes = !in_quotes && rest[1..].contains('"');
        } else if !in_quotes && !prev.is_some_and(is_word_char) {
            if let Some(op) = keyword_at(rest) {
                tokens.push(Token::Text(&input[segment_start..pos]));
                tokens.push(Token::Keyword(op));
                pos += op.as_str().len();
                segment_start = pos;
                prev = op.as_str().chars().last();
                continue;
            }
            if let Some(len) = near_group_len(rest) {
                tokens.push(Token::Text(&input[segment_start..pos]));
                tokens.push(Token::Near(&input[pos..pos + len]));
                pos += len;
                segment_start = pos;
                prev = Some(')');
                continue;
            }
        }

        prev = Some(c);
        pos += c.len_utf8();
    }

    tokens.push(Token::Text(&input[segment_start..]));
    tokens
}

/// Keyword at the start of `rest`, if it ends on a word boundary.
fn keyword_at(rest: &str) -> Option<BoolOp> {
    BoolOp::ALL.into_iter().find(|op| {
        let word = op.as_str();
        rest.starts_with(word) && !rest[word.len()..].chars().next().is_some_and(is_word_char)
    })
}

/// Byte length of a `NEAR(...)` group at the start of `rest`.
///
/// Parentheses are balanced outside of quoted phrases. An unterminated group
/// runs to the end of the input.
fn near_group_len(rest: &str) -> Option<usize> {
    let after = rest.strip_prefix("NEAR")?;
    let trimmed = after.trim_start();
    if !trimmed.starts_with('(') {
        return None;
    }
    let open = rest.len() - trimmed.len();

    let mut depth = 0usize;
    let mut in_quotes = false;
    for (i, c) in rest[open..].char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i + 1);
                }
            }
            _ => {}
        }
    }
    Some(rest.len())
}
