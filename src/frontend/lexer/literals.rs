//! Literal decoding
//!
//! Turns the raw text of literal tokens into values: strips quotes, decodes
//! escape sequences and drops the `litre`/`litres` unit from numerals.

/// Literal decoding error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
    #[error("invalid hex escape `{0}`")]
    InvalidHex(String),
    #[error("invalid unicode code point U+{0:X}")]
    InvalidCodePoint(u32),
    #[error("escape sequence ends early")]
    Truncated,
    #[error("char literal must hold exactly one character, found {0}")]
    CharLength(usize),
    #[error("invalid numeral `{0}`")]
    Numeral(String),
    #[error("integer literal `{0}` does not fit in 64 bits")]
    IntegerOverflow(String),
}

/// Strip the surrounding quotes of a string or char token
pub fn strip_quotes(raw: &str) -> &str {
    let mut chars = raw.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

/// Decode backslash escapes
///
/// Unknown escapes are kept verbatim, backslash included.
pub fn unescape(body: &str) -> Result<String, LiteralError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(escaped) = chars.next() else {
            return Err(LiteralError::Truncated);
        };

        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            'x' => {
                let digits: String = chars.by_ref().take(2).collect();
                if digits.len() != 2 {
                    return Err(LiteralError::Truncated);
                }
                let code = u32::from_str_radix(&digits, 16)
                    .map_err(|_| LiteralError::InvalidHex(format!("\\x{}", digits)))?;
                out.push(char::from_u32(code).ok_or(LiteralError::InvalidCodePoint(code))?);
            }
            'u' => {
                let digits: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(d) => digits.push(d),
                            None => return Err(LiteralError::Truncated),
                        }
                    }
                    digits
                } else {
                    let digits: String = chars.by_ref().take(4).collect();
                    if digits.chars().count() != 4 {
                        return Err(LiteralError::Truncated);
                    }
                    digits
                };
                let code = u32::from_str_radix(&digits, 16)
                    .map_err(|_| LiteralError::InvalidHex(format!("\\u{}", digits)))?;
                out.push(char::from_u32(code).ok_or(LiteralError::InvalidCodePoint(code))?);
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}

/// Decode a string literal token
pub fn string_value(raw: &str) -> Result<String, LiteralError> {
    unescape(strip_quotes(raw))
}

/// Decode a char literal token
pub fn char_value(raw: &str) -> Result<char, LiteralError> {
    let decoded = unescape(strip_quotes(raw))?;
    let mut chars = decoded.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(LiteralError::CharLength(decoded.chars().count())),
    }
}

/// Numeric part of a numeral, unit removed
fn numeral_digits(raw: &str) -> &str {
    raw.split_whitespace().next().unwrap_or(raw)
}

/// Decode an integer numeral such as `3 litres`
pub fn int_value(raw: &str) -> Result<i64, LiteralError> {
    let digits = numeral_digits(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LiteralError::Numeral(raw.to_string()));
    }
    digits
        .parse()
        .map_err(|_| LiteralError::IntegerOverflow(digits.to_string()))
}

/// Decode a float numeral such as `2.5 litres`
pub fn float_value(raw: &str) -> Result<f64, LiteralError> {
    numeral_digits(raw)
        .parse()
        .map_err(|_| LiteralError::Numeral(raw.to_string()))
}
