use crate::foundation::error::{CheckergenError, CheckergenResult};

/// Split a command line into words.
///
/// Whitespace separates words; single quotes keep everything literally, double quotes keep
/// whitespace and honour `\"` and `\\`; a backslash outside quotes escapes the next character.
pub(crate) fn split_line(line: &str) -> CheckergenResult<Vec<String>> {
    let mut words = Vec::new();
    let mut cur = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut cur));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => cur.push(c),
                        None => return Err(unterminated('\'')),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(e @ ('"' | '\\')) => cur.push(e),
                            Some(other) => {
                                cur.push('\\');
                                cur.push(other);
                            }
                            None => return Err(unterminated('"')),
                        },
                        Some(c) => cur.push(c),
                        None => return Err(unterminated('"')),
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(e) => cur.push(e),
                    None => {
                        return Err(CheckergenError::validation(
                            "line ends with an escape character",
                        ));
                    }
                }
            }
            c => {
                in_word = true;
                cur.push(c);
            }
        }
    }
    if in_word {
        words.push(cur);
    }
    Ok(words)
}

fn unterminated(quote: char) -> CheckergenError {
    CheckergenError::validation(format!("no closing quotation ({quote})"))
}

#[cfg(test)]
#[path = "../../tests/unit/shell/lexer.rs"]
mod tests;
