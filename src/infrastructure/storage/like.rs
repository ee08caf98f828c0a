//! SQL `LIKE` pattern matching: `%` matches any run of characters
//! (including none), `_` exactly one character, `\` escapes the next one.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    AnyRun,
    AnyOne,
    Literal(char),
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => Token::AnyRun,
            '_' => Token::AnyOne,
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            other => Token::Literal(other),
        });
    }
    tokens
}

/// Whether `text` matches the whole of `pattern`.
pub fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let tokens = tokenize(pattern);

    let (mut t, mut p) = (0, 0);
    // Position of the last `%` seen and the text index it was tried at.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match tokens.get(p) {
            Some(Token::AnyRun) => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(Token::AnyOne) => {
                t += 1;
                p += 1;
            }
            Some(Token::Literal(c)) if *c == text[t] => {
                t += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((star, tried)) => {
                    p = star + 1;
                    t = tried + 1;
                    backtrack = Some((star, tried + 1));
                }
                None => return false,
            },
        }
    }

    tokens[p..].iter().all(|tok| *tok == Token::AnyRun)
}

/// Rewrite `pattern` with every literal wildcard and backslash escaped, for
/// use as `LIKE ... ESCAPE '\'`. A trailing lone `\` becomes an escaped one.
pub fn escape_like(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for token in tokenize(pattern) {
        match token {
            Token::AnyRun => escaped.push('%'),
            Token::AnyOne => escaped.push('_'),
            Token::Literal(c @ ('%' | '_' | '\\')) => {
                escaped.push('\\');
                escaped.push(c);
            }
            Token::Literal(c) => escaped.push(c),
        }
    }
    escaped
}

/// The same pattern in SQLite `GLOB` syntax, which compares case sensitively.
pub fn like_to_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len());
    for token in tokenize(pattern) {
        match token {
            Token::AnyRun => glob.push('*'),
            Token::AnyOne => glob.push('?'),
            Token::Literal(c @ ('*' | '?' | '[')) => {
                glob.push('[');
                glob.push(c);
                glob.push(']');
            }
            Token::Literal(c) => glob.push(c),
        }
    }
    glob
}

#[cfg(test)]
mod tests {
    use super::{escape_like, like_match, like_to_glob};

    #[test]
    fn wildcards() {
        assert!(like_match("Red Shirt", "%Shirt"));
        assert!(like_match("Red Shirt", "Red%"));
        assert!(like_match("Red Shirt", "%d S%"));
        assert!(like_match("Red Shirt", "R_d Shirt"));
        assert!(like_match("", "%"));
        assert!(like_match("abc", "%%c"));
        assert!(!like_match("Red Shirt", "Shirt"));
        assert!(!like_match("Red Shirt", "R_ Shirt"));
        assert!(!like_match("", "_"));
    }

    #[test]
    fn backtracks_over_repeated_prefixes() {
        assert!(like_match("aaab", "%ab"));
        assert!(like_match("mississippi", "%iss%ppi"));
        assert!(!like_match("mississippi", "%iss%ppx"));
    }

    #[test]
    fn escaped_wildcards_are_literal() {
        assert!(like_match("50%", "50\\%"));
        assert!(!like_match("500", "50\\%"));
        assert!(like_match("a_b", "a\\_b"));
        assert!(!like_match("axb", "a\\_b"));
    }

    #[test]
    fn glob_translation() {
        assert_eq!(like_to_glob("Red Shirt%"), "Red Shirt*");
        assert_eq!(like_to_glob("R_d"), "R?d");
        assert_eq!(like_to_glob("50\\%"), "50%");
        assert_eq!(like_to_glob("a\\_b"), "a_b");
        assert_eq!(like_to_glob("what?*[x]%"), "what[?][*][[]x]*");
    }

    #[test]
    fn escaped_form_keeps_meaning() {
        assert_eq!(escape_like("Red%"), "Red%");
        assert_eq!(escape_like("50\\%"), "50\\%");
        assert_eq!(escape_like("a\\b"), "ab");
        assert_eq!(escape_like("tail\\"), "tail\\\\");
    }
}
