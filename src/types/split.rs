//! Bracket- and quote-aware scanning of type strings.
//!
//! Type expressions nest (`array<int, array{a: int|null}>`) and literal
//! sets may contain separators inside quotes (`string<"a,b", "c">`), so
//! none of the splitting below can use a plain `str::split`.

/// Tracks bracket depth and quote state while scanning a type string.
#[derive(Debug, Default)]
struct Scanner {
    depth: i32,
    quote: Option<char>,
}

impl Scanner {
    /// Feed one character.  Returns `true` when the character sits at the
    /// top level: outside any bracket pair and outside quotes.
    fn feed(&mut self, c: char) -> bool {
        if let Some(q) = self.quote {
            if c == q {
                self.quote = None;
            }
            return false;
        }
        match c {
            '"' | '\'' => {
                self.quote = Some(c);
                false
            }
            '<' | '{' | '(' | '[' => {
                self.depth += 1;
                false
            }
            '>' | '}' | ')' | ']' => {
                self.depth -= 1;
                false
            }
            _ => self.depth == 0,
        }
    }
}

/// Split off the first type token from `s`, respecting `<…>`, `{…}`,
/// `(…)` nesting and quoted literals.
///
/// Returns `(type_token, remainder)`:
/// - `"array<int, User> $users the users"` → `("array<int, User>", " $users the users")`
/// - `"array{a: int, b?: string} $x"` → `("array{a: int, b?: string}", " $x")`
/// - `"string"` → `("string", "")`
pub fn split_type_token(s: &str) -> (&str, &str) {
    let mut scanner = Scanner::default();
    for (i, c) in s.char_indices() {
        let top = scanner.feed(c);
        if top && c.is_whitespace() {
            return (&s[..i], &s[i..]);
        }
    }
    (s, "")
}

/// Split `s` on every top-level occurrence of `sep`.  Segments are
/// trimmed; empty segments are kept so callers can reject them.
///
/// - `split_top_level("int|array<int|string>", '|')` → `["int", "array<int|string>"]`
/// - `split_top_level("a: int, b: array{c: int, d: int}", ',')` → `["a: int", "b: array{c: int, d: int}"]`
pub fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut scanner = Scanner::default();
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if scanner.feed(c) && c == sep {
            parts.push(s[start..i].trim());
            start = i + c.len_utf8();
        }
    }
    parts.push(s[start..].trim());
    parts
}

/// Byte offset of the first top-level occurrence of `needle`.
pub fn find_top_level(s: &str, needle: char) -> Option<usize> {
    let mut scanner = Scanner::default();
    s.char_indices()
        .find(|&(_, c)| scanner.feed(c) && c == needle)
        .map(|(i, _)| i)
}

/// If `s` is `<prefix><open>…<close>` with the bracket opened right after
/// the prefix closing at the very end, return the prefix and the inner
/// text.
///
/// - `split_bracketed("array<int, string>", '<', '>')` → `Some(("array", "int, string"))`
/// - `split_bracketed("array<int>[]", '<', '>')` → `None`
pub fn split_bracketed(s: &str, open: char, close: char) -> Option<(&str, &str)> {
    let s = s.trim();
    let open_at = s.find(open)?;
    let inner_start = open_at + open.len_utf8();
    let inner_end = s.len().checked_sub(close.len_utf8())?;
    if inner_end < inner_start || !s.ends_with(close) {
        return None;
    }
    // The bracket opened at `open_at` must be the one that closes last.
    let mut scanner = Scanner::default();
    for (i, c) in s[open_at..].char_indices() {
        scanner.feed(c);
        if scanner.depth == 0 && scanner.quote.is_none() && i + c.len_utf8() < s.len() - open_at {
            return None;
        }
    }
    if scanner.depth != 0 {
        return None;
    }
    Some((s[..open_at].trim(), &s[inner_start..inner_end]))
}

/// Parse a comma-separated list of literals the way a CSV reader would:
/// single or double quotes group a value (a doubled quote inside is a
/// literal quote), unquoted values are trimmed.
///
/// - `"a", 'b,c', d` → `["a", "b,c", "d"]`
pub fn split_literals(s: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut chars = s.chars().peekable();
    let mut quote: Option<char> = None;
    let mut was_quoted = false;

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => {
                if chars.peek() == Some(&q) {
                    current.push(q);
                    chars.next();
                } else {
                    quote = None;
                }
            }
            Some(_) => current.push(c),
            None => match c {
                '"' | '\'' if current.trim().is_empty() => {
                    current.clear();
                    quote = Some(c);
                    was_quoted = true;
                }
                ',' => {
                    values.push(finish_literal(&current, was_quoted));
                    current.clear();
                    was_quoted = false;
                }
                _ => {
                    if !(was_quoted && c.is_whitespace()) {
                        current.push(c);
                    }
                }
            },
        }
    }
    values.push(finish_literal(&current, was_quoted));
    values
}

fn finish_literal(value: &str, quoted: bool) -> String {
    if quoted {
        value.to_string()
    } else {
        value.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_token_respects_nesting() {
        assert_eq!(
            split_type_token("array<int, User> $users"),
            ("array<int, User>", " $users")
        );
        assert_eq!(
            split_type_token("array{a: int, b?: string} $x y"),
            ("array{a: int, b?: string}", " $x y")
        );
        assert_eq!(
            split_type_token("string<\"a b\", \"c\"> $s"),
            ("string<\"a b\", \"c\">", " $s")
        );
        assert_eq!(split_type_token("int|null"), ("int|null", ""));
    }

    #[test]
    fn top_level_split_skips_nested_separators() {
        assert_eq!(
            split_top_level("int|array<int|string>|null", '|'),
            vec!["int", "array<int|string>", "null"]
        );
        assert_eq!(split_top_level("\"a|b\"|c", '|'), vec!["\"a|b\"", "c"]);
        assert_eq!(split_top_level("a,", ','), vec!["a", ""]);
    }

    #[test]
    fn bracketed_requires_outer_pair() {
        assert_eq!(split_bracketed("array<int, string>", '<', '>'), Some(("array", "int, string")));
        assert_eq!(split_bracketed("array{}", '{', '}'), Some(("array", "")));
        assert_eq!(split_bracketed("array<int>[]", '<', '>'), None);
        assert_eq!(split_bracketed("a<b>|c<d>", '<', '>'), None);
        assert_eq!(split_bracketed("key-of<Suit>", '<', '>'), Some(("key-of", "Suit")));
    }

    #[test]
    fn literals_follow_csv_rules() {
        assert_eq!(split_literals("\"a\", 'b,c', d"), vec!["a", "b,c", "d"]);
        assert_eq!(split_literals("\"say \"\"hi\"\"\""), vec!["say \"hi\""]);
        assert_eq!(split_literals("one"), vec!["one"]);
    }
}
