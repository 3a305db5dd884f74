//! Quote-aware field tokenizer for catalog lines.
//!
//! Rules:
//!
//! - A comma separates fields only when the number of `"` characters between it and the end of
//!   the line is even, i.e. it does not sit inside a quoted span.
//! - Empty fields are preserved, including trailing ones produced by a trailing comma.
//! - Each raw field is then passed through [`unquote`].

use crate::types::FIELD_COUNT;

/// Split `line` on the commas that lie outside quoted spans, unquoting every field.
///
/// The number of returned fields follows the line's shape (it is not padded). Use
/// [`tokenize`] for the fixed-arity record view.
///
/// ```rust
/// use media_catalog_analytics::ingestion::tokenizer::split_fields;
///
/// assert_eq!(split_fields(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
/// ```
pub fn split_fields(line: &str) -> Vec<&str> {
    split_raw(line).into_iter().map(unquote).collect()
}

/// Tokenize `line` into exactly [`FIELD_COUNT`] unquoted fields.
///
/// Missing trailing fields are empty strings; fields beyond the eleventh are ignored.
pub fn tokenize(line: &str) -> [&str; FIELD_COUNT] {
    let mut out = [""; FIELD_COUNT];
    for (slot, raw) in out.iter_mut().zip(split_raw(line)) {
        *slot = unquote(raw);
    }
    out
}

/// Strip the quoting from a single raw field.
///
/// - Starts with `"` and is at least 3 characters long: the first and last characters are
///   removed (the last one is dropped even when it is not a quote).
/// - Starts with `"` but is shorter than that (`"` or `""`): empty string.
/// - Anything else is returned unchanged.
pub fn unquote(token: &str) -> &str {
    let Some(inner) = token.strip_prefix('"') else {
        return token;
    };
    let mut chars = inner.chars();
    if chars.next_back().is_none() {
        return "";
    }
    chars.as_str()
}

fn split_raw(line: &str) -> Vec<&str> {
    let total_quotes = line.bytes().filter(|&b| b == b'"').count();
    let mut fields = Vec::with_capacity(FIELD_COUNT);
    let mut quotes_seen = 0usize;
    let mut start = 0usize;

    for (idx, b) in line.bytes().enumerate() {
        match b {
            b'"' => quotes_seen += 1,
            b',' if (total_quotes - quotes_seen) % 2 == 0 => {
                fields.push(&line[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    fields.push(&line[start..]);
    fields
}

#[cfg(test)]
mod tests {
    use super::{split_fields, tokenize, unquote};
    use crate::types::FIELD_COUNT;

    #[test]
    fn comma_inside_quotes_does_not_split() {
        assert_eq!(split_fields(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn trailing_empty_fields_are_kept() {
        assert_eq!(split_fields("a,b,,"), vec!["a", "b", "", ""]);
        assert_eq!(split_fields(""), vec![""]);
    }

    #[test]
    fn short_line_is_padded_to_field_count() {
        let tokens = tokenize(r#""Alpha","S1""#);
        assert_eq!(tokens.len(), FIELD_COUNT);
        assert_eq!(tokens[0], "Alpha");
        assert_eq!(tokens[1], "S1");
        assert!(tokens[2..].iter().all(|t| t.is_empty()));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let line = (0..15).map(|i| i.to_string()).collect::<Vec<_>>().join(",");
        let tokens = tokenize(&line);
        assert_eq!(tokens[0], "0");
        assert_eq!(tokens[FIELD_COUNT - 1], "10");
    }

    #[test]
    fn quoted_title_with_commas_stays_whole() {
        let tokens = tokenize(r#""Good, Bad, Ugly","MGM","","Out","","DVD","9.99","R","1966","Western","2.35:1""#);
        assert_eq!(tokens[0], "Good, Bad, Ugly");
        assert_eq!(tokens[6], "9.99");
        assert_eq!(tokens[10], "2.35:1");
    }

    #[test]
    fn unquote_is_asymmetric() {
        assert_eq!(unquote(r#""abc""#), "abc");
        assert_eq!(unquote(r#""a""#), "a");
        assert_eq!(unquote(r#""""#), "");
        assert_eq!(unquote(r#"""#), "");
        assert_eq!(unquote("19.99"), "19.99");
        assert_eq!(unquote(""), "");
        // Missing closing quote still loses the last character.
        assert_eq!(unquote(r#""abc"#), "ab");
    }

    #[test]
    fn unquote_respects_multibyte_characters() {
        assert_eq!(unquote("\"Amélie\""), "Amélie");
        assert_eq!(unquote("\"é"), "");
    }
}
