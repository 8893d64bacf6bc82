//! Scanner for the comma-delimited tag grammar
//!
//! This module contains the tokenizer for raw annotation strings: the
//! comma-delimited, quote- and bracket-aware grammar attached to the
//! fields of subject shapes. Informally:
//!
//! ```text
//! tag        := entry (',' entry)*
//! entry      := [ key '=' ] value
//! key        := one-or-more word characters
//! value      := quoted | bracketed | bare
//! quoted     := "'" ( any-char-except-unescaped-quote | "\'" )* "'"
//! bracketed  := '[' ( any-char-except-unescaped-bracket | '\]' )* ']'
//! bare       := any characters up to the next ','
//! ```
//!
//! The only recognized escape sequences are `\'` inside quoted (and bare)
//! values and `\]` inside bracketed values; each is replaced by its literal
//! character and does not terminate the enclosing construct.
//!
//! # Design
//!
//! Every scanning routine here is a pure function over an explicit input
//! slice, returning the number of bytes it consumed along with the value it
//! extracted. There is no shared scanner state; the incremental entry
//! iterator [`Tokens`] simply re-slices its remaining input after each
//! entry. All delimiters are ASCII, so byte-offset slicing is always on a
//! character boundary.
//!
//! Keys are *not* finalized here: an entry with no explicit `key=` prefix
//! yields a token with `key == None`, and the decoder resolves the
//! effective key from plan-level context (position-zero name-carrier
//! override, or bare-flag self-reference).

pub mod error;

pub use error::{ScanError, ScanResult};

/// One scanned entry of a raw tag string.
///
/// `key` is `Some` only when the entry carried an explicit `key=` prefix;
/// `raw` is the entry's value with its delimiters stripped and its escape
/// sequences already replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken {
    /// Explicit key of the entry, if one was written
    pub key: Option<String>,
    /// Unescaped raw value of the entry
    pub raw: String,
}

/// Replaces every `\'` in `raw` with a literal `'`.
#[inline]
#[must_use]
fn unescape_quote(raw: &str) -> String {
    raw.replace("\\'", "'")
}

/// Attempts to scan an explicit `key=` prefix at the start of `input`.
///
/// A key is one or more word characters (ASCII alphanumeric or `_`)
/// immediately followed by `=`. Returns the number of bytes consumed
/// (key and `=` both) and the key itself, or `None` if `input` does not
/// begin with a well-formed prefix.
#[must_use]
pub fn scan_key(input: &str) -> Option<(usize, &str)> {
    let len = input
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    if len > 0 && input.as_bytes().get(len) == Some(&b'=') {
        Some((len + 1, &input[..len]))
    } else {
        None
    }
}

/// Scans a `'`-quoted value at the start of `input`.
///
/// `input` must begin with the opening quote. Returns the number of bytes
/// consumed, including both delimiters, and the contents with every `\'`
/// unescaped.
///
/// # Errors
///
/// Returns [`ScanError::UnterminatedQuote`] if no unescaped closing quote
/// is found before the end of `input`.
pub fn scan_quoted(input: &str) -> ScanResult<(usize, String)> {
    debug_assert!(input.as_bytes().first() == Some(&b'\''));
    let bytes = input.as_bytes();
    let mut out = String::new();
    let mut seg = 1;
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes[i - 1] == b'\\' {
                // escaped: drop the backslash, keep the quote, keep going
                out.push_str(&input[seg..i - 1]);
                out.push('\'');
                seg = i + 1;
            } else {
                out.push_str(&input[seg..i]);
                return Ok((i + 1, out));
            }
        }
        i += 1;
    }
    Err(ScanError::UnterminatedQuote { at: 0 })
}

/// Scans a `[`-bracketed value at the start of `input`.
///
/// `input` must begin with the opening bracket. Returns the number of
/// bytes consumed, including both delimiters, and the contents with every
/// `\]` unescaped. Commas inside the brackets do not terminate anything at
/// this level; splitting the contents into elements is the business of
/// [`split_list`].
///
/// # Errors
///
/// Returns [`ScanError::UnterminatedBracket`] if no unescaped closing
/// bracket is found before the end of `input`.
pub fn scan_bracketed(input: &str) -> ScanResult<(usize, String)> {
    debug_assert!(input.as_bytes().first() == Some(&b'['));
    let bytes = input.as_bytes();
    let mut out = String::new();
    let mut seg = 1;
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b']' {
            if bytes[i - 1] == b'\\' {
                out.push_str(&input[seg..i - 1]);
                out.push(']');
                seg = i + 1;
            } else {
                out.push_str(&input[seg..i]);
                return Ok((i + 1, out));
            }
        }
        i += 1;
    }
    Err(ScanError::UnterminatedBracket { at: 0 })
}

/// Scans a bare value: everything up to the next `,` or the end of
/// `input`, whichever comes first.
///
/// The terminating comma, if any, is not consumed. `\'` sequences are
/// unescaped in the returned value, mirroring their treatment in quoted
/// values. This scan cannot fail; an empty value is legal.
#[must_use]
pub fn scan_bare(input: &str) -> (usize, String) {
    let end = input
        .as_bytes()
        .iter()
        .position(|b| *b == b',')
        .unwrap_or(input.len());
    (end, unescape_quote(&input[..end]))
}

/// Scans one value of any shape (quoted, bracketed, or bare) at the start
/// of `input`.
///
/// Returns the number of bytes consumed and the extracted value. For
/// bracketed values the extracted value is the bracket *contents*; the
/// delimiters themselves are never part of any extracted value.
///
/// # Errors
///
/// Propagates [`ScanError`] from [`scan_quoted`] or [`scan_bracketed`].
pub fn scan_value(input: &str) -> ScanResult<(usize, String)> {
    match input.as_bytes().first() {
        Some(b'\'') => scan_quoted(input),
        Some(b'[') => scan_bracketed(input),
        Some(_) => Ok(scan_bare(input)),
        None => Ok((0, String::new())),
    }
}

/// Scans one list *element*: quoted or bare, never bracketed.
///
/// The grammar is deliberately one level deep, so an element of a
/// bracketed list is scanned with the same quoting rule as a top-level
/// value but without re-entering the bracket rule.
///
/// # Errors
///
/// Propagates [`ScanError::UnterminatedQuote`] from [`scan_quoted`].
pub fn scan_element(input: &str) -> ScanResult<(usize, String)> {
    match input.as_bytes().first() {
        Some(b'\'') => scan_quoted(input),
        Some(_) => Ok(scan_bare(input)),
        None => Ok((0, String::new())),
    }
}

/// Splits the contents of a bracketed value into its comma-delimited
/// elements, using the same quoting and escaping rule as the entry
/// scanner.
///
/// Empty contents yield an empty list. A trailing comma yields a final
/// empty element: `a,b,` splits as `["a", "b", ""]`. As with entries at
/// the top level, any text left over after a quoted element begins the
/// next element.
///
/// # Errors
///
/// Returns [`ScanError::UnterminatedQuote`] if a quoted element is left
/// unterminated.
pub fn split_list(contents: &str) -> ScanResult<Vec<String>> {
    if contents.is_empty() {
        return Ok(Vec::new());
    }
    let mut elems = Vec::new();
    let mut rest = contents;
    loop {
        let (consumed, elem) =
            scan_element(rest).map_err(|err| err.rebase(contents.len() - rest.len()))?;
        elems.push(elem);
        rest = &rest[consumed..];
        if rest.as_bytes().first() == Some(&b',') {
            rest = &rest[1..];
            if rest.is_empty() {
                elems.push(String::new());
                break;
            }
        } else if rest.is_empty() {
            break;
        }
        // non-empty, non-comma leftover: scan it as the next element
    }
    Ok(elems)
}

/// Incremental iterator over the entries of one raw tag string.
///
/// Yields `ScanResult<TagToken>`; after the first error the iterator is
/// exhausted, as nothing after a malformed construct can be trusted.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    full: &'a str,
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    /// Constructs an entry iterator over `raw`.
    #[inline]
    #[must_use]
    pub fn new(raw: &'a str) -> Self {
        Self { full: raw, rest: raw }
    }

    /// Returns the portion of the input that has not yet been scanned.
    #[inline]
    #[must_use]
    pub fn remainder(&self) -> &'a str {
        self.rest
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = ScanResult<TagToken>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let (key, after_key) = match scan_key(self.rest) {
            Some((n, k)) => (Some(k.to_string()), &self.rest[n..]),
            None => (None, self.rest),
        };
        let (consumed, raw) = match scan_value(after_key) {
            Ok(scanned) => scanned,
            Err(err) => {
                let base = self.full.len() - after_key.len();
                self.rest = "";
                return Some(Err(err.rebase(base)));
            }
        };
        let mut rest = &after_key[consumed..];
        if rest.as_bytes().first() == Some(&b',') {
            rest = &rest[1..];
        }
        self.rest = rest;
        Some(Ok(TagToken { key, raw }))
    }
}

/// Eagerly tokenizes a whole raw tag string.
///
/// The empty string yields zero tokens.
///
/// # Errors
///
/// Returns the first [`ScanError`] encountered; a grammar error rejects
/// the annotation string wholesale.
pub fn tokenize(raw: &str) -> ScanResult<Vec<TagToken>> {
    Tokens::new(raw).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! token {
        ( $key:literal = $raw:expr ) => {
            TagToken {
                key: Some($key.to_string()),
                raw: $raw.to_string(),
            }
        };
        ( $raw:expr ) => {
            TagToken {
                key: None,
                raw: $raw.to_string(),
            }
        };
    }

    #[test]
    fn empty_tag_has_no_tokens() {
        assert_eq!(tokenize("").unwrap(), Vec::<TagToken>::new());
    }

    #[test]
    fn quoted_values() {
        let cases: &[(&str, &str)] = &[
            ("s='123'", "123"),
            ("s='with spaces'", "with spaces"),
            ("s=''", ""),
            ("s='has\\'quotes\\''", "has'quotes'"),
        ];
        for (tag, expected) in cases {
            let tokens = tokenize(tag).unwrap();
            assert_eq!(tokens, vec![token!("s" = *expected)], "tag {:?}", tag);
        }
    }

    #[test]
    fn unterminated_quote_rejects_whole_tag() {
        assert_eq!(
            tokenize("s='test string"),
            Err(ScanError::UnterminatedQuote { at: 2 })
        );
        // the error is not confined to the malformed entry
        assert!(tokenize("a=1,s='oops,b=2").is_err());
    }

    #[test]
    fn unterminated_bracket_rejects_whole_tag() {
        assert_eq!(
            tokenize("sa=["),
            Err(ScanError::UnterminatedBracket { at: 3 })
        );
    }

    #[test]
    fn bare_entries_and_separators() {
        assert_eq!(
            tokenize("name,r='r',p=p").unwrap(),
            vec![token!("name"), token!("r" = "r"), token!("p" = "p")],
        );
    }

    #[test]
    fn leading_empty_entry_is_preserved() {
        // ",omitempty" is how a name-carrier option is left at its default
        assert_eq!(
            tokenize(",omitempty").unwrap(),
            vec![token!(""), token!("omitempty")],
        );
    }

    #[test]
    fn explicit_key_with_empty_value() {
        assert_eq!(tokenize("s=").unwrap(), vec![token!("s" = "")]);
    }

    #[test]
    fn bare_values_unescape_quotes() {
        assert_eq!(tokenize("s=it\\'s").unwrap(), vec![token!("s" = "it's")]);
    }

    #[test]
    fn bracketed_value_swallows_commas() {
        assert_eq!(
            tokenize("sa=[1,2,3],b=true").unwrap(),
            vec![token!("sa" = "1,2,3"), token!("b" = "true")],
        );
    }

    #[test]
    fn bracketed_value_unescapes_brackets() {
        assert_eq!(tokenize("sa=[a\\]b]").unwrap(), vec![token!("sa" = "a]b")]);
    }

    #[test]
    fn key_requires_word_characters() {
        // `$name=x` has no legal key prefix; the whole entry is a bare value
        assert_eq!(tokenize("$name=x").unwrap(), vec![token!("$name=x")]);
    }

    #[test]
    fn split_list_elements() {
        assert_eq!(
            split_list("'quoted spaces',not quoted spaces,").unwrap(),
            vec!["quoted spaces", "not quoted spaces", ""],
        );
        assert_eq!(split_list("-1,2").unwrap(), vec!["-1", "2"]);
        assert_eq!(split_list("").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn split_list_resumes_after_quoted_leftovers() {
        // same rule as top-level entries: trailing text starts the next element
        assert_eq!(split_list("'a'x,b").unwrap(), vec!["a", "x", "b"]);
        assert_eq!(tokenize("k='a'x,b").unwrap().len(), 3);
    }

    #[test]
    fn split_list_rejects_unterminated_quote() {
        assert!(split_list("'open,2").is_err());
    }

    #[test]
    fn quoting_round_trip() {
        // tokenizing key='escape(s)' recovers s for any s free of raw quotes
        let samples = ["", "plain", "with spaces", "it's, tricky", "a]b[c"];
        for s in samples {
            let escaped = s.replace('\'', "\\'");
            let tag = format!("key='{}'", escaped);
            assert_eq!(tokenize(&tag).unwrap(), vec![token!("key" = *s)]);
        }
    }
}
