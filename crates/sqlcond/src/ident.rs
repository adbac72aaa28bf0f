//! SQL identifier escaping.
//!
//! Two entry points:
//!
//! - [`escape`] is lenient and infallible. Plain parts (`[A-Za-z_][A-Za-z0-9_$]*`),
//!   `*` and parts that are already correctly double-quoted pass through; anything
//!   else is wrapped in double quotes with `"` doubled. Escaping is idempotent.
//! - [`Ident::parse`] is strict and rejects anything that is not a well-formed
//!   (optionally dotted, optionally quoted) identifier.
//!
//! Values are never inlined, so neither path deals with value quoting.
//!
//! # Example
//! ```ignore
//! use sqlcond::ident::{escape, Ident};
//!
//! assert_eq!(escape("demo.user"), "demo.user");
//! assert_eq!(escape("order total"), r#""order total""#);
//! let strict = Ident::parse(r#"public."UserTable".id"#)?;
//! # Ok::<(), sqlcond::CondError>(())
//! ```

use crate::error::{CondError, CondResult};
use std::collections::HashMap;
use std::fmt;

/// Escape a field or table reference so it can be placed directly into SQL.
pub fn escape(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for (i, part) in split_parts(name).into_iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        if part.is_empty() || part == "*" || is_plain(part) || is_quoted(part) {
            out.push_str(part);
        } else {
            push_quoted(&mut out, part);
        }
    }
    out
}

/// Escape a list of names. Repeated names are escaped once per call.
pub fn escape_all<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut cache: HashMap<&str, String> = HashMap::new();
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            cache.entry(name).or_insert_with(|| escape(name)).clone()
        })
        .collect()
}

// Split on '.' that are not inside double quotes.
fn split_parts(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn is_plain(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
}

fn is_quoted(part: &str) -> bool {
    if part.len() < 2 || !part.starts_with('"') || !part.ends_with('"') {
        return false;
    }
    let mut chars = part[1..part.len() - 1].chars();
    while let Some(c) = chars.next() {
        match c {
            '\0' => return false,
            '"' if chars.next() != Some('"') => return false,
            _ => {}
        }
    }
    true
}

fn push_quoted(out: &mut String, name: &str) {
    out.push('"');
    for ch in name.chars() {
        match ch {
            '"' => out.push_str("\"\""),
            '\0' => {}
            _ => out.push(ch),
        }
    }
    out.push('"');
}

/// One segment of a validated identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    /// Plain segment, written as-is.
    Unquoted(String),
    /// Segment written inside double quotes. Holds the unquoted name.
    Quoted(String),
}

/// A validated, possibly dotted identifier such as `public."UserTable".id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

impl Ident {
    /// Wrap any name as a single quoted segment.
    pub fn quoted(name: &str) -> CondResult<Self> {
        match name {
            "" => Err(CondError::invalid_identifier("empty quoted identifier")),
            n if n.contains('\0') => Err(CondError::invalid_identifier(format!(
                "NUL byte in identifier {n:?}"
            ))),
            n => Ok(Self {
                parts: vec![IdentPart::Quoted(n.to_string())],
            }),
        }
    }

    /// Strictly parse `s`. Every dotted segment must be a plain name or a
    /// correctly quoted one; `*`, empty segments and stray characters are
    /// rejected.
    pub fn parse(s: &str) -> CondResult<Self> {
        if s.is_empty() {
            return Err(CondError::invalid_identifier("empty identifier"));
        }
        split_parts(s)
            .into_iter()
            .map(|part| parse_part(s, part))
            .collect::<CondResult<Vec<_>>>()
            .map(|parts| Self { parts })
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Unquoted(name) => out.push_str(name),
                IdentPart::Quoted(name) => push_quoted(&mut out, name),
            }
        }
        out
    }
}

fn parse_part(whole: &str, part: &str) -> CondResult<IdentPart> {
    if is_plain(part) {
        return Ok(IdentPart::Unquoted(part.to_string()));
    }
    if part.len() > 2 && is_quoted(part) {
        let inner = &part[1..part.len() - 1];
        return Ok(IdentPart::Quoted(inner.replace("\"\"", "\"")));
    }
    let reason = if part.is_empty() {
        "empty segment"
    } else if part.starts_with('"') {
        "malformed quoted segment"
    } else {
        "invalid character"
    };
    Err(CondError::invalid_identifier(format!("{reason} in {whole:?}")))
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// An escaped field reference, ready to be written into SQL.
///
/// Escaping happens exactly once, when the `Field` is created. Rendering a
/// condition never re-escapes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field(String);

impl Field {
    /// Escape `name` leniently.
    pub fn new(name: &str) -> Self {
        Self(escape(name))
    }

    /// Parse `name` strictly, failing with [`CondError::InvalidIdentifier`].
    pub fn try_new(name: &str) -> CondResult<Self> {
        Ident::parse(name).map(Self::from)
    }

    /// The escaped SQL text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Field {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Field {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<&String> for Field {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl From<Ident> for Field {
    fn from(ident: Ident) -> Self {
        Self(ident.to_sql())
    }
}

impl From<&Ident> for Field {
    fn from(ident: &Ident) -> Self {
        Self(ident.to_sql())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_passes_plain_names() {
        assert_eq!(escape("id"), "id");
        assert_eq!(escape("demo.user"), "demo.user");
        assert_eq!(escape("my_var$1"), "my_var$1");
        assert_eq!(escape("u.*"), "u.*");
    }

    #[test]
    fn escape_quotes_special_characters() {
        assert_eq!(escape("order total"), r#""order total""#);
        assert_eq!(escape("1st"), r#""1st""#);
        assert_eq!(escape("public.user name"), r#"public."user name""#);
        assert_eq!(escape(r#"we"ird"#), r#""we""ird""#);
    }

    #[test]
    fn escape_keeps_quoted_parts() {
        assert_eq!(escape(r#""CamelCase"."User""#), r#""CamelCase"."User""#);
        assert_eq!(escape(r#"public."a.b""#), r#"public."a.b""#);
    }

    #[test]
    fn escape_neutralizes_injection() {
        let escaped = escape("id; DROP TABLE users; --");
        assert_eq!(escaped, r#""id; DROP TABLE users; --""#);
    }

    #[test]
    fn escape_drops_nul() {
        assert_eq!(escape("a\0b"), r#""ab""#);
    }

    #[test]
    fn escape_is_idempotent() {
        for name in [
            "id",
            "demo.user",
            "order total",
            r#"we"ird"#,
            r#""abc"#,
            r#""a"b"#,
            "x.y z.\"w\"",
            "",
            "a..b",
            "a\0b",
        ] {
            let once = escape(name);
            assert_eq!(escape(&once), once, "escaping {name:?}");
        }
    }

    #[test]
    fn escape_all_reuses_cache() {
        let out = escape_all(&["id", "first name", "id"]);
        assert_eq!(out, vec!["id", r#""first name""#, "id"]);
    }

    #[test]
    fn ident_parses_dotted_and_quoted() {
        assert_eq!(Ident::parse("public.users").unwrap().to_sql(), "public.users");
        assert_eq!(
            Ident::parse(r#"public."UserTable".id"#).unwrap().to_sql(),
            r#"public."UserTable".id"#
        );
        assert_eq!(
            Ident::parse(r#""has""quote""#).unwrap().to_sql(),
            r#""has""quote""#
        );
    }

    #[test]
    fn ident_rejects_unsafe() {
        assert!(Ident::parse("").is_err());
        assert!(Ident::parse("1table").is_err());
        assert!(Ident::parse("my table").is_err());
        assert!(Ident::parse("schema..table").is_err());
        assert!(Ident::parse("schema.").is_err());
        assert!(Ident::parse(r#""unclosed"#).is_err());
        assert!(Ident::parse("users; drop table users; --").is_err());
    }

    #[test]
    fn ident_quoted_wraps_anything() {
        let ident = Ident::quoted("Order Total").unwrap();
        assert_eq!(Field::from(&ident).as_str(), r#""Order Total""#);
        assert!(Ident::quoted("").unwrap_err().is_invalid_identifier());
        assert!(Ident::quoted("a\0b").is_err());
    }

    #[test]
    fn field_strict_and_lenient() {
        assert_eq!(Field::new("first name").as_str(), r#""first name""#);
        assert!(Field::try_new("first name").unwrap_err().is_invalid_identifier());
        assert_eq!(Field::try_new("users.id").unwrap().as_str(), "users.id");
    }

    #[test]
    fn field_from_escaped_text_is_stable() {
        let once = Field::new("first name");
        let twice = Field::new(once.as_str());
        assert_eq!(once, twice);
    }
}
