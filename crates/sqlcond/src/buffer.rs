//! Append-only output buffer used while rendering.

use crate::args::Token;
use crate::text::SqlText;
use std::fmt;

/// Accumulates rendered SQL with controlled separators.
///
/// The buffer only grows during a render pass; [`reset`](TextBuffer::reset)
/// and [`take`](TextBuffer::take) are the only ways to empty it.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    text: SqlText,
}

impl TextBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw text.
    pub fn write(&mut self, s: &str) -> &mut Self {
        self.text.push_str(s);
        self
    }

    /// Append a placeholder token.
    pub fn write_token(&mut self, token: Token) -> &mut Self {
        self.text.push_token(token);
        self
    }

    /// Append rendered text (raw parts and tokens).
    pub fn write_text(&mut self, text: &SqlText) -> &mut Self {
        self.text.push_text(text);
        self
    }

    /// Append `items` separated by `sep`. No-op on an empty slice; never
    /// emits a leading or trailing separator.
    pub fn write_joined(&mut self, items: &[SqlText], sep: &str) -> &mut Self {
        let Some((first, rest)) = items.split_first() else {
            return self;
        };
        self.write_text(first);
        for item in rest {
            self.write(sep);
            self.write_text(item);
        }
        self
    }

    /// [`write_joined`](TextBuffer::write_joined) for plain strings.
    pub fn write_strs<S: AsRef<str>>(&mut self, items: &[S], sep: &str) -> &mut Self {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(sep);
            }
            self.write(item.as_ref());
        }
        self
    }

    /// Append `s`, preceded by a single space unless the buffer is empty.
    pub fn write_leading(&mut self, s: &str) -> &mut Self {
        if !self.is_empty() {
            self.write(" ");
        }
        self.write(s)
    }

    /// [`write_leading`](TextBuffer::write_leading) for rendered text.
    pub fn write_leading_text(&mut self, text: &SqlText) -> &mut Self {
        if !self.is_empty() {
            self.write(" ");
        }
        self.write_text(text)
    }

    /// Check if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Current contents.
    pub fn as_text(&self) -> &SqlText {
        &self.text
    }

    /// Clear the buffer.
    pub fn reset(&mut self) {
        self.text = SqlText::new();
    }

    /// Move the contents out, leaving the buffer empty.
    pub fn take(&mut self) -> SqlText {
        std::mem::take(&mut self.text)
    }
}

impl fmt::Write for TextBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;
    use std::fmt::Write as _;

    #[test]
    fn write_joined_empty_is_noop() {
        let mut buf = TextBuffer::new();
        buf.write_joined(&[], ", ");
        assert!(buf.is_empty());
        assert_eq!(buf.as_text().to_string(), "");
    }

    #[test]
    fn write_joined_has_no_outer_separators() {
        let mut buf = TextBuffer::new();
        buf.write_joined(&["a".into(), "b".into(), "c".into()], " OR ");
        assert_eq!(buf.as_text().to_string(), "a OR b OR c");

        let mut single = TextBuffer::new();
        single.write_joined(&["a".into()], " OR ");
        assert_eq!(single.as_text().to_string(), "a");
    }

    #[test]
    fn write_leading_skips_space_when_empty() {
        let mut buf = TextBuffer::new();
        buf.write_leading("DELETE FROM t").write_leading("WHERE x");
        assert_eq!(buf.as_text().to_string(), "DELETE FROM t WHERE x");
    }

    #[test]
    fn take_empties_buffer() {
        let mut args = Args::new();
        let mut buf = TextBuffer::new();
        buf.write("id = ").write_token(args.add(1));

        let text = buf.take();
        assert_eq!(text.placeholder_count(), 1);
        assert!(buf.is_empty());
    }

    #[test]
    fn fmt_write_appends() {
        let mut buf = TextBuffer::new();
        write!(buf, "LIMIT {}", 10).unwrap();
        assert_eq!(buf.as_text().to_string(), "LIMIT 10");
    }

    #[test]
    fn write_strs_joins_plain_strings() {
        let mut buf = TextBuffer::new();
        buf.write_strs(&["id", "name"], ", ");
        assert_eq!(buf.as_text().to_string(), "id, name");
    }
}
