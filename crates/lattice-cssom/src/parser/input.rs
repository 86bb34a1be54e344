//! Parser input sources and source locations.

use std::io::{self, Read};

use encoding_rs::{Encoding, UTF_8};
use serde::{Deserialize, Serialize};

/// A 1-based position in CSS source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub column: u32,
}

impl Locator {
    /// Create a locator.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    pub(crate) fn from_css(loc: cssparser::SourceLocation) -> Self {
        // cssparser lines are 0-based, columns 1-based.
        Self {
            line: loc.line + 1,
            column: loc.column,
        }
    }
}

/// CSS text handed to the parser, with an optional declared encoding and the
/// URI it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputSource {
    text: String,
    encoding: Option<String>,
    uri: Option<String>,
}

impl InputSource {
    /// Create an input source from CSS text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            encoding: None,
            uri: None,
        }
    }

    /// Decode raw bytes.
    ///
    /// The encoding is chosen in this order: a byte order mark, the declared
    /// `encoding` label, a leading `@charset "label";` rule, then UTF-8.
    /// An unknown declared label is logged and skipped. Malformed sequences
    /// become U+FFFD.
    pub fn from_bytes(bytes: &[u8], encoding: Option<&str>) -> Self {
        let declared = encoding.and_then(|label| {
            let found = Encoding::for_label(label.trim().as_bytes());
            if found.is_none() {
                tracing::warn!("Unknown stylesheet encoding '{}', ignoring it", label);
            }
            found
        });

        let (text, detected) = if let Some((enc, bom_len)) = Encoding::for_bom(bytes) {
            (enc.decode_without_bom_handling(&bytes[bom_len..]).0, enc)
        } else {
            let enc = declared.or_else(|| sniff_charset_rule(bytes)).unwrap_or(UTF_8);
            (enc.decode_without_bom_handling(bytes).0, enc)
        };

        Self {
            text: text.into_owned(),
            encoding: Some(encoding.map_or_else(|| detected.name().to_string(), str::to_string)),
            uri: None,
        }
    }

    /// Read an input source to the end.
    pub fn from_reader(mut reader: impl Read) -> io::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::from_bytes(&bytes, None))
    }

    /// Set the declared encoding.
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Set the URI this source was loaded from.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// The CSS text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The declared encoding, if any.
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// The URI this source was loaded from, if known.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }
}

impl From<&str> for InputSource {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for InputSource {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Read the label of a `@charset "label";` rule at the very start of `bytes`.
fn sniff_charset_rule(bytes: &[u8]) -> Option<&'static Encoding> {
    let rest = bytes.strip_prefix(b"@charset \"")?;
    let end = rest.iter().take(1024).position(|&b| b == b'"')?;
    if rest.get(end + 1) != Some(&b';') {
        return None;
    }
    // UTF-16 labels resolve to UTF-8.
    Encoding::for_label(&rest[..end]).map(Encoding::output_encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bom() {
        let source = InputSource::from_bytes(b"\xEF\xBB\xBFa { }", Some("UTF-8"));
        assert_eq!(source.text(), "a { }");
        assert_eq!(source.encoding(), Some("UTF-8"));
    }

    #[test]
    fn declared_latin1_is_decoded() {
        let source = InputSource::from_bytes(b"p { content: \"caf\xE9\" }", Some("iso-8859-1"));
        assert_eq!(source.text(), "p { content: \"caf\u{e9}\" }");
        assert_eq!(source.encoding(), Some("iso-8859-1"));
    }

    #[test]
    fn charset_rule_selects_encoding() {
        let bytes = b"@charset \"windows-1252\"; p::after { content: \"\xA3\" }";
        let source = InputSource::from_bytes(bytes, None);
        assert!(source.text().contains('\u{a3}'), "{}", source.text());
        assert!(source.text().starts_with("@charset"));
        assert_eq!(source.encoding(), Some("windows-1252"));

        let source = InputSource::from_bytes(b"@charset \"utf-16\"; a { }", None);
        assert_eq!(source.text(), "@charset \"utf-16\"; a { }");
        assert_eq!(source.encoding(), Some("UTF-8"));
    }

    #[test]
    fn declared_encoding_beats_charset_rule() {
        let bytes = b"@charset \"iso-8859-1\"; a { content: \"\xC3\xA9\" }";
        let source = InputSource::from_bytes(bytes, Some("utf-8"));
        assert!(source.text().contains('\u{e9}'));
    }

    #[test]
    fn unknown_label_and_bad_bytes() {
        let source = InputSource::from_bytes(b"a { content: \"\xFF\" }", Some("no-such-charset"));
        assert_eq!(source.text(), "a { content: \"\u{fffd}\" }");
        assert_eq!(InputSource::from_bytes(b"", None).text(), "");
    }

    #[test]
    fn utf16_bom() {
        let source = InputSource::from_bytes(b"\xFF\xFEa\0{\0}\0", None);
        assert_eq!(source.text(), "a{}");
        assert_eq!(source.encoding(), Some("UTF-16LE"));
    }

    #[test]
    fn reads_from_reader() {
        let source = InputSource::from_reader(&b"p { color: red }"[..]).unwrap();
        assert_eq!(source.text(), "p { color: red }");
        assert_eq!(source.uri(), None);
    }

    #[test]
    fn builder_sets_uri() {
        let source = InputSource::new("").with_uri("file:///a.css");
        assert_eq!(source.uri(), Some("file:///a.css"));
    }
}
