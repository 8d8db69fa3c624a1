//! Minimal XML writer and pull tokenizer.
//!
//! Covers exactly what the record format emits: elements, attributes,
//! text content, and the five standard entity escapes. No namespaces, no
//! processing instructions, no comments, no DTDs. Whitespace-only text
//! between elements is dropped; a whitespace-only run that forms an
//! element's entire content is kept.

use crate::error::MetadataError;

///
/// XmlWriter
///
/// Compact single-line output; the format is machine-to-machine.
///

#[derive(Debug, Default)]
pub struct XmlWriter {
    out: String,
}

impl XmlWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.out
    }

    pub fn open(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attrs {
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            escape_into(&mut self.out, value);
            self.out.push('"');
        }
        self.out.push('>');
    }

    pub fn self_closing(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.open(name, attrs);
        // Rewrite the trailing '>' as '/>'.
        self.out.pop();
        self.out.push_str("/>");
    }

    pub fn close(&mut self, name: &str) {
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    pub fn text(&mut self, content: &str) {
        escape_into(&mut self.out, content);
    }
}

fn escape_into(out: &mut String, content: &str) {
    for ch in content.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
}

///
/// XmlToken
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum XmlToken {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close(String),
    Text(String),
}

impl XmlToken {
    /// Attribute lookup on an open token.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Self::Open { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }
}

///
/// XmlParser
///
/// Pull tokenizer over one document string. Every malformation is a
/// corruption error; parsing never resynchronizes.
///

pub struct XmlParser<'a> {
    rest: &'a str,
    peeked: Option<XmlToken>,
    in_content: bool,
}

impl<'a> XmlParser<'a> {
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            rest: input,
            peeked: None,
            in_content: false,
        }
    }

    /// The next token, or `None` at end of input.
    pub fn next(&mut self) -> Result<Option<XmlToken>, MetadataError> {
        if let Some(token) = self.peeked.take() {
            return Ok(Some(token));
        }
        self.lex()
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> Result<Option<&XmlToken>, MetadataError> {
        if self.peeked.is_none() {
            self.peeked = self.lex()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// Consume the next token and require an opening element.
    pub fn expect_open(&mut self) -> Result<XmlToken, MetadataError> {
        match self.next()? {
            Some(token @ XmlToken::Open { .. }) => Ok(token),
            other => Err(malformed(format!("expected opening element, found {other:?}"))),
        }
    }

    /// Consume the next token and require the named closing element.
    pub fn expect_close(&mut self, name: &str) -> Result<(), MetadataError> {
        match self.next()? {
            Some(XmlToken::Close(found)) if found == name => Ok(()),
            other => Err(malformed(format!("expected </{name}>, found {other:?}"))),
        }
    }

    /// Collect text content up to (not including) the next tag.
    pub fn take_text(&mut self) -> Result<String, MetadataError> {
        match self.peek()? {
            Some(XmlToken::Text(_)) => match self.next()? {
                Some(XmlToken::Text(text)) => Ok(text),
                _ => unreachable!("peeked text token"),
            },
            _ => Ok(String::new()),
        }
    }

    fn lex(&mut self) -> Result<Option<XmlToken>, MetadataError> {
        if self.rest.is_empty() {
            return Ok(None);
        }

        if let Some(after) = self.rest.strip_prefix("</") {
            let end = after
                .find('>')
                .ok_or_else(|| malformed("unterminated closing tag"))?;
            let name = after[..end].trim().to_string();
            self.rest = &after[end + 1..];
            self.in_content = false;
            return Ok(Some(XmlToken::Close(name)));
        }

        if let Some(after) = self.rest.strip_prefix('<') {
            let end = after
                .find('>')
                .ok_or_else(|| malformed("unterminated opening tag"))?;
            let (inner, self_closing) = match after[..end].strip_suffix('/') {
                Some(inner) => (inner, true),
                None => (&after[..end], false),
            };
            let token = parse_tag(inner, self_closing)?;
            self.rest = &after[end + 1..];
            self.in_content = !self_closing;
            return Ok(Some(token));
        }

        let end = self.rest.find('<').unwrap_or(self.rest.len());
        let raw = &self.rest[..end];
        // Indentation between elements is noise; a whitespace-only run
        // directly between an open tag and its close is element content.
        let content = self.in_content && self.rest[end..].starts_with("</");
        self.rest = &self.rest[end..];
        self.in_content = false;
        if raw.trim().is_empty() && !content {
            return self.lex();
        }
        Ok(Some(XmlToken::Text(unescape(raw)?)))
    }
}

fn parse_tag(inner: &str, self_closing: bool) -> Result<XmlToken, MetadataError> {
    let inner = inner.trim();
    let name_end = inner
        .find(|c: char| c.is_whitespace())
        .unwrap_or(inner.len());
    let name = &inner[..name_end];
    if name.is_empty() {
        return Err(malformed("empty element name"));
    }

    let mut attrs = Vec::new();
    let mut rest = inner[name_end..].trim_start();
    while !rest.is_empty() {
        let eq = rest
            .find('=')
            .ok_or_else(|| malformed(format!("attribute without value in <{name}>")))?;
        let key = rest[..eq].trim_end().to_string();
        let after = rest[eq + 1..].trim_start();
        let after = after
            .strip_prefix('"')
            .ok_or_else(|| malformed(format!("unquoted attribute '{key}'")))?;
        let end = after
            .find('"')
            .ok_or_else(|| malformed(format!("unterminated attribute '{key}'")))?;
        attrs.push((key, unescape(&after[..end])?));
        rest = after[end + 1..].trim_start();
    }

    Ok(XmlToken::Open {
        name: name.to_string(),
        attrs,
        self_closing,
    })
}

fn unescape(raw: &str) -> Result<String, MetadataError> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let end = rest
            .find(';')
            .ok_or_else(|| malformed("unterminated entity reference"))?;
        match &rest[..=end] {
            "&amp;" => out.push('&'),
            "&lt;" => out.push('<'),
            "&gt;" => out.push('>'),
            "&quot;" => out.push('"'),
            "&apos;" => out.push('\''),
            other => return Err(malformed(format!("unknown entity reference '{other}'"))),
        }
        rest = &rest[end + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

fn malformed(message: impl Into<String>) -> MetadataError {
    MetadataError::codec_corruption(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_reads_nested_elements() {
        let mut writer = XmlWriter::new();
        writer.open("Outer", &[("id", "5")]);
        writer.open("Inner", &[]);
        writer.text("a < b & c");
        writer.close("Inner");
        writer.self_closing("Empty", &[("ref", "T9")]);
        writer.close("Outer");
        let doc = writer.into_string();

        let mut parser = XmlParser::new(&doc);
        let outer = parser.expect_open().unwrap();
        assert_eq!(outer.attr("id"), Some("5"));

        let inner = parser.expect_open().unwrap();
        assert_eq!(inner.attr("id"), None);
        assert_eq!(parser.take_text().unwrap(), "a < b & c");
        parser.expect_close("Inner").unwrap();

        let empty = parser.expect_open().unwrap();
        assert!(matches!(empty, XmlToken::Open { self_closing: true, .. }));
        assert_eq!(empty.attr("ref"), Some("T9"));

        parser.expect_close("Outer").unwrap();
        assert!(parser.next().unwrap().is_none());
    }

    #[test]
    fn whitespace_between_elements_is_dropped() {
        let mut parser = XmlParser::new("<A>\n  <B/>\n</A>");
        parser.expect_open().unwrap();
        parser.expect_open().unwrap();
        parser.expect_close("A").unwrap();
    }

    #[test]
    fn whitespace_only_content_is_preserved() {
        let mut parser = XmlParser::new("<A>\n  <B>   </B>\n</A>");
        parser.expect_open().unwrap();
        parser.expect_open().unwrap();
        assert_eq!(parser.take_text().unwrap(), "   ");
        parser.expect_close("B").unwrap();
        parser.expect_close("A").unwrap();
        assert!(parser.next().unwrap().is_none());
    }

    #[test]
    fn attribute_values_unescape() {
        let mut parser = XmlParser::new("<A name=\"x &amp; y\"/>");
        let token = parser.expect_open().unwrap();
        assert_eq!(token.attr("name"), Some("x & y"));
    }

    #[test]
    fn unterminated_tag_is_corruption() {
        let mut parser = XmlParser::new("<A");
        assert!(parser.next().is_err());
    }

    #[test]
    fn unknown_entity_is_corruption() {
        let mut parser = XmlParser::new("<A>&bogus;</A>");
        parser.expect_open().unwrap();
        assert!(parser.next().is_err());
    }
}
