//! Line-oriented XML writer used by the encoder

use crate::config::EditorConfig;
use std::borrow::Cow;

/// Writes one element per line at the current depth
pub struct XmlWriter {
    buf: String,
    unit: String,
    depth: usize,
    final_newline: bool,
}

impl XmlWriter {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            buf: String::new(),
            unit: config.indent_str(),
            depth: 0,
            final_newline: config.insert_final_newline,
        }
    }

    /// Consume the writer, applying the final-newline setting
    pub fn finish(mut self) -> String {
        let content_len = self.buf.trim_end_matches('\n').len();
        self.buf.truncate(content_len);
        if self.final_newline {
            self.buf.push('\n');
        }
        self.buf
    }

    /// `<?xml ...?>` line
    pub fn declaration(&mut self, version: &str, encoding: &str, standalone: bool) {
        self.buf.push_str("<?xml");
        self.push_attributes(&[("version", version), ("encoding", encoding)]);
        if standalone {
            self.push_attributes(&[("standalone", "yes")]);
        }
        self.buf.push_str("?>\n");
    }

    /// `<name attrs...>` on its own line; children go one level deeper
    pub fn open(&mut self, name: &str, attributes: &[(&str, &str)]) {
        self.start_tag(name, attributes);
        self.buf.push_str(">\n");
        self.depth += 1;
    }

    /// `</name>` one level up
    pub fn close(&mut self, name: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.pad();
        self.buf.push_str("</");
        self.buf.push_str(name);
        self.buf.push_str(">\n");
    }

    /// `<name>text</name>` on one line
    pub fn text_element(&mut self, name: &str, text: &str) {
        self.start_tag(name, &[]);
        self.buf.push('>');
        self.buf.push_str(&escape(text));
        self.buf.push_str("</");
        self.buf.push_str(name);
        self.buf.push_str(">\n");
    }

    /// `<name attrs.../>` on one line
    pub fn empty_element(&mut self, name: &str, attributes: &[(&str, &str)]) {
        self.start_tag(name, attributes);
        self.buf.push_str("/>\n");
    }

    fn start_tag(&mut self, name: &str, attributes: &[(&str, &str)]) {
        self.pad();
        self.buf.push('<');
        self.buf.push_str(name);
        self.push_attributes(attributes);
    }

    fn push_attributes(&mut self, attributes: &[(&str, &str)]) {
        for (name, value) in attributes {
            self.buf.push(' ');
            self.buf.push_str(name);
            self.buf.push_str("=\"");
            self.buf.push_str(&escape_attribute(value));
            self.buf.push('"');
        }
    }

    fn pad(&mut self) {
        for _ in 0..self.depth {
            self.buf.push_str(&self.unit);
        }
    }
}

/// Escape element text.
///
/// Covers `& < > " '` plus `\r`, which a parser would otherwise fold into
/// `\n`.
pub fn escape(s: &str) -> Cow<'_, str> {
    escape_with(s, false)
}

/// Escape an attribute value.
///
/// On top of [`escape`], `\n` and `\t` become character references so
/// attribute-value normalization does not turn them into spaces.
pub fn escape_attribute(s: &str) -> Cow<'_, str> {
    escape_with(s, true)
}

fn escape_with(s: &str, attribute: bool) -> Cow<'_, str> {
    let needs_escape = |c: char| match c {
        '&' | '<' | '>' | '"' | '\'' | '\r' => true,
        '\n' | '\t' => attribute,
        _ => false,
    };
    if !s.contains(needs_escape) {
        return Cow::Borrowed(s);
    }

    let mut escaped = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        let entity = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' => "&quot;",
            '\'' => "&apos;",
            '\r' => "&#13;",
            '\n' if attribute => "&#10;",
            '\t' if attribute => "&#9;",
            other => {
                escaped.push(other);
                continue;
            }
        };
        escaped.push_str(entity);
    }
    Cow::Owned(escaped)
}
