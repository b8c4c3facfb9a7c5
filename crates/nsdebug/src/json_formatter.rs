use std::io;

use serde::Serialize;
use serde_json::ser::{CompactFormatter, PrettyFormatter, Serializer};
use tracing::warn;

use crate::fields::{Fields, DELTA_KEY, MESSAGE_KEY, NAMESPACE_KEY, TIME_KEY};
use crate::formatter::{Entry, Formatter};

/// Formats each call as one JSON object per line.
///
/// The object holds every field of the debugger plus `namespace` and `msg`,
/// and `time`/`delta` while time is enabled. Error values are written as
/// their description. Unless disabled, `<`, `>` and `&` in strings are
/// written as `\u003c`, `\u003e` and `\u0026` so lines can be embedded in
/// HTML safely.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter {
    /// Indent objects over multiple lines
    pub pretty: bool,
    /// Write `<`, `>` and `&` unescaped
    pub disable_html_escape: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    pub fn with_html_escape(mut self, escape: bool) -> Self {
        self.disable_html_escape = !escape;
        self
    }

    fn encode(&self, fields: &Fields) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        match (self.pretty, self.disable_html_escape) {
            (false, true) => fields.serialize(&mut Serializer::new(&mut buf))?,
            (true, true) => fields.serialize(&mut Serializer::pretty(&mut buf))?,
            (false, false) => fields.serialize(&mut Serializer::with_formatter(
                &mut buf,
                HtmlEscape(CompactFormatter),
            ))?,
            (true, false) => fields.serialize(&mut Serializer::with_formatter(
                &mut buf,
                HtmlEscape(PrettyFormatter::new()),
            ))?,
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, entry: &Entry<'_>) -> String {
        let fields = if entry.has_time {
            entry.finalized_fields_with(&[NAMESPACE_KEY, MESSAGE_KEY, TIME_KEY, DELTA_KEY])
        } else {
            entry.finalized_fields_with(&[NAMESPACE_KEY, MESSAGE_KEY])
        };

        // Field values always serialize; the error arm is a guard only.
        match self.encode(&fields) {
            Ok(json) => json + "\n",
            Err(e) => {
                warn!(namespace = entry.namespace, error = %e, "failed to encode fields");
                failure_line(&e)
            }
        }
    }

    fn reports_fields_only(&self) -> bool {
        true
    }
}

fn failure_line(e: &serde_json::Error) -> String {
    format!("failed to marshal fields to JSON, {}\n", e)
}

/// Wraps a serde_json formatter, escaping HTML-significant characters
/// inside strings.
struct HtmlEscape<F>(F);

impl<F: serde_json::ser::Formatter> serde_json::ser::Formatter for HtmlEscape<F> {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            let escaped = match c {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            self.0.write_string_fragment(writer, &fragment[start..i])?;
            writer.write_all(escaped.as_bytes())?;
            start = i + c.len_utf8();
        }
        self.0.write_string_fragment(writer, &fragment[start..])
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }
}
