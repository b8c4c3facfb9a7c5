use std::cmp::Ordering;
use std::fmt::Write;
use std::sync::Arc;

use crate::fields::{is_reserved, FieldValue, Fields};
use crate::formatter::{Entry, Formatter};

/// Ordering applied to field keys before rendering.
pub type KeyOrder = Arc<dyn Fn(&str, &str) -> Ordering + Send + Sync>;

/// Characters that never force a value to be quoted, besides alphanumerics.
const SAFE_PUNCTUATION: &[char] = &['-', '.', '_', '/', '@', '^', '+', ':'];

/// Human-readable line formatter.
///
/// By default renders
/// `<time> <global-delta> <delta> <namespace> - <message> key=value ...`.
/// In fields-only mode the prefix is dropped and namespace, message, time
/// and delta are rendered as `key=value` pairs like any other field.
///
/// Reserved keys are never repeated after the prefix. A `msg` field set with
/// [`Debugger::with_field`](crate::Debugger::with_field) therefore does not
/// appear in prefix mode, and the prefix always shows the logged message. In
/// fields-only mode (and in JSON) the supplied `msg` replaces the message.
#[derive(Clone, Default)]
pub struct TextFormatter {
    fields_only: bool,
    key_order: Option<KeyOrder>,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields_only(mut self, fields_only: bool) -> Self {
        self.fields_only = fields_only;
        self
    }

    /// Replace the default key sort with `order`.
    pub fn with_key_order<F>(mut self, order: F) -> Self
    where
        F: Fn(&str, &str) -> Ordering + Send + Sync + 'static,
    {
        self.key_order = Some(Arc::new(order));
        self
    }

    pub fn is_fields_only(&self) -> bool {
        self.fields_only
    }

    fn render_fields<'f, I>(&self, fields: I) -> String
    where
        I: Iterator<Item = (&'f String, &'f FieldValue)>,
    {
        let mut pairs: Vec<_> = fields.collect();
        if let Some(order) = &self.key_order {
            pairs.sort_by(|(a, _), (b, _)| order(a, b));
        }

        pairs
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, quote_if_needed(&value.to_string())))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn head(&self, entry: &Entry<'_>) -> String {
        let mut head = String::new();
        if entry.has_time {
            let _ = write!(
                head,
                "{} {:<6} {:<6} ",
                entry.time_string(),
                entry.global_delta_string(),
                entry.delta_string()
            );
        }
        head.push_str(&entry.colored_namespace());
        head
    }
}

impl Formatter for TextFormatter {
    fn format(&self, entry: &Entry<'_>) -> String {
        let finalized = entry.finalized_fields();

        if self.fields_only {
            return format!("{}\n", self.render_fields(finalized.iter()));
        }

        // The prefix already carries the reserved values.
        let fields = self.render_fields(finalized.iter().filter(|(key, _)| !is_reserved(key)));

        let mut line = format!("{} - {}", self.head(entry), entry.message);
        if !fields.is_empty() {
            line.push(' ');
            line.push_str(&fields);
        }
        line.push('\n');
        line
    }

    fn reports_fields_only(&self) -> bool {
        self.fields_only
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || SAFE_PUNCTUATION.contains(&c))
}

fn quote_if_needed(value: &str) -> String {
    if needs_quoting(value) {
        format!("{:?}", value)
    } else {
        value.to_string()
    }
}
