use std::time::Duration;

use chrono::{DateTime, Utc};
use colored::{Color, Colorize};

use crate::fields::{FieldValue, Fields, DELTA_KEY, MESSAGE_KEY, NAMESPACE_KEY, TIME_KEY};

/// Strategy turning one log event into output text.
///
/// Implementations must return the complete line, including its trailing
/// newline.
pub trait Formatter: Send + Sync {
    fn format(&self, entry: &Entry<'_>) -> String;

    /// Whether the formatter renders reserved keys as ordinary fields, in
    /// which case new debuggers are pre-seeded with placeholders for them.
    fn reports_fields_only(&self) -> bool {
        false
    }
}

/// Everything a formatter may render for one log call.
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    pub namespace: &'a str,
    pub color: Color,
    pub message: &'a str,
    pub fields: &'a Fields,
    pub timestamp: DateTime<Utc>,
    /// Elapsed since this debugger's previous call (or its creation)
    pub delta: Duration,
    /// Elapsed since the previous call of any debugger in the runtime
    pub global_delta: Duration,
    pub has_colors: bool,
    pub has_time: bool,
}

impl Entry<'_> {
    /// UTC wall-clock time as `HH:MM:SS.mmm`.
    pub fn time_string(&self) -> String {
        self.timestamp.format("%H:%M:%S%.3f").to_string()
    }

    pub fn delta_string(&self) -> String {
        humanize_duration(self.delta)
    }

    pub fn global_delta_string(&self) -> String {
        humanize_duration(self.global_delta)
    }

    /// The namespace wrapped in its color when colors are on.
    pub fn colored_namespace(&self) -> String {
        if self.has_colors {
            self.namespace.color(self.color).to_string()
        } else {
            self.namespace.to_string()
        }
    }

    /// The debugger's fields with reserved keys replaced by their values.
    ///
    /// `namespace`, `time` and `delta` always take the computed value. `msg`
    /// keeps an application-supplied value and only a placeholder is
    /// replaced by the message.
    pub fn finalized_fields(&self) -> Fields {
        self.fields
            .iter()
            .map(|(key, value)| (key.clone(), self.resolve(key, value)))
            .collect()
    }

    /// Like [`Entry::finalized_fields`], also adding any of `keys` that are
    /// missing.
    pub fn finalized_fields_with(&self, keys: &[&str]) -> Fields {
        let mut fields = self.finalized_fields();
        for key in keys {
            if !fields.contains_key(*key) {
                fields.insert(key.to_string(), self.resolve(key, &FieldValue::Placeholder));
            }
        }
        fields
    }

    fn resolve(&self, key: &str, value: &FieldValue) -> FieldValue {
        match key {
            NAMESPACE_KEY => FieldValue::Str(self.namespace.to_string()),
            TIME_KEY => FieldValue::Str(self.time_string()),
            DELTA_KEY => FieldValue::Str(self.delta_string()),
            MESSAGE_KEY if value.is_placeholder() => FieldValue::Str(self.message.to_string()),
            _ => value.clone(),
        }
    }
}

/// Render a duration as a whole number of the largest unit it exceeds.
pub fn humanize_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();

    let (value, suffix) = match nanos {
        n if n > 1_000_000_000 => (n / 1_000_000_000, "s"),
        n if n > 1_000_000 => (n / 1_000_000, "ms"),
        n if n > 1_000 => (n / 1_000, "us"),
        n => (n, "ns"),
    };

    format!("{}{}", value, suffix)
}
