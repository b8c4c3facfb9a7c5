use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::Utc;
use colored::Color;
use rand::Rng;

use crate::fields::{FieldValue, Fields, DELTA_KEY, MESSAGE_KEY, NAMESPACE_KEY, TIME_KEY};
use crate::formatter::Entry;
use crate::message::Message;
use crate::runtime::{Runtime, Settings};

/// Separator placed between a parent namespace and a spawned segment.
pub const NAMESPACE_SEPARATOR: &str = ":";

/// Prefix of the namespace error messages are logged under.
pub const ERROR_PREFIX: &str = "error:";

/// Colors handed out to new debuggers.
pub const PALETTE: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
];

/// Per-namespace state shared by every handle to the same cached debugger.
pub(crate) struct DebuggerState {
    namespace: String,
    color: Color,
    prev: Mutex<Instant>,
    fields: Mutex<Fields>,
}

impl DebuggerState {
    pub(crate) fn new(namespace: &str, settings: &Settings) -> Self {
        let color = PALETTE[rand::rng().random_range(0..PALETTE.len())];

        let mut fields = Fields::new();
        if settings.formatter().reports_fields_only() {
            fields.insert(NAMESPACE_KEY.to_string(), FieldValue::Placeholder);
            fields.insert(MESSAGE_KEY.to_string(), FieldValue::Placeholder);

            if settings.has_time() {
                fields.insert(TIME_KEY.to_string(), FieldValue::Placeholder);
                fields.insert(DELTA_KEY.to_string(), FieldValue::Placeholder);
            }
        }

        Self {
            namespace: namespace.to_string(),
            color,
            prev: Mutex::new(Instant::now()),
            fields: Mutex::new(fields),
        }
    }

    fn fields(&self) -> MutexGuard<'_, Fields> {
        self.fields.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn prev(&self) -> MutexGuard<'_, Instant> {
        self.prev.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Logging handle for one namespace.
///
/// Cloning is cheap and clones share color, fields and timing. Handles
/// obtained from the same runtime for the same namespace within the cache
/// lifetime share state as well.
#[derive(Clone)]
pub struct Debugger {
    state: Arc<DebuggerState>,
    runtime: Runtime,
}

impl Debugger {
    pub(crate) fn new(state: Arc<DebuggerState>, runtime: Runtime) -> Self {
        Self { state, runtime }
    }

    pub fn namespace(&self) -> &str {
        &self.state.namespace
    }

    pub fn color(&self) -> Color {
        self.state.color
    }

    /// Snapshot of the accumulated fields.
    pub fn fields(&self) -> Fields {
        self.state.fields().clone()
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Whether a log call on this debugger would currently be written.
    pub fn is_enabled(&self) -> bool {
        self.runtime.settings().is_active(self.namespace())
    }

    /// Write `message` if this namespace is active.
    ///
    /// Deferred messages are only evaluated when the call is active. An
    /// inactive call touches no state.
    pub fn log<'a>(&self, message: impl Into<Message<'a>>) {
        let settings = self.runtime.settings();
        if !settings.is_active(self.namespace()) {
            return;
        }

        let message = message.into().render();
        let now = Instant::now();
        let delta = now.saturating_duration_since(std::mem::replace(&mut *self.state.prev(), now));
        let global_delta = self.runtime.touch(now);
        let fields = self.fields();

        let entry = Entry {
            namespace: self.namespace(),
            color: self.state.color,
            message: &message,
            fields: &fields,
            timestamp: Utc::now(),
            delta,
            global_delta,
            has_colors: settings.has_colors(),
            has_time: settings.has_time(),
        };

        settings.sink().write_line(&settings.formatter().format(&entry));
    }

    /// [`Debugger::log`] with a closure that builds the message.
    pub fn log_lazy<F>(&self, build: F)
    where
        F: FnOnce() -> String,
    {
        self.log(Message::lazy(build))
    }

    /// Log on `error:<namespace>` so errors can be enabled separately.
    pub fn error<'a>(&self, message: impl Into<Message<'a>>) {
        self.runtime
            .debugger(&format!("{}{}", ERROR_PREFIX, self.namespace()))
            .log(message)
    }

    /// Debugger for `<namespace>:<child>`.
    pub fn spawn(&self, child: &str) -> Debugger {
        self.runtime
            .debugger(&format!("{}{}{}", self.namespace(), NAMESPACE_SEPARATOR, child))
    }

    /// Set one field. Reserved keys are rendered from computed values.
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<FieldValue>) -> Debugger {
        self.state.fields().insert(key.into(), value.into());
        self.clone()
    }

    /// Merge `fields` into the accumulated fields.
    pub fn with_fields<I, K, V>(&self, fields: I) -> Debugger
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.state
            .fields()
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        self.clone()
    }

    /// Remove a field, including a pre-seeded reserved placeholder.
    pub fn without_field(&self, key: &str) -> Debugger {
        self.state.fields().remove(key);
        self.clone()
    }

    /// Render `message` through the active formatter without filtering,
    /// writing, or moving the timing baseline.
    pub fn render<'a>(&self, message: impl Into<Message<'a>>) -> String {
        let settings = self.runtime.settings();
        let message = message.into().render();
        let now = Instant::now();
        let delta = now.saturating_duration_since(*self.state.prev());
        let fields = self.fields();

        let entry = Entry {
            namespace: self.namespace(),
            color: self.state.color,
            message: &message,
            fields: &fields,
            timestamp: Utc::now(),
            delta,
            global_delta: self.runtime.since_last_emit(now),
            has_colors: settings.has_colors(),
            has_time: settings.has_time(),
        };

        settings.formatter().format(&entry)
    }

    /// Whether both handles share the same underlying state.
    pub fn ptr_eq(&self, other: &Debugger) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for Debugger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debugger")
            .field("namespace", &self.state.namespace)
            .field("color", &self.state.color)
            .field("fields", &*self.state.fields())
            .finish()
    }
}
