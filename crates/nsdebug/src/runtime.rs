use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use nsdebug_pattern::Pattern;
use tracing::{debug, warn};

use crate::cache::NamespaceCache;
use crate::config::{parse_cache_minutes, Config};
use crate::debugger::{Debugger, DebuggerState};
use crate::error::DebugError;
use crate::formatter::Formatter;
use crate::text_formatter::TextFormatter;

/// Byte stream formatted lines are written to.
#[derive(Clone)]
pub struct Sink(Arc<Mutex<Box<dyn Write + Send>>>);

impl Sink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Sink(Arc::new(Mutex::new(Box::new(writer))))
    }

    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }

    pub(crate) fn write_line(&self, line: &str) {
        let mut writer = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writer.write_all(line.as_bytes()) {
            warn!(error = %e, "failed to write debug line");
        }
    }
}

/// One consistent view of the runtime configuration.
///
/// Settings are never mutated in place: every setter builds a new snapshot
/// and swaps it in, so a log call always sees a coherent set.
#[derive(Clone)]
pub struct Settings {
    enabled: bool,
    pattern: Option<Arc<Pattern>>,
    has_colors: bool,
    has_time: bool,
    formatter: Arc<dyn Formatter>,
    sink: Sink,
    cache: Arc<NamespaceCache<Arc<DebuggerState>>>,
}

impl Settings {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern.as_deref()
    }

    pub fn has_colors(&self) -> bool {
        self.has_colors
    }

    pub fn has_time(&self) -> bool {
        self.has_time
    }

    pub fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache.ttl()
    }

    /// Whether calls on `namespace` are written.
    pub fn is_active(&self, namespace: &str) -> bool {
        self.enabled && self.pattern.as_ref().is_some_and(|p| p.matches(namespace))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: false,
            pattern: None,
            has_colors: true,
            has_time: true,
            formatter: Arc::new(TextFormatter::new()),
            sink: Sink::stderr(),
            cache: Arc::new(NamespaceCache::default()),
        }
    }
}

struct Shared {
    settings: Mutex<Arc<Settings>>,
    last_emit: Mutex<Instant>,
}

/// Handle to one set of enable state, formatter, sink and namespace cache.
///
/// The process-wide runtime behind the crate's free functions is one of
/// these; separate instances are fully independent.
#[derive(Clone)]
pub struct Runtime {
    shared: Arc<Shared>,
}

impl Runtime {
    /// Disabled runtime writing colored text with timings to stderr.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                settings: Mutex::new(Arc::new(Settings::default())),
                last_emit: Mutex::new(Instant::now()),
            }),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, DebugError> {
        let runtime = Self::new();

        if let Some(pattern) = config.pattern.as_deref().filter(|p| !p.is_empty()) {
            runtime.enable(pattern)?;
        }
        runtime.set_has_colors(config.colors);
        runtime.set_has_time(config.time);
        runtime.set_cache_minutes(config.cache_minutes);

        Ok(runtime)
    }

    /// Current configuration snapshot.
    pub fn settings(&self) -> Arc<Settings> {
        Arc::clone(&self.lock_settings())
    }

    /// The debugger for `namespace`, cached or newly built.
    pub fn debugger(&self, namespace: &str) -> Debugger {
        let settings = self.settings();
        let state = settings
            .cache
            .get_or_insert_with(namespace, || Arc::new(DebuggerState::new(namespace, &settings)));
        Debugger::new(state, self.clone())
    }

    /// Activate namespaces matching `pattern`, replacing any earlier pattern.
    ///
    /// On error the previous state is left untouched.
    pub fn enable(&self, pattern: &str) -> Result<(), DebugError> {
        let compiled = Arc::new(Pattern::compile(pattern)?);
        self.update(|settings| {
            settings.pattern = Some(compiled);
            settings.enabled = true;
        });
        debug!(pattern, "debug output enabled");
        Ok(())
    }

    /// Silence every namespace.
    pub fn disable(&self) {
        self.update(|settings| settings.enabled = false);
        debug!("debug output disabled");
    }

    pub fn set_writer<W: Write + Send + 'static>(&self, writer: W) {
        self.set_sink(Sink::new(writer));
    }

    pub fn set_sink(&self, sink: Sink) {
        self.update(|settings| settings.sink = sink);
    }

    pub fn set_formatter<F: Formatter + 'static>(&self, formatter: F) {
        let fields_only = formatter.reports_fields_only();
        self.update(|settings| settings.formatter = Arc::new(formatter));
        debug!(fields_only, "formatter replaced");
    }

    pub fn set_has_colors(&self, on: bool) {
        self.update(|settings| settings.has_colors = on);
    }

    pub fn set_has_time(&self, on: bool) {
        self.update(|settings| settings.has_time = on);
    }

    /// Replace the namespace cache using a minutes string; empty means the
    /// default of 60 minutes.
    pub fn set_cache(&self, minutes: &str) -> Result<(), DebugError> {
        self.set_cache_minutes(parse_cache_minutes(minutes)?);
        Ok(())
    }

    /// Replace the namespace cache; zero or less minutes never expires.
    pub fn set_cache_minutes(&self, minutes: i64) {
        let cache = Arc::new(NamespaceCache::from_minutes(minutes));
        self.update(|settings| settings.cache = cache);
    }

    /// Replace the namespace cache with an explicit lifetime.
    pub fn set_cache_ttl(&self, ttl: Option<Duration>) {
        let cache = Arc::new(NamespaceCache::new(ttl));
        self.update(|settings| settings.cache = cache);
    }

    /// Number of live cached namespaces.
    pub fn cache_len(&self) -> usize {
        self.settings().cache.len()
    }

    pub fn cached_namespaces(&self) -> Vec<String> {
        self.settings().cache.keys()
    }

    pub fn flush_cache(&self) {
        self.settings().cache.flush();
    }

    /// Record an emitted line at `now`, returning the time since the previous one.
    pub(crate) fn touch(&self, now: Instant) -> Duration {
        let mut last = self.lock_last_emit();
        let elapsed = now.saturating_duration_since(*last);
        *last = now;
        elapsed
    }

    pub(crate) fn since_last_emit(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.lock_last_emit())
    }

    fn update<F: FnOnce(&mut Settings)>(&self, apply: F) {
        let mut current = self.lock_settings();
        let mut next = Settings::clone(&current);
        apply(&mut next);
        *current = Arc::new(next);
    }

    fn lock_settings(&self) -> MutexGuard<'_, Arc<Settings>> {
        self.shared
            .settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_last_emit(&self) -> MutexGuard<'_, Instant> {
        self.shared
            .last_emit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
