//! The process-wide runtime and free functions delegating to it.

use std::io::Write;
use std::time::Duration;

use lazy_static::lazy_static;

use crate::config::Config;
use crate::debugger::Debugger;
use crate::error::DebugError;
use crate::formatter::Formatter;
use crate::runtime::Runtime;

lazy_static! {
    static ref GLOBAL: Runtime = init_from_env();
}

// A malformed environment aborts startup rather than silently logging
// with defaults.
fn init_from_env() -> Runtime {
    match Config::from_env().and_then(|config| Runtime::from_config(&config)) {
        Ok(runtime) => runtime,
        Err(e) => panic!("nsdebug: invalid startup configuration: {}", e),
    }
}

/// The process-wide runtime, configured from the environment on first use.
pub fn global() -> &'static Runtime {
    &GLOBAL
}

/// The debugger for `namespace` in the process-wide runtime.
pub fn debugger(namespace: &str) -> Debugger {
    GLOBAL.debugger(namespace)
}

/// Enable the given pattern.
///
/// Patterns take a glob-like form: `*` enables everything, `mongo:*` one
/// library, `mongo*,redis*` several, and `*,-mongo:noisy` everything but
/// one namespace.
pub fn enable(pattern: &str) -> Result<(), DebugError> {
    GLOBAL.enable(pattern)
}

pub fn disable() {
    GLOBAL.disable()
}

/// Replace the default of stderr with `writer`.
pub fn set_writer<W: Write + Send + 'static>(writer: W) {
    GLOBAL.set_writer(writer)
}

pub fn set_formatter<F: Formatter + 'static>(formatter: F) {
    GLOBAL.set_formatter(formatter)
}

pub fn set_has_colors(on: bool) {
    GLOBAL.set_has_colors(on)
}

pub fn set_has_time(on: bool) {
    GLOBAL.set_has_time(on)
}

pub fn set_cache(minutes: &str) -> Result<(), DebugError> {
    GLOBAL.set_cache(minutes)
}

pub fn set_cache_ttl(ttl: Option<Duration>) {
    GLOBAL.set_cache_ttl(ttl)
}
