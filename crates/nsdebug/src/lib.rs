//! # nsdebug
//!
//! Namespace-scoped conditional debug logging.
//!
//! Code creates named debuggers that only write when the active enable
//! pattern matches their namespace. Output is rendered by a pluggable
//! formatter (human-readable text or JSON lines) together with any fields
//! attached to the debugger.
//!
//! ## Key Types
//!
//! - [`Runtime`] - Enable state, formatter, sink and namespace cache
//! - [`Debugger`] - Per-namespace handle with color, timing and fields
//! - [`Formatter`] - Rendering strategy ([`TextFormatter`], [`JsonFormatter`])
//! - [`Message`] - Literal, deferred, or arbitrary first log argument
//! - [`Config`] - Startup configuration from `DEBUG*` variables or TOML
//!
//! ## Usage
//!
//! ```rust
//! use nsdebug::Runtime;
//!
//! let runtime = Runtime::new();
//! runtime.set_writer(std::io::sink());
//! runtime.enable("mail*,-mail:secret").unwrap();
//!
//! let mail = runtime.debugger("mail");
//! mail.with_field("to", "tobi@segment.io").log("sending mail");
//! mail.log_lazy(|| format!("queue depth {}", 3));
//! nsdebug::dlog!(mail, "send email to {}", "loki@segment.io");
//! mail.spawn("smtp").log("connected");
//! mail.error("bounced");
//! ```
//!
//! The free functions ([`debugger`], [`enable`], ...) operate on a
//! process-wide runtime configured from the environment on first use.
//!
//! ## Environment
//!
//! - `DEBUG` - enable pattern
//! - `DEBUG_CACHE_MINUTES` - namespace cache lifetime (default 60)
//! - `DEBUG_COLOR_OFF` - disable colors when non-empty
//! - `DEBUG_TIME_OFF` - disable timestamps and deltas when non-empty

mod cache;
pub mod config;
mod debugger;
mod error;
pub mod fields;
mod formatter;
mod global;
mod json_formatter;
mod message;
mod runtime;
mod text_formatter;

pub use cache::{NamespaceCache, CLEANUP_INTERVAL, DEFAULT_CACHE_MINUTES};
pub use config::Config;
pub use debugger::{Debugger, ERROR_PREFIX, NAMESPACE_SEPARATOR, PALETTE};
pub use error::DebugError;
pub use fields::{FieldValue, Fields};
pub use formatter::{humanize_duration, Entry, Formatter};
pub use global::{
    debugger, disable, enable, global, set_cache, set_cache_ttl, set_formatter, set_has_colors,
    set_has_time, set_writer,
};
pub use json_formatter::JsonFormatter;
pub use message::Message;
pub use nsdebug_pattern::{Pattern, PatternError};
pub use runtime::{Runtime, Settings, Sink};
pub use text_formatter::{KeyOrder, TextFormatter};

pub use colored::Color;

/// Log with `format!` arguments, formatting only when the namespace is active.
#[macro_export]
macro_rules! dlog {
    ($debugger:expr, $($arg:tt)+) => {
        $debugger.log($crate::Message::lazy(|| ::std::format!($($arg)+)))
    };
}

/// Like [`dlog!`], on the debugger's `error:` namespace.
#[macro_export]
macro_rules! derror {
    ($debugger:expr, $($arg:tt)+) => {
        $debugger.error($crate::Message::lazy(|| ::std::format!($($arg)+)))
    };
}
