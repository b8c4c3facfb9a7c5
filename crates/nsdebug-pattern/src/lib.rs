//! # nsdebug-pattern
//!
//! Namespace patterns for the nsdebug logging facade.
//!
//! A pattern is a comma-separated list of glob tokens. `*` matches any
//! sequence of characters and a leading `-` turns a token into an exclusion.
//! A namespace is active when it matches at least one positive token and no
//! negative token.
//!
//! ## Key Types
//!
//! - [`Pattern`] - Compiled positive alternation plus negative matchers
//! - [`PatternError`] - Raised when a token fails to compile
//!
//! ## Usage
//!
//! ```rust
//! use nsdebug_pattern::Pattern;
//!
//! let pattern = Pattern::compile("foo*,-foo:secret").unwrap();
//!
//! assert!(pattern.matches("foo:a"));
//! assert!(!pattern.matches("foo:secret"));
//! assert!(!pattern.matches("bar"));
//! ```
//!
//! There is no implicit "match everything": an exclusion-only pattern such
//! as `-foo` matches nothing, so "everything but foo" is written `*,-foo`.

mod pattern;

pub use pattern::{Pattern, PatternError};
