use std::borrow::Cow;
use std::fmt;

/// First argument of a log call.
///
/// A literal is used as-is, a deferred closure is only invoked when the
/// namespace is active, and anything else is rendered through its `Debug`
/// representation (also only when active).
pub enum Message<'a> {
    Literal(Cow<'a, str>),
    Deferred(Box<dyn FnOnce() -> String + 'a>),
    Other(Box<dyn fmt::Debug + 'a>),
}

impl<'a> Message<'a> {
    /// Build a message whose text is produced only if it will be written.
    pub fn lazy<F>(f: F) -> Self
    where
        F: FnOnce() -> String + 'a,
    {
        Message::Deferred(Box::new(f))
    }

    /// Wrap an arbitrary value, stringified on demand.
    pub fn other<T: fmt::Debug + 'a>(value: T) -> Self {
        Message::Other(Box::new(value))
    }

    /// Produce the final text, consuming any deferred closure.
    pub fn render(self) -> Cow<'a, str> {
        match self {
            Message::Literal(text) => text,
            Message::Deferred(f) => Cow::Owned(f()),
            Message::Other(value) => Cow::Owned(format!("{:?}", value)),
        }
    }
}

impl fmt::Debug for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Message::Deferred(_) => f.write_str("Deferred(..)"),
            Message::Other(value) => f.debug_tuple("Other").field(value).finish(),
        }
    }
}

impl<'a> From<&'a str> for Message<'a> {
    fn from(s: &'a str) -> Self {
        Message::Literal(Cow::Borrowed(s))
    }
}

impl<'a> From<&'a String> for Message<'a> {
    fn from(s: &'a String) -> Self {
        Message::Literal(Cow::Borrowed(s.as_str()))
    }
}

impl From<String> for Message<'_> {
    fn from(s: String) -> Self {
        Message::Literal(Cow::Owned(s))
    }
}

impl<'a> From<Cow<'a, str>> for Message<'a> {
    fn from(s: Cow<'a, str>) -> Self {
        Message::Literal(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_literal_renders_as_is() {
        assert_eq!(Message::from("hello").render(), "hello");
        assert_eq!(Message::from(String::from("owned")).render(), "owned");
    }

    #[test]
    fn test_lazy_is_deferred_until_render() {
        let calls = Cell::new(0);
        let message = Message::lazy(|| {
            calls.set(calls.get() + 1);
            "built".to_string()
        });
        assert_eq!(calls.get(), 0);
        assert_eq!(message.render(), "built");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_lazy_dropped_without_render_is_never_called() {
        let calls = Cell::new(0);
        drop(Message::lazy(|| {
            calls.set(calls.get() + 1);
            String::new()
        }));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_other_uses_debug_representation() {
        let args = vec!["./bin"];
        assert_eq!(Message::other(&args).render(), r#"["./bin"]"#);
        assert_eq!(Message::other(42).render(), "42");
    }
}
