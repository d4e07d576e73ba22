//! The root error kind

use crate::chain::{build_chain, Link, SanitizeOpt};
use crate::separator;
use crate::wrapped::{Layer, Wrapped};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// The root of an error chain.
///
/// A `Kind` is a single message with no attached context. It never has a
/// source; matching against it is a plain string comparison. The separator
/// is captured at construction and used whenever context is added later.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Kind {
    message: String,
    separator: String,
}

impl Kind {
    /// Create a kind using the current process-wide separator
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_separator(message, separator::separator())
    }

    /// Create a kind with an explicit separator
    pub fn with_separator(message: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            separator: separator.into(),
        }
    }

    /// Capture the message of any error; its source chain is ignored.
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        Self::new(err.to_string())
    }

    /// The root message, unmodified
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The separator used when context is added
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Promote to [`Wrapped`] with `context` as the nested error.
    ///
    /// Unlike [`Wrapped::add`], the context is kept as-is, including its own
    /// source chain.
    pub fn add<E>(&self, context: E) -> Wrapped
    where
        E: StdError + Send + Sync + 'static,
    {
        Wrapped::from_parts(self.clone(), Some(Arc::new(context)))
    }

    /// Promote to [`Wrapped`] with a plain text context
    pub fn add_message(&self, context: impl Into<String>) -> Wrapped {
        self.add(Layer::new(context))
    }

    /// Always a single link: a kind has no source.
    pub fn chain(&self) -> Vec<Link> {
        build_chain(self, &[SanitizeOpt::trim_custom(self.separator.as_str())])
    }

    /// Plain string equality against the message
    pub fn is_match(&self, target: &(dyn StdError + 'static)) -> bool {
        self.is_match_message(&target.to_string())
    }

    /// [`Kind::is_match`] against raw text
    pub fn is_match_message(&self, target: &str) -> bool {
        self.message == target
    }

    /// A kind carries no context; returns itself.
    pub fn sanitize(&self) -> Kind {
        self.clone()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// Same layout as `Wrapped`, which has no context block to print here.
impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message)
    }
}

impl StdError for Kind {}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(message: &str) -> Kind {
        Kind::with_separator(message, " ")
    }

    #[test]
    fn test_message() {
        assert_eq!(kind("test").message(), "test");
        assert_eq!(kind("test").to_string(), "test");
        assert_eq!(kind("test").separator(), " ");
    }

    #[test]
    fn test_add() {
        let w = kind("test").add(Layer::new("added"));
        assert_eq!(w.kind(), &kind("test"));
        assert_eq!(w.nested().unwrap().to_string(), "added");
        assert_eq!(w.message(), "test added");
    }

    #[test]
    fn test_add_keeps_context_chain() {
        let context = Layer::wrap("outer", " ", Arc::new(Layer::new("inner")));
        let w = kind("test").add(context);
        assert_eq!(w.message(), "test outer inner");
        assert_eq!(w.chain(), ["inner", "outer", "test"]);
    }

    #[test]
    fn test_add_uses_own_separator() {
        let w = Kind::with_separator("test", ": ").add_message("added");
        assert_eq!(w.message(), "test: added");
    }

    #[test]
    fn test_chain() {
        assert_eq!(kind("test").chain(), ["test"]);
        assert_eq!(kind("").chain(), [""]);
        // The separator is trimmed from the single link too.
        assert_eq!(Kind::with_separator("test: ", ": ").chain(), ["test"]);
    }

    #[test]
    fn test_is_match() {
        assert!(kind("test").is_match(&Layer::new("test")));
        assert!(!kind("test").is_match(&Layer::new("not")));
        assert!(!kind("test").is_match_message("test "));
    }

    #[test]
    fn test_sanitize() {
        let k = kind("test");
        assert_eq!(k.sanitize(), k);
    }

    #[test]
    fn test_from_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml");
        let k = Kind::from_error(&io);
        assert_eq!(k.message(), "config.toml");
        assert!(k.source().is_none());
    }

    #[test]
    fn test_debug() {
        assert_eq!(format!("{:?}", kind("disk full")), "disk full\n");

        let value = crate::ErrorValue::from(kind("disk full"));
        assert_eq!(format!("{:?}", value), "disk full\n");
        let wrapped = format!("{:?}", value.add_message("ctx"));
        assert!(wrapped.starts_with("disk full\n"));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_value(kind("disk full")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "disk full", "separator": " " }));

        let back: Kind = serde_json::from_value(json).unwrap();
        assert_eq!(back, kind("disk full"));
    }
}
