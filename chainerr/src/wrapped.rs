//! The wrapped error: a root [`Kind`] plus the context added on top of it

use crate::chain::{build_chain, Link, SanitizeOpt};
use crate::Kind;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// A shared, thread-safe error used as the nested value of a [`Wrapped`].
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

// =============================================================================
// Layer
// =============================================================================

/// One layer of a textually concatenated chain.
///
/// The message is rendered once, at construction. [`Layer::wrap`] produces
/// `context + separator + cause` and keeps `cause` as its source, which is the
/// shape [`build_chain`] decomposes.
#[derive(Clone)]
pub struct Layer {
    message: String,
    cause: Option<Cause>,
}

impl Layer {
    /// A terminal layer without a cause
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// A layer with an explicit message and cause, no concatenation
    pub fn with_cause(message: impl Into<String>, cause: Cause) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause),
        }
    }

    /// Render `context`, `separator` and `cause` into one message
    pub fn wrap(context: impl fmt::Display, separator: &str, cause: Cause) -> Self {
        Self {
            message: format!("{}{}{}", context, separator, cause),
            cause: Some(cause),
        }
    }

    /// The rendered message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The cause, if this layer wraps one
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("message", &self.message)
            .field("has_cause", &self.cause.is_some())
            .finish()
    }
}

impl StdError for Layer {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_deref().map(|e| e as &(dyn StdError + 'static))
    }
}

// =============================================================================
// Wrapped
// =============================================================================

/// A root [`Kind`] with context attached.
///
/// The rendered message is `root + separator + nested`, where `nested` holds
/// every added context, newest first, down to the first error attached. The
/// value is immutable: [`Wrapped::add`] returns a new value sharing the old
/// nested chain.
///
/// # Example
///
/// ```rust
/// use chainerr::Kind;
///
/// let err = Kind::with_separator("query failed", ": ")
///     .add_message("connection reset")
///     .add_message("retry 3");
///
/// assert_eq!(err.message(), "query failed: retry 3: connection reset");
/// assert_eq!(err.chain(), ["connection reset", "retry 3", "query failed"]);
/// assert!(err.is_match_message("retry 3"));
/// assert_eq!(err.sanitize().message(), "query failed");
/// ```
#[derive(Clone)]
pub struct Wrapped {
    kind: Kind,
    nested: Option<Cause>,
}

impl Wrapped {
    /// Assemble a wrapped value directly from its parts.
    ///
    /// No normalization takes place; see [`crate::ErrorValue::builder`] for
    /// that. A missing nested value is a valid terminal state.
    pub fn from_parts(kind: Kind, nested: Option<Cause>) -> Self {
        Self { kind, nested }
    }

    // =========================================================================
    // Getters
    // =========================================================================

    /// The root kind
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// The nested error holding all added context
    pub fn nested(&self) -> Option<&Cause> {
        self.nested.as_ref()
    }

    /// The separator captured by the root kind
    pub fn separator(&self) -> &str {
        self.kind.separator()
    }

    /// The full rendered message
    pub fn message(&self) -> String {
        self.to_string()
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    /// Attach `context` and return the new value; only its message is kept.
    pub fn add<E>(&self, context: E) -> Wrapped
    where
        E: StdError + Send + Sync + 'static,
    {
        self.add_cause(Arc::new(context))
    }

    /// Attach a plain text context
    pub fn add_message(&self, context: impl Into<String>) -> Wrapped {
        self.add(Layer::new(context))
    }

    /// Attach an already shared context.
    ///
    /// With no nested value yet, `context` becomes the nested value itself and
    /// keeps its own source chain.
    pub fn add_cause(&self, context: Cause) -> Wrapped {
        let nested: Cause = match &self.nested {
            Some(previous) => Arc::new(Layer::wrap(context, self.separator(), previous.clone())),
            None => context,
        };
        Wrapped {
            kind: self.kind.clone(),
            nested: Some(nested),
        }
    }

    /// The discrete messages of this value, innermost context first and the
    /// root kind last.
    pub fn chain(&self) -> Vec<Link> {
        build_chain(self, &[SanitizeOpt::trim_custom(self.separator())])
    }

    /// Matches the full message, the root message, or any chain element.
    pub fn is_match(&self, target: &(dyn StdError + 'static)) -> bool {
        self.is_match_message(&target.to_string())
    }

    /// [`Wrapped::is_match`] against raw text
    pub fn is_match_message(&self, target: &str) -> bool {
        if self.message() == target {
            return true;
        }
        if self.kind.message() == target {
            return true;
        }
        self.chain().iter().any(|link| link.as_str() == target)
    }

    /// Drop all added context and return the root kind
    pub fn sanitize(&self) -> Kind {
        self.kind.clone()
    }
}

impl fmt::Display for Wrapped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.message())?;
        if let Some(nested) = &self.nested {
            write!(f, "{}{}", self.kind.separator(), nested)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Wrapped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind.message())?;
        if self.nested.is_some() {
            writeln!(f)?;
            writeln!(f, "    Context:")?;
            let mut cursor = self.source();
            while let Some(err) = cursor {
                writeln!(f, "        {}", err)?;
                cursor = err.source();
            }
        }
        Ok(())
    }
}

impl StdError for Wrapped {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.nested.as_deref().map(|e| e as &(dyn StdError + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(message: &str) -> Kind {
        Kind::with_separator(message, " ")
    }

    fn wrapped(root: &str, nested: Layer) -> Wrapped {
        Wrapped::from_parts(kind(root), Some(Arc::new(nested)))
    }

    fn added_original() -> Layer {
        Layer::wrap("added", " ", Arc::new(Layer::new("original")))
    }

    #[test]
    fn test_add() {
        let w = wrapped("test", Layer::new("wasThere"));
        let got = w.add(Layer::new("add"));

        assert_eq!(got.kind(), &kind("test"));
        assert_eq!(got.nested().unwrap().to_string(), "add wasThere");
        assert_eq!(got.nested().unwrap().source().unwrap().to_string(), "wasThere");
    }

    #[test]
    fn test_add_does_not_mutate() {
        let w = wrapped("test", added_original());
        let message = w.message();
        let chain = w.chain();

        let w2 = w.add_message("more");
        assert_eq!(w.message(), message);
        assert_eq!(w.chain(), chain);
        assert_eq!(w2.message(), "test more added original");
    }

    #[test]
    fn test_add_keeps_only_context_message() {
        let inner = Layer::wrap("outer", " ", Arc::new(Layer::new("inner")));
        let w = wrapped("test", Layer::new("base")).add(inner);
        assert_eq!(w.message(), "test outer inner base");
        // The context's own cause is not part of the chain.
        assert_eq!(w.nested().unwrap().source().unwrap().to_string(), "base");
    }

    #[test]
    fn test_message() {
        assert_eq!(wrapped("test", added_original()).message(), "test added original");
        assert_eq!(wrapped("test", Layer::new("original")).message(), "test original");

        let several = Layer::wrap(
            "added",
            " ",
            Arc::new(Layer::wrap("added2", " ", Arc::new(Layer::new("original")))),
        );
        assert_eq!(wrapped("test", several).message(), "test added added2 original");
    }

    #[test]
    fn test_message_without_nested() {
        let w = Wrapped::from_parts(kind("test"), None);
        assert_eq!(w.message(), "test");
        assert!(w.source().is_none());
        assert_eq!(w.chain(), ["test"]);
    }

    #[test]
    fn test_add_without_nested() {
        let w = Wrapped::from_parts(kind("test"), None).add_message("first");
        assert_eq!(w.message(), "test first");
        assert_eq!(w.chain(), ["first", "test"]);
    }

    #[test]
    fn test_chain() {
        assert_eq!(
            wrapped("test", added_original()).chain(),
            ["original", "added", "test"]
        );
        assert_eq!(
            wrapped("test", Layer::new("original")).chain(),
            ["original", "test"]
        );
    }

    #[test]
    fn test_chain_with_colon_separator() {
        let w = Wrapped::from_parts(
            Kind::with_separator("root", ": "),
            Some(Arc::new(Layer::new("first"))),
        )
        .add_message("second")
        .add_message("third");

        assert_eq!(w.message(), "root: third: second: first");
        assert_eq!(w.chain(), ["first", "second", "third", "root"]);
    }

    #[test]
    fn test_is_match() {
        let w = wrapped("test", Layer::new("original"));
        assert!(w.is_match(&Layer::new("test")));
        assert!(w.is_match(&Layer::new("original")));
        assert!(w.is_match(&Layer::new("test original")));
        assert!(!w.is_match(&Layer::new("not")));
    }

    #[test]
    fn test_is_match_deep() {
        let mut w = wrapped("top1", Layer::new("bot100"));
        for i in (2..100).rev() {
            w = w.add_message(format!("mid{i}"));
        }
        assert!(w.is_match_message("bot100"));
        assert!(w.is_match_message("mid50"));
        assert!(w.is_match_message("top1"));
        assert!(!w.is_match_message("mid100"));
    }

    #[test]
    fn test_add_empty_context() {
        let w = Kind::with_separator("root", ": ").add_message("first");

        // Nothing but a separator is left once the cause is removed.
        let empty = w.add_message("");
        assert_eq!(empty.message(), "root: : first");
        assert_eq!(empty.chain(), ["first", "root"]);

        let colon = Kind::with_separator("root", ":").add_message("first");
        let spaced = colon.add_message(" x ");
        assert_eq!(spaced.message(), "root: x :first");
        assert_eq!(spaced.chain(), ["first", " x ", "root"]);
        assert!(spaced.is_match_message(" x "));
    }

    #[test]
    fn test_deep_chain_matches_every_layer() {
        let mut w = Kind::with_separator("root", ": ").add_message("c0");
        for i in 1..1500 {
            w = w.add_message(format!("c{i}"));
        }
        let chain = w.chain();
        assert_eq!(chain.len(), 1501);
        assert_eq!(chain[0], "c0");
        assert_eq!(chain[1500], "root");
        assert!(w.is_match_message("c5"));
        assert!(w.is_match_message("c1499"));
    }

    #[test]
    fn test_sanitize() {
        let w = wrapped("test", added_original());
        let k = w.sanitize();
        assert_eq!(k, kind("test"));
        assert_eq!(k.sanitize(), k);
    }

    #[test]
    fn test_source_walk() {
        let w = wrapped("test", added_original());
        let mut messages = Vec::new();
        let mut cursor = w.source();
        while let Some(err) = cursor {
            messages.push(err.to_string());
            cursor = err.source();
        }
        assert_eq!(messages, ["added original", "original"]);
    }

    #[test]
    fn test_debug() {
        let debug = format!("{:?}", wrapped("test", added_original()));
        assert!(debug.starts_with("test\n"));
        assert!(debug.contains("Context:"));
        assert!(debug.contains("        original"));
    }
}
