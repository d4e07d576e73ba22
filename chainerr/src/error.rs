//! The ErrorValue type and its construction

use crate::chain::{build_chain, Link, SanitizeOpt};
use crate::separator;
use crate::wrapped::{Cause, Layer};
use crate::{Kind, Wrapped};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// An error value: either a bare [`Kind`] or a [`Wrapped`] kind with context.
///
/// Both variants share the same capabilities:
/// - `message`: the full rendered text
/// - `add`: attach context, returning a new value
/// - `chain`: the discrete messages, innermost context first, root last
/// - `is_match`: test a target against the root, any layer, or the whole
/// - `sanitize`: drop all context and return the root
///
/// # Example
///
/// ```rust
/// use chainerr::ErrorValue;
/// use std::io;
///
/// let err = ErrorValue::builder(io::Error::new(io::ErrorKind::NotFound, "no such file"))
///     .with_separator(": ")
///     .with_message("read config")
///     .with_message("start daemon")
///     .build();
///
/// assert_eq!(err.to_string(), "no such file: start daemon: read config");
/// assert_eq!(err.chain(), ["read config", "start daemon", "no such file"]);
/// assert!(err.is_match_message("read config"));
/// assert_eq!(err.sanitize().to_string(), "no such file");
/// ```
#[derive(Clone)]
pub enum ErrorValue {
    Kind(Kind),
    Wrapped(Wrapped),
}

impl ErrorValue {
    /// Build a value from `root` using the current default separator.
    ///
    /// If `root` already carries a source chain it is normalized: its
    /// outermost message becomes the root kind and every other layer is
    /// re-attached as context.
    pub fn new<E>(root: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::builder(root).build()
    }

    /// Start a [`Builder`] from `root`
    pub fn builder<E>(root: E) -> Builder
    where
        E: StdError + Send + Sync + 'static,
    {
        Builder::from_cause(Arc::new(root))
    }

    /// Convert any error into an error value.
    ///
    /// `ErrorValue`, [`Kind`] and [`Wrapped`] are returned unchanged; any
    /// other error is normalized with the current default separator.
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        if let Some(value) = err.downcast_ref::<ErrorValue>() {
            return value.clone();
        }
        if let Some(kind) = err.downcast_ref::<Kind>() {
            return ErrorValue::Kind(kind.clone());
        }
        if let Some(wrapped) = err.downcast_ref::<Wrapped>() {
            return ErrorValue::Wrapped(wrapped.clone());
        }
        let (kind, contexts) = normalize(err, &separator::separator());
        assemble(kind, contexts)
    }

    // =========================================================================
    // Getters
    // =========================================================================

    /// The full rendered message
    pub fn message(&self) -> String {
        match self {
            ErrorValue::Kind(kind) => kind.message().to_string(),
            ErrorValue::Wrapped(wrapped) => wrapped.message(),
        }
    }

    /// The separator captured at construction
    pub fn separator(&self) -> &str {
        match self {
            ErrorValue::Kind(kind) => kind.separator(),
            ErrorValue::Wrapped(wrapped) => wrapped.separator(),
        }
    }

    /// The root kind, whichever the variant
    pub fn kind(&self) -> &Kind {
        match self {
            ErrorValue::Kind(kind) => kind,
            ErrorValue::Wrapped(wrapped) => wrapped.kind(),
        }
    }

    /// Whether any context is attached
    pub fn is_wrapped(&self) -> bool {
        matches!(self, ErrorValue::Wrapped(_))
    }

    /// The wrapped variant, if this is one
    pub fn as_wrapped(&self) -> Option<&Wrapped> {
        match self {
            ErrorValue::Wrapped(wrapped) => Some(wrapped),
            ErrorValue::Kind(_) => None,
        }
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    /// Attach context. A bare kind is promoted to the wrapped variant.
    pub fn add<E>(&self, context: E) -> ErrorValue
    where
        E: StdError + Send + Sync + 'static,
    {
        match self {
            ErrorValue::Kind(kind) => ErrorValue::Wrapped(kind.add(context)),
            ErrorValue::Wrapped(wrapped) => ErrorValue::Wrapped(wrapped.add(context)),
        }
    }

    /// Attach a plain text context
    pub fn add_message(&self, context: impl Into<String>) -> ErrorValue {
        self.add(Layer::new(context))
    }

    /// The discrete messages, innermost context first and the root last
    pub fn chain(&self) -> Vec<Link> {
        match self {
            ErrorValue::Kind(kind) => kind.chain(),
            ErrorValue::Wrapped(wrapped) => wrapped.chain(),
        }
    }

    /// Matches the full message, the root message, or any chain element
    pub fn is_match(&self, target: &(dyn StdError + 'static)) -> bool {
        self.is_match_message(&target.to_string())
    }

    /// [`ErrorValue::is_match`] against raw text
    pub fn is_match_message(&self, target: &str) -> bool {
        match self {
            ErrorValue::Kind(kind) => kind.is_match_message(target),
            ErrorValue::Wrapped(wrapped) => wrapped.is_match_message(target),
        }
    }

    /// Drop all context, leaving the bare root kind
    pub fn sanitize(&self) -> ErrorValue {
        ErrorValue::Kind(self.kind().sanitize())
    }
}

/// [`ErrorValue::from_error`] over an optional error; `None` stays `None`.
pub fn as_error_value(err: Option<&(dyn StdError + 'static)>) -> Option<ErrorValue> {
    err.map(ErrorValue::from_error)
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`ErrorValue`].
///
/// Contexts are applied in call order: the first one becomes the nested
/// error, each later one wraps what came before it.
pub struct Builder {
    root: Cause,
    separator: Option<String>,
    contexts: Vec<Cause>,
}

impl Builder {
    /// Start from an already shared root error
    pub fn from_cause(root: Cause) -> Self {
        Self {
            root,
            separator: None,
            contexts: Vec::new(),
        }
    }

    /// Start from an `anyhow` error, keeping its context chain
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        let boxed: Box<dyn StdError + Send + Sync + 'static> = err.into();
        Self::from_cause(Arc::from(boxed))
    }

    /// Use `separator` instead of the process-wide default
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Attach an error as context
    pub fn with_err<E>(mut self, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.contexts.push(Arc::new(err));
        self
    }

    /// Attach a plain text context
    pub fn with_message(self, message: impl Into<String>) -> Self {
        self.with_err(Layer::new(message))
    }

    /// Normalize the root and apply the contexts
    pub fn build(self) -> ErrorValue {
        let separator = self.separator.unwrap_or_else(separator::separator);
        let (kind, mut contexts) = normalize(&*self.root, &separator);
        contexts.extend(self.contexts);
        assemble(kind, contexts)
    }
}

/// Split `head` into a root kind and the contexts to re-apply on top of it.
///
/// The chain is taken in its default order, so the outermost message becomes
/// the root and the terminal error becomes the first context.
fn normalize(head: &(dyn StdError + 'static), separator: &str) -> (Kind, Vec<Cause>) {
    if head.source().is_some() {
        let mut chain = build_chain(head, &[SanitizeOpt::trim_custom(separator)]);
        if chain.len() > 1 {
            if let Some(root) = chain.pop() {
                tracing::trace!(root = %root, layers = chain.len(), "normalizing error chain");
                let contexts = chain
                    .into_iter()
                    .map(|link| Arc::new(link) as Cause)
                    .collect();
                return (Kind::with_separator(root.into_string(), separator), contexts);
            }
        }
    }
    (Kind::with_separator(head.to_string(), separator), Vec::new())
}

fn assemble(kind: Kind, contexts: Vec<Cause>) -> ErrorValue {
    if contexts.is_empty() {
        return ErrorValue::Kind(kind);
    }
    let wrapped = contexts
        .into_iter()
        .fold(Wrapped::from_parts(kind, None), |wrapped, context| {
            wrapped.add_cause(context)
        });
    ErrorValue::Wrapped(wrapped)
}

// =============================================================================
// Display / Debug
// =============================================================================

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorValue::Kind(kind) => fmt::Display::fmt(kind, f),
            ErrorValue::Wrapped(wrapped) => fmt::Display::fmt(wrapped, f),
        }
    }
}

impl fmt::Debug for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorValue::Kind(kind) => fmt::Debug::fmt(kind, f),
            ErrorValue::Wrapped(wrapped) => fmt::Debug::fmt(wrapped, f),
        }
    }
}

// =============================================================================
// std::error::Error implementation
// =============================================================================

impl StdError for ErrorValue {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ErrorValue::Kind(_) => None,
            ErrorValue::Wrapped(wrapped) => wrapped.source(),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<Kind> for ErrorValue {
    fn from(kind: Kind) -> Self {
        ErrorValue::Kind(kind)
    }
}

impl From<Wrapped> for ErrorValue {
    fn from(wrapped: Wrapped) -> Self {
        ErrorValue::Wrapped(wrapped)
    }
}

impl From<anyhow::Error> for ErrorValue {
    fn from(err: anyhow::Error) -> Self {
        Builder::from_anyhow(err).build()
    }
}
