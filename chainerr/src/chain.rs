//! The chain engine: flatten a `source()` chain into discrete messages

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::error::Error as StdError;
use std::fmt;
use std::hash::{Hash, Hasher};

/// One sanitized message of a chain.
///
/// Links are produced only by [`build_chain`]. A `Link` is itself an error
/// without a source, so a chain can be handed back to anything that expects
/// `std::error::Error` values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Link(String);

impl Link {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// The sanitized message
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the sanitized message
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for Link {}

impl PartialEq<str> for Link {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Link {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Options applied to every message extracted by [`build_chain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizeOpt {
    /// Remove one leading and one trailing `:`
    TrimColons,
    /// Remove all leading and trailing whitespace
    TrimWhitespace,
    /// Remove one leading and one trailing occurrence of the given string
    TrimCustom(String),
    /// Keep the walk order (head first) instead of reversing it
    NaturalOrder,
}

impl SanitizeOpt {
    /// Shorthand for [`SanitizeOpt::TrimCustom`]
    pub fn trim_custom(s: impl Into<String>) -> Self {
        SanitizeOpt::TrimCustom(s.into())
    }
}

// =============================================================================
// Sanitize configuration
// =============================================================================

#[derive(Debug, Default)]
struct SanitizeConfig<'a> {
    trim_colons: bool,
    trim_whitespace: bool,
    trim_custom: Option<&'a str>,
    natural_order: bool,
}

impl<'a> SanitizeConfig<'a> {
    fn from_opts(opts: &'a [SanitizeOpt]) -> Self {
        let mut config = Self::default();
        for opt in opts {
            match opt {
                SanitizeOpt::TrimColons => config.trim_colons = true,
                SanitizeOpt::TrimWhitespace => config.trim_whitespace = true,
                // The last custom trim wins.
                SanitizeOpt::TrimCustom(s) => config.trim_custom = Some(s.as_str()),
                SanitizeOpt::NaturalOrder => config.natural_order = true,
            }
        }
        config
    }

    /// Custom trim, then whitespace, then colons.
    fn sanitize<'s>(&self, s: &'s str) -> &'s str {
        let mut s = s;
        if let Some(custom) = self.trim_custom {
            s = trim_once(s, custom);
        }
        if self.trim_whitespace {
            s = s.trim();
        }
        if self.trim_colons {
            s = trim_once(s, ":");
        }
        s
    }
}

/// Strip one trailing, then one leading occurrence of `pat`.
fn trim_once<'s>(s: &'s str, pat: &str) -> &'s str {
    if pat.is_empty() {
        return s;
    }
    let s = s.strip_suffix(pat).unwrap_or(s);
    s.strip_prefix(pat).unwrap_or(s)
}

/// Identity of an error within one walk: its address plus its message.
///
/// The address alone is not enough, a zero-sized source stored first in its
/// parent shares the parent's address.
fn identity(err: &(dyn StdError + 'static), message: &str) -> (usize, u64) {
    let mut hasher = DefaultHasher::new();
    message.hash(&mut hasher);
    (err as *const dyn StdError as *const () as usize, hasher.finish())
}

/// Remove the first occurrence of `next` from `current`.
///
/// This is what makes naively concatenated chains decompose: a layer rendered
/// as `context + separator + cause` leaves `context + separator` behind. A
/// context that happens to contain the cause text is split at the wrong
/// place; callers rely on exactly this behavior.
fn remove_first(current: &str, next: &str) -> String {
    current.replacen(next, "", 1)
}

// =============================================================================
// build_chain
// =============================================================================

/// Flatten `head` and its `source()` chain into an ordered list of messages.
///
/// Each layer contributes the text it adds on top of its cause (its *delta*).
/// Empty deltas are dropped, the terminal error is always emitted in full.
/// By default the result is reversed so the terminal error comes first; pass
/// [`SanitizeOpt::NaturalOrder`] to get `head` first.
///
/// ```rust
/// use chainerr::{build_chain, Layer, SanitizeOpt};
/// use std::sync::Arc;
///
/// let bot = Arc::new(Layer::new("bot3"));
/// let mid = Arc::new(Layer::wrap("mid2", ":", bot));
/// let top = Layer::wrap("top1", ":", mid);
/// assert_eq!(top.to_string(), "top1:mid2:bot3");
///
/// let chain = build_chain(&top, &[SanitizeOpt::TrimColons]);
/// assert_eq!(chain, ["bot3", "mid2", "top1"]);
/// ```
pub fn build_chain(head: &(dyn StdError + 'static), opts: &[SanitizeOpt]) -> Vec<Link> {
    let config = SanitizeConfig::from_opts(opts);

    let Some(mut next) = head.source() else {
        return vec![Link::new(config.sanitize(&head.to_string()))];
    };

    let mut chain = Vec::new();
    let mut current_msg = head.to_string();
    let mut visited = HashSet::from([identity(head, &current_msg)]);

    loop {
        let next_msg = next.to_string();

        // `source()` is not required to terminate; stop at the first error
        // seen twice and emit it as the terminal link.
        if !visited.insert(identity(next, &next_msg)) {
            tracing::warn!(
                layers = visited.len(),
                error = %next_msg,
                "error chain refers back to itself, stopping"
            );
            chain.push(Link::new(config.sanitize(&next_msg)));
            break;
        }

        push_delta(&current_msg, &next_msg, &mut chain, &config);

        match next.source() {
            Some(after) => {
                next = after;
                current_msg = next_msg;
            }
            None => {
                chain.push(Link::new(config.sanitize(&next_msg)));
                break;
            }
        }
    }

    if !config.natural_order {
        chain.reverse();
    }
    chain
}

fn push_delta(current: &str, next: &str, chain: &mut Vec<Link>, config: &SanitizeConfig<'_>) {
    let delta = remove_first(current, next);
    let delta = config.sanitize(&delta);
    if delta.is_empty() {
        tracing::trace!(layer = %current, "dropping layer without new context");
        return;
    }
    chain.push(Link::new(delta));
}
