//! # chainerr
//!
//! Structured error chains: attach context to a root error, flatten the chain
//! into discrete messages, and test membership anywhere in it.
//!
//! ## Design Philosophy
//!
//! - **Kind**: the root error, a single message with no context
//! - **Wrapped**: a kind plus the context added on top of it
//! - **Chain**: the discrete messages of any `source()` chain, including
//!   chains built by concatenating strings (`"ctx: " + inner`)
//! - **Sanitize**: drop all context and get the root back
//!
//! ## Usage
//!
//! ```rust
//! use chainerr::Kind;
//!
//! fn open() -> chainerr::Result<()> {
//!     Err(Kind::with_separator("permission denied", ": ")
//!         .add_message("open /etc/app.toml")
//!         .add_message("load config")
//!         .into())
//! }
//!
//! let err = open().unwrap_err();
//! assert_eq!(err.to_string(), "permission denied: load config: open /etc/app.toml");
//! assert_eq!(
//!     err.chain(),
//!     ["open /etc/app.toml", "load config", "permission denied"]
//! );
//! assert!(err.is_match_message("load config"));
//! ```
//!
//! Chains built elsewhere are normalized on the way in:
//!
//! ```rust
//! use chainerr::{build_chain, Builder, SanitizeOpt};
//!
//! let err = anyhow::anyhow!("connection refused").context("fetch config");
//! assert_eq!(build_chain(&*err, &[]), ["connection refused", "fetch config"]);
//!
//! let value = Builder::from_anyhow(err).with_separator(": ").build();
//! assert_eq!(value.to_string(), "fetch config: connection refused");
//! ```
//!
//! ## Principles
//!
//! - Values are immutable; `add` returns a new value
//! - Every operation is total, nothing here returns an error
//! - The separator is captured when a value is built

mod chain;
mod error;
mod kind;
pub mod separator;
mod wrapped;

pub use chain::{build_chain, Link, SanitizeOpt};
pub use error::{as_error_value, Builder, ErrorValue};
pub use kind::Kind;
pub use wrapped::{Cause, Layer, Wrapped};

/// Result type alias defaulting to [`ErrorValue`]
pub type Result<T, E = ErrorValue> = std::result::Result<T, E>;
