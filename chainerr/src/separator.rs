//! Process-wide default separator
//!
//! Every value captures the separator when it is constructed, so changing the
//! default only affects values built afterwards. Constructors that take an
//! explicit separator never read it.

use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// Single space, the default
pub const SPACE: &str = " ";

pub const COLON: &str = ":";

pub const COLON_AND_SPACE: &str = ": ";

static SEPARATOR: Lazy<RwLock<String>> = Lazy::new(|| RwLock::new(SPACE.to_string()));

/// The current default separator
pub fn separator() -> String {
    SEPARATOR.read().clone()
}

/// Replace the default separator
pub fn set_separator(separator: impl Into<String>) {
    let separator = separator.into();
    tracing::debug!(separator = %separator, "setting default error separator");
    *SEPARATOR.write() = separator;
}

pub fn set_colon_separator() {
    set_separator(COLON);
}

pub fn set_colon_and_space_separator() {
    set_separator(COLON_AND_SPACE);
}

pub fn set_space_separator() {
    set_separator(SPACE);
}
