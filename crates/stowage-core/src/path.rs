//! Path separator canonicalization.
//!
//! Every path handled by the library is normalized before any remote call or
//! pattern match, so two paths differing only by separator style address the
//! same key.

use std::borrow::Cow;

/// Replace every backslash with a forward slash.
///
/// Total function: the empty string maps to itself, and already-normalized
/// paths are returned without allocating.
pub fn normalize(path: &str) -> Cow<'_, str> {
    if path.contains('\\') {
        Cow::Owned(path.replace('\\', "/"))
    } else {
        Cow::Borrowed(path)
    }
}
