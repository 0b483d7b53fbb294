//! Engine warnings with coloured terminal output.
//!
//! Provides deduplication so that a style sheet with the same unsupported
//! value on a thousand elements reports it once. Used by selector building,
//! media matching, and the property accumulator.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Whether warnings are written to stderr at all.
static ENABLED: AtomicBool = AtomicBool::new(true);

/// Warn about an unsupported or dropped value (prints once per unique message).
///
/// Returns `true` if this call printed (or would have printed, when output is
/// disabled) a message that had not been seen before.
///
/// # Example
/// ```
/// use tartan_common::warning::warn_once;
///
/// let _ = warn_once("Media", "unknown media feature 'hover'");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let first_time = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if first_time && ENABLED.load(Ordering::Relaxed) {
        eprintln!("{}", format!("[Tartan {component}] ⚠ {message}").yellow());
    }
    first_time
}

/// Clear all recorded warnings (call between unrelated evaluations).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

/// Turn warning output on or off. Deduplication bookkeeping continues either way.
pub fn set_warnings_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_deduplicates() {
        set_warnings_enabled(false);
        assert!(warn_once("Test", "dedup-check message"));
        assert!(!warn_once("Test", "dedup-check message"));
        // Same message, different component is a new warning
        assert!(warn_once("Other", "dedup-check message"));
        set_warnings_enabled(true);
    }
}
