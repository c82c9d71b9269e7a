//! Parser warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the tokenizer and the tree builder to report input they recovered from.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Record `key` in the global set. Returns true the first time a key is seen.
fn first_sighting(key: String) -> bool {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key)
}

/// Warn about recovered input (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("XML Tokenizer", "unquoted attribute value at position 12");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    if first_sighting(key) {
        eprintln!("{}", format!("[wren {component}] ⚠ {message}").yellow());
    }
}

/// Warn about recovered input at `location` (prints once per unique message)
///
/// Only `component` and `message` decide whether the warning was already
/// shown; `location` is printed but not remembered.
pub fn warn_once_at(component: &str, message: &str, location: fmt::Arguments<'_>) {
    let key = format!("[{component}] {message}");
    if first_sighting(key) {
        eprintln!(
            "{}",
            format!("[wren {component}] ⚠ {message} ({location})").yellow()
        );
    }
}

/// Clear all recorded warnings (call before parsing an unrelated document)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
