//! Per-category debug output.
//!
//! Channels are switched on with the `WREN_DEBUG` environment variable, a
//! comma-separated list of category names (`xml-tokenizer`, `xml-parser`) or
//! `all`. The variable is read once per process; use [`DebugFlags::from_spec`]
//! to build a set of flags from a string without touching the environment.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::warning::warn_once;

/// Name of the environment variable holding the enabled debug categories.
pub const DEBUG_ENV_VAR: &str = "WREN_DEBUG";

/// A debug output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum DebugCategory {
    /// Markup scanning: recovered syntax, reference decoding.
    XmlTokenizer,
    /// Tree assembly: opening and closing tags, sibling chains, text content.
    XmlParser,
}

impl DebugCategory {
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// A set of enabled [`DebugCategory`] channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugFlags {
    bits: u8,
}

impl DebugFlags {
    /// No channel enabled.
    pub const NONE: Self = Self { bits: 0 };

    /// Every channel enabled.
    #[must_use]
    pub fn all() -> Self {
        let mut flags = Self::NONE;
        for category in DebugCategory::iter() {
            flags.insert(category);
        }
        flags
    }

    /// Parse a comma-separated category list such as `"xml-parser,xml-tokenizer"`.
    ///
    /// Names are matched case-insensitively after trimming. `all` enables every
    /// channel. Unknown names are reported through the warning system and skipped.
    #[must_use]
    pub fn from_spec(spec: &str) -> Self {
        let mut flags = Self::NONE;
        for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let lowered = part.to_ascii_lowercase();
            if lowered == "all" {
                return Self::all();
            }
            match DebugCategory::from_str(&lowered) {
                Ok(category) => flags.insert(category),
                Err(_) => warn_once("Debug", &format!("unknown {DEBUG_ENV_VAR} category '{part}'")),
            }
        }
        flags
    }

    /// Enable `category`.
    pub const fn insert(&mut self, category: DebugCategory) {
        self.bits |= category.bit();
    }

    /// Whether `category` is enabled.
    #[must_use]
    pub const fn contains(self, category: DebugCategory) -> bool {
        self.bits & category.bit() != 0
    }

    /// Whether no channel is enabled.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }
}

static FLAGS: OnceLock<DebugFlags> = OnceLock::new();

/// The process-wide flags, read from `WREN_DEBUG` on first use.
pub fn flags() -> DebugFlags {
    *FLAGS.get_or_init(|| {
        env::var(DEBUG_ENV_VAR)
            .map(|spec| DebugFlags::from_spec(&spec))
            .unwrap_or_default()
    })
}

/// Set the process-wide flags explicitly, ignoring `WREN_DEBUG`.
///
/// Returns `false` if the flags were already fixed by an earlier call or by
/// a first log.
pub fn init(flags: DebugFlags) -> bool {
    FLAGS.set(flags).is_ok()
}

/// Whether output for `category` is currently enabled.
#[must_use]
pub fn is_enabled(category: DebugCategory) -> bool {
    flags().contains(category)
}

/// Write a debug line for `category` to stderr if that channel is enabled.
///
/// ```ignore
/// debug_log(DebugCategory::XmlParser, format_args!("Opening tag: {name}"));
/// ```
pub fn debug_log(category: DebugCategory, args: fmt::Arguments<'_>) {
    if is_enabled(category) {
        eprintln!("[wren:{category}] {args}");
    }
}
