//! Lenient, orderable mod artifact versions
//!
//! Mod files carry loose dotted versions like `1.0`, `2.3.17`, or
//! `1.5-beta`. Comparison is numeric per dotted segment, with more
//! segments winning an otherwise-equal prefix (`1.2` < `1.2.0`).
//! Non-numeric segments are ignored rather than rejected.

use std::fmt;

/// An orderable artifact version parsed from a loose version string
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModVersion(Vec<u32>);

impl ModVersion {
    /// Parse a dotted version string; never fails, unparseable segments
    /// are skipped
    #[must_use]
    pub fn parse(version: &str) -> Self {
        Self(version.split('.').filter_map(|s| s.parse().ok()).collect())
    }
}

impl fmt::Display for ModVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u32::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}
