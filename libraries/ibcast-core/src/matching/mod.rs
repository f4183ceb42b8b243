//! Filters that turn human-friendly selectors into track ids.
//!
//! Both resolvers are pure functions over a [`crate::LibrarySnapshot`] and
//! share one [`MatchPolicy`], so a folder filter and an album pattern
//! always agree on case handling.

mod folder;
mod wildcard;

pub use folder::{resolve_folder, FolderFilter};
pub use wildcard::{matching_albums, resolve_albums, WildcardPattern};

/// Case handling shared by every matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    /// Compare text exactly (default) or after Unicode lowercasing
    pub case_sensitive: bool,
}

impl MatchPolicy {
    pub fn case_sensitive() -> Self {
        Self {
            case_sensitive: true,
        }
    }

    pub fn case_insensitive() -> Self {
        Self {
            case_sensitive: false,
        }
    }

    /// Fold text according to the policy
    pub(crate) fn fold(&self, text: &str) -> String {
        if self.case_sensitive {
            text.to_string()
        } else {
            text.to_lowercase()
        }
    }

    /// Compare two characters according to the policy.
    ///
    /// Lowercasing may expand one character into several (`'İ'` becomes
    /// `"i\u{307}"`), so the folded forms are compared as sequences while the
    /// caller keeps counting original characters.
    pub(crate) fn chars_eq(&self, a: char, b: char) -> bool {
        a == b || (!self.case_sensitive && a.to_lowercase().eq(b.to_lowercase()))
    }
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self::case_sensitive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_constructors() {
        assert_eq!(MatchPolicy::default(), MatchPolicy::case_sensitive());
        assert!(!MatchPolicy::case_insensitive().case_sensitive);
    }

    #[test]
    fn test_chars_eq() {
        let exact = MatchPolicy::case_sensitive();
        assert!(exact.chars_eq('a', 'a'));
        assert!(!exact.chars_eq('a', 'A'));

        let folded = MatchPolicy::case_insensitive();
        assert!(folded.chars_eq('a', 'A'));
        assert!(folded.chars_eq('İ', 'İ'));
        assert!(!folded.chars_eq('i', 'İ'));
    }
}
