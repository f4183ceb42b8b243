//! Wildcard album matching.
//!
//! `*` matches any run of characters (including none), `?` matches exactly
//! one character, everything else matches itself. There is no escape
//! character, so an album whose name contains a literal `*` or `?` can only
//! be matched through the wildcard itself.

use super::MatchPolicy;
use crate::selection::TrackSelection;
use crate::snapshot::LibrarySnapshot;
use crate::types::Album;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Literal(char),
    AnyOne,
    AnyRun,
}

/// A compiled wildcard pattern, anchored at both ends of the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardPattern {
    tokens: Vec<Token>,
    policy: MatchPolicy,
}

impl WildcardPattern {
    pub fn compile(pattern: &str, policy: &MatchPolicy) -> Self {
        let mut tokens: Vec<Token> = Vec::with_capacity(pattern.len());

        for c in pattern.chars() {
            let token = match c {
                '*' => Token::AnyRun,
                '?' => Token::AnyOne,
                c => Token::Literal(c),
            };
            // `**` behaves like `*`
            if token == Token::AnyRun && tokens.last() == Some(&Token::AnyRun) {
                continue;
            }
            tokens.push(token);
        }

        Self {
            tokens,
            policy: *policy,
        }
    }

    /// Check a whole name against the pattern.
    ///
    /// Backtracks to the most recent `*` on a mismatch, so the cost stays
    /// linear in practice and never recurses. Characters are compared one at
    /// a time, so `?` always consumes one character of the original name.
    pub fn is_match(&self, name: &str) -> bool {
        let text: Vec<char> = name.chars().collect();
        let tokens = &self.tokens;

        let mut t = 0;
        let mut p = 0;
        // (token after the last `*`, text position that `*` currently ends at)
        let mut resume: Option<(usize, usize)> = None;

        while t < text.len() {
            match tokens.get(p) {
                Some(Token::AnyRun) => {
                    p += 1;
                    resume = Some((p, t));
                }
                Some(Token::AnyOne) => {
                    p += 1;
                    t += 1;
                }
                Some(Token::Literal(c)) if self.policy.chars_eq(*c, text[t]) => {
                    p += 1;
                    t += 1;
                }
                _ => match resume {
                    Some((after_star, consumed)) => {
                        p = after_star;
                        t = consumed + 1;
                        resume = Some((after_star, t));
                    }
                    None => return false,
                },
            }
        }

        tokens[p..].iter().all(|token| *token == Token::AnyRun)
    }
}

/// Albums whose name matches `pattern`, ordered by name then id.
pub fn matching_albums<'a>(
    snapshot: &'a LibrarySnapshot,
    pattern: &str,
    policy: &MatchPolicy,
) -> Vec<&'a Album> {
    let pattern = WildcardPattern::compile(pattern, policy);

    let mut albums: Vec<&Album> = snapshot
        .albums()
        .filter(|album| pattern.is_match(&album.name))
        .collect();
    albums.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

    for album in &albums {
        debug!(album_id = %album.id, album = %album.name, "Album matched");
    }

    albums
}

/// Select every track of every album whose name matches `pattern`.
///
/// Albums are taken whole, in album track order.
pub fn resolve_albums(
    snapshot: &LibrarySnapshot,
    pattern: &str,
    policy: &MatchPolicy,
) -> TrackSelection {
    let albums = matching_albums(snapshot, pattern, policy);

    let selection: TrackSelection = albums
        .iter()
        .flat_map(|album| album.tracks.iter().cloned())
        .collect();

    debug!(
        pattern = %pattern,
        albums = albums.len(),
        tracks = selection.len(),
        "Resolved album pattern"
    );

    selection
}
