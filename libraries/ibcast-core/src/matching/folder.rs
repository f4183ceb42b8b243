//! Folder path resolution.

use super::MatchPolicy;
use crate::selection::TrackSelection;
use crate::snapshot::LibrarySnapshot;
use crate::types::Track;
use tracing::debug;

const SEPARATOR: char = '/';

/// A normalized folder filter.
///
/// Matches a folder and everything below it, on whole path segments only:
/// `Music/Rock` matches `Music/Rock` and `Music/Rock/Live`, never
/// `Music/Rockabilly`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderFilter {
    prefix: String,
    policy: MatchPolicy,
}

impl FolderFilter {
    pub fn new(filter: &str, policy: &MatchPolicy) -> Self {
        Self {
            prefix: normalize(filter, policy),
            policy: *policy,
        }
    }

    /// True when the filter names no folder at all (empty or only separators)
    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty()
    }

    /// The normalized form of the filter
    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    pub fn matches(&self, folder: &str) -> bool {
        if self.is_empty() {
            return false;
        }
        let folder = normalize(folder, &self.policy);
        match folder.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
            None => false,
        }
    }
}

/// Trim separators and collapse empty segments: `/a//b/` becomes `a/b`.
fn normalize(path: &str, policy: &MatchPolicy) -> String {
    let joined = path
        .split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    policy.fold(&joined)
}

/// Select every track stored in `filter` or one of its sub-folders.
///
/// Tracks come back ordered by folder, then track number, then title, so the
/// resulting playlist follows the folder layout.
pub fn resolve_folder(
    snapshot: &LibrarySnapshot,
    filter: &str,
    policy: &MatchPolicy,
) -> TrackSelection {
    let filter = FolderFilter::new(filter, policy);
    if filter.is_empty() {
        debug!("Empty folder filter selects nothing");
        return TrackSelection::new();
    }

    let mut matched: Vec<(String, &Track)> = snapshot
        .tracks()
        .filter(|track| filter.matches(&track.folder))
        .map(|track| (normalize(&track.folder, policy), track))
        .collect();

    matched.sort_by(|(a_folder, a), (b_folder, b)| {
        a_folder
            .cmp(b_folder)
            .then_with(|| a.track_number.cmp(&b.track_number))
            .then_with(|| a.title.cmp(&b.title))
            .then_with(|| a.id.cmp(&b.id))
    });

    debug!(
        folder = %filter.as_str(),
        tracks = matched.len(),
        "Resolved folder filter"
    );

    matched.into_iter().map(|(_, track)| track.id.clone()).collect()
}
