//! Property-based tests for the folder resolver and wildcard matcher
//!
//! Uses proptest to check matching invariants across generated libraries.

use ibcast_core::matching::{resolve_albums, resolve_folder, WildcardPattern};
use ibcast_core::{Album, LibrarySnapshot, MatchPolicy, SelectionAccumulator, Track, TrackId};
use proptest::prelude::*;
use std::collections::HashSet;

// ===== Helpers =====

/// Reference matcher: straightforward recursion over the grammar.
fn reference_match(pattern: &[char], name: &[char]) -> bool {
    match (pattern.first(), name.first()) {
        (None, None) => true,
        (Some('*'), _) => {
            reference_match(&pattern[1..], name)
                || (!name.is_empty() && reference_match(pattern, &name[1..]))
        }
        (Some('?'), Some(_)) => reference_match(&pattern[1..], &name[1..]),
        (Some(p), Some(n)) if p == n => reference_match(&pattern[1..], &name[1..]),
        _ => false,
    }
}

fn arbitrary_folder() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec!["Music", "Rock", "Ro", "Live", "Jazz"]), 0..4)
        .prop_map(|segments| segments.join("/"))
}

fn library_with_folders(folders: &[String]) -> LibrarySnapshot {
    LibrarySnapshot::from_parts(
        folders
            .iter()
            .enumerate()
            .map(|(i, folder)| Track::new(i.to_string(), format!("Track {}", i), folder.as_str())),
        vec![],
        vec![],
        vec![],
    )
}

// ===== Property Tests =====

proptest! {
    /// Property: the compiled matcher agrees with the reference grammar
    #[test]
    fn wildcard_agrees_with_reference(
        pattern in "[ab*?]{0,8}",
        name in "[abc]{0,10}"
    ) {
        let compiled = WildcardPattern::compile(&pattern, &MatchPolicy::default());
        let p: Vec<char> = pattern.chars().collect();
        let n: Vec<char> = name.chars().collect();
        prop_assert_eq!(compiled.is_match(&name), reference_match(&p, &n));
    }

    /// Property: a name always matches itself with `?` substituted anywhere
    #[test]
    fn question_marks_match_any_single_character(
        name in "[A-Za-z0-9 .]{1,20}",
        mask in prop::collection::vec(any::<bool>(), 20)
    ) {
        let pattern: String = name
            .chars()
            .zip(mask.iter())
            .map(|(c, hide)| if *hide { '?' } else { c })
            .collect();
        let compiled = WildcardPattern::compile(&pattern, &MatchPolicy::default());
        prop_assert!(compiled.is_match(&name));
    }

    /// Property: `prefix*` matches exactly the names starting with prefix
    #[test]
    fn trailing_star_is_prefix_match(
        prefix in "[a-c]{0,4}",
        name in "[a-c]{0,6}"
    ) {
        let compiled = WildcardPattern::compile(&format!("{}*", prefix), &MatchPolicy::default());
        prop_assert_eq!(compiled.is_match(&name), name.starts_with(&prefix));
    }

    /// Property: folder resolution selects exactly the folder and its descendants
    #[test]
    fn folder_resolution_respects_segment_boundaries(
        folders in prop::collection::vec(arbitrary_folder(), 0..30),
        filter in arbitrary_folder()
    ) {
        let library = library_with_folders(&folders);
        let selected: HashSet<TrackId> =
            resolve_folder(&library, &filter, &MatchPolicy::default()).into_iter().collect();

        for (i, folder) in folders.iter().enumerate() {
            let expected = !filter.is_empty()
                && (folder == &filter || folder.starts_with(&format!("{}/", filter)));
            prop_assert_eq!(
                selected.contains(&TrackId::new(i.to_string())),
                expected,
                "folder {:?} with filter {:?}", folder, filter
            );
        }
    }

    /// Property: repeating a selection never changes the accumulator
    #[test]
    fn repeated_selection_is_idempotent(
        folders in prop::collection::vec(arbitrary_folder(), 0..30),
        filter in arbitrary_folder()
    ) {
        let library = library_with_folders(&folders);
        let policy = MatchPolicy::default();

        let mut acc = SelectionAccumulator::new();
        acc.add(resolve_folder(&library, &filter, &policy));
        let before: Vec<TrackId> = acc.iter().cloned().collect();

        prop_assert_eq!(acc.add(resolve_folder(&library, &filter, &policy)), 0);
        let after: Vec<TrackId> = acc.iter().cloned().collect();
        prop_assert_eq!(before, after);
    }

    /// Property: album resolution only ever returns members of matched albums
    #[test]
    fn album_resolution_returns_only_matched_members(
        names in prop::collection::vec("[ab]{1,3}", 1..8),
        pattern in "[ab*?]{1,4}"
    ) {
        let tracks: Vec<Track> = (0..names.len())
            .map(|i| Track::new(i.to_string(), "t", "Music"))
            .collect();
        let albums: Vec<Album> = names
            .iter()
            .enumerate()
            .map(|(i, name)| Album::new(format!("album{}", i), name.as_str(), vec![TrackId::new(i.to_string())]))
            .collect();
        let library = LibrarySnapshot::from_parts(tracks, albums, vec![], vec![]);

        let policy = MatchPolicy::default();
        let compiled = WildcardPattern::compile(&pattern, &policy);
        let selected: HashSet<TrackId> =
            resolve_albums(&library, &pattern, &policy).into_iter().collect();

        for (i, name) in names.iter().enumerate() {
            prop_assert_eq!(
                selected.contains(&TrackId::new(i.to_string())),
                compiled.is_match(name)
            );
        }
    }
}
