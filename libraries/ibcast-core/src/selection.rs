//! Track selection.
//!
//! Playlist order is visible to the user, so selections keep first-insertion
//! order even though membership has set semantics.

use crate::types::TrackId;
use std::collections::HashSet;

/// An ordered set of track ids: duplicates are dropped, first position wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackSelection {
    order: Vec<TrackId>,
    members: HashSet<TrackId>,
}

impl TrackSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an id unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, id: TrackId) -> bool {
        if self.members.insert(id.clone()) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.members.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackId> {
        self.order.iter()
    }

    pub fn into_vec(self) -> Vec<TrackId> {
        self.order
    }
}

impl FromIterator<TrackId> for TrackSelection {
    fn from_iter<I: IntoIterator<Item = TrackId>>(iter: I) -> Self {
        let mut selection = Self::new();
        for id in iter {
            selection.insert(id);
        }
        selection
    }
}

impl IntoIterator for TrackSelection {
    type Item = TrackId;
    type IntoIter = std::vec::IntoIter<TrackId>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.into_iter()
    }
}

impl<'a> IntoIterator for &'a TrackSelection {
    type Item = &'a TrackId;
    type IntoIter = std::slice::Iter<'a, TrackId>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

/// Tracks chosen for the next playlist.
///
/// Filled additively by one or more resolver calls. Single tracks cannot be
/// deselected.
#[derive(Debug, Clone, Default)]
pub struct SelectionAccumulator {
    selection: TrackSelection,
}

impl SelectionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union `ids` into the selection. Returns how many ids were new.
    pub fn add(&mut self, ids: impl IntoIterator<Item = TrackId>) -> usize {
        ids.into_iter()
            .filter(|id| self.selection.insert(id.clone()))
            .count()
    }

    /// Take the selection in playlist order, leaving the accumulator empty.
    pub fn drain(&mut self) -> Vec<TrackId> {
        std::mem::take(&mut self.selection).into_vec()
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.selection.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackId> {
        self.selection.iter()
    }
}
