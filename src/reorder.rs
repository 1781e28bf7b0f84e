// Page reorder engine: last occurrence of a label wins, first occurrence fixes its position
use indexmap::IndexMap;

use crate::types::Label;

/// Insertion-ordered Label -> page mapping.
///
/// Re-inserting a label replaces its page but keeps the slot where the label
/// was first seen, so iteration order is first-seen order of labels.
#[derive(Debug, Clone)]
pub struct PageTable<P> {
    entries: IndexMap<Label, P>,
}

impl<P> PageTable<P> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Returns the page that `page` replaced, if any.
    pub fn insert(&mut self, label: Label, page: P) -> Option<P> {
        self.entries.insert(label, page)
    }

    pub fn get(&self, label: &Label) -> Option<&P> {
        self.entries.get(label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Label, &P)> {
        self.entries.iter()
    }

    pub fn into_pages(self) -> Vec<P> {
        self.entries.into_values().collect()
    }
}

impl<P> Default for PageTable<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> FromIterator<(Label, P)> for PageTable<P> {
    fn from_iter<I: IntoIterator<Item = (Label, P)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut table = Self::with_capacity(iter.size_hint().0);
        for (label, page) in iter {
            table.insert(label, page);
        }
        table
    }
}

/// Deduplicate `pages` by label in a single pass.
///
/// No numeric sorting happens: output order is the order in which each label
/// first appeared, so `["2/2", "1/2"]` stays `2, 1`.
pub fn reorder<P>(pages: impl IntoIterator<Item = (Label, P)>) -> Vec<P> {
    pages.into_iter().collect::<PageTable<P>>().into_pages()
}
