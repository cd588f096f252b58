use std::collections::HashSet;

use crate::CandidateItem;

/// Links already classified as observed, delivered or baseline-suppressed.
///
/// Grows monotonically for the life of the process and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeenSet {
    links: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, link: &str) -> bool {
        self.links.contains(link)
    }

    /// Records `link`, returning `true` if it was not seen before.
    pub fn insert(&mut self, link: impl Into<String>) -> bool {
        self.links.insert(link.into())
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Returns the items whose link is not yet in `seen`, in input order.
///
/// Each returned link is inserted into `seen` as it is classified, so a link
/// repeated within `items` is returned once, and a later call never returns it
/// again even if delivery of the item fails. Title changes at a known link are
/// not treated as new.
pub fn classify(items: Vec<CandidateItem>, seen: &mut SeenSet) -> Vec<CandidateItem> {
    items
        .into_iter()
        .filter(|item| seen.insert(item.link.as_str()))
        .collect()
}
