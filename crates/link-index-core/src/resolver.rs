use crate::link_indexer::LinkIndex;
use crate::model::{LinkRecord, Page};
use std::collections::HashMap;

/// Information about a known page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageInfo {
    pub id: String,
    pub title: String,
}

/// Bidirectional cache between page ids and titles, with case-insensitive title
/// resolution.
///
/// This is the caller-side half of link resolution. The [`LinkIndex`] stores titles
/// exactly as written; deciding which page `[[project x]]` means happens here.
#[derive(Debug, Default)]
pub struct PageResolver {
    /// Forward map: page id -> info
    by_id: HashMap<String, PageInfo>,
    /// Reverse map: lowercased title -> page ids, sorted
    by_title: HashMap<String, Vec<String>>,
}

impl PageResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear both maps and rebuild them from `pages`.
    pub fn rebuild(&mut self, pages: &[Page]) {
        self.by_id.clear();
        self.by_title.clear();
        for page in pages {
            self.update_page(page);
        }
    }

    /// Insert or refresh a page, handling title changes.
    pub fn update_page(&mut self, page: &Page) {
        self.remove_page(&page.id);
        let ids = self.by_title.entry(page.title.to_lowercase()).or_default();
        if let Err(pos) = ids.binary_search(&page.id) {
            ids.insert(pos, page.id.clone());
        }
        self.by_id.insert(
            page.id.clone(),
            PageInfo {
                id: page.id.clone(),
                title: page.title.clone(),
            },
        );
    }

    pub fn remove_page(&mut self, page_id: &str) {
        let Some(info) = self.by_id.remove(page_id) else {
            return;
        };
        let key = info.title.to_lowercase();
        if let Some(ids) = self.by_title.get_mut(&key) {
            ids.retain(|id| id != page_id);
            if ids.is_empty() {
                self.by_title.remove(&key);
            }
        }
    }

    pub fn page(&self, page_id: &str) -> Option<&PageInfo> {
        self.by_id.get(page_id)
    }

    /// Resolve a link title to a page.
    ///
    /// An exact-case match wins; otherwise the case-insensitive match with the smallest
    /// id is returned so that resolution is stable when titles collide.
    pub fn resolve_title(&self, title: &str) -> Option<&PageInfo> {
        let ids = self.by_title.get(&title.to_lowercase())?;
        ids.iter()
            .filter_map(|id| self.by_id.get(id))
            .find(|info| info.title == title)
            .or_else(|| ids.first().and_then(|id| self.by_id.get(id)))
    }

    /// Backlinks of a page across every stored case variant of its title.
    ///
    /// `[[Ideas]]` and `[[ideas]]` live in separate buckets of the index; this merges
    /// them for display without changing what the index stores.
    pub fn backlinks_for_page(&self, index: &LinkIndex, page_id: &str) -> Vec<LinkRecord> {
        let Some(info) = self.by_id.get(page_id) else {
            return Vec::new();
        };
        let wanted = info.title.to_lowercase();
        let mut titles: Vec<&str> = index
            .backlink_titles()
            .filter(|t| t.to_lowercase() == wanted)
            .collect();
        titles.sort();

        let mut records: Vec<LinkRecord> = titles
            .into_iter()
            .flat_map(|t| index.links().backlinks(t).into_iter().cloned())
            .collect();
        records.sort_by(|a, b| {
            a.source_page_title
                .cmp(&b.source_page_title)
                .then_with(|| a.source_page_id.cmp(&b.source_page_id))
        });
        records
    }

    /// Linked titles that no known page answers to, sorted.
    pub fn unresolved_targets(&self, index: &LinkIndex) -> Vec<String> {
        let mut titles: Vec<String> = index
            .backlink_titles()
            .filter(|t| self.resolve_title(t).is_none())
            .map(str::to_string)
            .collect();
        titles.sort();
        titles
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
