use crate::model::LinkRecord;
use std::collections::HashMap;

/// Page→title forward map and title→record reverse map, kept as transposes of each
/// other.
///
/// Titles are stored exactly as extracted. Lookup is case-sensitive; resolving a title
/// to an existing page is the caller's job.
#[derive(Debug, Clone, Default)]
pub struct BacklinkIndex {
    /// page id -> outgoing target titles
    forward: HashMap<String, Vec<String>>,
    /// target title -> source page id -> record
    backlinks: HashMap<String, HashMap<String, LinkRecord>>,
}

impl BacklinkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a page's outgoing links.
    ///
    /// Old records are found through the page's previous forward entry, so the cost is
    /// proportional to what the page linked to before plus what it links to now, no
    /// matter how many other pages share a target.
    pub fn set_page_links(&mut self, page_id: &str, page_title: &str, targets: Vec<String>) {
        self.remove_page(page_id);

        let mut kept: Vec<String> = Vec::with_capacity(targets.len());
        for target in targets {
            let bucket = self.backlinks.entry(target.clone()).or_default();
            if bucket.contains_key(page_id) {
                continue;
            }
            bucket.insert(
                page_id.to_string(),
                LinkRecord {
                    source_page_id: page_id.to_string(),
                    source_page_title: page_title.to_string(),
                    target_title: target.clone(),
                },
            );
            kept.push(target);
        }
        self.forward.insert(page_id.to_string(), kept);
    }

    /// Drop a page's forward entry and every record it contributed.
    /// Returns the number of records removed.
    pub fn remove_page(&mut self, page_id: &str) -> usize {
        let Some(previous) = self.forward.remove(page_id) else {
            return 0;
        };
        let mut removed = 0;
        for target in &previous {
            let Some(bucket) = self.backlinks.get_mut(target) else {
                continue;
            };
            if bucket.remove(page_id).is_some() {
                removed += 1;
            }
            if bucket.is_empty() {
                self.backlinks.remove(target);
            }
        }
        removed
    }

    /// Records of pages linking to exactly `title`, ordered by source page id.
    pub fn backlinks(&self, title: &str) -> Vec<&LinkRecord> {
        let mut records: Vec<&LinkRecord> = self
            .backlinks
            .get(title)
            .map(|bucket| bucket.values().collect())
            .unwrap_or_default();
        records.sort_by(|a, b| a.source_page_id.cmp(&b.source_page_id));
        records
    }

    /// Outgoing titles of a page, in extraction order.
    pub fn forward_links(&self, page_id: &str) -> &[String] {
        self.forward.get(page_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every title that currently has at least one backlink.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.backlinks.keys().map(String::as_str)
    }

    pub fn forward_entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.forward.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn page_count(&self) -> usize {
        self.forward.len()
    }

    pub fn record_count(&self) -> usize {
        self.backlinks.values().map(HashMap::len).sum()
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.backlinks.clear();
    }
}
