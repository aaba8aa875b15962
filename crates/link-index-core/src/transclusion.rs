//! Which pages live-mirror which blocks.
//!
//! The registry has two writers that must not clobber each other: embed widgets
//! mounting and unmounting at runtime ([`TransclusionRegistry::register`] /
//! [`TransclusionRegistry::unregister`]), and content scans that seed entries for
//! embeds already saved in pages ([`TransclusionRegistry::reconcile_from_pages`]).
//! Reconciling only ever adds, so registrations for pages outside the scanned set
//! survive a rebuild.

use crate::link_extractor::extract_block_embeds;
use crate::model::Page;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct TransclusionRegistry {
    /// block id -> embedding page ids. Never holds an empty set.
    embeds: HashMap<String, HashSet<String>>,
}

impl TransclusionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `page_id` embeds `block_id`. Returns false if it already did.
    pub fn register(&mut self, block_id: &str, page_id: &str) -> bool {
        self.embeds
            .entry(block_id.to_string())
            .or_default()
            .insert(page_id.to_string())
    }

    /// Forget that `page_id` embeds `block_id`. Returns false if it did not.
    pub fn unregister(&mut self, block_id: &str, page_id: &str) -> bool {
        let Some(pages) = self.embeds.get_mut(block_id) else {
            return false;
        };
        let removed = pages.remove(page_id);
        if pages.is_empty() {
            self.embeds.remove(block_id);
        }
        removed
    }

    pub fn is_synced(&self, block_id: &str) -> bool {
        self.embeds.get(block_id).is_some_and(|pages| !pages.is_empty())
    }

    /// Pages currently embedding `block_id`, sorted.
    pub fn embed_pages(&self, block_id: &str) -> Vec<String> {
        let mut pages: Vec<String> = self
            .embeds
            .get(block_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        pages.sort();
        pages
    }

    /// Seed entries from `blockEmbed` blocks found in `pages`. Additive only.
    /// Returns the number of new registrations.
    pub fn reconcile_from_pages(&mut self, pages: &[Page]) -> usize {
        let mut added = 0;
        for page in pages {
            for embed in extract_block_embeds(page.blocks()) {
                if self.register(&embed.block_id, &page.id) {
                    added += 1;
                }
            }
        }
        added
    }

    pub fn synced_block_count(&self) -> usize {
        self.embeds.len()
    }

    pub fn clear(&mut self) {
        self.embeds.clear();
    }
}
