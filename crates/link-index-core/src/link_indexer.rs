use crate::backlinks::BacklinkIndex;
use crate::block_refs::BlockRefIndex;
use crate::link_extractor::scan_blocks;
use crate::link_parser::BlockRefTarget;
use crate::model::{BlockReferenceRecord, LinkRecord, Page};
use crate::transclusion::TransclusionRegistry;
use serde::Serialize;

/// Counts describing the current state of a [`LinkIndex`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub pages: usize,
    pub link_titles: usize,
    pub link_records: usize,
    pub referenced_blocks: usize,
    pub block_references: usize,
    pub synced_blocks: usize,
}

/// The link index of one open notebook.
///
/// Owns the page-link index, the block-reference index and the transclusion registry.
/// Every mutation takes `&mut self` and runs to completion, so a reader never sees a
/// forward map that disagrees with its reverse map.
#[derive(Debug, Default)]
pub struct LinkIndex {
    links: BacklinkIndex,
    block_refs: BlockRefIndex,
    embeds: TransclusionRegistry,
}

impl LinkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Content-derived indices
    // -----------------------------------------------------------------------

    /// Re-index one page after an edit.
    ///
    /// Links and block references the page no longer contains are removed, new ones
    /// are added, and records from other pages are left alone. A page without content
    /// ends up with an empty forward entry.
    pub fn update_page_links(&mut self, page: &Page) {
        let scan = scan_blocks(page.blocks());
        tracing::debug!(
            "Page {}: {} links, {} block refs",
            page.id,
            scan.links.len(),
            scan.block_refs.len()
        );
        self.links.set_page_links(&page.id, &page.title, scan.links);
        self.block_refs
            .set_page_refs(&page.id, &page.title, scan.block_refs);
    }

    /// Throw away the link and block-reference maps and rebuild them from `pages`.
    ///
    /// One scan per page feeds both maps. Embeds found along the way are added to the
    /// transclusion registry without removing anything already registered.
    pub fn build_links_from_pages(&mut self, pages: &[Page]) {
        tracing::info!("Rebuilding link index from {} pages", pages.len());
        self.links.clear();
        self.block_refs.clear();

        let mut embeds_added = 0;
        for page in pages {
            let scan = scan_blocks(page.blocks());
            self.links.set_page_links(&page.id, &page.title, scan.links);
            self.block_refs
                .set_page_refs(&page.id, &page.title, scan.block_refs);
            for embed in &scan.embeds {
                if self.embeds.register(&embed.block_id, &page.id) {
                    embeds_added += 1;
                }
            }
        }

        tracing::info!(
            "Link index rebuilt: {} link records, {} block references, {} new embeds",
            self.links.record_count(),
            self.block_refs.record_count(),
            embeds_added
        );
    }

    /// Drop a deleted page's links and block references.
    ///
    /// Embeds are untouched; an embed widget unmounting is what unregisters them.
    pub fn remove_page(&mut self, page_id: &str) {
        let links = self.links.remove_page(page_id);
        let refs = self.block_refs.remove_page(page_id);
        tracing::debug!(
            "Page {}: removed {} link records, {} block references",
            page_id,
            links,
            refs
        );
    }

    /// Drop the link and block-reference maps. Used when no notebook is selected.
    pub fn clear_links(&mut self) {
        self.links.clear();
        self.block_refs.clear();
    }

    /// Clear everything, including live embed registrations.
    pub fn reset(&mut self) {
        self.clear_links();
        self.embeds.clear();
    }

    /// Pages linking to exactly `title`, ordered by source page id.
    pub fn get_backlinks(&self, title: &str) -> Vec<LinkRecord> {
        self.links.backlinks(title).into_iter().cloned().collect()
    }

    pub fn get_block_backlinks(&self, block_id: &str) -> Vec<BlockReferenceRecord> {
        self.block_refs.references(block_id).into_iter().cloned().collect()
    }

    pub fn forward_links(&self, page_id: &str) -> &[String] {
        self.links.forward_links(page_id)
    }

    pub fn block_refs_from(&self, page_id: &str) -> &[BlockRefTarget] {
        self.block_refs.refs_from(page_id)
    }

    /// Every title with at least one backlink, as stored.
    pub fn backlink_titles(&self) -> impl Iterator<Item = &str> {
        self.links.titles()
    }

    pub fn links(&self) -> &BacklinkIndex {
        &self.links
    }

    pub fn block_references(&self) -> &BlockRefIndex {
        &self.block_refs
    }

    // -----------------------------------------------------------------------
    // Transclusion
    // -----------------------------------------------------------------------

    pub fn register_block_embed(&mut self, block_id: &str, page_id: &str) {
        if self.embeds.register(block_id, page_id) {
            tracing::debug!("Block {} embedded by page {}", block_id, page_id);
        }
    }

    pub fn unregister_block_embed(&mut self, block_id: &str, page_id: &str) {
        if self.embeds.unregister(block_id, page_id) {
            tracing::debug!("Block {} no longer embedded by page {}", block_id, page_id);
        }
    }

    pub fn is_block_synced(&self, block_id: &str) -> bool {
        self.embeds.is_synced(block_id)
    }

    pub fn get_block_embed_pages(&self, block_id: &str) -> Vec<String> {
        self.embeds.embed_pages(block_id)
    }

    /// Seed embed registrations from saved `blockEmbed` blocks, additively.
    pub fn reconcile_embeds(&mut self, pages: &[Page]) -> usize {
        self.embeds.reconcile_from_pages(pages)
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            pages: self.links.page_count(),
            link_titles: self.links.titles().count(),
            link_records: self.links.record_count(),
            referenced_blocks: self.block_refs.block_ids().count(),
            block_references: self.block_refs.record_count(),
            synced_blocks: self.embeds.synced_block_count(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EditorBlock;
    use serde_json::json;
    use std::collections::{BTreeMap, BTreeSet};

    // === Test Helpers ===

    fn page(id: &str, title: &str, texts: &[&str]) -> Page {
        let blocks = texts
            .iter()
            .enumerate()
            .map(|(i, t)| EditorBlock::paragraph(format!("{id}-b{i}"), t))
            .collect();
        Page::new(id, title).with_blocks(blocks)
    }

    type LinkSnapshot = (
        BTreeMap<String, BTreeSet<String>>,
        BTreeMap<String, BTreeSet<(String, String)>>,
        BTreeMap<String, BTreeSet<(String, String, String)>>,
    );

    /// Order-insensitive view of the link and block-reference maps.
    fn snapshot(index: &LinkIndex) -> LinkSnapshot {
        let forward = index
            .links()
            .forward_entries()
            .map(|(page, targets)| (page.to_string(), targets.iter().cloned().collect()))
            .collect();
        let reverse = index
            .backlink_titles()
            .map(|title| {
                let records = index
                    .get_backlinks(title)
                    .into_iter()
                    .map(|r| (r.source_page_id, r.source_page_title))
                    .collect();
                (title.to_string(), records)
            })
            .collect();
        let refs = index
            .block_references()
            .block_ids()
            .map(|block| {
                let records = index
                    .get_block_backlinks(block)
                    .into_iter()
                    .map(|r| (r.source_page_id, r.source_page_title, r.target_page_id))
                    .collect();
                (block.to_string(), records)
            })
            .collect();
        (forward, reverse, refs)
    }

    fn assert_transposed(index: &LinkIndex) {
        for (page_id, targets) in index.links().forward_entries() {
            for target in targets {
                assert!(
                    index
                        .get_backlinks(target)
                        .iter()
                        .any(|r| r.source_page_id == page_id),
                    "missing backlink {page_id} -> {target}"
                );
            }
        }
        for title in index.backlink_titles() {
            for record in index.get_backlinks(title) {
                assert!(
                    index
                        .forward_links(&record.source_page_id)
                        .iter()
                        .any(|t| t == title),
                    "dangling backlink {} -> {title}",
                    record.source_page_id
                );
            }
        }
    }

    fn corpus() -> Vec<Page> {
        vec![
            page("m1", "Meeting", &["Discuss [[Project X]] and ((ref:block1,page:p2))"]),
            page("p2", "Project X", &["Links to [[Meeting]] and [[Roadmap]]"]),
            page("p3", "Roadmap", &["[[Project X]] [[project x]] ((ref:block1,page:p2))"]),
            Page::new("p4", "Empty"),
        ]
    }

    // === Scenario tests ===

    #[test]
    fn meeting_scenario() {
        let mut index = LinkIndex::new();
        let meeting = page("m1", "Meeting", &["Discuss [[Project X]] and ((ref:block1,page:p2))"]);

        index.update_page_links(&meeting);

        assert_eq!(
            index.get_backlinks("Project X"),
            vec![LinkRecord {
                source_page_id: "m1".into(),
                source_page_title: "Meeting".into(),
                target_title: "Project X".into(),
            }]
        );
        assert_eq!(
            index.get_block_backlinks("block1"),
            vec![BlockReferenceRecord {
                source_page_id: "m1".into(),
                source_page_title: "Meeting".into(),
                target_page_id: "p2".into(),
                target_block_id: "block1".into(),
            }]
        );
    }

    #[test]
    fn deleting_page_then_rebuilding_drops_only_its_contributions() {
        let mut index = LinkIndex::new();
        let mut pages = corpus();
        index.build_links_from_pages(&pages);
        assert_eq!(index.get_backlinks("Project X").len(), 2);

        pages.retain(|p| p.id != "m1");
        index.build_links_from_pages(&pages);

        let sources: Vec<String> = index
            .get_backlinks("Project X")
            .into_iter()
            .map(|r| r.source_page_id)
            .collect();
        assert_eq!(sources, vec!["p3"]);
        assert_eq!(index.get_block_backlinks("block1").len(), 1);
        assert_eq!(index.get_backlinks("Roadmap").len(), 1);
        assert!(index.forward_links("m1").is_empty());
        assert_transposed(&index);
    }

    // === Incremental update tests ===

    #[test]
    fn stale_link_removed_on_update() {
        let mut index = LinkIndex::new();
        index.update_page_links(&page("p1", "One", &["[[A]]"]));
        index.update_page_links(&page("p2", "Two", &["[[A]]"]));

        index.update_page_links(&page("p1", "One", &["no more links"]));

        let sources: Vec<String> = index
            .get_backlinks("A")
            .into_iter()
            .map(|r| r.source_page_id)
            .collect();
        assert_eq!(sources, vec!["p2"]);
        assert_transposed(&index);
    }

    #[test]
    fn editing_one_page_keeps_a_crowded_bucket_intact() {
        let mut index = LinkIndex::new();
        let spokes: Vec<Page> = (0..300)
            .map(|i| page(&format!("s{i:03}"), "Spoke", &["[[Hub]] ((ref:hb,page:hub))"]))
            .collect();
        index.build_links_from_pages(&spokes);

        index.update_page_links(&page("s150", "Spoke", &["only [[Elsewhere]]"]));

        let hub = index.get_backlinks("Hub");
        assert_eq!(hub.len(), 299);
        assert!(hub.iter().all(|r| r.source_page_id != "s150"));
        assert_eq!(hub[0].source_page_id, "s000");
        assert_eq!(index.get_block_backlinks("hb").len(), 299);
        assert_eq!(index.get_backlinks("Elsewhere").len(), 1);
        assert_transposed(&index);
    }

    #[test]
    fn repeated_update_is_idempotent() {
        let mut index = LinkIndex::new();
        let p = page("p1", "One", &["[[A]] [[B]] ((ref:x,page:y))"]);

        index.update_page_links(&p);
        let once = snapshot(&index);
        index.update_page_links(&p);

        assert_eq!(snapshot(&index), once);
        assert_eq!(index.get_backlinks("A").len(), 1);
        assert_eq!(index.get_block_backlinks("x").len(), 1);
    }

    #[test]
    fn page_without_content_clears_prior_contribution() {
        let mut index = LinkIndex::new();
        index.update_page_links(&page("p1", "One", &["[[A]] ((ref:b,page:q))"]));

        index.update_page_links(&Page::new("p1", "One"));

        assert!(index.get_backlinks("A").is_empty());
        assert!(index.get_block_backlinks("b").is_empty());
        assert!(index.forward_links("p1").is_empty());
        assert_eq!(index.stats().pages, 1);
    }

    #[test]
    fn duplicate_block_citation_yields_one_record() {
        let mut index = LinkIndex::new();
        index.update_page_links(&page(
            "p1",
            "One",
            &["((ref:b1,page:p9))", "again ((page:p9,ref:b1))"],
        ));

        assert_eq!(index.get_block_backlinks("b1").len(), 1);
    }

    #[test]
    fn remove_page_drops_links_but_not_embeds() {
        let mut index = LinkIndex::new();
        index.update_page_links(&page("p1", "One", &["[[A]] ((ref:b,page:q))"]));
        index.register_block_embed("b", "p1");

        index.remove_page("p1");

        assert!(index.get_backlinks("A").is_empty());
        assert!(index.get_block_backlinks("b").is_empty());
        assert!(index.is_block_synced("b"));
    }

    #[test]
    fn unknown_keys_return_empty() {
        let index = LinkIndex::new();
        assert!(index.get_backlinks("nothing").is_empty());
        assert!(index.get_block_backlinks("nothing").is_empty());
        assert!(index.get_block_embed_pages("nothing").is_empty());
        assert!(!index.is_block_synced("nothing"));
    }

    // === Rebuild tests ===

    #[test]
    fn rebuild_matches_sequential_updates_in_any_order() {
        let pages = corpus();

        let mut rebuilt = LinkIndex::new();
        rebuilt.build_links_from_pages(&pages);

        let mut forward = LinkIndex::new();
        for p in &pages {
            forward.update_page_links(p);
        }

        let mut backward = LinkIndex::new();
        for p in pages.iter().rev() {
            backward.update_page_links(p);
        }

        assert_eq!(snapshot(&rebuilt), snapshot(&forward));
        assert_eq!(snapshot(&rebuilt), snapshot(&backward));
        assert_transposed(&rebuilt);
    }

    #[test]
    fn rebuild_discards_previous_state() {
        let mut index = LinkIndex::new();
        index.update_page_links(&page("gone", "Gone", &["[[Stale]]"]));

        index.build_links_from_pages(&corpus());

        assert!(index.get_backlinks("Stale").is_empty());
        assert!(index.forward_links("gone").is_empty());
    }

    #[test]
    fn case_variants_stay_in_separate_buckets() {
        let mut index = LinkIndex::new();
        index.build_links_from_pages(&corpus());

        assert_eq!(index.get_backlinks("project x").len(), 1);
        assert_eq!(index.get_backlinks("Project X").len(), 2);
    }

    #[test]
    fn clear_links_keeps_embed_registrations() {
        let mut index = LinkIndex::new();
        index.build_links_from_pages(&corpus());
        index.register_block_embed("b", "p1");

        index.clear_links();
        assert_eq!(index.stats().link_records, 0);
        assert_eq!(index.stats().block_references, 0);
        assert!(index.is_block_synced("b"));

        index.reset();
        assert!(!index.is_block_synced("b"));
    }

    // === Transclusion tests ===

    #[test]
    fn register_twice_unregister_once_is_not_synced() {
        let mut index = LinkIndex::new();
        index.register_block_embed("b", "p");
        index.register_block_embed("b", "p");
        index.unregister_block_embed("b", "p");

        assert!(!index.is_block_synced("b"));
        assert!(index.get_block_embed_pages("b").is_empty());
    }

    #[test]
    fn rebuild_seeds_embeds_without_erasing_live_ones() {
        let mut index = LinkIndex::new();
        index.register_block_embed("live-block", "page-outside-set");

        let embedding = Page::new("e1", "Embeds").with_blocks(vec![EditorBlock::new(
            "x",
            "blockEmbed",
            json!({"targetBlockId": "block1", "targetPageId": "p2"}),
        )]);
        let mut pages = corpus();
        pages.push(embedding);
        index.build_links_from_pages(&pages);

        assert!(index.is_block_synced("live-block"));
        assert_eq!(index.get_block_embed_pages("block1"), vec!["e1"]);
        assert_eq!(index.stats().synced_blocks, 2);
    }

    #[test]
    fn reconcile_embeds_is_separate_from_links() {
        let mut index = LinkIndex::new();
        let embedding = Page::new("e1", "Embeds").with_blocks(vec![EditorBlock::new(
            "x",
            "blockEmbed",
            json!({"targetBlockId": "b7"}),
        )]);

        assert_eq!(index.reconcile_embeds(&[embedding]), 1);
        assert!(index.is_block_synced("b7"));
        assert_eq!(index.stats().pages, 0);
    }

    #[test]
    fn stats_reflect_corpus() {
        let mut index = LinkIndex::new();
        index.build_links_from_pages(&corpus());

        let stats = index.stats();
        assert_eq!(stats.pages, 4);
        // Project X, project x, Meeting, Roadmap
        assert_eq!(stats.link_titles, 4);
        assert_eq!(stats.link_records, 5);
        assert_eq!(stats.referenced_blocks, 1);
        assert_eq!(stats.block_references, 2);
    }
}
