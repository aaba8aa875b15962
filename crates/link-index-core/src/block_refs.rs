use crate::link_parser::BlockRefTarget;
use crate::model::BlockReferenceRecord;
use std::collections::HashMap;

/// Block-level counterpart of [`crate::backlinks::BacklinkIndex`]: page→cited blocks
/// forward, cited block id→citing records reverse.
///
/// At most one record exists per `(source page, target block id)`.
#[derive(Debug, Clone, Default)]
pub struct BlockRefIndex {
    forward: HashMap<String, Vec<BlockRefTarget>>,
    /// block id -> source page id -> record
    references: HashMap<String, HashMap<String, BlockReferenceRecord>>,
}

impl BlockRefIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the blocks a page cites.
    ///
    /// When the page cites one block id under several page ids, the first citation wins
    /// and the rest are dropped from both maps.
    pub fn set_page_refs(&mut self, page_id: &str, page_title: &str, targets: Vec<BlockRefTarget>) {
        self.remove_page(page_id);

        let mut kept: Vec<BlockRefTarget> = Vec::with_capacity(targets.len());
        for target in targets {
            let bucket = self.references.entry(target.block_id.clone()).or_default();
            if bucket.contains_key(page_id) {
                continue;
            }
            bucket.insert(
                page_id.to_string(),
                BlockReferenceRecord {
                    source_page_id: page_id.to_string(),
                    source_page_title: page_title.to_string(),
                    target_page_id: target.page_id.clone(),
                    target_block_id: target.block_id.clone(),
                },
            );
            kept.push(target);
        }
        self.forward.insert(page_id.to_string(), kept);
    }

    /// Drop everything `page_id` cites. Returns the number of records removed.
    pub fn remove_page(&mut self, page_id: &str) -> usize {
        let Some(previous) = self.forward.remove(page_id) else {
            return 0;
        };
        let mut removed = 0;
        for target in &previous {
            let Some(bucket) = self.references.get_mut(&target.block_id) else {
                continue;
            };
            if bucket.remove(page_id).is_some() {
                removed += 1;
            }
            if bucket.is_empty() {
                self.references.remove(&target.block_id);
            }
        }
        removed
    }

    /// Records citing `block_id`, ordered by source page id.
    pub fn references(&self, block_id: &str) -> Vec<&BlockReferenceRecord> {
        let mut records: Vec<&BlockReferenceRecord> = self
            .references
            .get(block_id)
            .map(|bucket| bucket.values().collect())
            .unwrap_or_default();
        records.sort_by(|a, b| a.source_page_id.cmp(&b.source_page_id));
        records
    }

    /// Blocks cited by a page, in extraction order.
    pub fn refs_from(&self, page_id: &str) -> &[BlockRefTarget] {
        self.forward.get(page_id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn block_ids(&self) -> impl Iterator<Item = &str> {
        self.references.keys().map(String::as_str)
    }

    pub fn forward_entries(&self) -> impl Iterator<Item = (&str, &[BlockRefTarget])> {
        self.forward.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn record_count(&self) -> usize {
        self.references.values().map(HashMap::len).sum()
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.references.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citing_twice_yields_one_record() {
        let mut index = BlockRefIndex::new();
        index.set_page_refs(
            "m1",
            "Meeting",
            vec![BlockRefTarget::new("block1", "p2"), BlockRefTarget::new("block1", "p2")],
        );

        assert_eq!(
            index.references("block1"),
            vec![&BlockReferenceRecord {
                source_page_id: "m1".into(),
                source_page_title: "Meeting".into(),
                target_page_id: "p2".into(),
                target_block_id: "block1".into(),
            }]
        );
        assert_eq!(index.refs_from("m1").len(), 1);
    }

    #[test]
    fn same_block_id_under_two_pages_collapses_per_source() {
        let mut index = BlockRefIndex::new();
        index.set_page_refs(
            "m1",
            "Meeting",
            vec![BlockRefTarget::new("b1", "p2"), BlockRefTarget::new("b1", "p3")],
        );

        assert_eq!(index.references("b1").len(), 1);
        assert_eq!(index.references("b1")[0].target_page_id, "p2");
        // The dropped citation has no forward edge either
        assert_eq!(index.refs_from("m1"), [BlockRefTarget::new("b1", "p2")]);

        index.remove_page("m1");
        assert!(index.references("b1").is_empty());
        assert_eq!(index.block_ids().count(), 0);
    }

    #[test]
    fn update_removes_stale_refs_only_for_that_page() {
        let mut index = BlockRefIndex::new();
        index.set_page_refs("a", "A", vec![BlockRefTarget::new("b1", "p")]);
        index.set_page_refs("b", "B", vec![BlockRefTarget::new("b1", "p")]);

        index.set_page_refs("a", "A", vec![BlockRefTarget::new("b2", "p")]);

        let sources: Vec<&str> = index
            .references("b1")
            .into_iter()
            .map(|r| r.source_page_id.as_str())
            .collect();
        assert_eq!(sources, vec!["b"]);
        assert_eq!(index.references("b2").len(), 1);
        assert_eq!(index.record_count(), 2);
    }

    #[test]
    fn update_leaves_other_citers_of_a_popular_block_alone() {
        let mut index = BlockRefIndex::new();
        for i in 0..500 {
            index.set_page_refs(&format!("c{i:03}"), "Citer", vec![BlockRefTarget::new("hot", "src")]);
        }
        index.set_page_refs("me", "Mine", vec![BlockRefTarget::new("hot", "src")]);

        index.set_page_refs("me", "Mine", vec![BlockRefTarget::new("cold", "src")]);

        let records = index.references("hot");
        assert_eq!(records.len(), 500);
        assert!(records.iter().all(|r| r.source_page_id != "me"));
        assert_eq!(index.references("cold").len(), 1);
        assert_eq!(index.record_count(), 501);
    }

    #[test]
    fn unknown_block_has_no_references() {
        let index = BlockRefIndex::new();
        assert!(index.references("nope").is_empty());
        assert!(index.refs_from("nope").is_empty());
    }
}
