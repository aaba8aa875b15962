//! Block-level extraction: turns a page's content blocks into outgoing wiki-link titles,
//! block references and declared embed targets.
//!
//! Everything here is pure and infallible. Blocks with an unexpected payload shape simply
//! contribute nothing.

use crate::link_parser::{extract_block_refs as refs_in_text, extract_wikilinks, BlockRefTarget};
use crate::model::{BlockKind, EditorBlock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// A block that a `blockEmbed` block mirrors into its page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedTarget {
    pub block_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
}

/// Everything a single pass over a page's blocks yields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageScan {
    pub links: Vec<String>,
    pub block_refs: Vec<BlockRefTarget>,
    pub embeds: Vec<EmbedTarget>,
}

/// Scan all blocks once, collecting links, block references and embeds.
///
/// Each list is deduplicated and keeps first-seen order.
pub fn scan_blocks(blocks: &[EditorBlock]) -> PageScan {
    let mut scan = PageScan::default();
    let mut seen_links: HashSet<String> = HashSet::new();
    let mut seen_refs: HashSet<BlockRefTarget> = HashSet::new();
    let mut seen_embeds: HashSet<String> = HashSet::new();

    for block in blocks {
        let kind = block.kind();
        if kind.carries_text() {
            for text in block_texts(block) {
                for link in extract_wikilinks(text) {
                    if seen_links.insert(link.clone()) {
                        scan.links.push(link);
                    }
                }
                for target in refs_in_text(text) {
                    if seen_refs.insert(target.clone()) {
                        scan.block_refs.push(target);
                    }
                }
            }
        } else if kind == BlockKind::BlockEmbed {
            if let Some(embed) = embed_target(&block.data) {
                if seen_embeds.insert(embed.block_id.clone()) {
                    scan.embeds.push(embed);
                }
            }
        }
    }

    scan
}

/// Outgoing wiki-link titles, deduplicated, in first-seen order.
pub fn extract_links(blocks: &[EditorBlock]) -> Vec<String> {
    scan_blocks(blocks).links
}

/// Outgoing block references, deduplicated by `(block_id, page_id)`.
pub fn extract_block_refs(blocks: &[EditorBlock]) -> Vec<BlockRefTarget> {
    scan_blocks(blocks).block_refs
}

/// Declared targets of `blockEmbed` blocks, deduplicated by block id.
pub fn extract_block_embeds(blocks: &[EditorBlock]) -> Vec<EmbedTarget> {
    scan_blocks(blocks).embeds
}

/// The text payloads of a text-carrying block. List and checklist items are
/// returned one per item so each is scanned on its own.
fn block_texts(block: &EditorBlock) -> Vec<&str> {
    let mut texts = Vec::new();
    match block.kind() {
        BlockKind::Paragraph | BlockKind::Header => {
            if let Some(text) = block.data.get("text").and_then(Value::as_str) {
                texts.push(text);
            }
        }
        BlockKind::List => {
            if let Some(items) = block.data.get("items").and_then(Value::as_array) {
                collect_list_items(items, &mut texts);
            }
        }
        BlockKind::Checklist => {
            if let Some(items) = block.data.get("items").and_then(Value::as_array) {
                texts.extend(
                    items
                        .iter()
                        .filter_map(|item| item.get("text").and_then(Value::as_str)),
                );
            }
        }
        BlockKind::BlockEmbed | BlockKind::Other => {}
    }
    texts
}

/// List items are either plain strings or objects with `content`/`text` and an
/// optional nested `items` array.
fn collect_list_items<'a>(items: &'a [Value], texts: &mut Vec<&'a str>) {
    for item in items {
        if let Some(s) = item.as_str() {
            texts.push(s);
            continue;
        }
        let Some(obj) = item.as_object() else {
            continue;
        };
        if let Some(text) = obj
            .get("content")
            .or_else(|| obj.get("text"))
            .and_then(Value::as_str)
        {
            texts.push(text);
        }
        if let Some(nested) = obj.get("items").and_then(Value::as_array) {
            collect_list_items(nested, texts);
        }
    }
}

fn embed_target(data: &Value) -> Option<EmbedTarget> {
    let block_id = data
        .get("targetBlockId")
        .or_else(|| data.get("blockId"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())?;
    let page_id = data
        .get("targetPageId")
        .or_else(|| data.get("pageId"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Some(EmbedTarget {
        block_id: block_id.to_string(),
        page_id,
    })
}
