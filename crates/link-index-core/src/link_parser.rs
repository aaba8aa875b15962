
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// Compile regex once, reuse across calls
static WIKILINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\[\]]+)\]\]").unwrap()
});

static WIKILINK_ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<wiki-link\b([^>]*)>").unwrap()
});

static BLOCK_REF_ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<block-ref\b([^>]*)>").unwrap()
});

static BLOCK_REF_PLAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\(([^()]*)\)\)").unwrap()
});

static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

static CODE_ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<code\b[^>]*>.*?</code>").unwrap()
});

/// The target of a block reference: a block inside a specific page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRefTarget {
    pub block_id: String,
    pub page_id: String,
}

impl BlockRefTarget {
    pub fn new(block_id: impl Into<String>, page_id: impl Into<String>) -> Self {
        Self {
            block_id: block_id.into(),
            page_id: page_id.into(),
        }
    }
}

/// Extract wiki-link targets from one text payload, in text order.
///
/// Recognises both the editor's `<wiki-link data-page-title="...">` element and the
/// plain `[[Title]]` form (anchors and aliases stripped). Links inside code are ignored.
/// Duplicates are kept; deduplication happens per page in the extractor.
pub fn extract_wikilinks(text: &str) -> Vec<String> {
    if !text.contains("[[") && !text.contains("<wiki-link") {
        return Vec::new();
    }
    let excluded = build_excluded_ranges(text);
    let mut found: Vec<(usize, String)> = Vec::new();

    for cap in WIKILINK_ELEMENT_RE.captures_iter(text) {
        let start = cap.get(0).unwrap().start();
        if is_excluded(start, &excluded) {
            continue;
        }
        let Some(title) = attribute(&cap[1], "data-page-title") else {
            continue;
        };
        let title = title.trim();
        if !title.is_empty() {
            found.push((start, title.to_string()));
        }
    }

    for cap in WIKILINK_RE.captures_iter(text) {
        let start = cap.get(0).unwrap().start();
        if is_excluded(start, &excluded) {
            continue;
        }
        if let Some(name) = page_name(&cap[1]) {
            found.push((start, decode_entities(name)));
        }
    }

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, title)| title).collect()
}

/// Extract block references from one text payload, in text order.
///
/// Both the `<block-ref data-block-id data-page-id>` element and the plain
/// `((ref:block,page:page))` form are accepted, with attributes in either order.
/// A reference missing its block id or page id is skipped.
pub fn extract_block_refs(text: &str) -> Vec<BlockRefTarget> {
    if !text.contains("((") && !text.contains("<block-ref") {
        return Vec::new();
    }
    let excluded = build_excluded_ranges(text);
    let mut found: Vec<(usize, BlockRefTarget)> = Vec::new();

    for cap in BLOCK_REF_ELEMENT_RE.captures_iter(text) {
        let start = cap.get(0).unwrap().start();
        if is_excluded(start, &excluded) {
            continue;
        }
        let attrs = &cap[1];
        let block_id = attribute(attrs, "data-block-id");
        let page_id = attribute(attrs, "data-page-id");
        if let Some(target) = block_ref_target(block_id.as_deref(), page_id.as_deref()) {
            found.push((start, target));
        }
    }

    for cap in BLOCK_REF_PLAIN_RE.captures_iter(text) {
        let start = cap.get(0).unwrap().start();
        if is_excluded(start, &excluded) {
            continue;
        }
        let mut block_id = None;
        let mut page_id = None;
        for part in cap[1].split(',') {
            let Some((key, value)) = part.split_once(':') else {
                continue;
            };
            match key.trim() {
                "ref" | "block" => block_id = Some(value.trim()),
                "page" => page_id = Some(value.trim()),
                _ => {}
            }
        }
        if let Some(target) = block_ref_target(block_id, page_id) {
            found.push((start, target));
        }
    }

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, target)| target).collect()
}

/// Decode the handful of entities the editor writes into attribute values.
pub fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    // &amp; last so "&amp;lt;" decodes to "&lt;" rather than "<"
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// The page-name part of a `[[...]]` body: text before any `|` or `#`, trimmed.
fn page_name(content: &str) -> Option<&str> {
    let end = content
        .find('|')
        .unwrap_or(content.len())
        .min(content.find('#').unwrap_or(content.len()));
    let name = content[..end].trim();
    (!name.is_empty()).then_some(name)
}

fn block_ref_target(block_id: Option<&str>, page_id: Option<&str>) -> Option<BlockRefTarget> {
    let block_id = block_id.map(str::trim).filter(|s| !s.is_empty())?;
    let page_id = page_id.map(str::trim).filter(|s| !s.is_empty())?;
    Some(BlockRefTarget::new(block_id, page_id))
}

/// Look up an attribute value inside the attribute section of an opening tag.
fn attribute(attrs: &str, name: &str) -> Option<String> {
    ATTRIBUTE_RE.captures_iter(attrs).find_map(|cap| {
        if !cap[1].eq_ignore_ascii_case(name) {
            return None;
        }
        cap.get(2)
            .or_else(|| cap.get(3))
            .map(|m| decode_entities(m.as_str()))
    })
}

/// Byte ranges covered by `<code>` elements. Backticks are ordinary characters in
/// editor HTML and exclude nothing.
fn build_excluded_ranges(text: &str) -> Vec<(usize, usize)> {
    CODE_ELEMENT_RE
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect()
}

/// Returns true if the byte offset falls within any excluded range.
fn is_excluded(offset: usize, excluded: &[(usize, usize)]) -> bool {
    excluded.iter().any(|&(start, end)| offset >= start && offset < end)
}
