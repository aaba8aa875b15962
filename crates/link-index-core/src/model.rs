use serde::{Deserialize, Serialize};

/// A page snapshot as handed over by the editor or the page store.
///
/// The index never mutates pages; it only reads the blocks of the snapshot it is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<EditorData>,
}

impl Page {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            notebook_id: None,
            content: None,
        }
    }

    pub fn with_blocks(mut self, blocks: Vec<EditorBlock>) -> Self {
        self.content = Some(EditorData {
            time: None,
            version: None,
            blocks,
        });
        self
    }

    /// Content blocks, empty when the page has no content at all.
    pub fn blocks(&self) -> &[EditorBlock] {
        self.content
            .as_ref()
            .map(|c| c.blocks.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub blocks: Vec<EditorBlock>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorBlock {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl EditorBlock {
    pub fn new(id: impl Into<String>, block_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.into(),
            data,
        }
    }

    pub fn paragraph(id: impl Into<String>, text: &str) -> Self {
        Self::new(id, "paragraph", serde_json::json!({ "text": text }))
    }

    pub fn kind(&self) -> BlockKind {
        BlockKind::from_type(&self.block_type)
    }
}

/// The block types the extractor distinguishes. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Header,
    List,
    Checklist,
    BlockEmbed,
    Other,
}

impl BlockKind {
    pub fn from_type(block_type: &str) -> Self {
        match block_type {
            "paragraph" => BlockKind::Paragraph,
            "header" => BlockKind::Header,
            "list" => BlockKind::List,
            "checklist" => BlockKind::Checklist,
            "blockEmbed" => BlockKind::BlockEmbed,
            _ => BlockKind::Other,
        }
    }

    /// Whether blocks of this kind carry free text that may hold link markers.
    pub fn carries_text(self) -> bool {
        matches!(
            self,
            BlockKind::Paragraph | BlockKind::Header | BlockKind::List | BlockKind::Checklist
        )
    }
}

/// One wiki-link from a source page to a target named by title.
///
/// The target may not exist as a page yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub source_page_id: String,
    pub source_page_title: String,
    pub target_title: String,
}

/// A citation of a specific block in a specific page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockReferenceRecord {
    pub source_page_id: String,
    pub source_page_title: String,
    pub target_page_id: String,
    pub target_block_id: String,
}
