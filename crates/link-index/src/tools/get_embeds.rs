use super::{required_str, to_json, wants_json};
use crate::notebook::Notebook;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedReport<'a> {
    block_id: &'a str,
    synced: bool,
    pages: Vec<String>,
}

/// Execute the `get_embeds` tool: report whether a block is live-mirrored and where.
pub fn execute(notebook: &Notebook, arguments: &Value) -> Result<String, String> {
    let block_id = required_str(arguments, "block_id")?;
    let index = notebook.index();
    let pages = index.get_block_embed_pages(block_id);

    if wants_json(arguments) {
        return to_json(&EmbedReport {
            block_id,
            synced: index.is_block_synced(block_id),
            pages,
        });
    }

    if !index.is_block_synced(block_id) {
        return Ok(format!("Block {} is not embedded anywhere\n", block_id));
    }
    let mut output = format!("Block {} is synced into:\n", block_id);
    for page_id in &pages {
        output.push_str(&format!("- {}\n", notebook.title_for(page_id)));
    }
    Ok(output)
}
