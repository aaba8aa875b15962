use super::{required_str, to_json, wants_json};
use crate::notebook::Notebook;
use serde_json::Value;

/// Execute the `get_block_refs` tool: list the pages citing a block.
pub fn execute(notebook: &Notebook, arguments: &Value) -> Result<String, String> {
    let block_id = required_str(arguments, "block_id")?;
    let records = notebook.index().get_block_backlinks(block_id);

    if wants_json(arguments) {
        return to_json(&records);
    }

    let mut output = format!("References to block {}:\n", block_id);
    if records.is_empty() {
        output.push_str("- (none)\n");
        return Ok(output);
    }
    for record in &records {
        output.push_str(&format!(
            "- {} (cites it in {})\n",
            record.source_page_title,
            notebook.title_for(&record.target_page_id)
        ));
    }
    Ok(output)
}
