pub mod get_block_refs;
pub mod get_embeds;
pub mod get_links;
pub mod unresolved;

use crate::notebook::Notebook;
use serde_json::Value;

/// Tool names accepted by [`call`].
pub const TOOL_NAMES: &[&str] = &["get_links", "get_block_refs", "get_embeds", "unresolved", "stats"];

/// Run a tool by name against an open notebook.
pub fn call(notebook: &Notebook, name: &str, arguments: &Value) -> Result<String, String> {
    tracing::debug!("Calling tool {} with {}", name, arguments);
    match name {
        "get_links" => get_links::execute(notebook, arguments),
        "get_block_refs" => get_block_refs::execute(notebook, arguments),
        "get_embeds" => get_embeds::execute(notebook, arguments),
        "unresolved" => unresolved::execute(notebook, arguments),
        "stats" => stats(notebook, arguments),
        _ => Err(format!(
            "Unknown tool: {}. Available: {}",
            name,
            TOOL_NAMES.join(", ")
        )),
    }
}

/// Read a required string argument.
pub(crate) fn required_str<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, String> {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| format!("Missing required parameter: {}", key))
}

pub(crate) fn wants_json(arguments: &Value) -> bool {
    arguments.get("format").and_then(|v| v.as_str()) == Some("json")
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Failed to serialize result: {}", e))
}

fn stats(notebook: &Notebook, arguments: &Value) -> Result<String, String> {
    let stats = notebook.index().stats();
    if wants_json(arguments) {
        return to_json(&stats);
    }
    Ok(format!(
        "Pages indexed: {}\nLinked titles: {} ({} links)\nReferenced blocks: {} ({} references)\nSynced blocks: {}\n",
        stats.pages,
        stats.link_titles,
        stats.link_records,
        stats.referenced_blocks,
        stats.block_references,
        stats.synced_blocks
    ))
}
