use super::{to_json, wants_json};
use crate::notebook::Notebook;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnresolvedLink {
    title: String,
    linked_from: Vec<String>,
}

/// Execute the `unresolved` tool: list link titles that no page answers to.
pub fn execute(notebook: &Notebook, arguments: &Value) -> Result<String, String> {
    let index = notebook.index();
    let unresolved: Vec<UnresolvedLink> = notebook
        .resolver()
        .unresolved_targets(index)
        .into_iter()
        .map(|title| {
            let mut linked_from: Vec<String> = index
                .get_backlinks(&title)
                .into_iter()
                .map(|r| r.source_page_title)
                .collect();
            linked_from.sort();
            UnresolvedLink { title, linked_from }
        })
        .collect();

    if wants_json(arguments) {
        return to_json(&unresolved);
    }

    let mut output = String::from("Unresolved links:\n");
    if unresolved.is_empty() {
        output.push_str("- (none)\n");
    }
    for link in &unresolved {
        output.push_str(&format!(
            "- {} (linked from {})\n",
            link.title,
            link.linked_from.join(", ")
        ));
    }
    Ok(output)
}
