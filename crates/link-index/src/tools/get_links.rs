use super::{required_str, to_json, wants_json};
use crate::notebook::Notebook;
use link_index_core::LinkRecord;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LinksReport<'a> {
    title: &'a str,
    page_id: Option<&'a str>,
    backlinks: Vec<LinkRecord>,
    forward_links: Vec<ForwardLink>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ForwardLink {
    title: String,
    page_id: Option<String>,
}

/// Execute the `get_links` tool: return backlinks and forward links for a page title.
///
/// The title is resolved case-insensitively. A title no page answers to still reports
/// the pages linking to it, so dangling links can be inspected.
pub fn execute(notebook: &Notebook, arguments: &Value) -> Result<String, String> {
    let title = required_str(arguments, "title")?;
    let index = notebook.index();
    let resolver = notebook.resolver();
    let page = resolver.resolve_title(title);

    // --- Backlinks ---
    let backlinks = match page {
        Some(info) => resolver.backlinks_for_page(index, &info.id),
        None => index.get_backlinks(title),
    };
    if page.is_none() && backlinks.is_empty() {
        return Err(format!("Error: Page not found: {}", title));
    }

    // --- Forward links ---
    let forward_links: Vec<ForwardLink> = page
        .map(|info| {
            index
                .forward_links(&info.id)
                .iter()
                .map(|target| ForwardLink {
                    title: target.clone(),
                    page_id: resolver.resolve_title(target).map(|p| p.id.clone()),
                })
                .collect()
        })
        .unwrap_or_default();

    if wants_json(arguments) {
        return to_json(&LinksReport {
            title: page.map(|p| p.title.as_str()).unwrap_or(title),
            page_id: page.map(|p| p.id.as_str()),
            backlinks,
            forward_links,
        });
    }

    // Format output
    let mut output = String::new();
    if page.is_none() {
        output.push_str(&format!("{} (no such page yet)\n\n", title));
    }

    output.push_str("Backlinks (pages linking to this):\n");
    // A page linking to two case variants of the title appears once
    let mut seen: HashSet<&str> = HashSet::new();
    let sources: Vec<&str> = backlinks
        .iter()
        .filter(|r| seen.insert(r.source_page_id.as_str()))
        .map(|r| r.source_page_title.as_str())
        .collect();
    if sources.is_empty() {
        output.push_str("- (none)\n");
    } else {
        for source in &sources {
            output.push_str(&format!("- {}\n", source));
        }
    }

    output.push_str("\nForward links (pages this links to):\n");
    if forward_links.is_empty() {
        output.push_str("- (none)\n");
    } else {
        for link in &forward_links {
            match &link.page_id {
                Some(id) => output.push_str(&format!("- {}\n", notebook.title_for(id))),
                None => output.push_str(&format!("- {} (unresolved)\n", link.title)),
            }
        }
    }

    Ok(output)
}
