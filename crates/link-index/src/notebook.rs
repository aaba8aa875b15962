use anyhow::Context;
use link_index_core::page_store::PageStore;
use link_index_core::resolver::PageResolver;
use link_index_core::{LinkIndex, Page};
use std::path::Path;

/// One open notebook: its pages, the link index built over them and the title
/// resolver the tools use to turn link titles into pages.
pub struct Notebook {
    pages: Vec<Page>,
    index: LinkIndex,
    resolver: PageResolver,
}

impl Notebook {
    /// Load all pages from `dir` and build the index.
    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        let pages = PageStore::new(dir)
            .list_pages()
            .with_context(|| format!("failed to load notebook {}", dir.display()))?;
        Ok(Self::from_pages(pages))
    }

    pub fn from_pages(pages: Vec<Page>) -> Self {
        let mut index = LinkIndex::new();
        index.build_links_from_pages(&pages);
        let mut resolver = PageResolver::new();
        resolver.rebuild(&pages);
        Self {
            pages,
            index,
            resolver,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn index(&self) -> &LinkIndex {
        &self.index
    }

    pub fn resolver(&self) -> &PageResolver {
        &self.resolver
    }

    /// Display title for a page id, falling back to the id itself.
    pub fn title_for(&self, page_id: &str) -> String {
        self.resolver
            .page(page_id)
            .map(|p| p.title.clone())
            .unwrap_or_else(|| page_id.to_string())
    }
}
