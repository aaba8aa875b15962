//! Read-only access to a notebook directory on disk.
//!
//! Layout: `<notebook>/pages/<page-id>.json`, one serialized [`Page`] per file.

use crate::model::Page;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("notebook not found: {0} has no pages directory")]
    NotebookNotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse page {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub struct PageStore {
    notebook_dir: PathBuf,
}

impl PageStore {
    pub fn new(notebook_dir: impl Into<PathBuf>) -> Self {
        Self {
            notebook_dir: notebook_dir.into(),
        }
    }

    pub fn notebook_dir(&self) -> &Path {
        &self.notebook_dir
    }

    fn pages_dir(&self) -> PathBuf {
        self.notebook_dir.join("pages")
    }

    /// Load every page of the notebook, sorted by id.
    ///
    /// A page file that cannot be read or parsed is logged and skipped; only a missing
    /// pages directory or an unreadable directory listing is an error.
    pub fn list_pages(&self) -> Result<Vec<Page>, StoreError> {
        let pages_dir = self.pages_dir();
        if !pages_dir.is_dir() {
            return Err(StoreError::NotebookNotFound(self.notebook_dir.clone()));
        }

        let entries = fs::read_dir(&pages_dir).map_err(|source| StoreError::Io {
            path: pages_dir.clone(),
            source,
        })?;

        let mut pages = Vec::new();
        let mut skipped = 0;
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(source) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", pages_dir.display(), source);
                    skipped += 1;
                    continue;
                }
            };
            if !path.is_file() || path.extension().map_or(true, |e| e != "json") {
                continue;
            }
            match read_page(&path) {
                Ok(page) => pages.push(page),
                Err(e) => {
                    tracing::warn!("Skipping page: {}", e);
                    skipped += 1;
                }
            }
        }

        pages.sort_by(|a, b| a.id.cmp(&b.id));
        tracing::info!(
            "Loaded {} pages from {} ({} skipped)",
            pages.len(),
            pages_dir.display(),
            skipped
        );
        Ok(pages)
    }

    /// Load a single page by id.
    pub fn get_page(&self, page_id: &str) -> Result<Page, StoreError> {
        read_page(&self.pages_dir().join(format!("{}.json", page_id)))
    }
}

fn read_page(path: &Path) -> Result<Page, StoreError> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}
