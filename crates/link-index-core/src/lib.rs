//! Link index for a notebook of block-structured pages.
//!
//! Tracks page→page wiki-links, block→block references and block transclusion, with
//! incremental per-page updates and full rebuilds. See [`link_indexer::LinkIndex`].

pub mod backlinks;
pub mod block_refs;
pub mod link_extractor;
pub mod link_indexer;
pub mod link_parser;
pub mod model;
pub mod page_store;
pub mod resolver;
pub mod transclusion;

pub use link_indexer::{IndexStats, LinkIndex};
pub use model::{BlockReferenceRecord, EditorBlock, LinkRecord, Page};
