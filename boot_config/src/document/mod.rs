//! Loading fragments: stores, the tolerant parser and the parse cache.

mod directive;
mod loader;
mod node;
mod parser;
mod store;

pub use loader::{DocumentLoader, parse_document};
pub use node::{Document, Entry, INCLUDE_KEY, Include, Item, MERGE_KEY, Node};
pub use parser::{ParseError, parse_node};
pub use store::{DirectoryStore, DocumentStore, MemoryStore, SearchPathStore};

pub(crate) use node::{index_crumb, key_crumb};

#[cfg(test)]
mod tests;
