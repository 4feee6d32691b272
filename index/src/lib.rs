//! # Index
//!
//! The per-date retrieval index for mailrag. A day's mail is normalized
//! into documents, split into overlapping chunks, embedded, and persisted
//! as one [`DateIndex`] per calendar date under a stable storage root.
//!
//! The lifecycle the rest of the system relies on:
//!
//! - an index is built lazily the first time a date is queried,
//! - every later access loads the persisted index instead of rebuilding,
//! - a build is atomic: storage holds either nothing for a date or a fully
//!   readable index, never a partial one.

pub mod chunker;
pub mod document;
pub mod error;
pub mod index;
pub mod store;

pub use chunker::{Chunk, ChunkConfig, split_documents};
pub use document::{MailDocument, normalize};
pub use error::{IndexError, Result};
pub use index::{DateIndex, IndexEntry, SearchHit};
pub use store::DateIndexStore;
