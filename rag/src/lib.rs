//! # RAG Pipeline
//!
//! Ties the mailrag components into one engine: given a date and that day's
//! message records, [`RagEngine`] builds or reuses the persisted index for
//! the date, retrieves the chunks most relevant to a question, and sends
//! them with the question to a chat-completion endpoint.
//!
//! ```rust,ignore
//! use mailrag_rag::{RagConfig, RagEngine, GenerationClient, AskOutcome};
//!
//! let engine = RagEngine::new(
//!     RagConfig::new("vector_store"),
//!     std::sync::Arc::new(provider),
//!     GenerationClient::new(),
//! );
//!
//! match engine.ask(date, &records, "When is the meeting?").await? {
//!     AskOutcome::Answer(text) => println!("{text}"),
//!     AskOutcome::NoData => println!("No mail indexed for that day."),
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod generation;

pub use config::RagConfig;
pub use engine::{AskOutcome, IndexOutcome, RagEngine};
pub use error::{RagError, Result};
pub use generation::GenerationClient;
