//! Message triage.
//!
//! The pure pipeline stages (signal extraction, sentiment, priority scoring,
//! knowledge retrieval, reply drafting) and the [`Engine`] that runs them for
//! one message.  External capabilities come in through `crate::service` and
//! every one of them has a local fallback.

pub mod compose;
pub mod engine;
pub mod extract;
pub mod knowledge;
pub mod lexicon;
pub mod priority;
pub mod retrieve;
pub mod sentiment;
pub mod summary;

pub use engine::Engine;
