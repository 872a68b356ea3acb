//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the collaborators the triage engine depends on:
//! - Database services (e.g., SurrealDB)
//! - Embedding services (local feature hashing, OpenAI)
//! - LLM services (e.g., OpenAI)
//! - Sentiment services (hosted text classification)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod db;
pub mod embed;
pub mod llm;
pub mod sentiment;
