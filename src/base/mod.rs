//! Core components, types, and utilities for support-triage.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - System directives for the drafting agent.
//! - Domain types and result handling.

pub mod config;
pub mod prompts;
pub mod types;
