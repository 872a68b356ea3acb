//! Caller-side handling for support-triage.
//!
//! This module provides functionality around the triage engine:
//! - Filtering and triaging inbound messages concurrently
//! - Recording results in the ticket store
//! - Reviewing the stored queue and marking tickets replied
//! - Rendering reports

pub mod inbound;
pub mod queue;
pub mod report;
