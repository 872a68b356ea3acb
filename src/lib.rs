//! Library root for `support-triage`.
//!
//! Support-triage turns an inbox of customer support messages into a ranked
//! queue of tickets.  For every message it will:
//! - Extract contact details, order ids and the customer's actual requests
//! - Classify sentiment and compute a deterministic priority score
//! - Retrieve the most relevant knowledge base passages
//! - Draft a reply, phrased by an LLM when one is configured
//!
//! Sentiment, embeddings and drafting are external capabilities behind traits,
//! each with a local fallback, so triage always completes.  Results are stored
//! in SurrealDB, where the queue can be reviewed and tickets marked replied.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;
pub mod triage;

use std::path::Path;

use base::{
    config::Config,
    types::{Res, Void},
};
use interaction::{inbound, queue, report};
use service::db::DbClient;
use tracing::{info, warn};

/// Public async entry for the binary crate.
///
/// Builds the runtime (ticket store and triage engine), triages every message
/// in the inbox file, and prints the report to stdout.
pub async fn start(config: Config, inbox: &Path, json: bool) -> Void {
    info!("Starting support-triage ...");

    // Initialize the runtime.
    warn_if_ephemeral(&config);
    let runtime = runtime::Runtime::new(config).await?;

    // Triage the inbox.
    let messages = inbound::load_inbox(inbox).await?;
    let mut results = inbound::handle_inbound_batch(messages, &runtime).await;
    report::by_priority(&mut results);

    // Print the report.
    if json {
        println!("{}", report::render_json(&results)?);
    } else {
        print!("{}", report::render_text(&results));
    }

    Ok(())
}

/// Print the stored ticket queue, highest priority first.
pub async fn list(config: Config, limit: usize, json: bool) -> Void {
    let db = open_store(&config).await?;
    let tickets = queue::list_queue(&db, limit).await?;

    if json {
        println!("{}", report::render_tickets_json(&tickets)?);
    } else {
        print!("{}", report::render_tickets_text(&tickets));
    }

    Ok(())
}

/// Record that the ticket for `message_id` has been answered.
pub async fn mark_replied(config: Config, message_id: &str) -> Void {
    let db = open_store(&config).await?;

    queue::mark_replied(&db, message_id).await
}

async fn open_store(config: &Config) -> Res<DbClient> {
    warn_if_ephemeral(config);

    DbClient::surreal(config).await
}

fn warn_if_ephemeral(config: &Config) {
    if config.db_endpoint == "memory" {
        warn!("The ticket store is in memory; set `db_endpoint` to keep tickets between runs.");
    }
}
