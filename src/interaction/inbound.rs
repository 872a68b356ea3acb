//! Inbound message handling.
//!
//! Decides which messages get triaged at all, runs the engine over each of them
//! concurrently and records the results in the ticket store.

use std::path::Path;

use futures::future::join_all;
use tracing::{Instrument, error, info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{RawMessage, Res, TriageOutcome},
    },
    runtime::Runtime,
    service::db::TicketRecord,
};

/// The bare, lower-cased address of a sender such as `Jo Smith <jo@example.com>`.
pub fn sender_address(sender: &str) -> String {
    let sender = sender.trim();

    let address = match (sender.rfind('<'), sender.rfind('>')) {
        (Some(start), Some(end)) if start < end => &sender[start + 1..end],
        _ => sender,
    };

    address.trim().to_lowercase()
}

/// Whether `message` was sent from our own mailbox.
pub fn is_self_message(config: &Config, message: &RawMessage) -> bool {
    config
        .self_address
        .as_deref()
        .map(sender_address)
        .is_some_and(|own| !own.is_empty() && own == sender_address(&message.sender))
}

/// Whether the sender's domain belongs to a paying customer.
pub fn is_paid_customer(config: &Config, sender: &str) -> bool {
    let address = sender_address(sender);
    let Some((_, domain)) = address.rsplit_once('@') else {
        return false;
    };

    config.paid_customer_domains.iter().any(|paid| paid.trim().trim_start_matches('@').eq_ignore_ascii_case(domain))
}

/// Read an inbox file: a JSON array of messages.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn load_inbox(path: &Path) -> Res<Vec<RawMessage>> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|err| anyhow::anyhow!("Unable to read inbox `{}`: {err}", path.display()))?;
    let messages: Vec<RawMessage> = serde_json::from_str(&contents)?;

    info!("Loaded {} messages from the inbox.", messages.len());

    Ok(messages)
}

/// Triage a batch of messages, one task per message.
///
/// Messages from our own mailbox, and messages that were already replied to, are
/// skipped.  Messages without an id are triaged but not stored.  Failures are logged and drop only the affected message.  Results
/// come back in inbox order.
#[instrument(skip_all, fields(count = messages.len()))]
pub async fn handle_inbound_batch(messages: Vec<RawMessage>, runtime: &Runtime) -> Vec<(RawMessage, TriageOutcome)> {
    let handles = messages
        .into_iter()
        .map(|message| {
            let runtime = runtime.clone();
            tokio::spawn(async move { handle_inbound_internal(message, &runtime).await }.in_current_span())
        })
        .collect::<Vec<_>>();

    let mut results = Vec::new();

    for joined in join_all(handles).await {
        match joined {
            Ok(Ok(Some(result))) => results.push(result),
            Ok(Ok(None)) => {}
            Ok(Err(err)) => error!("Error while handling message: {err}"),
            Err(err) => error!("Message task failed: {err}"),
        }
    }

    info!("Triaged {} messages.", results.len());

    results
}

#[instrument(skip_all, fields(message_id = %message.id))]
async fn handle_inbound_internal(message: RawMessage, runtime: &Runtime) -> Res<Option<(RawMessage, TriageOutcome)>> {
    if is_self_message(&runtime.config, &message) {
        info!("Skipping message sent from our own address.");
        return Ok(None);
    }

    let has_id = !message.id.is_empty();

    if has_id && runtime.db.is_replied(&message.id).await? {
        info!("Skipping message that was already replied to.");
        return Ok(None);
    }

    let is_paid = is_paid_customer(&runtime.config, &message.sender);
    let outcome = runtime.engine.process(&message, is_paid).await;

    // Tickets are keyed by message id.
    if has_id {
        runtime.db.save_ticket(&TicketRecord::new(&message, &outcome)).await?;
    } else {
        warn!("Message has no id; triaged but not stored.");
    }

    Ok(Some((message, outcome)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::base::config::ConfigInner;

    fn config() -> Config {
        Config {
            inner: Arc::new(ConfigInner {
                self_address: Some("Support <support@acme.io>".to_string()),
                paid_customer_domains: vec!["bigcorp.com".to_string(), "@paying.org".to_string()],
                ..Default::default()
            }),
        }
    }

    fn from(sender: &str) -> RawMessage {
        RawMessage {
            id: "m1".to_string(),
            sender: sender.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_sender_address() {
        assert_eq!(sender_address("Jo Smith <Jo@Example.com>"), "jo@example.com");
        assert_eq!(sender_address("  jo@example.com "), "jo@example.com");
        assert_eq!(sender_address(""), "");
    }

    #[test]
    fn test_is_self_message() {
        let config = config();

        assert!(is_self_message(&config, &from("support@ACME.io")));
        assert!(!is_self_message(&config, &from("customer@acme.io")));
        assert!(!is_self_message(&Config::default(), &from("support@acme.io")));
    }

    #[test]
    fn test_is_paid_customer() {
        let config = config();

        assert!(is_paid_customer(&config, "Ann <ann@BigCorp.com>"));
        assert!(is_paid_customer(&config, "bob@paying.org"));
        assert!(!is_paid_customer(&config, "eve@bigcorp.com.evil"));
        assert!(!is_paid_customer(&config, "not an address"));
    }

    #[tokio::test]
    async fn test_load_inbox() {
        let path = std::env::temp_dir().join(format!("support-triage-inbox-{}.json", std::process::id()));
        tokio::fs::write(&path, r#"[{"id": "a1", "sender": "x@y.com", "subject": "Hi", "body": "Help", "date": "2025-01-01"}]"#).await.unwrap();

        let messages = load_inbox(&path).await.unwrap();
        let _ = tokio::fs::remove_file(&path).await;

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].timestamp, "2025-01-01");
    }

    #[tokio::test]
    async fn test_load_inbox_missing_file_errors() {
        assert!(load_inbox(Path::new("/definitely/not/an/inbox.json")).await.is_err());
    }
}
