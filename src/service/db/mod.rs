use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::base::types::{ExtractedSignals, PriorityLabel, RawMessage, Res, Sentiment, TriageOutcome, Void};

pub mod surreal;

// Traits.

/// Generic database client trait that clients must implement.
///
/// The store is a sink for triage results and the source of truth for which
/// messages already received a reply.
#[async_trait]
pub trait GenericDbClient: Send + Sync + 'static {
    /// Gets a ticket by its message ID.
    async fn get_ticket(&self, message_id: &str) -> Res<Option<TicketRecord>>;

    /// Saves a ticket, inserting or replacing it.
    ///
    /// A ticket that is already `Replied` keeps that status.
    async fn save_ticket(&self, ticket: &TicketRecord) -> Void;

    /// Marks a ticket as replied.
    async fn mark_replied(&self, message_id: &str) -> Void;

    /// Lists tickets by descending priority score, then by descending receive time.
    async fn list_tickets(&self, limit: usize) -> Res<Vec<TicketRecord>>;

    /// Whether a reply was already sent for this message.
    async fn is_replied(&self, message_id: &str) -> Res<bool> {
        Ok(self.get_ticket(message_id).await?.is_some_and(|ticket| ticket.status == TicketStatus::Replied))
    }
}

/// Database client for support-triage.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct DbClient {
    /// The database client instance.
    pub inner: Arc<dyn GenericDbClient>,
}

impl Deref for DbClient {
    type Target = dyn GenericDbClient;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl DbClient {
    pub fn new(inner: Arc<dyn GenericDbClient>) -> Self {
        Self { inner }
    }
}

// Records.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    #[default]
    Pending,
    Replied,
}

/// A triaged message as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub message_id: String,
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub received_at: String,
    pub sentiment: Sentiment,
    pub priority_label: PriorityLabel,
    pub priority_score: f64,
    pub signals: ExtractedSignals,
    pub summary: String,
    pub draft: String,
    pub status: TicketStatus,
    pub is_frustrated: bool,
    pub processed_at: chrono::DateTime<chrono::Utc>,
}

impl TicketRecord {
    /// Builds a pending ticket from a message and its triage outcome.
    pub fn new(message: &RawMessage, outcome: &TriageOutcome) -> Self {
        Self {
            message_id: message.id.clone(),
            sender: message.sender.clone(),
            subject: message.subject.clone(),
            body: message.body.clone(),
            received_at: message.timestamp.clone(),
            sentiment: outcome.sentiment,
            priority_label: outcome.assessment.label,
            priority_score: outcome.assessment.score,
            signals: outcome.signals.clone(),
            summary: outcome.summary.clone(),
            draft: outcome.draft.body.clone(),
            status: TicketStatus::Pending,
            is_frustrated: outcome.signals.is_frustrated(),
            processed_at: chrono::Utc::now(),
        }
    }
}
