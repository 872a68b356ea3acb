//! SurrealDB implementation for support-triage ticket storage.

use std::sync::Arc;

use async_trait::async_trait;
use surrealdb::{
    Surreal,
    engine::any::{self, Any},
    opt::auth::Root,
};
use tracing::{info, instrument};

use crate::base::{
    config::Config,
    types::{Res, Void},
};

use super::{DbClient, GenericDbClient, TicketRecord, TicketStatus};

const TICKET_TABLE: &str = "ticket";

// Extra methods on `DbClient` applied by the surreal implementation.

impl DbClient {
    /// Connects to the configured SurrealDB endpoint (`memory` for an in-process store).
    pub async fn surreal(config: &Config) -> Res<Self> {
        let client = SurrealDbClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }

    /// Creates an in-process SurrealDB store.
    pub async fn surreal_memory() -> Res<Self> {
        let client = SurrealDbClient::connect("mem://", None).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

/// SurrealDB client implementation.
#[derive(Clone)]
pub struct SurrealDbClient {
    db: Surreal<Any>,
}

impl SurrealDbClient {
    #[instrument(name = "SurrealDbClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        let endpoint = if config.db_endpoint == "memory" { "mem://" } else { config.db_endpoint.as_str() };
        let credentials = (!config.db_username.is_empty()).then(|| (config.db_username.as_str(), config.db_password.as_str()));

        Self::connect(endpoint, credentials).await
    }

    async fn connect(endpoint: &str, credentials: Option<(&str, &str)>) -> Res<Self> {
        let db = any::connect(endpoint).await?;

        // Authenticate with the database using the provided username and password.
        if let Some((username, password)) = credentials {
            db.signin(Root { username, password }).await?;
        }

        db.use_ns("support").use_db("triage").await?;

        // Define schemas.

        db.query(format!("DEFINE TABLE IF NOT EXISTS {TICKET_TABLE} SCHEMALESS;")).await?.check()?;

        info!("Database initialized successfully.");

        Ok(Self { db })
    }
}

#[async_trait]
impl GenericDbClient for SurrealDbClient {
    #[instrument(skip(self))]
    async fn get_ticket(&self, message_id: &str) -> Res<Option<TicketRecord>> {
        let ticket: Option<TicketRecord> = self.db.select((TICKET_TABLE, message_id.to_string())).await?;

        Ok(ticket)
    }

    #[instrument(skip_all)]
    async fn save_ticket(&self, ticket: &TicketRecord) -> Void {
        let mut ticket = ticket.clone();

        if self.is_replied(&ticket.message_id).await? {
            ticket.status = TicketStatus::Replied;
        }

        let _: Option<TicketRecord> = self.db.upsert((TICKET_TABLE, ticket.message_id.clone())).content(ticket).await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_replied(&self, message_id: &str) -> Void {
        self.db
            .query(format!("UPDATE type::thing('{TICKET_TABLE}', $id) SET status = 'Replied';"))
            .bind(("id", message_id.to_string()))
            .await?
            .check()?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_tickets(&self, limit: usize) -> Res<Vec<TicketRecord>> {
        let mut response = self
            .db
            .query(format!("SELECT * FROM {TICKET_TABLE} ORDER BY priority_score DESC, received_at DESC LIMIT $limit;"))
            .bind(("limit", limit as i64))
            .await?
            .check()?;

        let tickets: Vec<TicketRecord> = response.take(0)?;

        Ok(tickets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::types::{ExtractedSignals, PriorityLabel, Sentiment};

    fn ticket(message_id: &str, score: f64) -> TicketRecord {
        TicketRecord {
            message_id: message_id.to_string(),
            sender: "customer@example.com".to_string(),
            subject: "Help".to_string(),
            body: "Please help.".to_string(),
            received_at: "2025-01-06".to_string(),
            sentiment: Sentiment::Neutral,
            priority_label: PriorityLabel::from_score(score),
            priority_score: score,
            signals: ExtractedSignals::default(),
            summary: "Please help.".to_string(),
            draft: "Thank you for reaching out to us.".to_string(),
            status: TicketStatus::Pending,
            is_frustrated: false,
            processed_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_and_get_ticket() {
        let db = DbClient::surreal_memory().await.unwrap();

        db.save_ticket(&ticket("msg-1", 1.0)).await.unwrap();

        let stored = db.get_ticket("msg-1").await.unwrap().unwrap();
        assert_eq!(stored.message_id, "msg-1");
        assert_eq!(stored.status, TicketStatus::Pending);
        assert!(db.get_ticket("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replied_status_survives_resave() {
        let db = DbClient::surreal_memory().await.unwrap();

        db.save_ticket(&ticket("msg-2", 5.0)).await.unwrap();
        db.mark_replied("msg-2").await.unwrap();
        assert!(db.is_replied("msg-2").await.unwrap());

        db.save_ticket(&ticket("msg-2", 5.0)).await.unwrap();
        assert!(db.is_replied("msg-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_tickets_by_priority() {
        let db = DbClient::surreal_memory().await.unwrap();

        db.save_ticket(&ticket("low", 1.0)).await.unwrap();
        db.save_ticket(&ticket("urgent", 6.5)).await.unwrap();
        db.save_ticket(&ticket("medium", 3.0)).await.unwrap();

        let ids = db.list_tickets(10).await.unwrap().into_iter().map(|t| t.message_id).collect::<Vec<_>>();
        assert_eq!(ids, vec!["urgent", "medium", "low"]);

        assert_eq!(db.list_tickets(1).await.unwrap().len(), 1);
    }
}
