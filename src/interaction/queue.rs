//! Ticket queue operations.
//!
//! Review the stored queue and record that a reply went out, so a later inbox
//! run skips the message.

use tracing::{info, instrument};

use crate::{
    base::types::{Res, Void},
    service::db::{DbClient, TicketRecord, TicketStatus},
};

/// Stored tickets, highest priority first.
#[instrument(skip(db))]
pub async fn list_queue(db: &DbClient, limit: usize) -> Res<Vec<TicketRecord>> {
    let tickets = db.list_tickets(limit).await?;

    info!("Listed {} tickets.", tickets.len());

    Ok(tickets)
}

/// Mark the ticket for `message_id` as replied.
///
/// Fails when no such ticket is stored.
#[instrument(skip(db))]
pub async fn mark_replied(db: &DbClient, message_id: &str) -> Void {
    let Some(ticket) = db.get_ticket(message_id).await? else {
        return Err(anyhow::anyhow!("No ticket `{message_id}` in the store."));
    };

    if ticket.status == TicketStatus::Replied {
        info!("Ticket was already marked as replied.");
        return Ok(());
    }

    db.mark_replied(message_id).await?;

    info!("Ticket marked as replied.");

    Ok(())
}
