//! Ticket read services.
//!
//! Tickets are already embedded in every cached sight payload, so the
//! standalone ticket reads go straight to the Catalog Store; nothing here
//! touches the cache and nothing needs invalidating.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use sightline_api_types::Envelope;

use crate::application::catalog::{CatalogStore, StoreError};
use crate::application::codec::{self, CodecError};

const TARGET: &str = "sightline::tickets";

#[derive(Debug, Error)]
pub enum TicketReadError {
    #[error("ticket not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode ticket {id}")]
    Encode {
        id: i64,
        #[source]
        source: CodecError,
    },
}

pub struct TicketReadService {
    store: Arc<dyn CatalogStore>,
}

impl TicketReadService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Single ticket by id; 404 when absent.
    pub async fn detail(&self, id: i64) -> Result<Envelope, TicketReadError> {
        let ticket = self
            .store
            .get_ticket(id)
            .await?
            .ok_or(TicketReadError::NotFound)?;
        let value = codec::encode_ticket(&ticket)
            .map_err(|source| TicketReadError::Encode { id, source })?;
        Ok(Envelope::ok(value))
    }

    /// Offset/limit slice over all tickets.
    pub async fn list(&self, skip: u64, limit: u32) -> Result<Envelope, TicketReadError> {
        let tickets = self.store.list_tickets(skip, limit).await?;
        Ok(Envelope::ok(self.encode(&tickets, "list")))
    }

    /// Every ticket of one sight. An unknown sight yields an empty list,
    /// not an error.
    pub async fn by_sight(&self, sight_id: i64) -> Result<Envelope, TicketReadError> {
        let tickets = self.store.tickets_by_sight(sight_id).await?;
        Ok(Envelope::ok(self.encode(&tickets, "by_sight")))
    }

    fn encode(&self, tickets: &[crate::domain::entities::TicketRecord], op: &'static str) -> Value {
        let (encoded, failures) = codec::encode_tickets(tickets);
        for failure in &failures {
            warn!(
                target: TARGET,
                op,
                ticket_id = failure.id,
                error = %failure.error,
                "skipping ticket that failed serialization"
            );
        }
        Value::Array(encoded)
    }
}
