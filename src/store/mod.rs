//! Entity resolution collaborator.
//!
//! Stores resolve public identifiers to entities; absence is expressed as
//! `None`, never as an error. Deciding that a missing entity fails the
//! request belongs to the fulfillment pipeline.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Event, Reservation, Ticket, TicketCategory};
use crate::utils::error::AppError;

pub use memory::InMemoryEntityStore;
pub use postgres::PgEntityStore;

/// The fully resolved entity triple (plus the ticket's category) a
/// fulfillment request operates on.
#[derive(Debug, Clone)]
pub struct ResolvedTicket {
    pub event: Event,
    pub reservation: Reservation,
    pub ticket: Ticket,
    pub category: TicketCategory,
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Look up an event by its public short name.
    async fn find_event_by_name(&self, short_name: &str) -> Result<Option<Event>, AppError>;

    /// Look up a reservation by its public identifier. Malformed identifiers
    /// are treated as absent.
    async fn find_reservation(&self, reservation_id: &str) -> Result<Option<Reservation>, AppError>;

    /// Look up a ticket by its public identifier. Malformed identifiers are
    /// treated as absent.
    async fn find_ticket(&self, ticket_identifier: &str) -> Result<Option<Ticket>, AppError>;

    async fn find_category(&self, category_id: Uuid) -> Result<Option<TicketCategory>, AppError>;

    /// Attach a holder to a ticket and mark it assigned.
    async fn update_ticket_owner(
        &self,
        ticket_identifier: &str,
        email: &str,
        full_name: &str,
    ) -> Result<(), AppError>;
}
