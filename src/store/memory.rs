//! In-memory entity store backed by mutex-guarded maps. Used by the test
//! suite and handy for demos without a database.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Event, Reservation, Ticket, TicketCategory};
use crate::utils::error::{AppError, MissingEntity};

use super::EntityStore;

#[derive(Default)]
struct Tables {
    events: HashMap<String, Event>,
    reservations: HashMap<Uuid, Reservation>,
    tickets: HashMap<Uuid, Ticket>,
    categories: HashMap<Uuid, TicketCategory>,
}

#[derive(Default)]
pub struct InMemoryEntityStore {
    tables: Mutex<Tables>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_event(&self, event: Event) {
        let mut tables = self.tables.lock().expect("store lock poisoned");
        tables.events.insert(event.short_name.clone(), event);
    }

    pub fn insert_reservation(&self, reservation: Reservation) {
        let mut tables = self.tables.lock().expect("store lock poisoned");
        tables.reservations.insert(reservation.id, reservation);
    }

    pub fn insert_ticket(&self, ticket: Ticket) {
        let mut tables = self.tables.lock().expect("store lock poisoned");
        tables.tickets.insert(ticket.id, ticket);
    }

    pub fn insert_category(&self, category: TicketCategory) {
        let mut tables = self.tables.lock().expect("store lock poisoned");
        tables.categories.insert(category.id, category);
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn find_event_by_name(&self, short_name: &str) -> Result<Option<Event>, AppError> {
        let tables = self.tables.lock().expect("store lock poisoned");
        Ok(tables.events.get(short_name).cloned())
    }

    async fn find_reservation(
        &self,
        reservation_id: &str,
    ) -> Result<Option<Reservation>, AppError> {
        let Ok(id) = Uuid::parse_str(reservation_id) else {
            return Ok(None);
        };
        let tables = self.tables.lock().expect("store lock poisoned");
        Ok(tables.reservations.get(&id).cloned())
    }

    async fn find_ticket(&self, ticket_identifier: &str) -> Result<Option<Ticket>, AppError> {
        let Ok(id) = Uuid::parse_str(ticket_identifier) else {
            return Ok(None);
        };
        let tables = self.tables.lock().expect("store lock poisoned");
        Ok(tables.tickets.get(&id).cloned())
    }

    async fn find_category(&self, category_id: Uuid) -> Result<Option<TicketCategory>, AppError> {
        let tables = self.tables.lock().expect("store lock poisoned");
        Ok(tables.categories.get(&category_id).cloned())
    }

    async fn update_ticket_owner(
        &self,
        ticket_identifier: &str,
        email: &str,
        full_name: &str,
    ) -> Result<(), AppError> {
        let Ok(id) = Uuid::parse_str(ticket_identifier) else {
            return Err(AppError::NotFound(MissingEntity::Ticket(
                ticket_identifier.to_string(),
            )));
        };

        let mut tables = self.tables.lock().expect("store lock poisoned");
        let ticket = tables.tickets.get_mut(&id).ok_or_else(|| {
            AppError::NotFound(MissingEntity::Ticket(ticket_identifier.to_string()))
        })?;

        ticket.email = Some(email.to_string());
        ticket.full_name = Some(full_name.to_string());
        ticket.assigned = true;
        Ok(())
    }
}
