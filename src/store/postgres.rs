//! sqlx/Postgres-backed entity store.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Event, Reservation, Ticket, TicketCategory};
use crate::utils::error::{AppError, MissingEntity};

use super::EntityStore;

#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore for PgEntityStore {
    async fn find_event_by_name(&self, short_name: &str) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, short_name, display_name, location, starts_at, ends_at, secret, \
             created_at, updated_at FROM events WHERE short_name = $1",
        )
        .bind(short_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn find_reservation(
        &self,
        reservation_id: &str,
    ) -> Result<Option<Reservation>, AppError> {
        let Ok(id) = Uuid::parse_str(reservation_id) else {
            return Ok(None);
        };

        let reservation = sqlx::query_as::<_, Reservation>(
            "SELECT id, status, created_at, updated_at FROM reservations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reservation)
    }

    async fn find_ticket(&self, ticket_identifier: &str) -> Result<Option<Ticket>, AppError> {
        let Ok(id) = Uuid::parse_str(ticket_identifier) else {
            return Ok(None);
        };

        let ticket = sqlx::query_as::<_, Ticket>(
            "SELECT id, reservation_id, category_id, full_name, email, assigned, \
             created_at, updated_at FROM tickets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ticket)
    }

    async fn find_category(&self, category_id: Uuid) -> Result<Option<TicketCategory>, AppError> {
        let category = sqlx::query_as::<_, TicketCategory>(
            "SELECT id, event_id, name, description, price, created_at, updated_at \
             FROM ticket_categories WHERE id = $1",
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn update_ticket_owner(
        &self,
        ticket_identifier: &str,
        email: &str,
        full_name: &str,
    ) -> Result<(), AppError> {
        let id = Uuid::parse_str(ticket_identifier).map_err(|_| {
            AppError::NotFound(MissingEntity::Ticket(ticket_identifier.to_string()))
        })?;

        let result = sqlx::query(
            "UPDATE tickets SET email = $2, full_name = $3, assigned = TRUE, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(email)
        .bind(full_name)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(MissingEntity::Ticket(
                ticket_identifier.to_string(),
            )));
        }

        Ok(())
    }
}
