use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketCategory {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    /// Public identifier, safe to expose in URLs and verification codes.
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub category_id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    /// True only once a holder name and email are attached.
    pub assigned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Public identifier as it appears in URLs, filenames and codes.
    pub fn identifier(&self) -> String {
        self.id.to_string()
    }
}
