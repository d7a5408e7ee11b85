use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::models::ReservationStatus;
use crate::utils::response::error as error_response;

/// Identifies which lookup of the resolution triple came up empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingEntity {
    Event(String),
    Reservation(String),
    Ticket(String),
    Category(String),
}

impl std::fmt::Display for MissingEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingEntity::Event(name) => write!(f, "event '{name}' was not found"),
            MissingEntity::Reservation(id) => write!(f, "reservation '{id}' was not found"),
            MissingEntity::Ticket(id) => write!(f, "ticket '{id}' was not found"),
            MissingEntity::Category(id) => write!(f, "ticket category '{id}' was not found"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(MissingEntity),

    #[error("Reservation is not complete (status: {})", .0.as_str())]
    ReservationNotComplete(ReservationStatus),

    #[error("Ticket is not assigned to a holder")]
    TicketNotAssigned,

    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("Verification symbol encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Artifact rendering failed: {0}")]
    RenderingFailed(String),

    #[error("Mail delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ReservationNotComplete(_) | AppError::TicketNotAssigned => {
                StatusCode::FORBIDDEN
            }
            AppError::InvalidKeyMaterial(_)
            | AppError::EncodingFailed(_)
            | AppError::RenderingFailed(_)
            | AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DeliveryFailed(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ReservationNotComplete(_) => "RESERVATION_NOT_COMPLETE",
            AppError::TicketNotAssigned => "TICKET_NOT_ASSIGNED",
            AppError::InvalidKeyMaterial(_) => "INVALID_KEY_MATERIAL",
            AppError::EncodingFailed(_) => "ENCODING_FAILED",
            AppError::RenderingFailed(_) => "RENDERING_FAILED",
            AppError::DeliveryFailed(_) => "DELIVERY_FAILED",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    fn log(&self) {
        match self {
            // Data-integrity fault: a well-formed event always has a secret.
            AppError::InvalidKeyMaterial(msg) => {
                error!(error = ?self, message = %msg, "Event key material is unusable");
            }
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
            _ => {
                error!(error = ?self, code = self.code(), "Fulfillment request failed");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level messages; key material and database faults
        // stay opaque to the client.
        let public_message = match &self {
            AppError::InvalidKeyMaterial(_) => "Event configuration error".to_string(),
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
            other => other.to_string(),
        };

        error_response(code, public_message, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_errors_map_to_forbidden() {
        let err = AppError::ReservationNotComplete(ReservationStatus::Pending);
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.code(), "RESERVATION_NOT_COMPLETE");

        assert_eq!(AppError::TicketNotAssigned.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn delivery_failure_is_distinct_from_rendering_failure() {
        let delivery = AppError::DeliveryFailed("smtp timeout".into());
        let rendering = AppError::RenderingFailed("layout".into());
        assert_ne!(delivery.code(), rendering.code());
        assert_eq!(delivery.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn missing_entity_names_the_failed_lookup() {
        let err = AppError::NotFound(MissingEntity::Reservation("abc".into()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("reservation 'abc'"));
    }
}
