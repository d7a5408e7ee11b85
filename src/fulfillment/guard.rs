//! Issuance precondition. This is the sole gate between ticket state and any
//! artifact or verification code leaving the service.

use crate::models::{Reservation, ReservationStatus, Ticket};
use crate::utils::error::AppError;

/// A ticket artifact may only be produced for a paid, assigned ticket.
/// The reservation check runs first so diagnostics point at payment before
/// assignment; both must hold.
pub fn check_issuable(reservation: &Reservation, ticket: &Ticket) -> Result<(), AppError> {
    if reservation.status != ReservationStatus::Complete {
        return Err(AppError::ReservationNotComplete(reservation.status));
    }
    if !ticket.assigned {
        return Err(AppError::TicketNotAssigned);
    }
    Ok(())
}
