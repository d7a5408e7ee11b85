pub mod event;
pub mod reservation;
pub mod ticket;

pub use event::Event;
pub use reservation::{Reservation, ReservationStatus};
pub use ticket::{Ticket, TicketCategory};
