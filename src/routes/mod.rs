use axum::routing::{get, post};
use axum::Router;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{
    assign_ticket_owner, download_ticket, health_check, send_ticket_by_email, show_ticket,
    ticket_code_image, AppState,
};

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/event/:event_name/reservation/:reservation_id/:ticket_identifier",
            get(show_ticket).post(assign_ticket_owner),
        )
        .route(
            "/event/:event_name/reservation/:reservation_id/:ticket_identifier/send-ticket-by-email",
            post(send_ticket_by_email),
        )
        .route(
            "/event/:event_name/reservation/:reservation_id/:ticket_identifier/download-ticket",
            get(download_ticket),
        )
        .route(
            "/event/:event_name/reservation/:reservation_id/:ticket_identifier/code.png",
            get(ticket_code_image),
        )
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .with_state(state)
}
