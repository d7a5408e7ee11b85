use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::fulfillment::{FulfillmentService, OwnerAssignment, TicketKey};
use crate::i18n::Locale;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success};

#[derive(Clone)]
pub struct AppState {
    pub fulfillment: Arc<FulfillmentService>,
    pub default_locale: Locale,
}

impl AppState {
    fn locale(&self, headers: &HeaderMap) -> Locale {
        headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::from_tag)
            .unwrap_or(self.default_locale)
    }
}

fn ticket_key(event_name: String, reservation_id: String, ticket_identifier: String) -> TicketKey {
    TicketKey {
        event_name,
        reservation_id,
        ticket_identifier,
    }
}

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "tessera-api",
    };

    success(payload, "Health check successful").into_response()
}

pub async fn show_ticket(
    State(state): State<AppState>,
    Path((event_name, reservation_id, ticket_identifier)): Path<(String, String, String)>,
) -> Result<Response, AppError> {
    let key = ticket_key(event_name, reservation_id, ticket_identifier);
    let view = state.fulfillment.view_ticket(&key).await?;

    Ok(success(view, "Ticket resolved").into_response())
}

#[derive(Deserialize)]
pub struct AssignOwnerRequest {
    pub full_name: String,
    pub email: String,
}

pub async fn assign_ticket_owner(
    State(state): State<AppState>,
    Path((event_name, reservation_id, ticket_identifier)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(request): Json<AssignOwnerRequest>,
) -> Result<Response, AppError> {
    let assignment = OwnerAssignment::new(&request.full_name, &request.email)?;
    let key = ticket_key(event_name, reservation_id, ticket_identifier);
    let locale = state.locale(&headers);

    state.fulfillment.assign_owner(&key, assignment, locale).await?;

    Ok(empty_success("Ticket assigned and sent to the holder").into_response())
}

pub async fn send_ticket_by_email(
    State(state): State<AppState>,
    Path((event_name, reservation_id, ticket_identifier)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let key = ticket_key(event_name, reservation_id, ticket_identifier);
    let locale = state.locale(&headers);

    state.fulfillment.email_artifact(&key, locale).await?;

    Ok(empty_success("Ticket sent by email").into_response())
}

pub async fn ticket_code_image(
    State(state): State<AppState>,
    Path((event_name, reservation_id, ticket_identifier)): Path<(String, String, String)>,
) -> Result<Response, AppError> {
    let key = ticket_key(event_name, reservation_id, ticket_identifier);
    let png = state.fulfillment.verification_symbol(&key).await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "image/png".to_string())],
        png,
    )
        .into_response())
}

pub async fn download_ticket(
    State(state): State<AppState>,
    Path((event_name, reservation_id, ticket_identifier)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let key = ticket_key(event_name, reservation_id, ticket_identifier);
    let locale = state.locale(&headers);

    let artifact = state.fulfillment.download_artifact(&key, locale).await?;

    let disposition = format!("attachment; filename={}", artifact.filename);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response())
}
