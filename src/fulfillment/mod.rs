//! Ticket fulfillment pipeline.
//!
//! Every operation runs the same spine: resolve the (event, reservation,
//! ticket) key triple, check the issuance guard, and only then render or
//! deliver. Resolution fails closed; no partial work happens once a lookup
//! misses.

pub mod code;
pub mod guard;
pub mod render;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::i18n::{Locale, Localizer};
use crate::mail::{Attachment, MailDispatcher};
use crate::store::{EntityStore, ResolvedTicket};
use crate::utils::error::{AppError, MissingEntity};

pub use render::{Artifact, ArtifactRenderer};

/// The public identifier triple every fulfillment request is keyed by.
#[derive(Debug, Clone)]
pub struct TicketKey {
    pub event_name: String,
    pub reservation_id: String,
    pub ticket_identifier: String,
}

/// Validated holder identity, constructed at the boundary before it reaches
/// the pipeline. Construction is the only way in, so an instance is always
/// well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerAssignment {
    full_name: String,
    email: String,
}

const MAX_FIELD_LEN: usize = 255;

impl OwnerAssignment {
    pub fn new(full_name: &str, email: &str) -> Result<Self, AppError> {
        let full_name = full_name.trim();
        let email = email.trim();

        if full_name.is_empty() {
            return Err(AppError::ValidationError("full name is required".into()));
        }
        if full_name.len() > MAX_FIELD_LEN {
            return Err(AppError::ValidationError(format!(
                "full name must be at most {MAX_FIELD_LEN} characters"
            )));
        }
        if email.is_empty() || email.len() > MAX_FIELD_LEN || !plausible_email(email) {
            return Err(AppError::ValidationError(
                "a valid email address is required".into(),
            ));
        }

        Ok(Self {
            full_name: full_name.to_string(),
            email: email.to_string(),
        })
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

fn plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.contains(char::is_whitespace)
        && !domain.contains('@')
}

/// Structured ticket data for on-screen display. Carries no artifact and no
/// key material.
#[derive(Debug, Clone, Serialize)]
pub struct TicketView {
    pub ticket_identifier: String,
    pub holder_full_name: Option<String>,
    pub holder_email: Option<String>,
    pub event_name: String,
    pub event_title: String,
    pub event_location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub category_name: String,
    pub category_price: Decimal,
}

/// Orchestrates fetch → guard → render → deliver across the delivery
/// channels. Stateless per request; collaborators are shared behind `Arc`.
pub struct FulfillmentService {
    store: Arc<dyn EntityStore>,
    renderer: Arc<dyn ArtifactRenderer>,
    mailer: Arc<dyn MailDispatcher>,
    localizer: Arc<dyn Localizer>,
}

impl FulfillmentService {
    pub fn new(
        store: Arc<dyn EntityStore>,
        renderer: Arc<dyn ArtifactRenderer>,
        mailer: Arc<dyn MailDispatcher>,
        localizer: Arc<dyn Localizer>,
    ) -> Self {
        Self {
            store,
            renderer,
            mailer,
            localizer,
        }
    }

    /// Resolve the key triple plus the ticket's category. All lookups must
    /// succeed, and the entities must actually belong together, before any
    /// precondition or rendering logic runs.
    async fn resolve(&self, key: &TicketKey) -> Result<ResolvedTicket, AppError> {
        let event = self
            .store
            .find_event_by_name(&key.event_name)
            .await?
            .ok_or_else(|| AppError::NotFound(MissingEntity::Event(key.event_name.clone())))?;

        let reservation = self
            .store
            .find_reservation(&key.reservation_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(MissingEntity::Reservation(key.reservation_id.clone()))
            })?;

        let ticket = self
            .store
            .find_ticket(&key.ticket_identifier)
            .await?
            .filter(|t| t.reservation_id == reservation.id)
            .ok_or_else(|| {
                AppError::NotFound(MissingEntity::Ticket(key.ticket_identifier.clone()))
            })?;

        let category = self
            .store
            .find_category(ticket.category_id)
            .await?
            .filter(|c| c.event_id == event.id)
            .ok_or_else(|| {
                AppError::NotFound(MissingEntity::Category(ticket.category_id.to_string()))
            })?;

        Ok(ResolvedTicket {
            event,
            reservation,
            ticket,
            category,
        })
    }

    /// Resolve and validate, returning display data. No artifact is rendered.
    pub async fn view_ticket(&self, key: &TicketKey) -> Result<TicketView, AppError> {
        let resolved = self.resolve(key).await?;
        guard::check_issuable(&resolved.reservation, &resolved.ticket)?;

        Ok(TicketView {
            ticket_identifier: resolved.ticket.identifier(),
            holder_full_name: resolved.ticket.full_name,
            holder_email: resolved.ticket.email,
            event_name: resolved.event.short_name,
            event_title: resolved.event.display_name,
            event_location: resolved.event.location,
            starts_at: resolved.event.starts_at,
            ends_at: resolved.event.ends_at,
            category_name: resolved.category.name,
            category_price: resolved.category.price,
        })
    }

    /// Full pipeline, returning the PDF artifact for streaming.
    pub async fn download_artifact(
        &self,
        key: &TicketKey,
        locale: Locale,
    ) -> Result<Artifact, AppError> {
        let resolved = self.resolve(key).await?;
        guard::check_issuable(&resolved.reservation, &resolved.ticket)?;

        self.renderer
            .render(&resolved.event, &resolved.category, &resolved.ticket, locale)
    }

    /// Serve the scannable symbol on its own, PNG-encoded, for clients
    /// that want the code without the full document.
    pub async fn verification_symbol(&self, key: &TicketKey) -> Result<Vec<u8>, AppError> {
        let resolved = self.resolve(key).await?;
        guard::check_issuable(&resolved.reservation, &resolved.ticket)?;

        let code = code::derive_code(&resolved.ticket.identifier(), &resolved.event.secret)?;
        render::symbol::encode(&code)?.to_png()
    }

    /// Full pipeline, then hand the artifact to the mail collaborator
    /// addressed to the assignee.
    pub async fn email_artifact(&self, key: &TicketKey, locale: Locale) -> Result<(), AppError> {
        let resolved = self.resolve(key).await?;
        guard::check_issuable(&resolved.reservation, &resolved.ticket)?;

        // The guard admits only assigned tickets; an assigned ticket without
        // an email is a broken invariant, treated as unassigned.
        let recipient = resolved
            .ticket
            .email
            .clone()
            .ok_or(AppError::TicketNotAssigned)?;

        let artifact =
            self.renderer
                .render(&resolved.event, &resolved.category, &resolved.ticket, locale)?;

        let subject = self.localizer.message(locale, "mail.subject");
        let body = self.localizer.message(locale, "mail.body");
        let html_body = format!("<html><body><p>{body}</p></body></html>");

        self.mailer
            .send(
                &recipient,
                &subject,
                &body,
                Some(&html_body),
                Attachment {
                    filename: artifact.filename.clone(),
                    content_type: artifact.content_type.to_string(),
                    bytes: artifact.bytes,
                },
            )
            .await
    }

    /// Attach a holder to the ticket and notify them with the rendered
    /// artifact. The assignment must be validated by the caller's boundary
    /// (see [`OwnerAssignment`]).
    pub async fn assign_owner(
        &self,
        key: &TicketKey,
        assignment: OwnerAssignment,
        locale: Locale,
    ) -> Result<(), AppError> {
        // Resolve first so an unknown key cannot mutate anything.
        self.resolve(key).await?;

        self.store
            .update_ticket_owner(
                &key.ticket_identifier,
                assignment.email(),
                assignment.full_name(),
            )
            .await?;

        tracing::info!(
            ticket = %key.ticket_identifier,
            "Ticket assigned, sending notification"
        );

        self.email_artifact(key, locale).await
    }
}
