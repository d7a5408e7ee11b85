//! Artifact rendering.
//!
//! Rendering happens in two phases: an immutable [`RenderModel`] is composed
//! from the resolved entities, then localized as a pure transform into a
//! [`LocalizedModel`] that layout consumes. Localization always runs before
//! layout since substituted text changes content size.

pub mod pdf;
pub mod symbol;

use crate::fulfillment::code::derive_code;
use crate::i18n::{Locale, Localizer};
use crate::models::{Event, Ticket, TicketCategory};
use crate::utils::error::AppError;

use symbol::SymbolImage;

/// A rendered, in-memory ticket document. Never persisted; regenerated on
/// every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Renders a ticket into its delivery artifact.
///
/// Implementations must be deterministic over their inputs so every delivery
/// channel hands out the same bytes for the same ticket state and locale.
pub trait ArtifactRenderer: Send + Sync {
    fn render(
        &self,
        event: &Event,
        category: &TicketCategory,
        ticket: &Ticket,
        locale: Locale,
    ) -> Result<Artifact, AppError>;
}

/// Locale-independent snapshot of everything the artifact displays.
#[derive(Debug, Clone)]
pub struct RenderModel {
    pub event_title: String,
    pub event_location: String,
    pub event_schedule: String,
    pub category_name: String,
    pub holder_name: String,
    pub ticket_identifier: String,
    pub verification_code: String,
    pub symbol: SymbolImage,
}

impl RenderModel {
    /// Derive the verification code, encode its symbol and snapshot the
    /// display fields.
    pub fn compose(
        event: &Event,
        category: &TicketCategory,
        ticket: &Ticket,
    ) -> Result<Self, AppError> {
        let identifier = ticket.identifier();
        let verification_code = derive_code(&identifier, &event.secret)?;
        let symbol = symbol::encode(&verification_code)?;

        let mut schedule = event.starts_at.format("%Y-%m-%d %H:%M UTC").to_string();
        if let Some(ends_at) = event.ends_at {
            schedule.push_str(&format!(" - {}", ends_at.format("%Y-%m-%d %H:%M UTC")));
        }

        Ok(Self {
            event_title: event.display_name.clone(),
            event_location: event.location.clone(),
            event_schedule: schedule,
            category_name: category.name.clone(),
            holder_name: ticket.full_name.clone().unwrap_or_default(),
            ticket_identifier: identifier,
            verification_code,
            symbol,
        })
    }

    /// Resolve every human-readable label for the locale. Consumes the model
    /// and produces a new one; nothing is mutated in place.
    pub fn localize(self, localizer: &dyn Localizer, locale: Locale) -> LocalizedModel {
        LocalizedModel {
            title: localizer.message(locale, "ticket.title"),
            holder_label: localizer.message(locale, "ticket.holder"),
            category_label: localizer.message(locale, "ticket.category"),
            identifier_label: localizer.message(locale, "ticket.identifier"),
            when_label: localizer.message(locale, "event.when"),
            where_label: localizer.message(locale, "event.where"),
            scan_notice: localizer.message(locale, "ticket.scan_notice"),
            content: self,
        }
    }
}

/// Fully localized model, ready for layout.
#[derive(Debug, Clone)]
pub struct LocalizedModel {
    pub title: String,
    pub holder_label: String,
    pub category_label: String,
    pub identifier_label: String,
    pub when_label: String,
    pub where_label: String,
    pub scan_notice: String,
    pub content: RenderModel,
}
