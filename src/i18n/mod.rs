//! Locale handling and message catalogs for rendered artifacts and mail copy.
//!
//! Localization is a pure transform: callers look up finished strings and
//! substitute them into an immutable model before layout ever runs.

/// Locales with a shipped message catalog. Anything else falls back to
/// English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    It,
}

impl Locale {
    /// Parse a locale from a language tag such as `it`, `it-IT` or the first
    /// entry of an `Accept-Language` header.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .split(',')
            .next()
            .unwrap_or("")
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or("");
        match primary.to_ascii_lowercase().as_str() {
            "it" => Locale::It,
            _ => Locale::En,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::It => "it",
        }
    }
}

/// Resolves message keys to human-readable strings for a locale.
pub trait Localizer: Send + Sync {
    fn message(&self, locale: Locale, key: &str) -> String;
}

/// Built-in catalog covering the ticket artifact and notification mails.
///
/// Unknown keys resolve to the key itself so a missing translation shows up
/// in output instead of failing a render.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageCatalog;

impl MessageCatalog {
    pub fn new() -> Self {
        Self
    }

    fn lookup(locale: Locale, key: &str) -> Option<&'static str> {
        let msg = match (locale, key) {
            (Locale::En, "ticket.title") => "Admission ticket",
            (Locale::En, "ticket.holder") => "Ticket holder",
            (Locale::En, "ticket.category") => "Category",
            (Locale::En, "ticket.identifier") => "Ticket nr.",
            (Locale::En, "event.when") => "When",
            (Locale::En, "event.where") => "Where",
            (Locale::En, "ticket.scan_notice") => {
                "Present this code at the entrance. One admission per ticket."
            }
            (Locale::En, "mail.subject") => "Your ticket",
            (Locale::En, "mail.body") => "Please find your ticket attached.",

            (Locale::It, "ticket.title") => "Biglietto d'ingresso",
            (Locale::It, "ticket.holder") => "Intestatario",
            (Locale::It, "ticket.category") => "Categoria",
            (Locale::It, "ticket.identifier") => "Biglietto n.",
            (Locale::It, "event.when") => "Quando",
            (Locale::It, "event.where") => "Dove",
            (Locale::It, "ticket.scan_notice") => {
                "Presenta questo codice all'ingresso. Un ingresso per biglietto."
            }
            (Locale::It, "mail.subject") => "Il tuo biglietto",
            (Locale::It, "mail.body") => "In allegato trovi il tuo biglietto.",

            _ => return None,
        };
        Some(msg)
    }
}

impl Localizer for MessageCatalog {
    fn message(&self, locale: Locale, key: &str) -> String {
        Self::lookup(locale, key)
            .or_else(|| Self::lookup(Locale::En, key))
            .map(str::to_owned)
            .unwrap_or_else(|| key.to_owned())
    }
}
