//! PDF layout for ticket artifacts.
//!
//! Single A4 page: event and holder details at the top, the verification
//! symbol below. Creation and modification dates are pinned, XMP metadata is
//! disabled, and the trailer `/ID` (which the layout engine otherwise
//! freshens on every save) is rewritten from a digest of the rendered
//! content, so the same inputs always produce the same bytes, whichever
//! delivery channel asked for them.

use std::sync::Arc;

use printpdf::image_crate::{DynamicImage, GrayImage};
use printpdf::lopdf::{Document, Object, StringFormat};
use printpdf::{
    BuiltinFont, CustomPdfConformance, Image, ImageTransform, Mm, PdfConformance, PdfDocument,
};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use crate::i18n::{Locale, Localizer};
use crate::models::{Event, Ticket, TicketCategory};
use crate::utils::error::AppError;

use super::{Artifact, ArtifactRenderer, LocalizedModel, RenderModel};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
/// Printed size of the verification symbol.
const SYMBOL_MM: f32 = 60.0;

// Character budgets for the fixed-position text slots; longer values are
// clipped so they cannot run off the page edge.
const MAX_TITLE_CHARS: usize = 42;
const MAX_SUBTITLE_CHARS: usize = 56;
const MAX_VALUE_CHARS: usize = 64;
const MAX_NOTICE_CHARS: usize = 100;

pub struct PdfTicketRenderer {
    localizer: Arc<dyn Localizer>,
}

impl PdfTicketRenderer {
    pub fn new(localizer: Arc<dyn Localizer>) -> Self {
        Self { localizer }
    }

    fn layout(&self, model: &LocalizedModel) -> Result<Vec<u8>, AppError> {
        let rendering =
            |e: &dyn std::fmt::Display| AppError::RenderingFailed(e.to_string());

        let (doc, page, layer) = PdfDocument::new(
            clip(&model.title, MAX_TITLE_CHARS),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "ticket",
        );
        let doc = doc
            .with_creation_date(OffsetDateTime::UNIX_EPOCH)
            .with_mod_date(OffsetDateTime::UNIX_EPOCH)
            .with_conformance(PdfConformance::Custom(CustomPdfConformance {
                requires_icc_profile: false,
                requires_xmp_metadata: false,
                ..Default::default()
            }));

        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| rendering(&e))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| rendering(&e))?;

        let layer = doc.get_page(page).get_layer(layer);
        let content = &model.content;

        layer.use_text(clip(&model.title, MAX_TITLE_CHARS), 22.0, Mm(20.0), Mm(268.0), &bold);
        layer.use_text(
            clip(&content.event_title, MAX_SUBTITLE_CHARS),
            16.0,
            Mm(20.0),
            Mm(252.0),
            &bold,
        );

        let rows = [
            (&model.when_label, &content.event_schedule),
            (&model.where_label, &content.event_location),
            (&model.holder_label, &content.holder_name),
            (&model.category_label, &content.category_name),
            (&model.identifier_label, &content.ticket_identifier),
        ];
        let mut y = 238.0;
        for (label, value) in rows {
            layer.use_text(clip(label, MAX_VALUE_CHARS), 11.0, Mm(20.0), Mm(y), &bold);
            layer.use_text(clip(value, MAX_VALUE_CHARS), 11.0, Mm(58.0), Mm(y), &regular);
            y -= 8.0;
        }

        let side = content.symbol.side;
        let raster = GrayImage::from_raw(side, side, content.symbol.pixels.clone())
            .ok_or_else(|| AppError::RenderingFailed("symbol raster has bad dimensions".into()))?;
        let image = Image::from_dynamic_image(&DynamicImage::ImageLuma8(raster));
        // dpi chosen so `side` pixels print as SYMBOL_MM millimeters.
        let dpi = side as f32 * 25.4 / SYMBOL_MM;
        image.add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(20.0)),
                translate_y: Some(Mm(130.0)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );

        layer.use_text(&content.verification_code, 6.0, Mm(20.0), Mm(124.0), &regular);
        layer.use_text(
            clip(&model.scan_notice, MAX_NOTICE_CHARS),
            9.0,
            Mm(20.0),
            Mm(112.0),
            &regular,
        );

        let bytes = doc.save_to_bytes().map_err(|e| rendering(&e))?;
        pin_trailer_id(&bytes, model)
    }
}

/// Truncate to a character budget, marking the cut with an ellipsis.
fn clip(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut clipped: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}

/// The layout engine stamps a fresh random `/ID` pair into the trailer on
/// every save. Rewrite both entries from a digest of the rendered content so
/// re-rendering the same state yields byte-identical output.
fn pin_trailer_id(bytes: &[u8], model: &LocalizedModel) -> Result<Vec<u8>, AppError> {
    let rendering = |e: &dyn std::fmt::Display| AppError::RenderingFailed(e.to_string());

    let mut inner = Document::load_mem(bytes).map_err(|e| rendering(&e))?;

    let mut hasher = Sha256::new();
    hasher.update(model.content.verification_code.as_bytes());
    hasher.update(model.title.as_bytes());
    hasher.update(model.content.event_schedule.as_bytes());
    hasher.update(model.content.holder_name.as_bytes());
    let digest = hasher.finalize();
    let id = digest[..16].to_vec();

    inner.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(id.clone(), StringFormat::Hexadecimal),
            Object::String(id, StringFormat::Hexadecimal),
        ]),
    );

    let mut out = Vec::new();
    inner.save_to(&mut out).map_err(|e| rendering(&e))?;
    Ok(out)
}

impl ArtifactRenderer for PdfTicketRenderer {
    fn render(
        &self,
        event: &Event,
        category: &TicketCategory,
        ticket: &Ticket,
        locale: Locale,
    ) -> Result<Artifact, AppError> {
        let model = RenderModel::compose(event, category, ticket)?
            .localize(self.localizer.as_ref(), locale);
        let bytes = self.layout(&model)?;

        Ok(Artifact {
            filename: format!("ticket-{}.pdf", model.content.ticket_identifier),
            content_type: "application/pdf",
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::MessageCatalog;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn renderer() -> PdfTicketRenderer {
        PdfTicketRenderer::new(Arc::new(MessageCatalog::new()))
    }

    fn fixtures() -> (Event, TicketCategory, Ticket) {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 18, 30, 0).unwrap();
        let event = Event {
            id: Uuid::new_v4(),
            short_name: "rustfest".into(),
            display_name: "RustFest".into(),
            location: "Turin".into(),
            starts_at: now,
            ends_at: Some(now + chrono::Duration::hours(6)),
            secret: b"s3cr3t".to_vec(),
            created_at: now,
            updated_at: now,
        };
        let category = TicketCategory {
            id: Uuid::new_v4(),
            event_id: event.id,
            name: "Standard".into(),
            description: None,
            price: Decimal::new(4500, 2),
            created_at: now,
            updated_at: now,
        };
        let ticket = Ticket {
            id: Uuid::new_v4(),
            reservation_id: Uuid::new_v4(),
            category_id: category.id,
            full_name: Some("Alice A".into()),
            email: Some("alice@example.com".into()),
            assigned: true,
            created_at: now,
            updated_at: now,
        };
        (event, category, ticket)
    }

    #[test]
    fn renders_a_nonempty_pdf() {
        let (event, category, ticket) = fixtures();
        let artifact = renderer()
            .render(&event, &category, &ticket, Locale::En)
            .unwrap();

        assert!(artifact.bytes.starts_with(b"%PDF"));
        assert!(artifact.bytes.len() > 1_000);
        assert_eq!(artifact.content_type, "application/pdf");
        assert_eq!(artifact.filename, format!("ticket-{}.pdf", ticket.id));
    }

    #[test]
    fn repeated_renders_are_byte_identical() {
        let (event, category, ticket) = fixtures();
        let renderer = renderer();

        let first = renderer
            .render(&event, &category, &ticket, Locale::En)
            .unwrap();
        let second = renderer
            .render(&event, &category, &ticket, Locale::En)
            .unwrap();

        assert_eq!(first.bytes, second.bytes);
    }

    #[test]
    fn distinct_tickets_render_distinct_bytes() {
        let (event, category, ticket) = fixtures();
        let mut other = ticket.clone();
        other.id = Uuid::new_v4();

        let renderer = renderer();
        let a = renderer.render(&event, &category, &ticket, Locale::En).unwrap();
        let b = renderer.render(&event, &category, &other, Locale::En).unwrap();
        assert_ne!(a.bytes, b.bytes);
    }

    #[test]
    fn overlong_fields_stay_on_the_page() {
        let (mut event, category, ticket) = fixtures();
        event.display_name = "Exceedingly ".repeat(40);
        event.location = "Far away ".repeat(60);

        let artifact = renderer()
            .render(&event, &category, &ticket, Locale::En)
            .unwrap();
        assert!(artifact.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn clip_preserves_short_values_and_ellipsizes_long_ones() {
        assert_eq!(clip("short", 10), "short");

        let clipped = clip(&"x".repeat(100), 10);
        assert_eq!(clipped.chars().count(), 10);
        assert!(clipped.ends_with('…'));
    }

    #[test]
    fn missing_key_material_yields_no_bytes() {
        let (mut event, category, ticket) = fixtures();
        event.secret.clear();
        let err = renderer()
            .render(&event, &category, &ticket, Locale::En)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidKeyMaterial(_)));
    }
}
