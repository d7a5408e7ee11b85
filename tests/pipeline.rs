//! End-to-end fulfillment pipeline tests over the in-memory store, a
//! recording mail dispatcher and (where byte equality matters) a
//! deterministic stub renderer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use tessera_server::fulfillment::code::derive_code;
use tessera_server::fulfillment::render::pdf::PdfTicketRenderer;
use tessera_server::fulfillment::{Artifact, ArtifactRenderer, FulfillmentService, OwnerAssignment, TicketKey};
use tessera_server::i18n::{Locale, Localizer, MessageCatalog};
use tessera_server::mail::{Attachment, MailDispatcher};
use tessera_server::models::{Event, Reservation, ReservationStatus, Ticket, TicketCategory};
use tessera_server::store::{EntityStore, InMemoryEntityStore};
use tessera_server::utils::error::{AppError, MissingEntity};

#[derive(Debug, Clone)]
struct SentMail {
    to: String,
    subject: String,
    attachment: Attachment,
}

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    fail: bool,
}

impl RecordingMailer {
    fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailDispatcher for RecordingMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        _text_body: &str,
        _html_body: Option<&str>,
        attachment: Attachment,
    ) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::DeliveryFailed("transport down".into()));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            attachment,
        });
        Ok(())
    }
}

/// Deterministic renderer: the artifact embeds the derived verification code
/// so tests can assert what ended up inside without parsing a PDF.
#[derive(Default)]
struct StubRenderer {
    renders: AtomicUsize,
}

impl ArtifactRenderer for StubRenderer {
    fn render(
        &self,
        event: &Event,
        category: &TicketCategory,
        ticket: &Ticket,
        locale: Locale,
    ) -> Result<Artifact, AppError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        let code = derive_code(&ticket.identifier(), &event.secret)?;
        let body = format!(
            "{}|{}|{}|{}",
            event.short_name,
            category.name,
            code,
            locale.as_tag()
        );
        Ok(Artifact {
            filename: format!("ticket-{}.pdf", ticket.identifier()),
            content_type: "application/pdf",
            bytes: body.into_bytes(),
        })
    }
}

struct Fixture {
    store: Arc<InMemoryEntityStore>,
    mailer: Arc<RecordingMailer>,
    renderer: Arc<StubRenderer>,
    service: FulfillmentService,
    key: TicketKey,
    ticket_id: Uuid,
}

fn fixture(status: ReservationStatus, assigned: bool) -> Fixture {
    fixture_with_mailer(status, assigned, Arc::new(RecordingMailer::default()))
}

fn fixture_with_mailer(
    status: ReservationStatus,
    assigned: bool,
    mailer: Arc<RecordingMailer>,
) -> Fixture {
    let now = Utc.with_ymd_and_hms(2026, 5, 1, 18, 30, 0).unwrap();
    let event_id = Uuid::new_v4();
    let reservation_id = Uuid::new_v4();
    let category_id = Uuid::new_v4();
    let ticket_id = Uuid::new_v4();

    let store = Arc::new(InMemoryEntityStore::new());
    store.insert_event(Event {
        id: event_id,
        short_name: "rustfest".into(),
        display_name: "RustFest".into(),
        location: "Turin".into(),
        starts_at: now,
        ends_at: None,
        secret: b"s3cr3t".to_vec(),
        created_at: now,
        updated_at: now,
    });
    store.insert_reservation(Reservation {
        id: reservation_id,
        status,
        created_at: now,
        updated_at: now,
    });
    store.insert_category(TicketCategory {
        id: category_id,
        event_id,
        name: "Standard".into(),
        description: None,
        price: Decimal::new(4500, 2),
        created_at: now,
        updated_at: now,
    });
    store.insert_ticket(Ticket {
        id: ticket_id,
        reservation_id,
        category_id,
        full_name: assigned.then(|| "Alice A".to_string()),
        email: assigned.then(|| "alice@example.com".to_string()),
        assigned,
        created_at: now,
        updated_at: now,
    });

    let renderer = Arc::new(StubRenderer::default());
    let service = FulfillmentService::new(
        store.clone(),
        renderer.clone(),
        mailer.clone(),
        Arc::new(MessageCatalog::new()),
    );

    Fixture {
        store,
        mailer,
        renderer,
        service,
        key: TicketKey {
            event_name: "rustfest".into(),
            reservation_id: reservation_id.to_string(),
            ticket_identifier: ticket_id.to_string(),
        },
        ticket_id,
    }
}

#[tokio::test]
async fn download_embeds_the_derived_verification_code() {
    let fx = fixture(ReservationStatus::Complete, true);
    let artifact = fx
        .service
        .download_artifact(&fx.key, Locale::En)
        .await
        .unwrap();

    assert!(!artifact.bytes.is_empty());
    assert_eq!(artifact.filename, format!("ticket-{}.pdf", fx.ticket_id));

    let expected_code = derive_code(&fx.ticket_id.to_string(), b"s3cr3t").unwrap();
    let body = String::from_utf8(artifact.bytes).unwrap();
    assert!(body.contains(&expected_code));
}

#[tokio::test]
async fn download_through_the_real_pdf_renderer() {
    let fx = fixture(ReservationStatus::Complete, true);
    let localizer: Arc<dyn Localizer> = Arc::new(MessageCatalog::new());
    let service = FulfillmentService::new(
        fx.store.clone(),
        Arc::new(PdfTicketRenderer::new(localizer.clone())),
        fx.mailer.clone(),
        localizer,
    );

    let artifact = service.download_artifact(&fx.key, Locale::It).await.unwrap();
    assert!(artifact.bytes.starts_with(b"%PDF"));
    assert_eq!(artifact.content_type, "application/pdf");

    // Downloading again yields the exact same document.
    let again = service.download_artifact(&fx.key, Locale::It).await.unwrap();
    assert_eq!(again.bytes, artifact.bytes);
}

#[tokio::test]
async fn code_image_serves_a_png_behind_the_guard() {
    let fx = fixture(ReservationStatus::Complete, true);

    let png = fx.service.verification_symbol(&fx.key).await.unwrap();
    assert!(png.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]));

    let fx = fixture(ReservationStatus::Pending, true);
    let err = fx.service.verification_symbol(&fx.key).await.unwrap_err();
    assert!(matches!(err, AppError::ReservationNotComplete(_)));

    let fx = fixture(ReservationStatus::Complete, false);
    let err = fx.service.verification_symbol(&fx.key).await.unwrap_err();
    assert!(matches!(err, AppError::TicketNotAssigned));
}

#[tokio::test]
async fn pending_reservation_yields_no_bytes() {
    let fx = fixture(ReservationStatus::Pending, true);

    let err = fx
        .service
        .download_artifact(&fx.key, Locale::En)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::ReservationNotComplete(ReservationStatus::Pending)
    ));

    let err = fx.service.email_artifact(&fx.key, Locale::En).await.unwrap_err();
    assert!(matches!(err, AppError::ReservationNotComplete(_)));

    assert_eq!(fx.renderer.renders.load(Ordering::SeqCst), 0);
    assert!(fx.mailer.sent().is_empty());
}

#[tokio::test]
async fn unassigned_ticket_yields_no_bytes() {
    let fx = fixture(ReservationStatus::Complete, false);

    let err = fx
        .service
        .download_artifact(&fx.key, Locale::En)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TicketNotAssigned));
    assert_eq!(fx.renderer.renders.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn view_is_guarded_but_renders_nothing() {
    let fx = fixture(ReservationStatus::Complete, true);
    let view = fx.service.view_ticket(&fx.key).await.unwrap();
    assert_eq!(view.holder_email.as_deref(), Some("alice@example.com"));
    assert_eq!(view.event_title, "RustFest");
    assert_eq!(fx.renderer.renders.load(Ordering::SeqCst), 0);

    let fx = fixture(ReservationStatus::Pending, true);
    let err = fx.service.view_ticket(&fx.key).await.unwrap_err();
    assert!(matches!(err, AppError::ReservationNotComplete(_)));
}

#[tokio::test]
async fn resolution_fails_closed_before_guard_and_render() {
    let fx = fixture(ReservationStatus::Complete, true);

    let mut key = fx.key.clone();
    key.event_name = "no-such-event".into();
    let err = fx.service.download_artifact(&key, Locale::En).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(MissingEntity::Event(_))));

    let mut key = fx.key.clone();
    key.reservation_id = Uuid::new_v4().to_string();
    let err = fx.service.download_artifact(&key, Locale::En).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(MissingEntity::Reservation(_))));

    let mut key = fx.key.clone();
    key.ticket_identifier = "not-even-a-uuid".into();
    let err = fx.service.download_artifact(&key, Locale::En).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(MissingEntity::Ticket(_))));

    assert_eq!(fx.renderer.renders.load(Ordering::SeqCst), 0);
    assert!(fx.mailer.sent().is_empty());
}

#[tokio::test]
async fn ticket_from_another_reservation_does_not_resolve() {
    let fx = fixture(ReservationStatus::Complete, true);
    let now = Utc.with_ymd_and_hms(2026, 5, 1, 18, 30, 0).unwrap();

    // A second, unrelated reservation in the same store.
    let other_reservation = Uuid::new_v4();
    fx.store.insert_reservation(Reservation {
        id: other_reservation,
        status: ReservationStatus::Complete,
        created_at: now,
        updated_at: now,
    });

    // Keyed by the first reservation but the other reservation's ticket.
    let stray_ticket = Uuid::new_v4();
    let original = fx
        .store
        .find_ticket(&fx.ticket_id.to_string())
        .await
        .unwrap()
        .unwrap();
    fx.store.insert_ticket(Ticket {
        id: stray_ticket,
        reservation_id: other_reservation,
        ..original
    });

    let mut key = fx.key.clone();
    key.ticket_identifier = stray_ticket.to_string();
    let err = fx.service.view_ticket(&key).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(MissingEntity::Ticket(_))));
}

#[tokio::test]
async fn email_and_download_carry_identical_bytes() {
    let fx = fixture(ReservationStatus::Complete, true);

    let downloaded = fx
        .service
        .download_artifact(&fx.key, Locale::It)
        .await
        .unwrap();
    fx.service.email_artifact(&fx.key, Locale::It).await.unwrap();

    let sent = fx.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "alice@example.com");
    assert_eq!(sent[0].subject, "Il tuo biglietto");
    assert_eq!(sent[0].attachment.filename, downloaded.filename);
    assert_eq!(sent[0].attachment.bytes, downloaded.bytes);
}

#[tokio::test]
async fn assign_notifies_the_new_holder_exactly_once() {
    let fx = fixture(ReservationStatus::Complete, false);

    let assignment = OwnerAssignment::new("Bob B", "bob@example.com").unwrap();
    fx.service
        .assign_owner(&fx.key, assignment, Locale::En)
        .await
        .unwrap();

    let sent = fx.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "bob@example.com");
    assert_eq!(sent[0].attachment.filename, format!("ticket-{}.pdf", fx.ticket_id));

    // The assignment is persisted.
    let view = fx.service.view_ticket(&fx.key).await.unwrap();
    assert_eq!(view.holder_full_name.as_deref(), Some("Bob B"));
}

#[tokio::test]
async fn transport_faults_surface_as_delivery_failed() {
    let fx = fixture_with_mailer(
        ReservationStatus::Complete,
        true,
        Arc::new(RecordingMailer::failing()),
    );

    let err = fx.service.email_artifact(&fx.key, Locale::En).await.unwrap_err();
    assert!(matches!(err, AppError::DeliveryFailed(_)));
    // Rendering happened; only delivery failed.
    assert_eq!(fx.renderer.renders.load(Ordering::SeqCst), 1);
}
