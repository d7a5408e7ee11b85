use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use tessera_server::config::Config;
use tessera_server::fulfillment::render::pdf::PdfTicketRenderer;
use tessera_server::fulfillment::FulfillmentService;
use tessera_server::handlers::AppState;
use tessera_server::i18n::{Localizer, MessageCatalog};
use tessera_server::mail::SmtpMailer;
use tessera_server::routes::create_routes;
use tessera_server::store::PgEntityStore;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let localizer: Arc<dyn Localizer> = Arc::new(MessageCatalog::new());
    let mailer = SmtpMailer::new(&config.smtp).expect("Failed to configure SMTP transport");
    let fulfillment = Arc::new(FulfillmentService::new(
        Arc::new(PgEntityStore::new(pool)),
        Arc::new(PdfTicketRenderer::new(localizer.clone())),
        Arc::new(mailer),
        localizer,
    ));

    let app: Router = create_routes(AppState {
        fulfillment,
        default_locale: config.default_locale,
    });

    tracing::info!("Ticket fulfillment server running at http://{}", config.bind_addr);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
