//! The postloop server: wires the store, collaborators, workflow
//! controller, daily trigger, and HTTP surface together.

mod config;
mod db;
mod pages;
mod routes;
mod state;

use crate::config::ServerConfig;
use crate::db::PgPostStore;
use crate::state::AppState;
use postloop_ai::{AnthropicBackend, PostGenerator};
use postloop_integration::{InstagramPublisher, ResendNotifier};
use postloop_scheduler::{DailySchedule, DailyTrigger};
use postloop_workflow::{ActionTokenSigner, PostStore, ThemeRotation, WorkflowController};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    // Create database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("failed to run migrations");

    let store: Arc<dyn PostStore> = Arc::new(PgPostStore::new(db_pool));

    // Theme rotation: configured file or built-in defaults
    let rotation = match &config.themes_path {
        Some(path) => ThemeRotation::from_json_file(path).expect("failed to load themes file"),
        None => ThemeRotation::defaults(),
    };

    // Collaborators
    let backend = AnthropicBackend::new(&config.anthropic.api_key, &config.anthropic.model)
        .expect("failed to configure content producer");
    let producer = Arc::new(PostGenerator::new(Arc::new(backend)));

    let notifier = Arc::new(
        ResendNotifier::new(
            &config.email.api_key,
            &config.email.from,
            &config.email.approver,
        )
        .expect("failed to configure notifier"),
    );

    let publisher = Arc::new(
        InstagramPublisher::new(
            &config.instagram.access_token,
            &config.instagram.account_id,
        )
        .expect("failed to configure publisher"),
    );
    match publisher.verify_credentials().await {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!("platform credentials missing or invalid; publishing will fail");
        }
        Err(err) => {
            tracing::warn!(error = %err, "platform credential check failed");
        }
    }

    let controller = Arc::new(WorkflowController::new(
        store.clone(),
        producer,
        notifier,
        publisher,
        rotation,
        ActionTokenSigner::new(&config.secret_key),
        &config.base_url,
        config.instagram.default_image_url.clone(),
    ));

    // Daily generation trigger
    let schedule = DailySchedule::new(config.schedule.hour, config.schedule.minute)
        .expect("invalid generation schedule");
    tokio::spawn(DailyTrigger::new(schedule, controller.clone(), store.clone()).run());

    let app_state = Arc::new(AppState {
        controller,
        store,
        secret_key: config.secret_key.clone(),
        dashboard_limit: config.dashboard_limit,
    });

    let app = routes::router(app_state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app).await.expect("server error");
}
