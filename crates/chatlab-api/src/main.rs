//! Chatlab API server entry point.

use std::error::Error;
use std::sync::{Arc, Mutex};

use axum::Router;
use chatlab_core::clock::{Clock, SystemClock};
use chatlab_core::rng::{DeterministicRng, SystemRng};
use chatlab_core::sink::SessionSink;
use chatlab_dialogue::domain::condition::ConditionSet;
use chatlab_dialogue::domain::design::ExperimentDesign;
use chatlab_dialogue::domain::script::ScriptStore;
use chatlab_session::application::store::InMemorySessionStore;
use chatlab_sink::csv_session_sink::CsvSessionSink;
use chatlab_sink::fallback::FallbackSessionSink;
use chatlab_sink::pg_session_sink::PgSessionSink;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use chatlab_api::config::Config;
use chatlab_api::routes;
use chatlab_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Chatlab API server");

    let config = Config::from_env()?;

    // Load the script; a bad source degrades to an empty script.
    let conditions = ConditionSet::new(config.conditions.clone(), config.default_condition.clone())?;
    let store = ScriptStore::load(&config.script_path);
    store.warn_missing_variants(&conditions);
    let design = Arc::new(ExperimentDesign::new(store, conditions));

    // Build the sink chain: PostgreSQL when configured, CSV otherwise.
    let primary: Option<Arc<dyn SessionSink>> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await?;
            let pg = PgSessionSink::new(pool);
            pg.ensure_schema().await?;
            let pg: Arc<dyn SessionSink> = Arc::new(pg);
            Some(pg)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; sessions are recorded to CSV only");
            None
        }
    };
    let fallback = Arc::new(CsvSessionSink::new(config.csv_log_path.clone()));
    let sink: Arc<dyn SessionSink> = Arc::new(FallbackSessionSink::new(primary, fallback));

    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(SystemClock);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(SystemRng::new()));
    let app_state = AppState::new(
        design,
        clock,
        rng,
        Arc::new(InMemorySessionStore::new()),
        sink,
    );

    // Build router.
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/sessions", routes::sessions::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr = config.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
