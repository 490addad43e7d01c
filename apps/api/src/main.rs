use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::{AppointmentLedger, BookingService, InMemoryLedger, SupabaseLedger};
use assistant_cell::{AssistantService, Dispatcher, OpenAiChatModel, SessionStore};
use doctor_cell::RosterService;
use shared_config::AppConfig;

use crate::router::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clinic assistant server");

    let config = AppConfig::from_env();

    // A roster that cannot be read is fatal
    let roster = Arc::new(
        RosterService::load(&config.roster_path)
            .with_context(|| format!("failed to load doctor roster from {}", config.roster_path))?,
    );

    let ledger: Arc<dyn AppointmentLedger> = if config.is_configured() {
        info!("Appointments stored in Supabase table '{}'", config.appointments_table);
        Arc::new(SupabaseLedger::new(&config).context("failed to build Supabase client")?)
    } else {
        warn!("Appointments kept in memory and lost on restart");
        Arc::new(InMemoryLedger::new())
    };

    let booking = Arc::new(BookingService::new(roster.clone(), ledger));
    let model = OpenAiChatModel::new(&config).context("failed to build language model client")?;
    let assistant = Arc::new(AssistantService::new(
        Arc::new(model),
        Dispatcher::new(booking.clone()),
        SessionStore::from_config(&config),
    ));

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router::create_router(AppState { roster, booking, assistant })
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
