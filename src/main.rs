//! CSMS entry point: loads configuration, connects and migrates the
//! database, provisions the default admin/staff accounts, then runs the
//! OCPP WebSocket server and the HTTP control plane concurrently until
//! shutdown.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use csms::auth::JwtConfig;
use csms::bootstrap;
use csms::config::AppConfig;
use csms::engines::{ReminderScheduler, SessionEngine, TicketEngine, WalletEngine};
use csms::http;
use csms::infrastructure::database::{self, store::Store};
use csms::mailer::LoggingMailer;
use csms::ocpp::dispatcher::OutboundDispatcher;
use csms::ocpp::handlers::HandlerContext;
use csms::ocpp::registry::ConnectionRegistry;
use csms::ocpp::server::OcppServer;
use csms::payment::GatewayRegistry;
use csms::support::shutdown::ShutdownCoordinator;
use csms::SystemClock;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))).init();

    let config = AppConfig::load();
    info!(database_url = config.database_url.as_str(), "starting CSMS");

    let db = database::connect(&config.database_url).await?;
    info!("running database migrations");
    database::migrate(&db).await?;

    bootstrap::ensure_admin(&db, &config).await?;
    bootstrap::ensure_staff(&db, &config).await?;

    let clock = Arc::new(SystemClock) as Arc<dyn csms::Clock>;
    let store = Store::new(db.clone());

    let registry = ConnectionRegistry::shared();
    let dispatcher = OutboundDispatcher::shared(registry.clone(), config.call_timeout_secs, config.long_call_timeout_secs);

    let session_engine = Arc::new(SessionEngine::new(store.clone(), clock.clone(), dispatcher.clone(), &config));
    let wallet_engine = Arc::new(WalletEngine::new(store.clone(), clock.clone()));
    let mailer = Arc::new(LoggingMailer) as Arc<dyn csms::mailer::Mailer>;
    let ticket_engine = Arc::new(TicketEngine::new(store.clone(), clock.clone(), mailer));

    let jwt_config = JwtConfig { secret: config.jwt_secret.clone(), access_token_expire_minutes: config.access_token_expire_minutes, refresh_token_expire_days: config.refresh_token_expire_days };
    let gateways = Arc::new(GatewayRegistry::new(&config));
    let config = Arc::new(config);

    let shutdown = ShutdownCoordinator::new(30);
    let shutdown_signal = shutdown.signal();
    shutdown.start_signal_listener();

    let app_state = http::state::AppState {
        store: store.clone(),
        session_engine: session_engine.clone(),
        wallet_engine,
        ticket_engine: ticket_engine.clone(),
        dispatcher: dispatcher.clone(),
        registry: registry.clone(),
        jwt_config,
        gateways,
        config: config.clone(),
        clock: clock.clone(),
        started_at: Arc::new(Instant::now()),
    };

    let router = http::build_router(app_state);
    let http_addr = config.http_address();
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    info!(address = http_addr.as_str(), "HTTP control plane listening");

    let http_shutdown = shutdown_signal.clone();
    let http_server = axum::serve(listener, router.into_make_service_with_connect_info::<std::net::SocketAddr>()).with_graceful_shutdown(async move {
        http_shutdown.wait().await;
        info!("HTTP server received shutdown signal");
    });

    let handler_context = Arc::new(HandlerContext { session_engine });
    let ocpp_server = OcppServer::new(registry, dispatcher, handler_context, shutdown_signal.clone());
    let ocpp_addr: std::net::SocketAddr = config.ocpp_address().parse()?;

    let reminder_scheduler = ReminderScheduler::new(ticket_engine, config.reminder_check_minutes);
    let reminder_shutdown = shutdown_signal.clone();

    let ocpp_task = tokio::spawn(async move { ocpp_server.run(ocpp_addr).await });
    let http_task = tokio::spawn(async move { http_server.await });
    let reminder_task = tokio::spawn(async move { reminder_scheduler.run(reminder_shutdown).await });

    info!("all servers started, press Ctrl+C to shut down gracefully");

    tokio::select! {
        result = ocpp_task => {
            match result {
                Ok(Ok(())) => info!("OCPP server stopped"),
                Ok(Err(e)) => error!(error = %e, "OCPP server error"),
                Err(e) => error!(error = %e, "OCPP server task panicked"),
            }
        }
        result = http_task => {
            match result {
                Ok(Ok(())) => info!("HTTP server stopped"),
                Ok(Err(e)) => error!(error = %e, "HTTP server error"),
                Err(e) => error!(error = %e, "HTTP server task panicked"),
            }
        }
        _ = reminder_task => {
            warn!("reminder scheduler task ended unexpectedly");
        }
    }

    if let Err(e) = db.close().await {
        warn!(error = %e, "error closing database connection");
    } else {
        info!("database connection closed");
    }

    info!("CSMS shutdown complete");
    Ok(())
}
