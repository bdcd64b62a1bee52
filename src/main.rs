use actix_cors::Cors;
use actix_web::{web, App, HttpServer, middleware};
use stay_engine::config::Settings;
use stay_engine::routes::{self, AppState, handle_json_payload_error, handle_path_error};
use stay_engine::services::{BookingEngine, CacheManager, PostgresClient};
use std::sync::Arc;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

fn init_logging(settings: &Settings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| startup_error("Configuration error", e))?;

    init_logging(&settings);
    info!("Starting Stay Engine...");

    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);
    let cache = Arc::new(
        CacheManager::connect(settings.cache.redis_url.as_deref(), l1_cache_size, cache_ttl).await,
    );
    info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);

    let postgres = PostgresClient::from_settings(
        &settings.database.url,
        settings.database.max_connections,
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    .map_err(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        startup_error("PostgreSQL connection error", e)
    })?;
    let postgres = Arc::new(postgres.with_history_limits(settings.history_limits()));

    info!("PostgreSQL client initialized");

    // One client serves all three accessors
    let engine = BookingEngine::new(postgres.clone(), postgres.clone(), postgres.clone())
        .with_checker(settings.availability_checker())
        .with_ranker(settings.ranker())
        .with_options(settings.engine_options());

    info!(
        "Engine initialized with weights {:?} ({:?})",
        settings.scoring_weights(),
        settings.scoring.absent_source_policy
    );

    let app_state = AppState {
        engine,
        cache,
        postgres: Some(postgres),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
