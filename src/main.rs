use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use matrimony_match::config::{Settings, StoreBackend};
use matrimony_match::core::MatchEngine;
use matrimony_match::routes::{self, handle_json_payload_error, handle_query_payload_error, matches::AppState};
use matrimony_match::services::{
    AppwriteProfileStore, CacheManager, CachedProfileStore, InMemoryProfileStore,
    PostgresProfileStore, ProfileStore,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(default_level: &str, default_format: &str) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| default_level.to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| default_format.to_string());

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e))
}

async fn build_store(settings: &Settings) -> std::io::Result<Arc<dyn ProfileStore>> {
    let store: Arc<dyn ProfileStore> = match settings.store.backend {
        StoreBackend::Appwrite => {
            let appwrite = settings
                .appwrite
                .clone()
                .ok_or_else(|| startup_error("Configuration error", "missing [appwrite] section"))?;
            let store = AppwriteProfileStore::new(appwrite.into(), settings.store.page_size)
                .map_err(|e| startup_error("Failed to build Appwrite client", e))?;
            info!("Appwrite profile store initialized");
            Arc::new(store)
        }
        StoreBackend::Postgres => {
            let database = settings
                .database
                .as_ref()
                .ok_or_else(|| startup_error("Configuration error", "missing [database] section"))?;
            let store = PostgresProfileStore::connect(&database.into())
                .await
                .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;
            info!("PostgreSQL profile store initialized");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            let store = match &settings.store.seed_path {
                Some(path) => InMemoryProfileStore::from_json_file(path)
                    .map_err(|e| startup_error("Failed to load seed profiles", e))?,
                None => InMemoryProfileStore::default(),
            };
            info!("In-memory profile store initialized with {} profiles", store.len());
            Arc::new(store)
        }
    };

    Ok(store)
}

async fn build_cache(settings: &Settings) -> Option<Arc<CacheManager>> {
    if !settings.cache.enabled {
        return None;
    }

    let ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match &settings.cache.redis_url {
        Some(url) => match CacheManager::connect(url, l1_size, ttl).await {
            Ok(cache) => cache,
            Err(e) => {
                warn!("Failed to connect to Redis ({}), running with in-process cache only", e);
                CacheManager::in_memory(l1_size, ttl)
            }
        },
        None => CacheManager::in_memory(l1_size, ttl),
    };

    info!(
        "Cache manager initialized (L1: {} entries, TTL: {}s, redis: {})",
        l1_size,
        ttl,
        cache.has_redis()
    );
    warn!("Seeker profile cache is on; profile edits may take up to {}s to reach matches", ttl);

    Some(Arc::new(cache))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing("info", "json");
            error!("Failed to load configuration: {}", e);
            panic!("Configuration error: {}", e);
        }
    };

    init_tracing(&settings.logging.level, &settings.logging.format);

    info!("Starting matrimony matching service...");

    let weights = settings
        .scoring
        .weights
        .resolve()
        .map_err(|e| startup_error("Invalid scoring weights", e))?;

    let base_store = build_store(&settings).await?;
    let cache = build_cache(&settings).await;

    let store: Arc<dyn ProfileStore> = match &cache {
        Some(cache) => Arc::new(CachedProfileStore::new(base_store, cache.clone())),
        None => base_store,
    };

    let engine_config = settings.matching.engine_config(&settings.store);
    let engine = MatchEngine::new(store.clone(), weights, engine_config);

    info!(
        "Match engine initialized with weights: {:?}, config: {:?}",
        weights, engine_config
    );

    let app_state = AppState {
        engine: Arc::new(engine),
        store,
        cache,
        default_limit: settings.matching.default_limit,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
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
