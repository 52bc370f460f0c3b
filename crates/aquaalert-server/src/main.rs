use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context};
use aquaalert_core::{AppState, InMemoryStore, ReportStore};
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug, Clone)]
struct ServerConfig {
    bind_addr: SocketAddr,
    allowed_origins: Vec<String>,
    data_path: Option<PathBuf>,
}

impl ServerConfig {
    fn from_env() -> anyhow::Result<Self> {
        let bind_addr = env::var("AQUAALERT_BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("failed to parse AQUAALERT_BIND_ADDR")?;

        let allowed_origins = env::var("AQUAALERT_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();

        let data_path = env::var("AQUAALERT_DATA_PATH")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bind_addr,
            allowed_origins,
            data_path,
        })
    }

    fn open_store(&self) -> anyhow::Result<Arc<dyn ReportStore>> {
        let store = match &self.data_path {
            Some(path) => InMemoryStore::open(path)
                .with_context(|| format!("failed to open data journal {}", path.display()))?,
            None => {
                tracing::warn!("AQUAALERT_DATA_PATH not set, reports will not survive a restart");
                InMemoryStore::new()
            }
        };
        Ok(Arc::new(store))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ServerConfig::from_env()?;
    let state = AppState::with_store(config.open_store()?);

    info!(
        villages = state.registry().len(),
        window_hours = state.aggregator_config().window.num_hours(),
        "alert aggregator ready"
    );

    let app = Router::new()
        .route("/healthz", get(healthz))
        .merge(aquaalert_core::create_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&config.allowed_origins)?);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(
        bind_addr = %config.bind_addr,
        allowed_origins = ?config.allowed_origins,
        data_path = ?config.data_path,
        "aquaalert-server listening"
    );

    axum::serve(listener, app)
        .await
        .context("server exited with error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn build_cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let parsed = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin: {origin}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if parsed.is_empty() {
        return Err(anyhow!("at least one CORS origin must be configured"));
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any))
}

async fn healthz() -> &'static str {
    "ok"
}
