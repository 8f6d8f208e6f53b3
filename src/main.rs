use std::error::Error;
use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use gobank::config::Config;
use gobank::middleware::auth::TOKEN_HEADER;
use gobank::sqlite_repo::SqliteRepository;
use gobank::token::TokenKeys;
use gobank::{build_app, db, AppState};

/// Browsers may call the JSON API with the token header from the configured origins only.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(TOKEN_HEADER)])
}

fn with_http_layers(app: Router, config: &Config) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(tower_http::LatencyUnit::Millis),
        );

    app.layer(RequestBodyLimitLayer::new(config.max_payload_bytes))
        .layer(trace)
        .layer(cors_layer(&config.cors_origins))
}

async fn run(config: Config) -> Result<(), Box<dyn Error>> {
    let pool = db::init_pool(&config.database_url).await?;
    tracing::info!(database_url = %config.database_url, "Account store ready");

    let state = AppState {
        repo: Arc::new(SqliteRepository::new(pool, config.store_timeout)),
        keys: TokenKeys::new(&config),
    };
    let app = with_http_layers(build_app(state), &config);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "gobank listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Ctrl+C handler failed, shutting down");
            }
            tracing::info!("Shutting down...");
        })
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let result = match Config::from_env() {
        Ok(config) => run(config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "gobank stopped");
        std::process::exit(1);
    }
}
