use crate::cmd::{build_refresher, open_store, StoreKind};
use crate::config::HustleConfig;
use crate::modules::handlers::{fetch_hustle, liveness, refresh_leaderboard};
use anyhow::{Context, Result};
use axum::{extract::Extension, routing, Router, Server};
use clap::Args;
use http::{header::CONTENT_TYPE, HeaderValue, Method};
use hustle_board_libs::LeaderboardRefresher;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

#[derive(Debug, Args)]
pub struct ServerArgs {
    #[arg(long)]
    port: Option<u16>,
    #[arg(long, value_enum, default_value_t = StoreKind::Postgres)]
    store: StoreKind,
    /// Overrides FRONTEND_ORIGIN_URL.
    #[arg(long)]
    frontend_origin_url: Option<String>,
}

pub async fn run(args: ServerArgs) -> Result<()> {
    let mut config = HustleConfig::from_env()?;
    if args.frontend_origin_url.is_some() {
        config.frontend_origin_url = args.frontend_origin_url;
    }

    tracing::info!("Open {} document store.", args.store);
    let store = open_store(&args.store, &config).await?;
    let refresher = build_refresher(&config, store)?;

    let origin = match &config.frontend_origin_url {
        Some(origin) => Some(origin.parse::<HeaderValue>().with_context(|| {
            let message = format!("FRONTEND_ORIGIN_URL `{}` is not a valid origin", origin);
            tracing::error!(message);
            message
        })?),
        None => {
            tracing::warn!("FRONTEND_ORIGIN_URL is not set. CORS restriction is disabled.");
            None
        }
    };

    let app = create_router(Arc::new(refresher), origin);
    let port = match args.port {
        Some(port) => port,
        None => {
            tracing::warn!("API server will be launched at default port number 8000");
            8000u16
        }
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server start at port {}", port);
    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .with_context(|| {
            let message = "Failed to bind server.";
            tracing::error!(message);
            message
        })?;

    Ok(())
}

pub fn create_router(refresher: Arc<LeaderboardRefresher>, origin: Option<HeaderValue>) -> Router {
    let router = Router::new()
        .route(
            "/api/hustle",
            routing::get(fetch_hustle)
                .put(refresh_leaderboard)
                .post(refresh_leaderboard),
        )
        .route("/api/liveness", routing::get(liveness))
        .layer(Extension(refresher))
        .layer(TraceLayer::new_for_http());

    match origin {
        Some(origin) => router.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::exact(origin))
                .allow_methods([Method::GET, Method::PUT, Method::POST])
                .allow_headers([CONTENT_TYPE]),
        ),
        None => router,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler.");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown.");
}
