//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, the expiry sweeper, and Axum
//! server lifecycle.

use crate::application::expiry_sweeper::run_expiry_sweeper;
use crate::application::services::{AuthService, LinkService};
use crate::config::Config;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::{MIGRATOR, PgLinkRepository, connect_with_retry};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::code_generator::CodeGenerator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;

/// Connects to Redis if configured, falling back to [`NullCache`].
pub async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (with retry)
/// - Apply migrations
/// - Redis cache (or NullCache fallback)
/// - Background expiry sweeper
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Migrations fail
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_with_retry(&config.database_url, &config.pool_settings())
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    MIGRATOR
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;

    let cache = build_cache(&config).await;

    let repository = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));
    let link_service = Arc::new(LinkService::new(
        repository,
        cache,
        CodeGenerator::default(),
        config.engine_settings(),
    ));
    let auth_service = Arc::new(AuthService::new(&config.api_key));

    let (stop_tx, stop_rx) = watch::channel(false);

    let sweeper = config.cleanup_interval().map(|every| {
        tokio::spawn(run_expiry_sweeper(
            link_service.clone(),
            every,
            stop_rx.clone(),
        ))
    });

    let app = app_router(AppState::new(link_service, auth_service));

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .context("LISTEN is not a valid socket address")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    let mut server_stop = stop_rx.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
            .with_graceful_shutdown(async move {
                let _ = server_stop.wait_for(|stop| *stop).await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            let _ = stop_tx.send(true);
            result.context("Server task failed")??;
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }

    tracing::info!("Shutting down");
    let _ = stop_tx.send(true);

    let budget = config.shutdown_timeout();
    match tokio::time::timeout(budget, &mut server).await {
        Ok(result) => result.context("Server task failed")??,
        Err(_) => {
            tracing::warn!(?budget, "In-flight requests did not finish in time");
            server.abort();
        }
    }

    if let Some(handle) = sweeper
        && tokio::time::timeout(budget, handle).await.is_err()
    {
        tracing::warn!("Expiry sweeper did not stop in time");
    }

    pool.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
