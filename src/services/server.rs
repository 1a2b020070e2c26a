//! HTTP server.
//!
//! Assembles the axum router from the per-resource handler modules, wraps it
//! in request logging and a per-request timeout, and runs it until a shutdown
//! signal arrives.

use crate::commands::{self, ApiErr};
use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppError;
use axum::extract::Request;
use axum::http::{Method, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;

/// Shared state for the axum routes.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
}

/// Build the full router.
///
/// A request that outlives `request_timeout` is dropped, which rolls back
/// its open transaction, and answered with a `TIMEOUT` error.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .merge(commands::teams::routes())
        .merge(commands::users::routes())
        .merge(commands::pull_requests::routes())
        .merge(commands::stats::routes())
        .merge(commands::health::routes())
        .fallback(unknown_route)
        .method_not_allowed_fallback(wrong_method)
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::map_response(timeout_body))
        .layer(middleware::from_fn(log_request))
}

async fn unknown_route(uri: Uri) -> Response {
    ApiErr(AppError::not_found_with_id("Route", uri.path())).into_response()
}

async fn wrong_method(method: Method, uri: Uri) -> Response {
    ApiErr(AppError::method_not_allowed(method.as_str(), uri.path())).into_response()
}

/// The timeout layer answers with a bare 408; give it the JSON error body.
/// Handlers never produce 408 themselves.
async fn timeout_body(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return ApiErr(AppError::Timeout).into_response();
    }
    response
}

/// Log each request once it has a response.
async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    log::info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        start.elapsed().as_millis()
    );

    response
}

/// Serve `app` on `listener` until `shutdown` is cancelled.
///
/// After cancellation the listener stops accepting and in-flight requests
/// get up to `drain_timeout` to finish.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
    drain_timeout: Duration,
) -> Result<(), AppError> {
    let cancelled = shutdown.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { cancelled.cancelled().await })
            .await
    });

    tokio::select! {
        result = &mut server => return join_result(result),
        _ = shutdown.cancelled() => {}
    }

    log::info!("Draining in-flight requests for up to {:?}", drain_timeout);

    match tokio::time::timeout(drain_timeout, &mut server).await {
        Ok(result) => join_result(result)?,
        Err(_) => {
            log::warn!("Drain period elapsed, aborting remaining requests");
            server.abort();
        }
    }

    log::info!("Server stopped");
    Ok(())
}

fn join_result(
    result: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(AppError::internal(format!("Server error: {}", e))),
        Err(e) => Err(AppError::internal(format!("Server task failed: {}", e))),
    }
}

/// Bind the configured address and serve until SIGINT or SIGTERM.
pub async fn run_server(config: &Config, db: DbPool) -> Result<(), AppError> {
    let app = build_router(AppState { db }, config.request_timeout());

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    log::info!("Server listening on http://{}", addr);

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received");
        trigger.cancel();
    });

    serve(listener, app, shutdown, config.shutdown_timeout()).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
