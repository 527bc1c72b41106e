// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP front of the print bridge.
//
// Routes:
//
//   GET  /health  liveness and default printer
//   POST /print   submit one label document
//
// Every request gets a fresh `RequestId` from the middleware below.  The id
// rides along in a tracing span and in every `/print` response.  Status codes:
// 200 delivered, 400 bad input, 413 body over `MAX_LABEL_SIZE`, 502 printer
// unreachable, 500 anything else.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tracing::{Instrument, info, info_span, warn};

use shekspir_core::config::BridgeConfig;
use shekspir_core::error::{ErrorClass, Result, ShekspirError};
use shekspir_core::types::{HealthStatus, LabelResult, PrintRequest, RequestId};

use crate::bridge::PrintBridge;

/// Build the bridge's router.
pub fn router(bridge: Arc<PrintBridge>) -> Router {
    with_layers(
        Router::new()
            .route("/health", get(health_handler))
            .route("/print", post(print_handler)),
        bridge,
    )
}

/// Wrap `routes` in the body limit, request ids, panic recovery and CORS.
fn with_layers(routes: Router<Arc<PrintBridge>>, bridge: Arc<PrintBridge>) -> Router {
    let body_limit = bridge.config().max_label_bytes;

    routes
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(assign_request_id))
        .layer(CatchPanicLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(bridge)
}

/// Bind `0.0.0.0:{listen_port}` and serve until `shutdown` resolves.
pub async fn serve<F>(config: BridgeConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_addr: SocketAddr = ([0, 0, 0, 0], config.listen_port).into();
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| ShekspirError::Internal(format!("bind {bind_addr}: {e}")))?;

    serve_on(listener, Arc::new(PrintBridge::new(config)), shutdown).await
}

/// Serve on an already bound listener.
pub async fn serve_on<F>(listener: TcpListener, bridge: Arc<PrintBridge>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    info!("Printer server listening on {local_addr} ({})", bridge.config());

    axum::serve(listener, router(bridge))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("printer server stopped");
    Ok(())
}

/// Mint a `RequestId`, expose it to handlers, and scope the request's logs.
async fn assign_request_id(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::new();
    let span = info_span!(
        "request",
        %request_id,
        method = %request.method(),
        path = %request.uri().path()
    );
    request.extensions_mut().insert(request_id);

    async move {
        info!("request received");
        next.run(request).await
    }
    .instrument(span)
    .await
}

async fn health_handler(State(bridge): State<Arc<PrintBridge>>) -> Json<HealthStatus> {
    Json(bridge.health())
}

async fn print_handler(
    State(bridge): State<Arc<PrintBridge>>,
    Extension(request_id): Extension<RequestId>,
    payload: std::result::Result<Json<PrintRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            let status = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                StatusCode::PAYLOAD_TOO_LARGE
            } else {
                StatusCode::BAD_REQUEST
            };
            let err = ShekspirError::MalformedBody(rejection.body_text());
            warn!(%request_id, %status, error = %err, "request body rejected");
            return (status, Json(LabelResult::failed(request_id, &err))).into_response();
        }
    };

    match bridge.submit(request_id, request).await {
        Ok(delivery) => Json(LabelResult::delivered(request_id, &delivery.target)).into_response(),
        Err(err) => (status_for(&err), Json(LabelResult::failed(request_id, &err))).into_response(),
    }
}

fn status_for(err: &ShekspirError) -> StatusCode {
    match err.class() {
        ErrorClass::Client => StatusCode::BAD_REQUEST,
        ErrorClass::Device => StatusCode::BAD_GATEWAY,
        ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
