use std::time::Duration;

use axum::{middleware, Extension, Router};
use datadog_tracing::axum::{shutdown_signal, OtelAxumLayer, OtelInResponseLayer};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::middleware::{cors_layer, require_https};
use crate::routes;
use crate::{state::AppState, types::Environment};

/// Upper bound for a whole request, signing and storage calls included
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the application router with all layers and dependencies attached
pub fn router(environment: Environment, state: AppState) -> Router {
    let mut openapi = routes::api_description();
    let cors = cors_layer(&environment.allowed_origins());

    routes::handler()
        .finish_api(&mut openapi)
        .layer(middleware::from_fn(require_https))
        .layer(Extension(openapi))
        .layer(Extension(environment))
        .layer(Extension(state.upload_targets))
        .layer(Extension(state.url_signer))
        .layer(Extension(state.object_storage))
        .layer(Extension(state.serving_urls))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // Include trace context as header into the response
        .layer(OtelInResponseLayer)
        // Start OpenTelemetry trace on incoming request
        .layer(OtelAxumLayer::default())
        .layer(tower_http::timeout::TimeoutLayer::new(REQUEST_TIMEOUT))
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(environment: Environment, state: AppState) -> anyhow::Result<()> {
    let router = router(environment, state);

    let addr = std::net::SocketAddr::from((
        [0, 0, 0, 0],
        std::env::var("PORT").map_or(Ok(8001), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Upload gateway started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}
