use axum::{
    extract::Request,
    http::{
        header::{HOST, LOCATION},
        StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};

use crate::types::{AppError, Environment};

/// Header set by the load balancer with the scheme the client used
const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// HTTPS enforcement middleware
///
/// Outside development, requests that did not reach the load balancer over HTTPS
/// are answered with a `301` to the same URL on `https://`.
///
/// # Errors
///
/// - `AppError` - 400 when a plain HTTP request carries no `Host` header
pub async fn require_https(
    Extension(environment): Extension<Environment>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !environment.require_https() || is_secure(&request) {
        return Ok(next.run(request).await);
    }

    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::abort(StatusCode::BAD_REQUEST, "Missing Host header"))?;

    let path_and_query = request
        .uri()
        .path_and_query()
        .map_or("/", |pq| pq.as_str());

    let location = format!("https://{host}{path_and_query}");
    tracing::debug!("Redirecting plain HTTP request to {location}");

    Ok((StatusCode::MOVED_PERMANENTLY, [(LOCATION, location)]).into_response())
}

fn is_secure(request: &Request) -> bool {
    request.uri().scheme_str() == Some("https")
        || request
            .headers()
            .get(FORWARDED_PROTO)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
}
