use aide::{
    axum::ApiRouter,
    openapi::{Info, OpenApi},
    scalar::Scalar,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json,
};

use crate::types::Environment;

/// Empty OpenAPI document describing this service, filled in by `finish_api`
#[must_use]
pub fn api_description() -> OpenApi {
    OpenApi {
        info: Info {
            title: "Upload Gateway".to_string(),
            description: Some(
                "Signed Cloud Storage URLs for image and file uploads".to_string(),
            ),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Info::default()
        },
        ..OpenApi::default()
    }
}

pub fn handler() -> ApiRouter {
    let scalar = Scalar::new("/openapi.json").with_title("Upload Gateway Docs");

    ApiRouter::new()
        .route("/docs", scalar.axum_route())
        .route("/openapi.json", get(openapi_schema))
}

#[allow(clippy::unused_async)]
async fn openapi_schema(
    Extension(environment): Extension<Environment>,
    Extension(openapi): Extension<OpenApi>,
) -> Response {
    if environment.show_api_docs() {
        Json(openapi).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}
