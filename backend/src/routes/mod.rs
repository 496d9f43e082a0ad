mod docs;
mod health;
pub mod uploads;

use aide::axum::{
    routing::{delete, get, post},
    ApiRouter,
};

pub use docs::api_description;

/// Creates the router with all handler routes
///
/// The unprefixed routes serve the images bucket, `/files` serves documents.
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .merge(docs::handler())
        .api_route("/health", get(health::handler))
        .api_route("/upload", get(uploads::request_image_upload))
        .api_route("/signed-url", get(uploads::sign_image_url))
        .api_route("/dynamic", post(uploads::create_dynamic_url))
        .api_route("/delete", delete(uploads::delete_image))
        .api_route("/files/upload", get(uploads::request_file_upload))
        .api_route("/files/signed-url", get(uploads::sign_file_url))
        .api_route("/files/delete", delete(uploads::delete_file))
}
