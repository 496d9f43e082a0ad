use std::sync::Arc;

use axum::{Extension, Json};
use gcs_signing::{generate_object_key, HttpMethod, ObjectKey, SigningRequest, UrlSigner};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    serving_urls::{ServingUrlError, ServingUrls},
    storage::ObjectStorage,
    types::{ApiQuery, AppError, Created, NoContent},
    uploads::{StoredObject, UploadTarget, UploadTargets},
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UploadQuery {
    /// Original name of the file to upload, e.g. `My Report.pdf`
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SignedUrlQuery {
    /// Path of an existing object in the bucket
    pub path: Option<String>,
    /// `GET`, `PUT` or `DELETE`, defaults to `GET`
    pub method: Option<String>,
    /// Lifetime of the URL in seconds, at most 604800
    pub expires: Option<u64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PathQuery {
    /// Path of an existing object in the bucket
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteQuery {
    /// Path of the object to delete
    pub filepath: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SignedRequest {
    /// HTTP method the URL must be used with
    pub method: String,
    /// Signed Cloud Storage URL
    pub url: String,
    /// RFC 3339 UTC timestamp when the URL expires
    pub expires: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UploadResponse {
    /// Where and how to send the file
    pub upload: SignedRequest,
    /// Where the file will live once uploaded
    pub object: StoredObject,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ObjectResponse {
    /// Object description including the dynamic serving URL
    pub object: StoredObject,
}

fn required(value: Option<String>, param: &'static str, message: &str) -> Result<String, AppError> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::validation(param, message))
}

async fn request_upload(
    target: &UploadTarget,
    url_signer: &UrlSigner,
    filename: Option<String>,
) -> Result<Json<UploadResponse>, AppError> {
    let filename = required(filename, "filename", "Parameter filename is required")?;

    let key = generate_object_key(&filename, &target.extensions)?;
    tracing::info!("Generated {} object key {key}", target.kind);

    let request = SigningRequest::new(&target.bucket, key.clone(), HttpMethod::Put, target.expiry_secs);
    let signed = url_signer.sign(&request).await?;

    Ok(Json(UploadResponse {
        upload: SignedRequest {
            method: signed.method.to_string(),
            url: signed.url,
            expires: signed.expires_at.to_rfc3339(),
        },
        object: target.describe(&key, None),
    }))
}

async fn sign_existing(
    target: &UploadTarget,
    url_signer: &UrlSigner,
    query: SignedUrlQuery,
) -> Result<Json<UploadResponse>, AppError> {
    let path = required(query.path, "path", "Parameter path is required")?;
    let key = ObjectKey::parse(&path)?;

    let method = match query.method.as_deref() {
        None | Some("") => HttpMethod::Get,
        Some(method) => method.parse().map_err(|_| {
            AppError::validation("method", "Parameter method must be one of GET, PUT or DELETE")
        })?,
    };
    let expiry_secs = query.expires.unwrap_or(target.expiry_secs);

    let request = SigningRequest::new(&target.bucket, key.clone(), method, expiry_secs);
    let signed = url_signer.sign(&request).await?;

    Ok(Json(UploadResponse {
        upload: SignedRequest {
            method: signed.method.to_string(),
            url: signed.url,
            expires: signed.expires_at.to_rfc3339(),
        },
        object: target.describe(&key, None),
    }))
}

async fn delete_object(
    target: &UploadTarget,
    object_storage: &dyn ObjectStorage,
    filepath: Option<String>,
) -> Result<ObjectKey, AppError> {
    let filepath = required(filepath, "filepath", "Parameter filepath is required")?;
    let key = ObjectKey::parse(&filepath).map_err(|e| AppError::validation("filepath", e.message))?;

    object_storage.delete_object(&target.bucket, &key).await?;
    tracing::info!("Deleted {key} from {}", target.bucket);

    Ok(key)
}

/// Creates a signed URL for uploading a new image
///
/// Generates a unique object path of the form `year/month/salt/slug.ext` from the
/// supplied filename and signs a `PUT` URL for it.
///
/// # Errors
///
/// - `422` - Missing filename or an extension not accepted for images
/// - `500` - The service account could not sign the URL
#[instrument(skip(targets, url_signer))]
pub async fn request_image_upload(
    Extension(targets): Extension<Arc<UploadTargets>>,
    Extension(url_signer): Extension<Arc<UrlSigner>>,
    ApiQuery(query): ApiQuery<UploadQuery>,
) -> Result<Json<UploadResponse>, AppError> {
    request_upload(&targets.images, &url_signer, query.filename).await
}

/// Creates a signed URL for uploading a new file
///
/// # Errors
///
/// - `422` - Missing filename or an extension not accepted for files
/// - `500` - The service account could not sign the URL
#[instrument(skip(targets, url_signer))]
pub async fn request_file_upload(
    Extension(targets): Extension<Arc<UploadTargets>>,
    Extension(url_signer): Extension<Arc<UrlSigner>>,
    ApiQuery(query): ApiQuery<UploadQuery>,
) -> Result<Json<UploadResponse>, AppError> {
    request_upload(&targets.files, &url_signer, query.filename).await
}

/// Signs a URL for an existing image
///
/// # Errors
///
/// - `422` - Missing or invalid path, unknown method, or expiry above 7 days
/// - `500` - The service account could not sign the URL
#[instrument(skip(targets, url_signer))]
pub async fn sign_image_url(
    Extension(targets): Extension<Arc<UploadTargets>>,
    Extension(url_signer): Extension<Arc<UrlSigner>>,
    ApiQuery(query): ApiQuery<SignedUrlQuery>,
) -> Result<Json<UploadResponse>, AppError> {
    sign_existing(&targets.images, &url_signer, query).await
}

/// Signs a URL for an existing file
///
/// # Errors
///
/// - `422` - Missing or invalid path, unknown method, or expiry above 7 days
/// - `500` - The service account could not sign the URL
#[instrument(skip(targets, url_signer))]
pub async fn sign_file_url(
    Extension(targets): Extension<Arc<UploadTargets>>,
    Extension(url_signer): Extension<Arc<UrlSigner>>,
    ApiQuery(query): ApiQuery<SignedUrlQuery>,
) -> Result<Json<UploadResponse>, AppError> {
    sign_existing(&targets.files, &url_signer, query).await
}

/// Registers an uploaded image for dynamic serving
///
/// Returns the object description with a `dynamic_url` that serves resized and
/// cropped variants of the image.
///
/// # Errors
///
/// - `422` - Missing or invalid path
/// - `403` - The serving service may not read the object
/// - `404` - The object does not exist
/// - `405` - The object is not an image
/// - `409` - The image cannot be transformed
#[instrument(skip(targets, serving_urls))]
pub async fn create_dynamic_url(
    Extension(targets): Extension<Arc<UploadTargets>>,
    Extension(serving_urls): Extension<Arc<dyn ServingUrls>>,
    ApiQuery(query): ApiQuery<PathQuery>,
) -> Result<Created<ObjectResponse>, AppError> {
    let path = required(
        query.path,
        "path",
        "Parameter path is required and should contain the object name",
    )?;
    let key = ObjectKey::parse(&path)?;

    let target = &targets.images;
    let dynamic_url = serving_urls.register(&target.bucket, &key).await?;
    tracing::info!("Registered dynamic serving URL for {key}");

    Ok(Created(ObjectResponse {
        object: target.describe(&key, Some(dynamic_url)),
    }))
}

/// Deletes an image and its dynamic serving URL
///
/// A serving URL that was never registered is not an error.
///
/// # Errors
///
/// - `422` - Missing or invalid filepath
/// - `401`, `403`, `404`, `408` - Storage refused or failed to delete the object
/// - `403` - The object was deleted but its serving URL could not be removed
#[instrument(skip(targets, object_storage, serving_urls))]
pub async fn delete_image(
    Extension(targets): Extension<Arc<UploadTargets>>,
    Extension(object_storage): Extension<Arc<dyn ObjectStorage>>,
    Extension(serving_urls): Extension<Arc<dyn ServingUrls>>,
    ApiQuery(query): ApiQuery<DeleteQuery>,
) -> Result<NoContent, AppError> {
    let target = &targets.images;
    let key = delete_object(target, object_storage.as_ref(), query.filepath).await?;

    match serving_urls.unregister(&target.bucket, &key).await {
        Ok(()) | Err(ServingUrlError::NotFound { .. }) => Ok(NoContent),
        Err(ServingUrlError::AccessDenied) => Err(AppError::abort(
            axum::http::StatusCode::FORBIDDEN,
            "Image serving access denied, the file has already been deleted from storage",
        )),
        Err(e) => Err(e.into()),
    }
}

/// Deletes a file
///
/// # Errors
///
/// - `422` - Missing or invalid filepath
/// - `401`, `403`, `404`, `408` - Storage refused or failed to delete the object
#[instrument(skip(targets, object_storage))]
pub async fn delete_file(
    Extension(targets): Extension<Arc<UploadTargets>>,
    Extension(object_storage): Extension<Arc<dyn ObjectStorage>>,
    ApiQuery(query): ApiQuery<DeleteQuery>,
) -> Result<NoContent, AppError> {
    delete_object(&targets.files, object_storage.as_ref(), query.filepath).await?;
    Ok(NoContent)
}
