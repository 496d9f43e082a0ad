//! Custom extractors for request validation

use aide::operation::OperationInput;
use aide::OperationOutput;
use axum::extract::{rejection::QueryRejection, FromRequestParts, Query};
use axum::http::request::Parts;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::types::error::AppError;

/// Query string extractor that reports malformed parameters with the validation envelope
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|err: QueryRejection| {
                tracing::debug!("Query string rejected: {err}");
                AppError::validation("query", err.body_text())
            })?;

        Ok(Self(params))
    }
}

impl<T> OperationInput for ApiQuery<T>
where
    T: JsonSchema,
{
    fn operation_input(ctx: &mut aide::generate::GenContext, operation: &mut aide::openapi::Operation) {
        Query::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AppError::inferred_responses(ctx, operation)
    }
}
