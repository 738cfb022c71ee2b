use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cropguru_core::CropguruError;
use thiserror::Error;

/// Request failures. Store failures carry no machine-readable kind on the
/// wire, only a fixed 500 body.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed JSON payload")]
    MalformedPayload,

    #[error("Payload contains a NUL character")]
    NulCharacter,

    #[error(transparent)]
    Body(#[from] BytesRejection),

    #[error("Store error: {0}")]
    Store(#[from] CropguruError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::MalformedPayload => {
                (StatusCode::BAD_REQUEST, "Malformed JSON payload").into_response()
            }
            AppError::NulCharacter => (
                StatusCode::BAD_REQUEST,
                "Payload contains a NUL character",
            )
                .into_response(),
            AppError::Body(rejection) => rejection.into_response(),
            AppError::Store(e) => {
                tracing::error!("Store operation failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
