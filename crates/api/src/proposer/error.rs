use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use helix_types::SigError;

#[derive(Debug, thiserror::Error)]
pub enum ProposerApiError {
    #[error("empty request")]
    EmptyRequest,

    #[error("unknown validator")]
    UnknownValidator,

    #[error("timestamp too far in the future")]
    TimestampTooFarInTheFuture,

    #[error("invalid signature")]
    InvalidSignature(#[from] SigError),

    #[error("serde decode error: {0}")]
    SerdeDecodeError(#[from] serde_json::Error),

    #[error("registration queue is full")]
    RegistrationQueueFull,

    #[error("registration intake closed")]
    RegistrationIntakeClosed,
}

impl IntoResponse for ProposerApiError {
    fn into_response(self) -> Response {
        let code = match self {
            ProposerApiError::EmptyRequest |
            ProposerApiError::UnknownValidator |
            ProposerApiError::TimestampTooFarInTheFuture |
            ProposerApiError::InvalidSignature(_) |
            ProposerApiError::SerdeDecodeError(_) => StatusCode::BAD_REQUEST,

            ProposerApiError::RegistrationQueueFull => StatusCode::SERVICE_UNAVAILABLE,

            ProposerApiError::RegistrationIntakeClosed => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (code, self.to_string()).into_response()
    }
}
