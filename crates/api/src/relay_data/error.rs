use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use helix_common::api::data_api::InvalidBlockHash;

#[derive(Debug, thiserror::Error)]
pub enum DataApiError {
    #[error("cannot specify both slot and cursor")]
    SlotAndCursor,
    #[error("maximum limit is 500")]
    LimitReached,
    #[error(transparent)]
    InvalidBlockHash(#[from] InvalidBlockHash),
    #[error("no registration found for validator")]
    RegistrationNotFound,
    #[error("internal server error")]
    InternalServerError,
}

impl IntoResponse for DataApiError {
    fn into_response(self) -> Response {
        let code = match self {
            DataApiError::SlotAndCursor |
            DataApiError::LimitReached |
            DataApiError::InvalidBlockHash(_) |
            DataApiError::RegistrationNotFound => StatusCode::BAD_REQUEST,
            DataApiError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (code, self.to_string()).into_response()
    }
}
