//! Request-level errors and their HTTP mapping.

use crate::channels::{ChannelError, SignatureError};
use crate::llm::GenerationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("missing signature header")]
    MissingSignature,
    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] SignatureError),
    #[error("invalid webhook payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("reply failed: {0}")]
    Reply(#[from] ChannelError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingSignature
            | RelayError::InvalidSignature(_)
            | RelayError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            RelayError::Generation(_) | RelayError::Reply(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::warn!("request failed: {}", self);
        } else {
            log::debug!("request rejected: {}", self);
        }
        // Upstream error detail goes to the log only.
        let body = match &self {
            RelayError::Generation(_) => "generation failed",
            RelayError::Reply(_) => "reply failed",
            _ => "bad request",
        };
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_400() {
        assert_eq!(RelayError::MissingSignature.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RelayError::InvalidSignature(SignatureError::Mismatch).status(),
            StatusCode::BAD_REQUEST
        );
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            RelayError::InvalidPayload(parse).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn downstream_errors_map_to_500() {
        let err = RelayError::from(GenerationError::Api("429 quota".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let err = RelayError::from(ChannelError::Api("400 Invalid reply token".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
