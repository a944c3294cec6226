//! Unified server error and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parlor_protocol::ErrorResponse;
use parlor_session::SessionError;

/// Top-level error for the HTTP layer.
///
/// The `#[from]` attribute lets handlers use `?` on session-core results;
/// `IntoResponse` turns whatever comes out into the `{"error": "..."}`
/// body with the right status code, so handlers never build error
/// responses by hand.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A session-core error (validation, not-found, permission, gone).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Binding or serving the listener failed.
    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Session(e) => match e {
                SessionError::Validation(_) => StatusCode::BAD_REQUEST,
                SessionError::NotFound(_) | SessionError::PlayerNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                SessionError::PermissionDenied => StatusCode::FORBIDDEN,
                SessionError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_protocol::{PlayerId, SessionCode};

    #[test]
    fn test_validation_maps_to_400() {
        let err = ServerError::from(SessionError::Validation("name is required".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let session = SessionError::NotFound(SessionCode::from_raw("ZZZZZ"));
        assert_eq!(ServerError::from(session).status(), StatusCode::NOT_FOUND);

        let player = SessionError::PlayerNotFound(PlayerId::new("ghost"));
        assert_eq!(ServerError::from(player).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_permission_denied_maps_to_403() {
        let err = ServerError::from(SessionError::PermissionDenied);
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        // The message must not say anything beyond the generic rejection.
        assert_eq!(err.to_string(), "invalid host secret");
    }

    #[test]
    fn test_unavailable_maps_to_503() {
        let err =
            ServerError::from(SessionError::Unavailable(SessionCode::from_raw("AAAAA")));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
