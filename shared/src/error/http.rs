//! HTTP status code mapping for error kinds

use super::kind::ErrorKind;
use http::StatusCode;

impl ErrorKind {
    /// Classify a non-success HTTP status
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::Forbidden,
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Self::Validation,
            StatusCode::REQUEST_TIMEOUT
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => Self::Transport,
            _ => Self::Business,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(
            ErrorKind::from_status(StatusCode::UNAUTHORIZED),
            ErrorKind::Unauthorized
        );
        assert_eq!(
            ErrorKind::from_status(StatusCode::FORBIDDEN),
            ErrorKind::Forbidden
        );
        assert_eq!(
            ErrorKind::from_status(StatusCode::NOT_FOUND),
            ErrorKind::NotFound
        );
        assert_eq!(
            ErrorKind::from_status(StatusCode::BAD_REQUEST),
            ErrorKind::Validation
        );
        assert_eq!(
            ErrorKind::from_status(StatusCode::GATEWAY_TIMEOUT),
            ErrorKind::Transport
        );
        assert_eq!(
            ErrorKind::from_status(StatusCode::CONFLICT),
            ErrorKind::Business
        );
        assert_eq!(
            ErrorKind::from_status(StatusCode::INTERNAL_SERVER_ERROR),
            ErrorKind::Business
        );
    }
}
