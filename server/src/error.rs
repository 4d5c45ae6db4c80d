use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::{
    borrow::Cow,
    fmt::{self, Display, Formatter},
};

/// Webhook failure as seen by GitHub's delivery log.
#[derive(Debug)]
pub enum AppError {
    /// The delivery itself is at fault; GitHub shows the message next to the status.
    StatusCodeMessage(StatusCode, Cow<'static, str>),
    /// Processing failed upstream, e.g. the hosting API rejected a call.
    InternalServerError(anyhow::Error),
}

impl<S> From<(StatusCode, S)> for AppError
where
    S: Into<Cow<'static, str>>,
{
    fn from((status, message): (StatusCode, S)) -> Self {
        AppError::StatusCodeMessage(status, message.into())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::InternalServerError(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InternalServerError(err) => {
                tracing::error!("Internal server error: {err:#}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            AppError::StatusCodeMessage(status, message) => {
                tracing::warn!(%status, %message);
                (status, message).into_response()
            }
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InternalServerError(err) => write!(f, "Internal server error: {err:#}"),
            AppError::StatusCodeMessage(status, message) => {
                write!(f, "{}: {}", status, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_message() {
        let err = AppError::from((StatusCode::BAD_REQUEST, "Invalid signature"));
        assert_eq!(err.to_string(), "400 Bad Request: Invalid signature");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_error_hides_details() {
        let err = AppError::from(anyhow::anyhow!("token expired").context("adding labels"));
        assert_eq!(
            err.to_string(),
            "Internal server error: adding labels: token expired"
        );
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
