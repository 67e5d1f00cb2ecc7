use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use whisper_domain::ValidationError;

/// Web层错误
///
/// `NotFound`和校验错误返回对应状态码，其余核心错误一律记录完整信息后返回500。
#[derive(Error, Debug)]
pub enum WebError {
    #[error(transparent)]
    Core(#[from] whisper_api::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<ValidationError> for WebError {
    fn from(err: ValidationError) -> Self {
        WebError::Core(err.into())
    }
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Core(whisper_api::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            WebError::Core(whisper_api::Error::Validation(ValidationError::SlugTaken(_))) => {
                StatusCode::CONFLICT
            }
            WebError::Core(whisper_api::Error::Validation(_)) => StatusCode::BAD_REQUEST,
            WebError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {:?}", self);
            return (status, "Internal Server Error").into_response();
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found = WebError::from(whisper_api::Error::NotFound("post `a`".into()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let taken = WebError::from(ValidationError::SlugTaken("a".into()));
        assert_eq!(taken.status(), StatusCode::CONFLICT);

        let invalid = WebError::from(ValidationError::Slug("A B".into()));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let fatal = WebError::from(whisper_api::Error::ForwardingLimit {
            provider: "x".into(),
            limit: 16,
        });
        assert_eq!(fatal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
