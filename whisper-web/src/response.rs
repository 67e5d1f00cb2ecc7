use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::error;
use whisper_api::ProviderResponse;

/// provider响应到HTTP响应的转换
pub struct Rendered(pub ProviderResponse);

impl IntoResponse for Rendered {
    fn into_response(self) -> Response {
        let rendered = self.0;
        let status = StatusCode::from_u16(rendered.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = Response::new(Body::from(rendered.body));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        match HeaderValue::from_str(&rendered.content_type) {
            Ok(value) => {
                headers.insert(header::CONTENT_TYPE, value);
            }
            Err(e) => error!("Invalid content type {:?}: {}", rendered.content_type, e),
        }
        for (name, value) in rendered.headers {
            match (HeaderName::try_from(name.as_str()), HeaderValue::from_str(&value)) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => error!("Dropping invalid response header {}", name),
            }
        }
        response
    }
}
