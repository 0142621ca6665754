use bytes::Bytes;
use reqwest::{
    header::{HeaderMap, CONTENT_TYPE},
    StatusCode,
};
use serde_json::Value as JsonValue;

/// Returns whether a status code counts as success.
///
/// Boundaries: 199 is not, 200 and 299 are, 300 is not.
pub fn status_code_20x(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Selects which representation [`api_request`] returns.
///
/// [`api_request`]: crate::ApiClient::api_request
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseType {
    /// Status, headers and buffered body bytes.
    Raw,
    /// Body decoded as UTF-8 text.
    Text,
    /// Body decoded as JSON, when the content type declares JSON.
    #[default]
    Json,
}

/// Status, headers and buffered body of a successful response.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// The representation returned to the caller.
///
/// `Absent` covers both failure (non-2xx without an explicit status
/// expectation) and a JSON request against a non-JSON response body.
#[derive(Clone, Debug)]
pub enum ResponseShape {
    Raw(RawResponse),
    Text(String),
    Json(JsonValue),
    Absent,
}

impl ResponseShape {
    /// Builds the selected shape from a buffered response.
    ///
    /// JSON decoding is only attempted when the content type is exactly
    /// `application/json`; a missing or different content type, or a body
    /// that fails to parse, yields `Absent` rather than an error.
    pub(crate) fn from_parts(
        response_type: ResponseType,
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
    ) -> Self {
        match response_type {
            ResponseType::Raw => Self::Raw(RawResponse {
                status,
                headers,
                body,
            }),
            ResponseType::Text => Self::Text(String::from_utf8_lossy(&body).into_owned()),
            ResponseType::Json => {
                let declared_json = headers
                    .get(CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .is_some_and(|value| value == "application/json");
                if !declared_json {
                    return Self::Absent;
                }
                match serde_json::from_slice(&body) {
                    Ok(value) => Self::Json(value),
                    Err(_) => Self::Absent,
                }
            }
        }
    }

    pub fn raw(&self) -> Option<&RawResponse> {
        match self {
            Self::Raw(raw) => Some(raw),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn json(&self) -> Option<&JsonValue> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use reqwest::{
        header::{HeaderMap, HeaderValue, CONTENT_TYPE},
        StatusCode,
    };
    use serde_json::json;

    use super::{status_code_20x, ResponseShape, ResponseType};

    fn headers(content_type: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        map
    }

    #[test]
    fn status_code_20x_boundaries() {
        assert!(!status_code_20x(199));
        assert!(status_code_20x(200));
        assert!(status_code_20x(299));
        assert!(!status_code_20x(300));
    }

    #[test]
    fn json_shape_decodes_declared_json() {
        let shape = ResponseShape::from_parts(
            ResponseType::Json,
            StatusCode::OK,
            headers("application/json"),
            Bytes::from_static(br#"{"id": 1}"#),
        );
        assert_eq!(shape.json(), Some(&json!({"id": 1})));
    }

    #[test]
    fn json_shape_is_absent_for_other_content_types() {
        let shape = ResponseShape::from_parts(
            ResponseType::Json,
            StatusCode::OK,
            headers("text/plain"),
            Bytes::from_static(br#"{"id": 1}"#),
        );
        assert!(shape.is_absent());
    }

    #[test]
    fn json_shape_is_absent_when_body_fails_to_parse() {
        let shape = ResponseShape::from_parts(
            ResponseType::Json,
            StatusCode::OK,
            headers("application/json"),
            Bytes::from_static(b"not json"),
        );
        assert!(shape.is_absent());
    }

    #[test]
    fn text_shape_returns_body_regardless_of_content_type() {
        let shape = ResponseShape::from_parts(
            ResponseType::Text,
            StatusCode::OK,
            headers("application/json"),
            Bytes::from_static(br#"{"id": 1}"#),
        );
        assert_eq!(shape.text(), Some(r#"{"id": 1}"#));
    }

    #[test]
    fn raw_shape_keeps_status_and_body() {
        let shape = ResponseShape::from_parts(
            ResponseType::Raw,
            StatusCode::CREATED,
            HeaderMap::new(),
            Bytes::from_static(b"created"),
        );
        let raw = shape.raw().expect("raw shape");
        assert_eq!(raw.status, StatusCode::CREATED);
        assert_eq!(raw.body.as_ref(), b"created");
    }
}
