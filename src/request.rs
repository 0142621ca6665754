use std::{fmt, str::FromStr, time::Duration};

use serde_json::Value as JsonValue;

use crate::{ApiError, ResponseType};

/// HTTP methods supported by [`ApiClient::api_request`].
///
/// A closed enum rather than free-form strings: unsupported methods are
/// rejected at parse time, before any network I/O.
///
/// [`ApiClient::api_request`]: crate::ApiClient::api_request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub(crate) fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ApiError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let method = [Self::Get, Self::Post, Self::Put, Self::Patch, Self::Delete]
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(value));
        method.ok_or_else(|| {
            ApiError::Precondition(format!(
                "unsupported http method '{value}'; supported methods are GET, POST, PUT, PATCH, DELETE"
            ))
        })
    }
}

/// One part of a multipart file upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name.
    pub name: String,
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type of the part.
    pub mime: String,
    /// Part contents, owned so the request can be rebuilt on retry.
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }
}

/// Everything describing a single API request.
///
/// Built fresh per call with the builder methods and consumed by
/// [`ApiClient::api_request`]. The expected status defaults to `200`; call
/// [`expect_status`] for endpoints that return something else, or
/// [`any_status`] to skip validation and fall back to plain 2xx
/// classification.
///
/// [`ApiClient::api_request`]: crate::ApiClient::api_request
/// [`expect_status`]: RequestSpec::expect_status
/// [`any_status`]: RequestSpec::any_status
#[derive(Clone, Debug, PartialEq)]
pub struct RequestSpec {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) payload: Option<JsonValue>,
    pub(crate) data: Option<String>,
    pub(crate) form: Option<Vec<(String, String)>>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) params: Vec<(String, String)>,
    pub(crate) auth: Option<(String, Option<String>)>,
    pub(crate) cookies: Vec<(String, String)>,
    pub(crate) files: Vec<FilePart>,
    pub(crate) response_type: ResponseType,
    pub(crate) expected_status: Option<u16>,
    pub(crate) timeout: Option<Duration>,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            payload: None,
            data: None,
            form: None,
            headers: Vec::new(),
            params: Vec::new(),
            auth: None,
            cookies: Vec::new(),
            files: Vec::new(),
            response_type: ResponseType::Json,
            expected_status: Some(200),
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Sets a JSON payload as the request body.
    pub fn json(mut self, payload: JsonValue) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Sets a raw string body, for non-JSON payloads.
    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets a `application/x-www-form-urlencoded` body.
    pub fn form<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.form = Some(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        );
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Appends a query parameter to the resolved URL.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Sets HTTP basic-auth credentials.
    pub fn basic_auth(mut self, user: impl Into<String>, password: Option<String>) -> Self {
        self.auth = Some((user.into(), password));
        self
    }

    /// Sets a bearer token `Authorization` header.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        self.header("authorization", format!("Bearer {}", token.as_ref()))
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    /// Attaches a multipart file upload part.
    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }

    /// Selects which response representation the call returns.
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    /// Requires the response status to equal `status` exactly.
    pub fn expect_status(mut self, status: u16) -> Self {
        self.expected_status = Some(status);
        self
    }

    /// Clears the expected-status check; any 2xx counts as success and
    /// anything else yields [`ResponseShape::Absent`].
    ///
    /// [`ResponseShape::Absent`]: crate::ResponseShape::Absent
    pub fn any_status(mut self) -> Self {
        self.expected_status = None;
        self
    }

    /// Overrides the client's default timeout for this call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Method, RequestSpec};
    use crate::{ApiError, ResponseType};

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("delete".parse::<Method>().unwrap(), Method::Delete);
        assert_eq!("Patch".parse::<Method>().unwrap(), Method::Patch);
    }

    #[test]
    fn unsupported_method_is_a_precondition_error() {
        let err = "TRACE".parse::<Method>().unwrap_err();
        assert!(matches!(err, ApiError::Precondition(_)));
    }

    #[test]
    fn spec_defaults_to_json_shape_and_expected_200() {
        let spec = RequestSpec::get("/items");
        assert_eq!(spec.response_type, ResponseType::Json);
        assert_eq!(spec.expected_status, Some(200));
        assert!(spec.timeout.is_none());
    }

    #[test]
    fn any_status_clears_the_expectation() {
        let spec = RequestSpec::post("/items").expect_status(201).any_status();
        assert_eq!(spec.expected_status, None);
    }
}
