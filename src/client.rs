use reqwest::{header, multipart, redirect, Proxy};
use tokio::time::sleep;
use url::Url;

use crate::{
    response::status_code_20x, ApiError, ClientOptions, FilePart, RequestSpec, ResponseShape,
    Result,
};

/// Resilient HTTP API client.
///
/// Owns a base URL, a shared `reqwest` connection pool and a retry policy.
/// All requests go through [`ApiClient::api_request`], so connection reuse
/// and retry behavior apply uniformly. The client is cheap to clone and safe
/// to share across tasks; concurrent callers share the same pool.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    options: ClientOptions,
}

impl ApiClient {
    /// Creates a client with default [`ClientOptions`].
    ///
    /// Fails when the base URL does not parse.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref()).map_err(ApiError::Url)?;
        let options = ClientOptions::default();
        let http = build_pool(&options)?;
        Ok(Self {
            http,
            base_url,
            options,
        })
    }

    /// Applies client options such as timeout, retry and TLS behavior.
    ///
    /// Rebuilds the connection pool, since TLS verification, redirect policy
    /// and proxying bind at pool construction.
    pub fn with_options(mut self, options: ClientOptions) -> Result<Self> {
        self.http = build_pool(&options)?;
        self.options = options;
        Ok(self)
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Issues one HTTP request and returns the selected response shape.
    ///
    /// The path is resolved against the base URL with standard join
    /// semantics: absolute paths replace the base path, relative paths are
    /// appended. Transient failures (retryable statuses, timeouts,
    /// connection errors) are retried internally per the client's
    /// [`RetryPolicy`]; the caller only observes the final outcome.
    ///
    /// When the request spec carries an expected status and the response differs,
    /// the call fails with [`ApiError::UnexpectedStatus`] before any body is
    /// read, even if the actual status is a 2xx. Without an expectation, a
    /// non-2xx response yields [`ResponseShape::Absent`].
    ///
    /// [`RetryPolicy`]: crate::RetryPolicy
    pub async fn api_request(&self, spec: RequestSpec) -> Result<ResponseShape> {
        let url = self.resolve_url(&spec.path)?;
        tracing::info!(method = %spec.method, url = %url, "issuing api request");

        let response = self.send_with_retry(&spec, &url).await?;
        let status = response.status();

        if let Some(expected) = spec.expected_status {
            if status.as_u16() != expected {
                return Err(ApiError::UnexpectedStatus {
                    expected,
                    actual: status.as_u16(),
                });
            }
        }
        if !status_code_20x(status.as_u16()) {
            return Ok(ResponseShape::Absent);
        }

        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|err| {
            tracing::error!(error = %err, "failed to read response body");
            ApiError::Transport(err)
        })?;
        Ok(ResponseShape::from_parts(
            spec.response_type,
            status,
            headers,
            body,
        ))
    }

    fn resolve_url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(ApiError::Url)
    }

    async fn send_with_retry(&self, spec: &RequestSpec, url: &Url) -> Result<reqwest::Response> {
        let policy = &self.options.retry;
        let mut attempt = 0u32;
        loop {
            // Rebuilt per attempt; bodies are owned so this never fails on
            // a consumed stream.
            let request = self.build_request(spec, url.clone())?;
            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if policy.is_retryable_status(status) {
                        if attempt + 1 < policy.max_attempts {
                            self.wait_before_retry(attempt).await;
                            attempt += 1;
                            continue;
                        }
                        tracing::error!(
                            status,
                            attempts = policy.max_attempts,
                            "retries exhausted"
                        );
                        return Err(ApiError::RetryExhausted {
                            status,
                            attempts: policy.max_attempts,
                        });
                    }
                    return Ok(response);
                }
                Err(err) => {
                    if should_retry_transport(&err) && attempt + 1 < policy.max_attempts {
                        self.wait_before_retry(attempt).await;
                        attempt += 1;
                        continue;
                    }
                    tracing::error!(error = %err, "transport failure");
                    return Err(ApiError::Transport(err));
                }
            }
        }
    }

    fn build_request(&self, spec: &RequestSpec, url: Url) -> Result<reqwest::RequestBuilder> {
        let mut builder = self
            .http
            .request(spec.method.as_reqwest(), url)
            .timeout(spec.timeout.unwrap_or(self.options.timeout));

        if let Some(payload) = &spec.payload {
            builder = builder.json(payload);
        }
        if let Some(data) = &spec.data {
            builder = builder.body(data.clone());
        }
        if let Some(form) = &spec.form {
            builder = builder.form(form);
        }
        for (name, value) in &spec.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !spec.params.is_empty() {
            builder = builder.query(&spec.params);
        }
        if let Some((user, password)) = &spec.auth {
            builder = builder.basic_auth(user, password.as_deref());
        }
        if !spec.cookies.is_empty() {
            builder = builder.header(header::COOKIE, cookie_header(&spec.cookies));
        }
        if !spec.files.is_empty() {
            builder = builder.multipart(multipart_form(&spec.files)?);
        }
        Ok(builder)
    }

    async fn wait_before_retry(&self, retries_done: u32) {
        let delay = self.options.retry.backoff_delay(retries_done);
        tracing::debug!(delay_ms = delay.as_millis() as u64, "retrying request");
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

fn build_pool(options: &ClientOptions) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if !options.verify_tls {
        builder = builder.danger_accept_invalid_certs(true);
    }
    if !options.allow_redirects {
        builder = builder.redirect(redirect::Policy::none());
    }
    if let Some(proxy) = &options.proxy {
        builder = builder.proxy(Proxy::all(proxy).map_err(ApiError::Transport)?);
    }
    builder.build().map_err(ApiError::Transport)
}

fn should_retry_transport(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
}

fn cookie_header(cookies: &[(String, String)]) -> String {
    cookies
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn multipart_form(files: &[FilePart]) -> Result<multipart::Form> {
    let mut form = multipart::Form::new();
    for file in files {
        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime)
            .map_err(ApiError::Transport)?;
        form = form.part(file.name.clone(), part);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::{cookie_header, ApiClient};
    use crate::ApiError;

    #[test]
    fn relative_paths_append_to_the_base_path() {
        let client = ApiClient::new("http://localhost:9009/api/").unwrap();
        let url = client.resolve_url("items").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9009/api/items");
    }

    #[test]
    fn absolute_paths_replace_the_base_path() {
        let client = ApiClient::new("http://localhost:9009/api/").unwrap();
        let url = client.resolve_url("/token").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9009/token");
    }

    #[test]
    fn invalid_base_url_is_rejected_at_construction() {
        let err = ApiClient::new("not a url").unwrap_err();
        assert!(matches!(err, ApiError::Url(_)));
    }

    #[test]
    fn cookie_header_joins_pairs() {
        let cookies = vec![
            ("session".to_owned(), "abc".to_owned()),
            ("theme".to_owned(), "dark".to_owned()),
        ];
        assert_eq!(cookie_header(&cookies), "session=abc; theme=dark");
    }
}
