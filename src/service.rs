use serde_json::Value as JsonValue;

use crate::{ApiClient, ApiError, RequestSpec, ResponseShape, Result};

const LOGIN_PATH: &str = "/token";
const ITEM_PATH: &str = "/items";

/// Token-authenticated item API on top of [`ApiClient`].
///
/// `login` must complete before `add_item`/`get_item`; calling them without a
/// token fails with [`ApiError::Precondition`] before any request is issued.
#[derive(Clone, Debug)]
pub struct ItemService {
    client: ApiClient,
    auth_token: Option<String>,
}

impl ItemService {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            auth_token: None,
        }
    }

    /// The access token obtained by [`ItemService::login`], if any.
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Performs an OAuth password-grant login and stores the access token.
    ///
    /// Sends `grant_type=password` with the credentials as a form body to
    /// `/token` and expects a 200 response whose JSON carries an
    /// `access_token` field.
    pub async fn login(&mut self, user: &str, password: &str) -> Result<()> {
        if user.is_empty() || password.is_empty() {
            return Err(ApiError::Precondition(
                "login requires a non-empty user and password".to_owned(),
            ));
        }

        let spec = RequestSpec::post(LOGIN_PATH).form([
            ("grant_type", "password"),
            ("username", user),
            ("password", password),
        ]);
        let shape = self.client.api_request(spec).await?;

        let token = shape
            .json()
            .and_then(|body| body.get("access_token"))
            .and_then(JsonValue::as_str)
            .ok_or_else(|| {
                ApiError::Decode("login response did not include an access token".to_owned())
            })?;
        self.auth_token = Some(token.to_owned());
        Ok(())
    }

    /// Creates an item; the server is expected to answer 201.
    pub async fn add_item(&self, body: JsonValue) -> Result<ResponseShape> {
        let token = self.require_token()?;
        let spec = RequestSpec::post(ITEM_PATH)
            .bearer_auth(token)
            .json(body)
            .expect_status(201);
        self.client.api_request(spec).await
    }

    /// Fetches an item by id; the server is expected to answer 200.
    pub async fn get_item(&self, item_id: &str) -> Result<ResponseShape> {
        let token = self.require_token()?;
        if item_id.is_empty() {
            return Err(ApiError::Precondition(
                "item_id must not be empty".to_owned(),
            ));
        }
        let spec = RequestSpec::get(format!("{ITEM_PATH}/{item_id}")).bearer_auth(token);
        self.client.api_request(spec).await
    }

    fn require_token(&self) -> Result<&str> {
        self.auth_token
            .as_deref()
            .ok_or_else(|| ApiError::Precondition("auth token is not set; login first".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ItemService;
    use crate::{ApiClient, ApiError};

    fn service() -> ItemService {
        ItemService::new(ApiClient::new("http://localhost:9009").unwrap())
    }

    #[tokio::test]
    async fn login_rejects_empty_credentials_before_any_io() {
        let mut service = service();
        let err = service.login("", "secret1").await.unwrap_err();
        assert!(matches!(err, ApiError::Precondition(_)));
        assert!(service.auth_token().is_none());
    }

    #[tokio::test]
    async fn item_operations_require_a_token() {
        let service = service();
        let add = service.add_item(json!({"item_id": 1})).await.unwrap_err();
        let get = service.get_item("1").await.unwrap_err();
        assert!(matches!(add, ApiError::Precondition(_)));
        assert!(matches!(get, ApiError::Precondition(_)));
    }
}
