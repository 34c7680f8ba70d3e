//! Session API trait and its HTTP implementation

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::ApiError;
use crate::types::{Credentials, ErrorBody, LoginResponse, Registration, SessionStatus};
use crate::Result;

const LOGIN_PATH: &str = "login";
const LOGOUT_PATH: &str = "logout";
const LOGGED_IN_PATH: &str = "loggedIn";
const REGISTER_PATH: &str = "register";

/// The four wire operations the session layer consumes.
#[async_trait]
pub trait SessionApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse>;
    async fn logout(&self) -> Result<()>;
    async fn get_logged_in(&self) -> Result<SessionStatus>;
    async fn register(&self, registration: &Registration) -> Result<LoginResponse>;
}

/// `SessionApi` over HTTP. The server issues a session cookie on login; the
/// client's cookie store carries it on every subsequent request.
pub struct HttpSessionApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpSessionApi {
    pub fn new(base_url: &str) -> Result<Self> {
        // A trailing slash keeps Url::join from replacing the last path
        // segment of the base.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)?;

        let client = reqwest::Client::builder().cookie_store(true).build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.client.get(self.endpoint(path)?).send().await?;
        Self::decode(response).await
    }

    /// Map a response to a payload or to the two failure shapes: a 400-class
    /// body carrying `errorMessage` becomes `Rejected`, anything else a bare
    /// `UnexpectedStatus`.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        if status.is_client_error() {
            if let Ok(body) = response.json::<ErrorBody>().await {
                return Err(ApiError::Rejected {
                    status: status.as_u16(),
                    message: body.error_message,
                });
            }
        }

        Err(ApiError::UnexpectedStatus(status.as_u16()))
    }
}

#[async_trait]
impl SessionApi for HttpSessionApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        tracing::debug!(username = %credentials.username, "POST /login");
        self.post_json(LOGIN_PATH, credentials).await
    }

    async fn logout(&self) -> Result<()> {
        tracing::debug!("GET /logout");
        let response = self.client.get(self.endpoint(LOGOUT_PATH)?).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::UnexpectedStatus(status.as_u16()))
        }
    }

    async fn get_logged_in(&self) -> Result<SessionStatus> {
        tracing::debug!("GET /loggedIn");
        self.get_json(LOGGED_IN_PATH).await
    }

    async fn register(&self, registration: &Registration) -> Result<LoginResponse> {
        tracing::debug!(username = %registration.username, "POST /register");
        self.post_json(REGISTER_PATH, registration).await
    }
}
