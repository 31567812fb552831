use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::model::signup::SignupPayload;

pub const REGISTER_PATH: &str = "/api/auth/register";
const SIGNUP_FAILED: &str = "Signup failed";

#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{0}")]
    Server(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Signup failed: response carried no token")]
    MissingToken,
}

/// The registration endpoint as seen from the client.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Posts the payload once and returns the issued session token.
    async fn register(&self, payload: &SignupPayload) -> Result<String, ClientError>;
}

#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: Client,
    base_url: String,
}

impl HttpAuthApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn register_url(&self) -> String {
        format!("{}{}", self.base_url, REGISTER_PATH)
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn register(&self, payload: &SignupPayload) -> Result<String, ClientError> {
        let url = self.register_url();
        tracing::debug!("POST {} as {}", url, payload.role());

        let res = self.client.post(&url).json(payload).send().await?;
        let status = res.status();
        let data: Value = res.json().await?;

        if !status.is_success() {
            let message = data
                .get("error")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(SIGNUP_FAILED);
            tracing::warn!("signup rejected with {}: {}", status, message);
            return Err(ClientError::Server(message.to_string()));
        }

        data.get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or(ClientError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let api = HttpAuthApi::new("http://localhost:8000/");
        assert_eq!(api.register_url(), "http://localhost:8000/api/auth/register");
    }

    #[test]
    fn server_errors_display_verbatim() {
        assert_eq!(ClientError::Server("X".into()).to_string(), "X");
    }
}
