// Identity Toolkit REST client
use crate::application::identity_provider::{AuthError, IdentityProvider};
use crate::domain::session::User;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OobRequest<'a> {
    request_type: &'a str,
    email: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Email/password accounts over the Identity Toolkit v1 REST API. Sign-out
/// is local: the provider keeps no server-side session for this client.
pub struct IdentityClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    state: watch::Sender<Option<User>>,
}

impl IdentityClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let (state, _) = watch::channel(None);
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            state,
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/accounts:{}?key={}",
            self.base_url,
            method,
            urlencoding::encode(&self.api_key)
        )
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, AuthError> {
        let response = self.client.post(self.endpoint(method)).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let code = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", status));
            return Err(map_error_code(&code));
        }

        Ok(response.json::<T>().await?)
    }

    async fn password_call(&self, method: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let account: AccountResponse = self.post(method, &request).await?;
        let user = User {
            uid: account.local_id,
            email: if account.email.is_empty() {
                email.to_string()
            } else {
                account.email
            },
        };
        self.state.send_replace(Some(user.clone()));
        Ok(user)
    }
}

/// Provider error codes look like `EMAIL_EXISTS` or `WEAK_PASSWORD : <detail>`
fn map_error_code(message: &str) -> AuthError {
    let code = message.split(" : ").next().unwrap_or(message).trim();
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            AuthError::InvalidCredentials
        }
        "EMAIL_EXISTS" => AuthError::EmailInUse,
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
        "WEAK_PASSWORD" | "MISSING_PASSWORD" => AuthError::WeakPassword,
        other => AuthError::Provider(other.to_string()),
    }
}

#[async_trait]
impl IdentityProvider for IdentityClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.password_call("signInWithPassword", email, password).await
    }

    async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.password_call("signUp", email, password).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.state.send_replace(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let request = OobRequest {
            request_type: "PASSWORD_RESET",
            email,
        };
        let _: serde_json::Value = self.post("sendOobCode", &request).await?;
        Ok(())
    }

    fn auth_state(&self) -> BoxStream<'static, Option<User>> {
        WatchStream::new(self.state.subscribe()).boxed()
    }
}
