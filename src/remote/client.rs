use std::sync::{Arc, Mutex};

use reqwest::RequestBuilder;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::SupabaseConfig;
use crate::state::data::UserIdentity;

use super::RemoteError;

/// Signed-in session
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub user: UserIdentity,
}

/// User object as returned by the auth endpoints
#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: Value,
}

impl From<AuthUser> for UserIdentity {
    fn from(user: AuthUser) -> Self {
        let display_name = user
            .user_metadata
            .get("display_name")
            .and_then(Value::as_str)
            .map(str::to_string);
        UserIdentity {
            id: user.id,
            email: user.email,
            display_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

/// HTTP client for one Supabase project
#[derive(Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    config: SupabaseConfig,
    session: Arc<Mutex<Option<Session>>>,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("url", &self.config.url)
            .field("signed_in", &self.current_user().is_some())
            .finish()
    }
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Reuse an existing [`reqwest::Client`] for connection pooling
    pub fn with_client(client: reqwest::Client, config: SupabaseConfig) -> Self {
        Self {
            client,
            config,
            session: Arc::new(Mutex::new(None)),
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// The signed-in user, if any. No network round trip.
    pub fn current_user(&self) -> Option<UserIdentity> {
        self.session
            .lock()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.user.clone()))
    }

    fn access_token(&self) -> Option<String> {
        self.session
            .lock()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.access_token.clone()))
    }

    fn set_session(&self, session: Option<Session>) {
        if let Ok(mut guard) = self.session.lock() {
            *guard = session;
        }
    }

    // ---- identity ----

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity, RemoteError> {
        let response = self
            .client
            .post(self.endpoint("/auth/v1/token?grant_type=password"))
            .header("apikey", &self.config.anon_key)
            .json(&json!({ "email": email.trim(), "password": password }))
            .send()
            .await?;

        let token: TokenResponse = Self::parse_response(response).await?;
        let user = UserIdentity::from(token.user);
        self.set_session(Some(Session {
            access_token: token.access_token,
            user: user.clone(),
        }));
        log::info!("🔑 Signed in as {}", user.name());

        if let Err(e) = self.ensure_profile(&user).await {
            log::warn!("⚠️  Could not ensure profile for {}: {e}", user.id);
        }
        Ok(user)
    }

    /// Create an account. Returns `None` when the project requires email
    /// confirmation before the first sign-in.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Option<UserIdentity>, RemoteError> {
        let mut data = json!({});
        if let Some(name) = display_name.map(str::trim).filter(|n| !n.is_empty()) {
            data["display_name"] = json!(name);
        }

        let response = self
            .client
            .post(self.endpoint("/auth/v1/signup"))
            .header("apikey", &self.config.anon_key)
            .json(&json!({ "email": email.trim(), "password": password, "data": data }))
            .send()
            .await?;

        let body: Value = Self::parse_response(response).await?;
        if body.get("access_token").is_none() {
            log::info!("📧 Account created for {email}, awaiting confirmation");
            return Ok(None);
        }

        let token: TokenResponse = serde_json::from_value(body)
            .map_err(|e| RemoteError::UnexpectedResponse(e.to_string()))?;
        let user = UserIdentity::from(token.user);
        self.set_session(Some(Session {
            access_token: token.access_token,
            user: user.clone(),
        }));
        Ok(Some(user))
    }

    /// Drop the session. The local session is cleared even if the
    /// server call fails.
    pub async fn sign_out(&self) -> Result<(), RemoteError> {
        let Some(token) = self.access_token() else {
            return Ok(());
        };
        self.set_session(None);

        let response = self
            .client
            .post(self.endpoint("/auth/v1/logout"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Create the `profiles` row for a user if it is missing
    async fn ensure_profile(&self, user: &UserIdentity) -> Result<(), RemoteError> {
        let response = self
            .rest_get("profiles")
            .query(&[("select", "id".to_string()), ("id", format!("eq.{}", user.id))])
            .send()
            .await?;
        let existing: Vec<Value> = Self::parse_response(response).await?;
        if !existing.is_empty() {
            return Ok(());
        }

        let response = self
            .rest_post("profiles")
            .json(&json!({
                "id": user.id,
                "email": user.email,
                "display_name": user.name(),
            }))
            .send()
            .await?;
        Self::check_status(response).await
    }

    // ---- request helpers ----

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.url, path)
    }

    /// Public URL of an object in a storage bucket
    pub(crate) fn public_object_url(&self, bucket: &str, path: &str) -> String {
        self.endpoint(&format!("/storage/v1/object/public/{bucket}/{path}"))
    }

    /// Attach the project key and the user's token (or the anon key)
    pub(crate) fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self
            .access_token()
            .unwrap_or_else(|| self.config.anon_key.clone());
        request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(token)
    }

    pub(crate) fn rest_get(&self, table: &str) -> RequestBuilder {
        self.authorize(self.client.get(self.endpoint(&format!("/rest/v1/{table}"))))
    }

    pub(crate) fn rest_post(&self, table: &str) -> RequestBuilder {
        self.authorize(self.client.post(self.endpoint(&format!("/rest/v1/{table}"))))
    }

    pub(crate) fn rest_patch(&self, table: &str) -> RequestBuilder {
        self.authorize(self.client.patch(self.endpoint(&format!("/rest/v1/{table}"))))
    }

    pub(crate) fn rest_delete(&self, table: &str) -> RequestBuilder {
        self.authorize(self.client.delete(self.endpoint(&format!("/rest/v1/{table}"))))
    }

    pub(crate) fn rpc(&self, function: &str) -> RequestBuilder {
        self.authorize(self.client.post(self.endpoint(&format!("/rest/v1/rpc/{function}"))))
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or [`RemoteError::ApiError`] with
    /// the status and body text on failure.
    pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RemoteError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    pub(crate) async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RemoteError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    pub(crate) async fn check_status(response: reqwest::Response) -> Result<(), RemoteError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
