//! Recipe service API client
//!
//! [`RecipeApi`] is the seam between the client state and the network;
//! [`HttpClient`] implements it over `ureq`. Response-shape differences are
//! handled by [`crate::wire`], so every method here returns normalized types.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, ClientResult};
use crate::metadata::USER_AGENT;
use crate::types::{Recipe, RecipeId, Session, UserId};
use crate::wire::{
    self, AuthResponse, CheckAuthResponse, GenerateRequest, GenerateResponse, HealthReport,
    LoginRequest, RecipeListResponse, RegisterRequest,
};

/// Calls consumed from the recipe service.
pub trait RecipeApi {
    /// `Ok(None)` means the server answered but has no session for us.
    fn check_session(&self) -> ClientResult<Option<Session>>;
    fn login(&self, username: &str, password: &str) -> ClientResult<Session>;
    /// Some server variants only acknowledge registration without a user.
    fn register(&self, username: &str, email: &str, password: &str)
    -> ClientResult<Option<Session>>;
    fn logout(&self) -> ClientResult<()>;
    fn generate_recipes(&self, ingredients: &[String], user_id: &UserId)
    -> ClientResult<Vec<Recipe>>;
    fn list_recipes(&self, user_id: &UserId) -> ClientResult<Vec<Recipe>>;
    fn delete_recipe(&self, id: RecipeId) -> ClientResult<()>;
    fn health(&self) -> ClientResult<HealthReport>;
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base_url: String,
    pub timeout: Duration,
}

/// Blocking HTTP client for the recipe service. The agent keeps a cookie
/// jar, so a server-side session set by login is sent on later calls.
pub struct HttpClient {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpClient {
    pub fn new(config: HttpConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Dispatch a request and turn transport failures and non-2xx statuses
    /// into [`ClientError`]s. `action` names the call in error messages.
    fn send(
        &self,
        request: ureq::Request,
        body: Option<serde_json::Value>,
        action: &str,
    ) -> ClientResult<ureq::Response> {
        tracing::debug!(method = request.method(), url = request.url(), "{action}");

        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };

        match result {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(status, response)) => {
                let text = response.into_string().unwrap_or_default();
                let message = wire::error_message(&text, &format!("{action} failed: HTTP {status}"));
                tracing::debug!(status, %message, "{action} rejected");
                Err(ClientError::Server { status, message })
            }
            Err(ureq::Error::Transport(transport)) => Err(ClientError::Network(format!(
                "{action}: {transport}"
            ))),
        }
    }

    fn decode<T: DeserializeOwned>(response: ureq::Response, action: &str) -> ClientResult<T> {
        let text = response
            .into_string()
            .map_err(|e| ClientError::Network(format!("Failed to read {action} response: {e}")))?;
        serde_json::from_str(&text)
            .map_err(|e| ClientError::Protocol(format!("{action}: {e}")))
    }

    fn json_body<T: Serialize>(body: &T) -> ClientResult<serde_json::Value> {
        Ok(serde_json::to_value(body)?)
    }
}

impl RecipeApi for HttpClient {
    fn check_session(&self) -> ClientResult<Option<Session>> {
        let request = self.agent.get(&self.url("/api/check-auth"));
        let response = self.send(request, None, "check session")?;
        let reply: CheckAuthResponse = Self::decode(response, "check session")?;
        Ok(reply.user)
    }

    fn login(&self, username: &str, password: &str) -> ClientResult<Session> {
        let body = Self::json_body(&LoginRequest { username, password })?;
        let request = self.agent.post(&self.url("/api/login"));
        let response = self.send(request, Some(body), "login")?;
        let reply: AuthResponse = Self::decode(response, "login")?;
        reply
            .into_session(username)
            .ok_or_else(|| ClientError::Protocol("login reply carried no user".to_string()))
    }

    fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<Option<Session>> {
        let body = Self::json_body(&RegisterRequest {
            username,
            email,
            password,
        })?;
        let request = self.agent.post(&self.url("/api/register"));
        let response = self.send(request, Some(body), "register")?;
        let reply: AuthResponse = Self::decode(response, "register")?;
        Ok(reply.into_session(username))
    }

    fn logout(&self) -> ClientResult<()> {
        let request = self.agent.post(&self.url("/api/logout"));
        self.send(request, None, "logout")?;
        Ok(())
    }

    fn generate_recipes(
        &self,
        ingredients: &[String],
        user_id: &UserId,
    ) -> ClientResult<Vec<Recipe>> {
        let body = Self::json_body(&GenerateRequest {
            ingredients,
            user_id,
        })?;
        let request = self.agent.post(&self.url("/api/generate-recipes"));
        let response = self.send(request, Some(body), "generate recipes")?;
        let reply: GenerateResponse = Self::decode(response, "generate recipes")?;
        if let Some(message) = &reply.message {
            tracing::debug!(%message, count = reply.recipes.len(), "generation finished");
        }
        Ok(reply.recipes)
    }

    fn list_recipes(&self, user_id: &UserId) -> ClientResult<Vec<Recipe>> {
        let request = self
            .agent
            .get(&self.url("/api/recipes"))
            .query("user_id", &user_id.to_string());
        let response = self.send(request, None, "load recipes")?;
        let reply: RecipeListResponse = Self::decode(response, "load recipes")?;
        Ok(reply.into_recipes())
    }

    fn delete_recipe(&self, id: RecipeId) -> ClientResult<()> {
        let request = self.agent.delete(&self.url(&format!("/api/recipes/{id}")));
        self.send(request, None, "delete recipe")?;
        Ok(())
    }

    fn health(&self) -> ClientResult<HealthReport> {
        let request = self.agent.get(&self.url("/api/health"));
        let response = self.send(request, None, "health check")?;
        Self::decode(response, "health check")
    }
}

/// Build a client from a connection string such as `localhost:5000` or
/// `https://recipes.example.com`.
pub fn create_http_client(connection_string: &str, timeout: Duration) -> HttpClient {
    HttpClient::new(HttpConfig {
        base_url: normalize_base_url(connection_string),
        timeout,
    })
}

pub fn normalize_base_url(connection_string: &str) -> String {
    let trimmed = connection_string.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}
