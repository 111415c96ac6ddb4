//! Request and response bodies of the recipe service, and the single place
//! where its inconsistent response shapes are normalized.

use serde::{Deserialize, Serialize};

use crate::types::{Recipe, Session, UserId};

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub ingredients: &'a [String],
    pub user_id: &'a UserId,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckAuthResponse {
    #[serde(default)]
    pub user: Option<Session>,
}

/// Login and registration replies. Seen as `{user: {id, username}}`,
/// `{user_id, username}` and `{message, user_id}`.
#[derive(Debug, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub user: Option<Session>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AuthResponse {
    /// `submitted_username` fills in replies that only carry an id.
    pub fn into_session(self, submitted_username: &str) -> Option<Session> {
        if let Some(user) = self.user {
            return Some(user);
        }
        let user_id = self.user_id?;
        Some(Session {
            user_id,
            username: self
                .username
                .unwrap_or_else(|| submitted_username.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecipeListResponse {
    Wrapped { recipes: Vec<Recipe> },
    Bare(Vec<Recipe>),
}

impl RecipeListResponse {
    pub fn into_recipes(self) -> Vec<Recipe> {
        match self {
            RecipeListResponse::Wrapped { recipes } | RecipeListResponse::Bare(recipes) => recipes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Pull the human-readable reason out of a failure body, preferring `error`
/// over `message`.
pub fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
