//! Test doubles shared by the unit tests.

use std::cell::{Cell, RefCell};

use crate::client::RecipeApi;
use crate::error::{ClientError, ClientResult};
use crate::types::{Difficulty, Recipe, RecipeId, Session, UserId};
use crate::wire::HealthReport;

pub(crate) fn recipe(id: i64, title: &str, difficulty: Difficulty, time: &str) -> Recipe {
    Recipe {
        id: RecipeId(id),
        title: title.to_string(),
        ingredients: vec!["salt".into()],
        instructions: "1. Cook".into(),
        difficulty,
        cooking_time: time.to_string(),
        servings: Some("4".into()),
        created_at: None,
    }
}

/// In-process stand-in for the recipe service that records every call.
#[derive(Default)]
pub(crate) struct FakeApi {
    pub calls: RefCell<Vec<&'static str>>,
    pub server_session: RefCell<Option<Session>>,
    pub recipes: RefCell<Vec<Recipe>>,
    pub next_id: Cell<i64>,
    pub offline: Cell<bool>,
    pub fail_list: Cell<bool>,
    pub fail_delete: Cell<bool>,
    pub register_returns_user: Cell<bool>,
}

impl FakeApi {
    pub fn with_recipes(recipes: Vec<Recipe>) -> Self {
        let next = recipes.iter().map(|r| r.id.0).max().unwrap_or(0) + 1;
        let api = Self::default();
        *api.recipes.borrow_mut() = recipes;
        api.next_id.set(next);
        api
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: &'static str) -> ClientResult<()> {
        self.calls.borrow_mut().push(call);
        if self.offline.get() {
            return Err(ClientError::Network("connection refused".into()));
        }
        Ok(())
    }
}

impl RecipeApi for FakeApi {
    fn check_session(&self) -> ClientResult<Option<Session>> {
        self.record("check_session")?;
        Ok(self.server_session.borrow().clone())
    }

    fn login(&self, username: &str, password: &str) -> ClientResult<Session> {
        self.record("login")?;
        if password != "secret" {
            return Err(ClientError::Server {
                status: 401,
                message: "Invalid credentials".into(),
            });
        }
        Ok(Session::new(7, username))
    }

    fn register(
        &self,
        username: &str,
        _email: &str,
        _password: &str,
    ) -> ClientResult<Option<Session>> {
        self.record("register")?;
        Ok(self
            .register_returns_user
            .get()
            .then(|| Session::new(8, username)))
    }

    fn logout(&self) -> ClientResult<()> {
        self.record("logout")
    }

    fn generate_recipes(
        &self,
        ingredients: &[String],
        _user_id: &UserId,
    ) -> ClientResult<Vec<Recipe>> {
        self.record("generate_recipes")?;
        let id = self.next_id.get().max(1);
        self.next_id.set(id + 1);
        let first = ingredients.first().map(String::as_str).unwrap_or("Mystery");
        let generated = recipe(id, &format!("{first} Stir Fry"), Difficulty::Easy, "15 minutes");
        // Newest first, like the server's listing.
        self.recipes.borrow_mut().insert(0, generated.clone());
        Ok(vec![generated])
    }

    fn list_recipes(&self, _user_id: &UserId) -> ClientResult<Vec<Recipe>> {
        self.record("list_recipes")?;
        if self.fail_list.get() {
            return Err(ClientError::Server {
                status: 500,
                message: "Failed to get recipes".into(),
            });
        }
        Ok(self.recipes.borrow().clone())
    }

    fn delete_recipe(&self, id: RecipeId) -> ClientResult<()> {
        self.record("delete_recipe")?;
        if self.fail_delete.get() {
            return Err(ClientError::Server {
                status: 500,
                message: "Failed to delete recipe".into(),
            });
        }
        self.recipes.borrow_mut().retain(|r| r.id != id);
        Ok(())
    }

    fn health(&self) -> ClientResult<HealthReport> {
        self.record("health")?;
        Ok(HealthReport {
            status: "healthy".into(),
            database: Some("connected".into()),
            openai_available: None,
            timestamp: None,
            error: None,
        })
    }
}
