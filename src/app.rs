//! Application context: the session store and recipe cache for one client,
//! wired to a [`RecipeApi`]. Created at startup, reset on logout.

use crate::cache::RecipeCache;
use crate::client::RecipeApi;
use crate::error::{ClientError, ClientResult};
use crate::filter::RecipeFilter;
use crate::selection::IngredientSelection;
use crate::session::{AuthState, SessionStore};
use crate::storage::KeyValueStore;
use crate::types::{Recipe, RecipeId, Session, UserId};
use crate::wire::HealthReport;

/// Interactive yes/no prompt used before destructive actions.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied(usize),
    /// A newer load had already been applied; this result was dropped.
    Stale,
    /// No active session, nothing was fetched.
    NoSession,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GenerateOutcome {
    /// The batch the server just generated. Not necessarily equal to what
    /// the cache holds after the refresh.
    pub recipes: Vec<Recipe>,
    /// Whether the follow-up reload succeeded. When it failed the cache kept
    /// its previous contents.
    pub refreshed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    Cancelled,
    Removed { refreshed: bool },
}

pub struct RecipeApp<A: RecipeApi, S: KeyValueStore> {
    api: A,
    session: SessionStore<S>,
    cache: RecipeCache,
}

impl<A: RecipeApi, S: KeyValueStore> RecipeApp<A, S> {
    pub fn new(api: A, storage: S) -> Self {
        Self {
            api,
            session: SessionStore::new(storage),
            cache: RecipeCache::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.current()
    }

    pub fn state(&self) -> AuthState {
        self.session.state()
    }

    pub fn recipes(&self) -> &[Recipe] {
        self.cache.recipes()
    }

    pub fn recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.cache.get(id)
    }

    /// Hydrate from local storage and reconcile with the server. A failed
    /// probe keeps the local session. Only storage errors propagate.
    pub fn restore(&mut self) -> ClientResult<Option<Session>> {
        self.session.hydrate();

        match self.api.check_session() {
            Ok(server) => {
                if let Some(session) = &server {
                    self.drop_foreign_cache(&session.user_id);
                }
                self.session.reconcile_with_server(server)?;
            }
            Err(err) => {
                tracing::info!(error = %err, "auth check failed; keeping client session");
            }
        }
        Ok(self.session.current().cloned())
    }

    /// [`restore`](Self::restore), then load the recipes when a session
    /// exists. A failed load is logged and leaves the cache empty.
    pub fn startup(&mut self) -> ClientResult<Option<Session>> {
        self.restore()?;

        if self.session.current().is_some() {
            if let Err(err) = self.load() {
                tracing::warn!(error = %err, "initial recipe load failed");
            }
        }

        Ok(self.session.current().cloned())
    }

    pub fn login(&mut self, username: &str, password: &str) -> ClientResult<Session> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ClientError::validation("Please enter your username and password."));
        }

        self.session.begin_authentication();
        let session = match self.api.login(username, password) {
            Ok(session) => session,
            Err(err) => {
                self.session.abort_authentication();
                return Err(err);
            }
        };

        if let Err(err) = self.adopt_session(session.clone()) {
            self.session.abort_authentication();
            return Err(err);
        }
        if let Err(err) = self.load() {
            tracing::warn!(error = %err, "recipe load after login failed");
        }
        Ok(session)
    }

    /// Returns `None` when the server accepted the registration without
    /// handing back a user; the caller should then log in.
    pub fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<Option<Session>> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(ClientError::validation("All fields are required."));
        }

        self.session.begin_authentication();
        match self.api.register(username, email, password) {
            Ok(Some(session)) => {
                if let Err(err) = self.adopt_session(session.clone()) {
                    self.session.abort_authentication();
                    return Err(err);
                }
                Ok(Some(session))
            }
            Ok(None) => {
                self.session.abort_authentication();
                Ok(None)
            }
            Err(err) => {
                self.session.abort_authentication();
                Err(err)
            }
        }
    }

    /// Server logout first; local state is only dropped once it succeeded.
    pub fn logout(&mut self) -> ClientResult<()> {
        self.api.logout()?;
        self.session.clear()?;
        self.cache.clear();
        Ok(())
    }

    /// Fetch the whole collection and replace the cache with it.
    pub fn load(&mut self) -> ClientResult<LoadOutcome> {
        let Some(user_id) = self.session.current().map(|s| s.user_id.clone()) else {
            tracing::debug!("skipping recipe load without a session");
            return Ok(LoadOutcome::NoSession);
        };

        let ticket = self.cache.begin_load(&user_id);
        let recipes = self.api.list_recipes(&user_id)?;
        let count = recipes.len();
        if self.cache.apply_load(ticket, recipes) {
            Ok(LoadOutcome::Applied(count))
        } else {
            Ok(LoadOutcome::Stale)
        }
    }

    pub fn generate(&mut self, ingredients: &[String]) -> ClientResult<GenerateOutcome> {
        let user_id = self.require_session("Please login to generate recipes!")?;

        let selection: IngredientSelection = ingredients.iter().collect();
        if selection.is_empty() {
            return Err(ClientError::validation("Please select at least one ingredient!"));
        }

        let recipes = self.api.generate_recipes(selection.as_slice(), &user_id)?;
        tracing::info!(count = recipes.len(), "recipes generated");

        let refreshed = self.refresh("generate");
        Ok(GenerateOutcome { recipes, refreshed })
    }

    /// Delete after confirmation. On failure the cache is left as it was.
    pub fn remove(&mut self, id: RecipeId, confirm: &impl Confirm) -> ClientResult<RemoveOutcome> {
        self.require_session("Please login to manage your recipes!")?;

        let prompt = match self.cache.get(id) {
            Some(recipe) => format!("Delete \"{}\"?", recipe.title),
            None => format!("Delete recipe {id}?"),
        };
        if !confirm.confirm(&prompt) {
            return Ok(RemoveOutcome::Cancelled);
        }

        self.api.delete_recipe(id)?;
        tracing::info!(%id, "recipe deleted");

        let refreshed = self.refresh("delete");
        Ok(RemoveOutcome::Removed { refreshed })
    }

    pub fn filter(&self, filter: &RecipeFilter) -> Vec<Recipe> {
        self.cache.filter(filter)
    }

    pub fn health(&self) -> ClientResult<HealthReport> {
        self.api.health()
    }

    fn require_session(&self, message: &str) -> ClientResult<UserId> {
        self.session
            .current()
            .map(|s| s.user_id.clone())
            .ok_or_else(|| ClientError::validation(message))
    }

    /// Set the session and drop a cache that belongs to another user.
    fn adopt_session(&mut self, session: Session) -> ClientResult<()> {
        self.drop_foreign_cache(&session.user_id);
        self.session.set_session(session)?;
        Ok(())
    }

    fn drop_foreign_cache(&mut self, user_id: &UserId) {
        if self.cache.owner().is_some_and(|owner| owner != user_id) {
            tracing::info!(%user_id, "session changed user; dropping cached recipes");
            self.cache.clear();
        }
    }

    fn refresh(&mut self, after: &str) -> bool {
        match self.load() {
            Ok(LoadOutcome::Applied(_)) => true,
            Ok(_) => false,
            Err(err) => {
                tracing::warn!(error = %err, "reload after {after} failed; keeping previous recipes");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SESSION_KEY;
    use crate::storage::MemoryStore;
    use crate::testing::{FakeApi, recipe};
    use crate::types::Difficulty;
    use std::cell::RefCell;

    fn example_recipes() -> Vec<Recipe> {
        vec![
            recipe(1, "Tomato Soup", Difficulty::Easy, "30 minutes"),
            recipe(2, "Beef Stew", Difficulty::Hard, "1 hour"),
        ]
    }

    fn logged_in_app() -> RecipeApp<FakeApi, MemoryStore> {
        let mut storage = MemoryStore::new();
        storage.store(SESSION_KEY, &Session::new(7, "ana")).unwrap();
        let mut app = RecipeApp::new(FakeApi::with_recipes(example_recipes()), storage);
        app.startup().unwrap();
        app
    }

    fn yes(_: &str) -> bool {
        true
    }

    #[test]
    fn startup_restores_session_and_loads() {
        let app = logged_in_app();
        assert_eq!(app.session(), Some(&Session::new(7, "ana")));
        assert_eq!(app.state(), AuthState::Authenticated);
        assert_eq!(app.recipes(), example_recipes().as_slice());
        assert_eq!(app.api().calls(), vec!["check_session", "list_recipes"]);
    }

    #[test]
    fn startup_adopts_server_session() {
        let api = FakeApi::default();
        *api.server_session.borrow_mut() = Some(Session::new(3, "srv"));
        let mut app = RecipeApp::new(api, MemoryStore::new());

        assert_eq!(app.startup().unwrap(), Some(Session::new(3, "srv")));
    }

    #[test]
    fn startup_offline_keeps_local_session() {
        let mut storage = MemoryStore::new();
        storage.store(SESSION_KEY, &Session::new(7, "ana")).unwrap();
        let api = FakeApi::default();
        api.offline.set(true);
        let mut app = RecipeApp::new(api, storage);

        assert_eq!(app.startup().unwrap(), Some(Session::new(7, "ana")));
        assert!(app.recipes().is_empty());
    }

    #[test]
    fn anonymous_startup_does_not_load() {
        let mut app = RecipeApp::new(FakeApi::default(), MemoryStore::new());
        assert_eq!(app.startup().unwrap(), None);
        assert_eq!(app.api().calls(), vec!["check_session"]);
        assert_eq!(app.load().unwrap(), LoadOutcome::NoSession);
    }

    #[test]
    fn restore_reconciles_without_loading() {
        let mut storage = MemoryStore::new();
        storage.store(SESSION_KEY, &Session::new(7, "ana")).unwrap();
        let mut app = RecipeApp::new(FakeApi::with_recipes(example_recipes()), storage);

        assert_eq!(app.restore().unwrap(), Some(Session::new(7, "ana")));
        assert!(app.recipes().is_empty());
        assert_eq!(app.api().calls(), vec!["check_session"]);
    }

    #[test]
    fn login_persists_and_loads() {
        let mut app = RecipeApp::new(FakeApi::with_recipes(example_recipes()), MemoryStore::new());
        let session = app.login("ana", "secret").unwrap();

        assert_eq!(session, Session::new(7, "ana"));
        assert_eq!(app.recipes().len(), 2);
        let stored: Option<Session> = app.session.storage().load(SESSION_KEY).unwrap();
        assert_eq!(stored, Some(session));
    }

    #[test]
    fn failed_login_stays_anonymous() {
        let mut app = RecipeApp::new(FakeApi::default(), MemoryStore::new());
        let err = app.login("ana", "wrong").unwrap_err();

        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(app.state(), AuthState::Anonymous);
    }

    #[test]
    fn unwritable_storage_fails_login_without_a_session() {
        let mut app = RecipeApp::new(FakeApi::with_recipes(example_recipes()), MemoryStore::failing());
        let err = app.login("ana", "secret").unwrap_err();

        assert!(matches!(err, ClientError::Storage(_)), "{err:?}");
        assert_eq!(app.state(), AuthState::Anonymous);
        assert!(app.recipes().is_empty());
        assert_eq!(app.api().calls(), vec!["login"]);
    }

    #[test]
    fn restore_with_another_server_user_drops_cache() {
        let mut app = logged_in_app();
        assert_eq!(app.recipes().len(), 2);

        *app.api().server_session.borrow_mut() = Some(Session::new(9, "zed"));
        assert_eq!(app.restore().unwrap(), Some(Session::new(9, "zed")));
        assert!(app.recipes().is_empty());
    }

    #[test]
    fn restore_with_same_server_user_keeps_cache() {
        let mut app = logged_in_app();
        *app.api().server_session.borrow_mut() = Some(Session::new(7, "ana"));

        app.restore().unwrap();
        assert_eq!(app.recipes().len(), 2);
    }

    #[test]
    fn register_without_user_needs_login() {
        let mut app = RecipeApp::new(FakeApi::default(), MemoryStore::new());
        assert_eq!(app.register("bo", "bo@example.com", "pw").unwrap(), None);
        assert_eq!(app.state(), AuthState::Anonymous);

        app.api().register_returns_user.set(true);
        assert_eq!(
            app.register("bo", "bo@example.com", "pw").unwrap(),
            Some(Session::new(8, "bo"))
        );
        assert_eq!(app.state(), AuthState::Authenticated);
    }

    #[test]
    fn generate_with_no_ingredients_never_hits_network() {
        let mut app = logged_in_app();
        let before = app.api().calls().len();

        for input in [vec![], vec!["  ".to_string()]] {
            let err = app.generate(&input).unwrap_err();
            assert!(matches!(err, ClientError::Validation(_)));
            assert_eq!(err.to_string(), "Please select at least one ingredient!");
        }
        assert_eq!(app.api().calls().len(), before);
    }

    #[test]
    fn anonymous_actions_are_rejected_locally() {
        let mut app = RecipeApp::new(FakeApi::default(), MemoryStore::new());

        let err = app.generate(&["egg".to_string()]).unwrap_err();
        assert_eq!(err.to_string(), "Please login to generate recipes!");
        assert!(app.remove(RecipeId(1), &yes).is_err());
        assert!(app.api().calls().is_empty());
    }

    #[test]
    fn generate_returns_batch_and_reloads() {
        let mut app = logged_in_app();
        let outcome = app.generate(&["tofu".to_string()]).unwrap();

        assert!(outcome.refreshed);
        assert_eq!(outcome.recipes.len(), 1);
        assert_eq!(app.recipes().len(), 3);
        assert_eq!(app.recipes()[0].id, outcome.recipes[0].id);
        assert_eq!(app.api().calls().last(), Some(&"list_recipes"));
    }

    #[test]
    fn failed_refresh_after_generate_keeps_last_good_cache() {
        let mut app = logged_in_app();
        app.api().fail_list.set(true);

        let outcome = app.generate(&["tofu".to_string()]).unwrap();
        assert!(!outcome.refreshed);
        assert_eq!(app.recipes(), example_recipes().as_slice());
    }

    #[test]
    fn remove_then_reload_drops_the_recipe() {
        let mut app = logged_in_app();
        let outcome = app.remove(RecipeId(1), &yes).unwrap();

        assert_eq!(outcome, RemoveOutcome::Removed { refreshed: true });
        assert!(app.recipe(RecipeId(1)).is_none());
        assert_eq!(app.recipes().len(), 1);
    }

    #[test]
    fn declined_confirmation_sends_nothing() {
        let mut app = logged_in_app();
        let before = app.api().calls().len();
        let prompts = RefCell::new(Vec::new());
        let decline = |prompt: &str| {
            prompts.borrow_mut().push(prompt.to_string());
            false
        };

        assert_eq!(app.remove(RecipeId(2), &decline).unwrap(), RemoveOutcome::Cancelled);
        assert_eq!(app.api().calls().len(), before);
        assert_eq!(prompts.borrow().as_slice(), ["Delete \"Beef Stew\"?"]);
    }

    #[test]
    fn failed_delete_leaves_cache_unchanged() {
        let mut app = logged_in_app();
        app.api().fail_delete.set(true);

        let err = app.remove(RecipeId(1), &yes).unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(app.recipes(), example_recipes().as_slice());
    }

    #[test]
    fn load_failure_is_a_fetch_error() {
        let mut app = logged_in_app();
        app.api().fail_list.set(true);

        let err = app.load().unwrap_err();
        assert!(err.is_fetch_error());
        assert_eq!(app.recipes().len(), 2);
    }

    #[test]
    fn logout_resets_everything() {
        let mut app = logged_in_app();
        app.logout().unwrap();

        assert_eq!(app.state(), AuthState::Anonymous);
        assert!(app.recipes().is_empty());
        let stored: Option<Session> = app.session.storage().load(SESSION_KEY).unwrap();
        assert!(stored.is_none());
    }

    #[test]
    fn failed_logout_keeps_session() {
        let mut app = logged_in_app();
        app.api().offline.set(true);

        assert!(app.logout().is_err());
        assert_eq!(app.state(), AuthState::Authenticated);
        assert_eq!(app.recipes().len(), 2);
    }

    #[test]
    fn filter_example_from_a_loaded_collection() {
        let app = logged_in_app();

        let easy = app.filter(&RecipeFilter {
            difficulty: Some("Easy".into()),
            ..Default::default()
        });
        let thirty = app.filter(&RecipeFilter {
            time: Some("30".into()),
            ..Default::default()
        });

        assert_eq!(easy.iter().map(|r| r.id).collect::<Vec<_>>(), vec![RecipeId(1)]);
        assert_eq!(thirty.iter().map(|r| r.id).collect::<Vec<_>>(), vec![RecipeId(1)]);
        assert_eq!(app.filter(&RecipeFilter::default()), app.recipes());
    }

    #[test]
    fn switching_user_drops_foreign_cache() {
        let mut app = logged_in_app();
        assert_eq!(app.recipes().len(), 2);

        app.api().fail_list.set(true);
        app.login("zed", "secret").unwrap();
        // Same id 7 from the fake, so the cache is kept.
        assert_eq!(app.recipes().len(), 2);

        app.adopt_session(Session::new(99, "other")).unwrap();
        assert!(app.recipes().is_empty());
    }
}
