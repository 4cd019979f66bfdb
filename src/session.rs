use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use tracing::{info, warn};

use crate::model::Role;
use crate::ui::Ui;

pub const TOKEN_KEY: &str = "token";
pub const ROLE_KEY: &str = "role";
pub const USER_KEY: &str = "user";

/// Tab-scoped key/value storage holding the session.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Volatile store used outside the browser.
#[derive(Default, Debug)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn with_session(token: &str, role: Role) -> Self {
        let store = Self::default();
        store.set(TOKEN_KEY, token);
        store.set(ROLE_KEY, role.as_str());
        store
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// The authenticated context handed to every page controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: Role,
}

/// Where an unauthenticated visitor has to go instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect(pub String);

#[derive(Clone)]
pub struct SessionGuard {
    store: Rc<dyn SessionStore>,
    login_route: String,
}

impl SessionGuard {
    pub fn new(store: Rc<dyn SessionStore>, login_route: impl Into<String>) -> Self {
        Self {
            store,
            login_route: login_route.into(),
        }
    }

    /// Returns the session when a token is present and the stored role is
    /// `role`, otherwise the login redirect.
    pub fn require(&self, role: Role) -> Result<Session, Redirect> {
        let token = self.store.get(TOKEN_KEY).filter(|t| !t.is_empty());
        let stored_role = self.store.get(ROLE_KEY);

        match (token, stored_role) {
            (Some(token), Some(stored)) if stored == role.as_str() => Ok(Session { token, role }),
            (None, _) => {
                info!("no session token, redirecting to {}", self.login_route);
                Err(Redirect(self.login_route.clone()))
            }
            (Some(_), stored) => {
                warn!("role {:?} cannot open a {} page", stored, role);
                Err(Redirect(self.login_route.clone()))
            }
        }
    }

    pub fn cache_profile<P: Serialize>(&self, profile: &P) {
        match serde_json::to_string(profile) {
            Ok(json) => self.store.set(USER_KEY, &json),
            Err(e) => warn!("profile not cached: {:?}", e),
        }
    }

    pub fn cached_profile(&self) -> Option<String> {
        self.store.get(USER_KEY)
    }

    /// Drops token, role and cached profile, then sends the user to login.
    pub fn logout<U: Ui>(&self, ui: &U) {
        self.store.remove(TOKEN_KEY);
        self.store.remove(ROLE_KEY);
        self.store.remove(USER_KEY);
        info!("session cleared");
        ui.navigate(&self.login_route);
    }
}
