//! Session state and its persistence seam.
//!
//! The auth token and the user profile are the only durable client-side
//! state; entity data is refetched from the server on every app start.
//! The `KeyValueStore` trait stands in for browser local storage so the
//! session can be exercised headless.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::StoreResult;
use crate::models::user::UserProfile;
use crate::models::validation::validate_profile;

pub const AUTH_TOKEN_KEY: &str = "jobtrack.auth_token";
pub const USER_PROFILE_KEY: &str = "jobtrack.user_profile";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory stand-in for browser local storage.
pub struct MemoryStorage {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.inner.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.inner.lock().remove(key);
    }
}

#[derive(Debug, Clone)]
struct SignedIn {
    token: String,
    profile: UserProfile,
}

/// The signed-in user, restored from storage at construction and kept in
/// sync with it on every change. `terminate` is the process-wide reaction
/// to an authorization failure: it clears both memory and storage.
pub struct Session {
    storage: Arc<dyn KeyValueStore>,
    inner: RwLock<Option<SignedIn>>,
}

impl Session {
    /// Restores a session from storage. A missing token or an unreadable
    /// profile yields a signed-out session rather than an error.
    pub fn restore(storage: Arc<dyn KeyValueStore>) -> Self {
        let restored = match (storage.get(AUTH_TOKEN_KEY), storage.get(USER_PROFILE_KEY)) {
            (Some(token), Some(raw_profile)) => {
                match serde_json::from_str::<UserProfile>(&raw_profile) {
                    Ok(profile) => Some(SignedIn { token, profile }),
                    Err(err) => {
                        warn!("Stored profile is unreadable, discarding session: {err}");
                        storage.remove(AUTH_TOKEN_KEY);
                        storage.remove(USER_PROFILE_KEY);
                        None
                    }
                }
            }
            _ => None,
        };
        Self {
            storage,
            inner: RwLock::new(restored),
        }
    }

    pub fn sign_in(&self, token: String, profile: UserProfile) -> StoreResult<()> {
        validate_profile(&profile).into_result()?;
        self.storage.set(AUTH_TOKEN_KEY, &token);
        if let Ok(raw) = serde_json::to_string(&profile) {
            self.storage.set(USER_PROFILE_KEY, &raw);
        }
        *self.inner.write() = Some(SignedIn { token, profile });
        debug!("Session established");
        Ok(())
    }

    /// Updates the stored profile for the signed-in user.
    pub fn set_profile(&self, profile: UserProfile) -> StoreResult<()> {
        validate_profile(&profile).into_result()?;
        let mut inner = self.inner.write();
        if let Some(signed_in) = inner.as_mut() {
            if let Ok(raw) = serde_json::to_string(&profile) {
                self.storage.set(USER_PROFILE_KEY, &raw);
            }
            signed_in.profile = profile;
        }
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        self.inner.read().as_ref().map(|s| s.token.clone())
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.inner.read().as_ref().map(|s| s.profile.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Ends the session: clears the in-memory state and the persisted keys.
    /// Called on sign-out and whenever a gateway call comes back 401.
    pub fn terminate(&self) {
        warn!("Terminating session");
        self.storage.remove(AUTH_TOKEN_KEY);
        self.storage.remove(USER_PROFILE_KEY);
        *self.inner.write() = None;
    }
}
