use crate::ConfigFileSection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// An OAuth access token issued by VK for one application, as returned by the
/// `access_token` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Lifetime in seconds. `0` means the token does not expire.
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Access tokens of the VK applications a service is registered with, keyed by application ID.
///
/// There is at most one token per application and the last write wins. The registry is meant to
/// be built once by the calling code and shared by reference (or in an `Arc`).
#[derive(Default)]
pub struct TokenRegistry {
    callback_url: String,
    secrets: HashMap<String, String>,
    tokens: RwLock<HashMap<String, AccessToken>>,
}

impl TokenRegistry {
    /// Register the VK applications a service works with: the OAuth callback URL and the secret
    /// of each application. No tokens are cached until [`add_token`](Self::add_token) is called.
    pub fn register_apps(
        callback_url: impl Into<String>,
        app_secrets: HashMap<String, String>,
    ) -> Self {
        Self {
            callback_url: callback_url.into(),
            secrets: app_secrets,
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Build the registry from the `callback_url` and `app_secrets` keys of a config section.
    pub fn from_config_section(section: &ConfigFileSection) -> Self {
        Self::register_apps(
            section.callback_url.clone().unwrap_or_default(),
            section.app_secrets.clone().unwrap_or_default(),
        )
    }

    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    pub fn app_secret(&self, app_id: &str) -> Option<&str> {
        self.secrets.get(app_id).map(String::as_str)
    }

    /// Store the token for `app_id`, replacing any token cached before.
    pub fn add_token(&self, app_id: impl Into<String>, token: AccessToken) {
        let app_id = app_id.into();
        debug!(app_id = %app_id, expires_in = token.expires_in, "caching VK access token");
        // A single insert cannot leave the map inconsistent, so a poisoned lock is still usable.
        let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        tokens.insert(app_id, token);
    }

    /// The cached token for `app_id`, if any. A miss does not start an authentication flow.
    pub fn token(&self, app_id: &str) -> Option<AccessToken> {
        let tokens = self.tokens.read().unwrap_or_else(PoisonError::into_inner);
        tokens.get(app_id).cloned()
    }

    pub fn remove_token(&self, app_id: &str) -> Option<AccessToken> {
        let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        tokens.remove(app_id)
    }

    pub fn len(&self) -> usize {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
