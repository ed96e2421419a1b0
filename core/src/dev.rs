//! The dev settings dialog: credentials and identity used in debug mode.

use rabbit_config::{KeyValueStore, StoreError, StoreKey};
use rabbit_types::SocialProvider;
use serde::Serialize;

use crate::session::current_provider;

/// User id shown when none is stored.
pub const DEFAULT_DEV_USER_ID: &str = "1";

/// Current dev settings, with the API key masked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DevSettings {
    pub dev_api_key: String,
    pub dev_user_id: String,
    pub social_provider: SocialProvider,
    pub api_base: Option<String>,
}

impl DevSettings {
    #[must_use]
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self {
            dev_api_key: store
                .get(StoreKey::DevApiKey)
                .map(|key| rabbit_utils::mask_secret(&key))
                .unwrap_or_default(),
            dev_user_id: store
                .get_non_empty(StoreKey::DevUserId)
                .unwrap_or_else(|| DEFAULT_DEV_USER_ID.to_string()),
            social_provider: current_provider(store),
            api_base: store.get_non_empty(StoreKey::ApiBase),
        }
    }
}

/// Edits to apply. `None` leaves a value alone; an empty string clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DevSettingsUpdate {
    pub dev_api_key: Option<String>,
    pub dev_user_id: Option<String>,
    pub social_provider: Option<SocialProvider>,
    pub api_base: Option<String>,
}

impl DevSettingsUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dev_api_key.is_none()
            && self.dev_user_id.is_none()
            && self.social_provider.is_none()
            && self.api_base.is_none()
    }

    pub fn apply(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        let text = [
            (StoreKey::DevApiKey, &self.dev_api_key),
            (StoreKey::DevUserId, &self.dev_user_id),
            (StoreKey::ApiBase, &self.api_base),
        ];
        for (key, value) in text {
            match value.as_deref().map(str::trim) {
                Some("") => store.remove(key)?,
                Some(value) => store.set(key, value)?,
                None => {}
            }
        }
        if let Some(provider) = self.social_provider {
            store.set(StoreKey::SocialProvider, provider.as_str())?;
        }
        Ok(())
    }
}
