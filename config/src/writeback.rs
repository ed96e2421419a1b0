use serde::{Deserialize, Serialize};

use crate::{BuildEnv, KeyValueStore, StoreKey};

/// Diagnostic record of the build environment at the moment of write-back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvSnapshot {
    pub env_api_base: String,
    pub env_debug: Option<String>,
    pub time: String,
}

/// Copy the build API base into the local store and record a snapshot.
///
/// Does nothing unless write-back is enabled. Store failures are logged and
/// swallowed; startup never fails because of this.
pub fn write_env_on_start(env: &BuildEnv, store: &dyn KeyValueStore) -> Option<EnvSnapshot> {
    if !env.write_env_on_start() {
        return None;
    }

    let api_base = env.api_base().trim();
    if !api_base.is_empty()
        && let Err(e) = store.set(StoreKey::ApiBase, api_base)
    {
        tracing::warn!("Env write-back could not store api_base: {e}");
    }

    let snapshot = EnvSnapshot {
        env_api_base: env.api_base().to_string(),
        env_debug: env.debug_raw().map(str::to_string),
        time: chrono::Utc::now().to_rfc3339(),
    };
    match serde_json::to_string(&snapshot) {
        Ok(json) => {
            if let Err(e) = store.set(StoreKey::EnvWritebackSnapshot, &json) {
                tracing::warn!("Env write-back could not store snapshot: {e}");
            }
        }
        Err(e) => tracing::warn!("Env write-back could not encode snapshot: {e}"),
    }

    tracing::info!(api_base = %snapshot.env_api_base, "Wrote build environment to local store");
    Some(snapshot)
}
