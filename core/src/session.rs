//! Login state kept in the local store, and the calls that change it.

use rabbit_client::{ApiClient, ApiError, CustomerQuery, Page, Profile};
use rabbit_config::{KeyValueStore, StoreError, StoreKey};
use rabbit_types::{EntityType, SocialProvider};
use serde_json::Value;

/// Keys dropped on logout. `api_base` survives.
const SESSION_KEYS: [StoreKey; 3] = [
    StoreKey::DevUserId,
    StoreKey::DevApiKey,
    StoreKey::AdminAuthToken,
];

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The backend has no session for this caller.
    #[error("not_logged_in")]
    NotLoggedIn,
    #[error("admin login failed: {0}")]
    AdminLoginFailed(#[source] ApiError),
    #[error("social login response carried no redirect_to")]
    MissingRedirect,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Store `token` as the admin token and check it with `admin_ping`.
///
/// A rejected token is removed again so later requests do not carry it.
pub async fn admin_login(client: &ApiClient, token: &str) -> Result<Value, SessionError> {
    let store = client.store();
    store.set(StoreKey::AdminAuthToken, token.trim())?;
    match client.admin_ping().await {
        Ok(pong) => {
            tracing::info!("Admin login accepted");
            Ok(pong)
        }
        Err(e) => {
            if let Err(store_err) = store.remove(StoreKey::AdminAuthToken) {
                tracing::warn!("Failed to clear rejected admin token: {store_err}");
            }
            Err(SessionError::AdminLoginFailed(e))
        }
    }
}

/// Forget the dev identity and admin token.
pub fn logout(store: &dyn KeyValueStore) -> Result<(), StoreError> {
    for key in SESSION_KEYS {
        store.remove(key)?;
    }
    tracing::info!("Logged out");
    Ok(())
}

/// The provider used when none is given: the stored one, else Google.
#[must_use]
pub fn current_provider(store: &dyn KeyValueStore) -> SocialProvider {
    store
        .get_non_empty(StoreKey::SocialProvider)
        .and_then(|raw| match raw.parse() {
            Ok(provider) => Some(provider),
            Err(e) => {
                tracing::warn!("Ignoring stored social provider: {e}");
                None
            }
        })
        .unwrap_or_default()
}

/// Start a social login and return the URL to open.
pub async fn start_social_login(
    client: &ApiClient,
    provider: Option<SocialProvider>,
) -> Result<String, SessionError> {
    let provider = provider.unwrap_or_else(|| current_provider(client.store()));
    let response = client.start_social_login(provider).await?;
    response
        .get("redirect_to")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .ok_or(SessionError::MissingRedirect)
}

/// The signed-in profile.
///
/// In debug mode a profile without a name is filled in from the customer
/// matching `dev_user_id`, or else from the most recent user customer, whose
/// id then becomes the stored `dev_user_id`. Lookup failures keep the
/// profile as the backend returned it.
pub async fn current_profile(client: &ApiClient) -> Result<Profile, SessionError> {
    let me = match client.get_me().await {
        Ok(response) => response.me,
        Err(e) if e.is_not_logged_in() => return Err(SessionError::NotLoggedIn),
        Err(e) => return Err(e.into()),
    };
    if me.has_name() || !client.debug() {
        return Ok(me);
    }

    match debug_fallback(client).await {
        Ok(Some(profile)) => Ok(profile),
        Ok(None) => Ok(me),
        Err(e) => {
            tracing::warn!("Debug profile lookup failed: {e}");
            Ok(me)
        }
    }
}

async fn debug_fallback(client: &ApiClient) -> Result<Option<Profile>, SessionError> {
    let store = client.store();
    let stored_id = store
        .get_non_empty(StoreKey::DevUserId)
        .and_then(|raw| raw.parse::<u64>().ok());

    if let Some(entity_id) = stored_id {
        let query = CustomerQuery {
            entity_type: Some(EntityType::User),
            entity_id: Some(entity_id),
            page: Page::new(1, 0),
            ..CustomerQuery::default()
        };
        if let Some(customer) = first_customer(&client.list_customers(&query).await?) {
            return Ok(Some(customer));
        }
    }

    let query = CustomerQuery {
        entity_type: Some(EntityType::User),
        page: Page::new(1, 0),
        ..CustomerQuery::default()
    };
    let Some(customer) = first_customer(&client.list_customers(&query).await?) else {
        return Ok(None);
    };
    if let Some(user_id) = customer.user_id {
        store.set(StoreKey::DevUserId, &user_id.to_string())?;
        tracing::info!(user_id, "Adopted latest user customer as dev user");
    }
    Ok(Some(customer))
}

fn first_customer(response: &Value) -> Option<Profile> {
    let customer = response.get("customers")?.as_array()?.first()?;
    let text = |field: &str| customer.get(field).and_then(Value::as_str).map(str::to_string);
    Some(Profile {
        user_id: customer.get("entity_id").and_then(Value::as_u64),
        name: Some(text("name").unwrap_or_default()),
        email: Some(text("email").unwrap_or_default()),
    })
}
