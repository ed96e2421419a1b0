use std::sync::Arc;

use rabbit_config::{BuildEnv, KeyValueStore, StoreKey};
use rabbit_types::ReportFormat;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::{
    ApiError, ApiPath, Query, ReportOutput, headers, http_client, read_capped_error_body,
    resolve_api_base,
};

/// Client for the RabbitRelay backend.
///
/// The API base and auth headers are recomputed for every request from the
/// build environment and the local store, so a change made through the store
/// (e.g. `dev set --base`) applies to the very next call.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    env: BuildEnv,
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    #[must_use]
    pub fn new(env: BuildEnv, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            http: http_client().clone(),
            env,
            store,
        }
    }

    #[must_use]
    pub fn env(&self) -> &BuildEnv {
        &self.env
    }

    #[must_use]
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.env.debug()
    }

    /// The normalised origin requests go to right now. May be empty.
    #[must_use]
    pub fn api_base(&self) -> String {
        resolve_api_base(
            self.env.debug(),
            self.store.get(StoreKey::ApiBase).as_deref(),
            self.env.api_base(),
        )
    }

    /// Full URL for `path` with `query` appended in order.
    pub fn url(&self, path: &ApiPath, query: &Query) -> Result<Url, ApiError> {
        let base = self.api_base();
        let invalid = |reason: String| ApiError::InvalidUrl {
            url: format!("{base}{path}"),
            reason,
        };

        let mut url = Url::parse(&base).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("API base cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(path.segments());
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.pairs());
        }
        Ok(url)
    }

    /// Headers attached to every request.
    ///
    /// JSON content type always; `x-api-key` and `x-dev-user-id` only in debug
    /// mode; `x-admin-auth` whenever an admin token is stored.
    pub fn headers(&self) -> Result<HeaderMap, ApiError> {
        let mut map = HeaderMap::new();
        map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if self.env.debug() {
            if let Some(key) = self.store.get_non_empty(StoreKey::DevApiKey) {
                insert_header(&mut map, headers::API_KEY, &key, true)?;
            }
            if let Some(user_id) = self.store.get_non_empty(StoreKey::DevUserId) {
                insert_header(&mut map, headers::DEV_USER_ID, &user_id, false)?;
            }
        }
        if let Some(token) = self.store.get_non_empty(StoreKey::AdminAuthToken) {
            insert_header(&mut map, headers::ADMIN_AUTH, &token, true)?;
        }
        Ok(map)
    }

    pub(crate) async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &ApiPath,
        query: &Query,
        body: Option<&B>,
        extra: &[(&'static str, &str)],
    ) -> Result<Response, ApiError> {
        let url = self.url(path, query)?;
        let mut request_headers = self.headers()?;
        for &(name, value) in extra {
            insert_header(&mut request_headers, name, value, true)?;
        }
        let request_id = uuid::Uuid::new_v4().to_string();
        insert_header(&mut request_headers, headers::REQUEST_ID, &request_id, false)?;

        tracing::debug!(%method, %path, %request_id, "Sending request");
        let mut builder = self.http.request(method.clone(), url).headers(request_headers);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = read_capped_error_body(response).await;
        tracing::warn!(
            %method,
            %path,
            %request_id,
            status = status.as_u16(),
            body = %rabbit_utils::redact_api_keys(&body),
            "Request failed"
        );
        Err(ApiError::Http { status, body })
    }

    pub(crate) async fn get_json(&self, path: &ApiPath, query: &Query) -> Result<Value, ApiError> {
        let response = self
            .send::<Value>(Method::GET, path, query, None, &[])
            .await?;
        decode_json(response).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &ApiPath,
        query: &Query,
        body: Option<&B>,
    ) -> Result<Value, ApiError> {
        let response = self.send(Method::POST, path, query, body, &[]).await?;
        decode_json(response).await
    }

    pub(crate) async fn patch_json<B: Serialize + ?Sized>(
        &self,
        path: &ApiPath,
        body: &B,
    ) -> Result<Value, ApiError> {
        let response = self
            .send(Method::PATCH, path, &Query::new(), Some(body), &[])
            .await?;
        decode_json(response).await
    }

    pub(crate) async fn delete_json(&self, path: &ApiPath) -> Result<Value, ApiError> {
        let response = self
            .send::<Value>(Method::DELETE, path, &Query::new(), None, &[])
            .await?;
        decode_json(response).await
    }

    /// GET a report that answers in JSON or raw CSV depending on `format`.
    pub(crate) async fn get_report(
        &self,
        path: &ApiPath,
        query: &Query,
        format: ReportFormat,
    ) -> Result<ReportOutput, ApiError> {
        let response = self
            .send::<Value>(Method::GET, path, query, None, &[])
            .await?;
        match format {
            ReportFormat::Csv => Ok(ReportOutput::Csv(response.text().await?)),
            ReportFormat::Json => decode_json(response).await.map(ReportOutput::Json),
        }
    }
}

fn insert_header(
    map: &mut HeaderMap,
    name: &'static str,
    value: &str,
    sensitive: bool,
) -> Result<(), ApiError> {
    let mut header_value =
        HeaderValue::from_str(value).map_err(|_| ApiError::InvalidHeader { name })?;
    header_value.set_sensitive(sensitive);
    map.insert(HeaderName::from_static(name), header_value);
    Ok(())
}

/// Decode a JSON body; an empty body decodes to `null`.
pub(crate) async fn decode_json(response: Response) -> Result<Value, ApiError> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(ApiError::Decode)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rabbit_config::{BuildEnv, MemoryStore, StoreKey};

    use super::ApiClient;
    use crate::{ApiError, ApiPath, Query};

    fn client(debug: bool, default_base: &str, store: MemoryStore) -> ApiClient {
        ApiClient::new(BuildEnv::new(default_base, debug), Arc::new(store))
    }

    #[test]
    fn budget_url_from_build_default() {
        let client = client(true, "api.example.com", MemoryStore::new());
        let url = client
            .url(
                &ApiPath::new("/v1/reports/budget"),
                &Query::new().with("user_id", 1).with("format", "json"),
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://api.example.com/v1/reports/budget?user_id=1&format=json"
        );
    }

    #[test]
    fn local_override_ignored_without_debug() {
        let store = MemoryStore::new().with(StoreKey::ApiBase, "localhost:9000");
        let client = client(false, "api.example.com", store);
        assert_eq!(client.api_base(), "http://api.example.com");
    }

    #[test]
    fn base_path_prefix_is_kept() {
        let client = client(false, "https://example.com/relay/", MemoryStore::new());
        let url = client
            .url(&ApiPath::new("/v1/plans").push(4), &Query::new())
            .unwrap();
        assert_eq!(url.as_str(), "https://example.com/relay/v1/plans/4");
    }

    #[test]
    fn dynamic_segments_are_encoded() {
        let client = client(false, "api.example.com", MemoryStore::new());
        let url = client
            .url(
                &ApiPath::new("/v1/billing/subscriptions/by_stripe").push("sub 1/x"),
                &Query::new(),
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://api.example.com/v1/billing/subscriptions/by_stripe/sub%201%2Fx"
        );
    }

    #[test]
    fn empty_base_is_an_invalid_url() {
        let client = client(false, "", MemoryStore::new());
        let err = client.url(&ApiPath::new("/healthz"), &Query::new()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }

    #[test]
    fn debug_headers_only_in_debug_mode() {
        let store = || {
            MemoryStore::new()
                .with(StoreKey::DevApiKey, "dev-key")
                .with(StoreKey::DevUserId, "7")
        };

        let headers = client(true, "api.example.com", store()).headers().unwrap();
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["x-api-key"], "dev-key");
        assert_eq!(headers["x-dev-user-id"], "7");

        let headers = client(false, "api.example.com", store()).headers().unwrap();
        assert_eq!(headers["content-type"], "application/json");
        assert!(headers.get("x-api-key").is_none());
        assert!(headers.get("x-dev-user-id").is_none());
    }

    #[test]
    fn admin_token_is_attached_in_any_mode() {
        let store = MemoryStore::new().with(StoreKey::AdminAuthToken, "adm");
        let headers = client(false, "api.example.com", store).headers().unwrap();
        assert_eq!(headers["x-admin-auth"], "adm");
    }

    #[test]
    fn header_values_with_newlines_are_rejected() {
        let store = MemoryStore::new().with(StoreKey::AdminAuthToken, "a\nb");
        let err = client(false, "api.example.com", store).headers().unwrap_err();
        assert!(matches!(err, ApiError::InvalidHeader { name: "x-admin-auth" }));
    }
}
