use std::sync::Arc;

use log::{debug, error, info, warn};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::base::{HttpRequest, Transport};
use crate::airflow::config::BasicAuth;

/// Token exchange endpoint, relative to the server root.
pub const TOKEN_ENDPOINT: &str = "auth/token";
pub const DEFAULT_TOKEN_LIFETIME_SECS: f64 = 1800.0;
/// Refresh this long before the server-side expiry.
pub const REFRESH_BUFFER_SECS: f64 = 300.0;

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    fetched_at: Instant,
    lifetime_secs: f64,
}

impl CachedToken {
    fn is_stale(&self, now: Instant) -> bool {
        now.duration_since(self.fetched_at).as_secs_f64() >= self.lifetime_secs - REFRESH_BUFFER_SECS
    }
}

/// Fetches, caches and refreshes bearer tokens from the token exchange
/// endpoint. The cache is `None` (empty) or holds one token; every read and
/// write goes through the mutex, and a fetch holds it for its whole duration.
#[derive(Debug)]
pub struct TokenManager {
    transport: Arc<dyn Transport>,
    credentials: Option<BasicAuth>,
    state: Mutex<Option<CachedToken>>,
}

impl TokenManager {
    pub fn new(transport: Arc<dyn Transport>, credentials: Option<BasicAuth>) -> Self {
        Self {
            transport,
            credentials,
            state: Mutex::new(None),
        }
    }

    /// Returns a valid token, fetching first when the cache is empty or stale.
    /// `None` when the fetch failed; the cache is left empty in that case.
    pub async fn get_token(&self) -> Option<String> {
        let mut state = self.state.lock().await;
        if let Some(token) = state.as_ref() {
            if !token.is_stale(Instant::now()) {
                return Some(token.value.clone());
            }
            debug!("Cached token is due for refresh");
        }
        *state = self.fetch().await;
        state.as_ref().map(|token| token.value.clone())
    }

    /// Drops the cached token so the next `get_token` fetches a fresh one.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        if state.take().is_some() {
            debug!("Cached token invalidated");
        }
    }

    async fn fetch(&self) -> Option<CachedToken> {
        let request = match &self.credentials {
            Some(auth) => {
                info!("🔑 Exchanging credentials for token: {}", auth.username);
                HttpRequest::post(
                    TOKEN_ENDPOINT,
                    json!({"username": auth.username, "password": auth.password}),
                )
            }
            None => {
                info!("🔑 Requesting token without credentials");
                HttpRequest::get(TOKEN_ENDPOINT)
            }
        };

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Token request failed: {e}");
                return None;
            }
        };
        if !response.is_success() {
            warn!("Token request returned HTTP {}", response.status);
            return None;
        }
        let body = match response.into_json() {
            Ok(Some(body)) => body,
            Ok(None) => {
                error!("Token response was empty");
                return None;
            }
            Err(e) => {
                error!("Token response could not be decoded: {e}");
                return None;
            }
        };
        let Some(value) = body.get("access_token").and_then(Value::as_str) else {
            error!("Token response did not contain an access_token field");
            return None;
        };

        let lifetime_secs = body
            .get("expires_in")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        debug!("Fetched token valid for {lifetime_secs}s");
        Some(CachedToken {
            value: value.to_string(),
            fetched_at: Instant::now(),
            lifetime_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airflow::client::testing::ScriptedTransport;
    use crate::airflow::error::AdapterError;
    use reqwest::Method;
    use std::time::Duration;

    fn manager(transport: &Arc<ScriptedTransport>, credentials: Option<BasicAuth>) -> TokenManager {
        TokenManager::new(transport.clone(), credentials)
    }

    fn airflow_auth() -> Option<BasicAuth> {
        Some(BasicAuth {
            username: "admin".to_string(),
            password: "admin".to_string(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_is_cached_within_lifetime() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(201, json!({"access_token": "tok-1"}));
        let tokens = manager(&transport, airflow_auth());

        assert_eq!(tokens.get_token().await.as_deref(), Some("tok-1"));
        tokio::time::advance(Duration::from_secs(1000)).await;
        assert_eq!(tokens.get_token().await.as_deref(), Some("tok-1"));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_credentials_are_posted() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(201, json!({"access_token": "tok-1"}));
        let tokens = manager(&transport, airflow_auth());
        tokens.get_token().await;

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, TOKEN_ENDPOINT);
        assert_eq!(
            request.body,
            Some(json!({"username": "admin", "password": "admin"}))
        );
    }

    #[tokio::test]
    async fn test_anonymous_exchange_uses_get_without_body() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({"access_token": "open"}));
        let tokens = manager(&transport, None);

        assert_eq!(tokens.get_token().await.as_deref(), Some("open"));
        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.body, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_token_is_refreshed() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(201, json!({"access_token": "tok-1"}));
        transport.push_json(201, json!({"access_token": "tok-2"}));
        let tokens = manager(&transport, airflow_auth());

        assert_eq!(tokens.get_token().await.as_deref(), Some("tok-1"));
        // Default lifetime 1800s minus the 300s buffer
        tokio::time::advance(Duration::from_secs(1500)).await;
        assert_eq!(tokens.get_token().await.as_deref(), Some("tok-2"));
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expires_in_is_adopted() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(201, json!({"access_token": "short", "expires_in": 360}));
        transport.push_json(201, json!({"access_token": "next", "expires_in": 360}));
        let tokens = manager(&transport, airflow_auth());

        assert_eq!(tokens.get_token().await.as_deref(), Some("short"));
        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(tokens.get_token().await.as_deref(), Some("short"));
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(tokens.get_token().await.as_deref(), Some("next"));
    }

    #[tokio::test]
    async fn test_invalidate_forces_fresh_fetch() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(201, json!({"access_token": "tok-1"}));
        transport.push_json(201, json!({"access_token": "tok-2"}));
        let tokens = manager(&transport, airflow_auth());

        assert_eq!(tokens.get_token().await.as_deref(), Some("tok-1"));
        tokens.invalidate().await;
        assert_eq!(tokens.get_token().await.as_deref(), Some("tok-2"));
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_access_token_is_failure() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({"token_type": "bearer"}));
        transport.push_json(201, json!({"access_token": "tok-1"}));
        let tokens = manager(&transport, airflow_auth());

        assert_eq!(tokens.get_token().await, None);
        // Still empty, so the next call fetches again
        assert_eq!(tokens.get_token().await.as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_transport_failure_returns_none() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_error(AdapterError::Connectivity {
            message: "connection refused".to_string(),
        });
        transport.push_json(401, json!({"detail": "Invalid credentials"}));
        let tokens = manager(&transport, airflow_auth());

        assert_eq!(tokens.get_token().await, None);
        assert_eq!(tokens.get_token().await, None);
    }
}
