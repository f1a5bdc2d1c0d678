use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::base::{HttpRequest, HttpResponse, RequestAuth, Transport};
use super::token::TokenManager;
use crate::airflow::config::{AirflowVersion, BasicAuth};
use crate::airflow::error::{AdapterError, AdapterResult};
use crate::airflow::model::common::collection::Collection;
use crate::airflow::model::common::problem::api_error_message;

/// Where bearer tokens come from.
#[derive(Clone)]
pub enum TokenSource {
    Static(String),
    Managed(Arc<TokenManager>),
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Static(_) => f.write_str("Static(***redacted***)"),
            TokenSource::Managed(_) => f.write_str("Managed"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum AuthStrategy {
    Anonymous,
    Basic(BasicAuth),
    Bearer(TokenSource),
}

/// HTTP wrapper shared by both adapters: resolves credentials per request,
/// retries once after a token refresh on 401/403, and maps every remaining
/// non-2xx status to an [`AdapterError`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    auth: AuthStrategy,
    version: AirflowVersion,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, auth: AuthStrategy, version: AirflowVersion) -> Self {
        Self {
            transport,
            auth,
            version,
        }
    }

    /// Bearer token for the next request. A static token is returned as-is
    /// and never touches the token manager.
    pub async fn get_auth_token(&self) -> Option<String> {
        match &self.auth {
            AuthStrategy::Bearer(TokenSource::Static(token)) => Some(token.clone()),
            AuthStrategy::Bearer(TokenSource::Managed(manager)) => manager.get_token().await,
            AuthStrategy::Anonymous | AuthStrategy::Basic(_) => None,
        }
    }

    pub async fn get(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        explicit_token: Option<&str>,
    ) -> AdapterResult<HttpResponse> {
        let request = HttpRequest::get(endpoint).query(params.iter().map(|(k, v)| (*k, v.clone())));
        self.execute(request, explicit_token).await
    }

    pub async fn post(
        &self,
        endpoint: &str,
        body: Value,
        explicit_token: Option<&str>,
    ) -> AdapterResult<HttpResponse> {
        self.execute(HttpRequest::post(endpoint, body), explicit_token)
            .await
    }

    /// Sends `request`, at most twice. The second attempt only happens after
    /// a 401/403 when tokens come from the token manager and no explicit
    /// token was supplied.
    pub async fn execute(
        &self,
        request: HttpRequest,
        explicit_token: Option<&str>,
    ) -> AdapterResult<HttpResponse> {
        let refreshable = match (&self.auth, explicit_token) {
            (AuthStrategy::Bearer(TokenSource::Managed(manager)), None) => Some(manager),
            _ => None,
        };

        let response = self.attempt(&request, explicit_token).await?;
        let response = match refreshable {
            Some(manager) if response.is_auth_failure() => {
                warn!(
                    "HTTP {} for {}, refreshing token and retrying once",
                    response.status, request.path
                );
                manager.invalidate().await;
                self.attempt(&request, explicit_token).await?
            }
            _ => response,
        };

        if response.is_success() {
            Ok(response)
        } else {
            Err(self.error_for(&request, &response))
        }
    }

    async fn attempt(
        &self,
        request: &HttpRequest,
        explicit_token: Option<&str>,
    ) -> AdapterResult<HttpResponse> {
        let auth = match explicit_token {
            Some(token) => Some(RequestAuth::Bearer(token.to_string())),
            None => match &self.auth {
                AuthStrategy::Basic(basic) => Some(RequestAuth::Basic(basic.clone())),
                _ => self.get_auth_token().await.map(RequestAuth::Bearer),
            },
        };
        self.transport
            .send(request.clone().with_auth(auth))
            .await
    }

    fn error_for(&self, request: &HttpRequest, response: &HttpResponse) -> AdapterError {
        let message = api_error_message(self.version, response.status, &response.body);
        debug!("{} {} failed: HTTP {} {message}", request.method, request.path, response.status);
        match response.status {
            401 | 403 => AdapterError::Auth {
                status: response.status,
                message,
            },
            404 => AdapterError::NotFound { message },
            status => AdapterError::Api { status, message },
        }
    }

    /// Sends `request` and returns its JSON body, `None` when the body is empty.
    pub async fn request_json(&self, request: HttpRequest) -> AdapterResult<Option<Value>> {
        self.execute(request, None).await?.into_json()
    }

    pub async fn get_json(&self, endpoint: &str, query: Vec<(String, String)>) -> AdapterResult<Value> {
        self.request_json(HttpRequest::get(endpoint).query(query))
            .await?
            .ok_or_else(|| AdapterError::decode(format!("empty response from {endpoint}")))
    }

    /// Singular lookup: a 404 or an empty body is `Ok(None)`.
    pub async fn get_optional(&self, endpoint: &str) -> AdapterResult<Option<Value>> {
        match self.request_json(HttpRequest::get(endpoint)).await {
            Err(e) if e.is_not_found() => Ok(None),
            other => other,
        }
    }

    /// List lookup: an empty body is an empty collection.
    pub async fn get_collection<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        key: &'static str,
        query: Vec<(String, String)>,
    ) -> AdapterResult<Collection<T>> {
        match self.request_json(HttpRequest::get(endpoint).query(query)).await? {
            Some(body) => Collection::from_value(key, body),
            None => Ok(Collection::empty(key)),
        }
    }

    pub async fn get_text(&self, endpoint: &str) -> AdapterResult<String> {
        let response = self
            .execute(HttpRequest::get(endpoint).expect_text(), None)
            .await?;
        Ok(response.into_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airflow::client::testing::ScriptedTransport;
    use serde_json::json;

    fn managed_client(transport: &Arc<ScriptedTransport>) -> ApiClient {
        let manager = TokenManager::new(
            transport.clone(),
            Some(BasicAuth {
                username: "admin".to_string(),
                password: "admin".to_string(),
            }),
        );
        ApiClient::new(
            transport.clone(),
            AuthStrategy::Bearer(TokenSource::Managed(Arc::new(manager))),
            AirflowVersion::V3,
        )
    }

    fn bearer(request: &HttpRequest) -> Option<&str> {
        match &request.auth {
            Some(RequestAuth::Bearer(token)) => Some(token),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_static_token_never_uses_manager() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({"dags": []}));
        let client = ApiClient::new(
            transport.clone(),
            AuthStrategy::Bearer(TokenSource::Static("static".to_string())),
            AirflowVersion::V3,
        );

        assert_eq!(client.get_auth_token().await.as_deref(), Some("static"));
        client.get("api/v2/dags", &[], None).await.unwrap();
        assert_eq!(transport.calls(), vec!["GET api/v2/dags"]);
        assert_eq!(bearer(&transport.requests()[0]), Some("static"));
    }

    #[tokio::test]
    async fn test_auth_failure_refreshes_once_and_retries() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(201, json!({"access_token": "old"}));
        transport.push_json(401, json!({"detail": "Token expired"}));
        transport.push_json(201, json!({"access_token": "new"}));
        transport.push_json(200, json!({"dags": [], "total_entries": 0}));
        let client = managed_client(&transport);

        let response = client.get("api/v2/dags", &[], None).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(
            transport.calls(),
            vec![
                "POST auth/token",
                "GET api/v2/dags",
                "POST auth/token",
                "GET api/v2/dags"
            ]
        );
        let requests = transport.requests();
        assert_eq!(bearer(&requests[1]), Some("old"));
        assert_eq!(bearer(&requests[3]), Some("new"));
    }

    #[tokio::test]
    async fn test_second_auth_failure_is_auth_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(201, json!({"access_token": "old"}));
        transport.push_json(403, json!({"detail": "Forbidden"}));
        transport.push_json(201, json!({"access_token": "new"}));
        transport.push_json(403, json!({"detail": "Forbidden"}));
        let client = managed_client(&transport);

        let result = client.get("api/v2/dags", &[], None).await;
        assert!(matches!(result, Err(AdapterError::Auth { status: 403, .. })));
        assert_eq!(transport.request_count(), 4);
    }

    #[tokio::test]
    async fn test_explicit_token_wins_and_disables_retry() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(401, json!({"detail": "Invalid token"}));
        let client = managed_client(&transport);

        let result = client
            .post("api/v2/dags/etl/dagRuns", json!({}), Some("caller-token"))
            .await;
        assert!(matches!(result, Err(AdapterError::Auth { status: 401, .. })));
        assert_eq!(transport.calls(), vec!["POST api/v2/dags/etl/dagRuns"]);
        assert_eq!(bearer(&transport.requests()[0]), Some("caller-token"));
    }

    #[tokio::test]
    async fn test_basic_auth_is_attached_without_retry() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(401, json!({"title": "Unauthorized"}));
        let basic = BasicAuth {
            username: "airflow".to_string(),
            password: "airflow".to_string(),
        };
        let client = ApiClient::new(
            transport.clone(),
            AuthStrategy::Basic(basic.clone()),
            AirflowVersion::V2,
        );

        assert!(client.get("dags", &[], None).await.is_err());
        assert_eq!(transport.request_count(), 1);
        assert_eq!(transport.requests()[0].auth, Some(RequestAuth::Basic(basic)));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(404, json!({"detail": "missing"}));
        transport.push_json(500, json!({"detail": "boom"}));
        transport.push_json(404, json!({"detail": "missing"}));
        let client = ApiClient::new(transport.clone(), AuthStrategy::Anonymous, AirflowVersion::V3);

        let not_found = client.get_json("api/v2/dags/x", Vec::new()).await;
        assert!(matches!(not_found, Err(AdapterError::NotFound { .. })));
        let server = client.get_json("api/v2/dags", Vec::new()).await;
        assert!(matches!(server, Err(AdapterError::Api { status: 500, .. })));
        assert_eq!(client.get_optional("api/v2/dags/x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_legacy_problem_payload_is_read_by_generation() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(
            400,
            json!({"type": "about:blank", "title": "Bad Request", "detail": "limit must be positive", "status": 400}),
        );
        let client = ApiClient::new(transport.clone(), AuthStrategy::Anonymous, AirflowVersion::V2);

        match client.get_json("dags", Vec::new()).await {
            Err(AdapterError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Bad Request: limit must be positive");
            }
            other => panic!("expected an API error, got {other:?}"),
        }
    }
}
