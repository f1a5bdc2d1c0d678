use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::airflow::config::BasicAuth;
use crate::airflow::error::{AdapterError, AdapterResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Credentials attached to a single outgoing request. Never both at once.
#[derive(Clone, PartialEq)]
pub enum RequestAuth {
    Bearer(String),
    Basic(BasicAuth),
}

impl fmt::Debug for RequestAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestAuth::Bearer(_) => f.write_str("Bearer(***redacted***)"),
            RequestAuth::Basic(auth) => write!(f, "Basic({auth:?})"),
        }
    }
}

/// A method/path/query/body request, relative to the transport's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub auth: Option<RequestAuth>,
    /// Read the body as raw text regardless of its content type.
    pub text: bool,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            auth: None,
            text: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).json(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PATCH, path).json(body)
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn query<K: Into<String>, V: Into<String>>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    #[must_use]
    pub fn with_auth(mut self, auth: Option<RequestAuth>) -> Self {
        self.auth = auth;
        self
    }

    #[must_use]
    pub fn expect_text(mut self) -> Self {
        self.text = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl HttpResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: ResponseBody::Json(body),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: ResponseBody::Text(body.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status, 401 | 403)
    }

    /// Parsed JSON body. `None` for an empty or `null` body, an error when the
    /// server answered with something that is not JSON.
    pub fn into_json(self) -> AdapterResult<Option<Value>> {
        match self.body {
            ResponseBody::Json(Value::Null) | ResponseBody::Empty => Ok(None),
            ResponseBody::Json(value) => Ok(Some(value)),
            ResponseBody::Text(text) => {
                log::error!(
                    "Expected a JSON response, got text (first 500 chars): {}",
                    text.chars().take(500).collect::<String>()
                );
                Err(AdapterError::decode("response body is not JSON"))
            }
        }
    }

    pub fn into_text(self) -> String {
        match self.body {
            ResponseBody::Text(text) => text,
            ResponseBody::Json(value) => value.to_string(),
            ResponseBody::Empty => String::new(),
        }
    }
}

/// Executes requests against one base URL. Status codes are reported, not
/// turned into errors; only transport failures produce `Err`.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn send(&self, request: HttpRequest) -> AdapterResult<HttpResponse>;
}

/// Transport that prepends a fixed path prefix to every request.
#[derive(Debug, Clone)]
pub struct PrefixedTransport {
    inner: Arc<dyn Transport>,
    prefix: String,
}

impl PrefixedTransport {
    pub fn new(inner: Arc<dyn Transport>, prefix: &str) -> Self {
        Self {
            inner,
            prefix: prefix.trim_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Transport for PrefixedTransport {
    async fn send(&self, mut request: HttpRequest) -> AdapterResult<HttpResponse> {
        request.path = format!("{}/{}", self.prefix, request.path.trim_start_matches('/'));
        self.inner.send(request).await
    }
}

/// reqwest-backed transport bound to the configured Airflow endpoint.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(endpoint: &str, proxy: Option<&str>) -> AdapterResult<Self> {
        let mut client_builder = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .use_rustls_tls();

        // Configured proxy takes priority over the environment
        if let Some(proxy_url) = proxy {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| AdapterError::Config {
                message: format!("invalid proxy URL '{proxy_url}': {e}"),
            })?;
            client_builder = client_builder.proxy(proxy);
            info!("🔀 Using proxy from config: {proxy_url}");
        } else {
            if let Ok(http_proxy) = std::env::var("HTTP_PROXY").or_else(|_| std::env::var("http_proxy")) {
                let proxy = reqwest::Proxy::http(&http_proxy).map_err(|e| AdapterError::Config {
                    message: format!("invalid HTTP_PROXY '{http_proxy}': {e}"),
                })?;
                client_builder = client_builder.proxy(proxy);
                info!("🔀 Using proxy from HTTP_PROXY: {http_proxy}");
            }
            if let Ok(https_proxy) = std::env::var("HTTPS_PROXY").or_else(|_| std::env::var("https_proxy")) {
                let proxy = reqwest::Proxy::https(&https_proxy).map_err(|e| AdapterError::Config {
                    message: format!("invalid HTTPS_PROXY '{https_proxy}': {e}"),
                })?;
                client_builder = client_builder.proxy(proxy);
                info!("🔀 Using proxy from HTTPS_PROXY: {https_proxy}");
            }
        }

        let client = client_builder.build().map_err(|e| AdapterError::Config {
            message: format!("failed to build HTTP client: {e}"),
        })?;

        // Trailing slash so relative paths join under the endpoint
        let mut base_endpoint = endpoint.to_string();
        if !base_endpoint.ends_with('/') {
            base_endpoint.push('/');
        }
        let base_url = Url::parse(&base_endpoint)?;
        Ok(Self { client, base_url })
    }

    fn url_for(&self, path: &str) -> AdapterResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AdapterError::Config {
                message: format!("'{}' cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> AdapterResult<HttpResponse> {
        let url = self.url_for(&request.path)?;
        debug!("🔗 {} {url}", request.method);

        let mut builder = self.client.request(request.method, url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.auth {
            Some(RequestAuth::Bearer(token)) => builder.bearer_auth(token),
            Some(RequestAuth::Basic(auth)) => builder.basic_auth(&auth.username, Some(&auth.password)),
            None => builder,
        };
        builder = if request.text {
            builder.header(ACCEPT, "text/plain")
        } else {
            builder.header(ACCEPT, "application/json")
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("json"));
        let text = response.text().await?;

        let body = if text.trim().is_empty() {
            ResponseBody::Empty
        } else if request.text || !is_json {
            ResponseBody::Text(text)
        } else {
            match serde_json::from_str(&text) {
                Ok(value) => ResponseBody::Json(value),
                Err(e) => {
                    debug!("Response advertised JSON but failed to parse: {e}");
                    ResponseBody::Text(text)
                }
            }
        };
        Ok(HttpResponse { status, body })
    }
}
