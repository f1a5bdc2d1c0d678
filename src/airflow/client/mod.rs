pub mod auth;
pub mod base;
pub mod token;
pub mod v1;
pub mod v2;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use log::info;

use self::auth::{ApiClient, AuthStrategy, TokenSource};
use self::base::{PrefixedTransport, ReqwestTransport, Transport};
use self::token::TokenManager;
use self::v1::V1Adapter;
use self::v2::V2Adapter;
use crate::airflow::config::{AirflowConfig, AirflowVersion, Credentials};
use crate::airflow::error::AdapterResult;
use crate::airflow::traits::AirflowAdapter;
use crate::airflow::version::detect_version;

/// Builds the adapter for a server: detects the API generation (unless the
/// config pins one) and wires credentials the way that generation expects.
pub async fn create_adapter(config: &AirflowConfig) -> AdapterResult<Arc<dyn AirflowAdapter>> {
    let credentials = config.credentials()?;
    let proxy = config.resolved_proxy()?;
    let root: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(
        &config.resolved_endpoint()?,
        proxy.as_deref(),
    )?);

    let version = match config.version {
        Some(version) => {
            info!("Using configured {version} for '{}'", config.name);
            version
        }
        None => detect_version(root.as_ref(), &credentials).await?.version,
    };
    Ok(build_adapter(version, root, credentials))
}

/// Binds an adapter to the server root. The legacy adapter gets its
/// `api/v1` prefix from the transport; the current adapter's endpoints
/// already embed `api/v2`, so the root is used unmodified.
pub fn build_adapter(
    version: AirflowVersion,
    root: Arc<dyn Transport>,
    credentials: Credentials,
) -> Arc<dyn AirflowAdapter> {
    match version {
        AirflowVersion::V2 => {
            let auth = match credentials {
                Credentials::Token(token) => AuthStrategy::Bearer(TokenSource::Static(token)),
                Credentials::Basic(basic) => AuthStrategy::Basic(basic),
                Credentials::Anonymous => AuthStrategy::Anonymous,
            };
            info!("🔑 {version} adapter with {}", auth_label(&auth));
            let transport = Arc::new(PrefixedTransport::new(root, V1Adapter::API_PREFIX));
            Arc::new(V1Adapter::new(ApiClient::new(transport, auth, version)))
        }
        AirflowVersion::V3 => {
            let auth = match credentials {
                Credentials::Token(token) => AuthStrategy::Bearer(TokenSource::Static(token)),
                Credentials::Basic(basic) => AuthStrategy::Bearer(TokenSource::Managed(Arc::new(
                    TokenManager::new(root.clone(), Some(basic)),
                ))),
                Credentials::Anonymous => AuthStrategy::Bearer(TokenSource::Managed(Arc::new(
                    TokenManager::new(root.clone(), None),
                ))),
            };
            info!("🔑 {version} adapter with {}", auth_label(&auth));
            Arc::new(V2Adapter::new(ApiClient::new(root, auth, version)))
        }
    }
}

fn auth_label(auth: &AuthStrategy) -> &'static str {
    match auth {
        AuthStrategy::Anonymous => "no authentication",
        AuthStrategy::Basic(_) => "basic auth",
        AuthStrategy::Bearer(TokenSource::Static(_)) => "static bearer token",
        AuthStrategy::Bearer(TokenSource::Managed(_)) => "token exchange",
    }
}
