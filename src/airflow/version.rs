use std::sync::OnceLock;

use log::{debug, info};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::airflow::client::base::{HttpRequest, RequestAuth, Transport};
use crate::airflow::config::{AirflowVersion, Credentials};
use crate::airflow::error::{AdapterError, AdapterResult};

/// Version endpoints, newest first. Airflow 2 answers 404 on the first one.
const VERSION_PROBES: [&str; 2] = ["api/v2/version", "api/v1/version"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub version: AirflowVersion,
    pub version_string: String,
}

impl VersionInfo {
    pub fn major(&self) -> u8 {
        self.version.major()
    }
}

fn version_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^\s*v?(\d+)(?:[.\-+]|\s*$)").unwrap())
}

/// Extracts the leading major version; only 2 and 3 are supported.
pub fn parse_version(version_string: &str) -> AdapterResult<VersionInfo> {
    let major = version_regex()
        .captures(version_string)
        .and_then(|c| c[1].parse::<u64>().ok())
        .ok_or_else(|| AdapterError::VersionDetection {
            message: format!("unparseable version string '{version_string}'"),
        })?;
    let version = AirflowVersion::from_major(major).ok_or_else(|| AdapterError::VersionDetection {
        message: format!("unsupported major version {major} in '{version_string}'"),
    })?;
    Ok(VersionInfo {
        version,
        version_string: version_string.trim().to_string(),
    })
}

/// Probes the server's version endpoints. Sends whatever static credentials
/// are configured (never a token exchange, since no token may exist yet).
pub async fn detect_version(
    transport: &dyn Transport,
    credentials: &Credentials,
) -> AdapterResult<VersionInfo> {
    let auth = match credentials {
        Credentials::Token(token) => Some(RequestAuth::Bearer(token.clone())),
        Credentials::Basic(basic) => Some(RequestAuth::Basic(basic.clone())),
        Credentials::Anonymous => None,
    };

    let mut failures = Vec::new();
    for probe in VERSION_PROBES {
        let response = transport
            .send(HttpRequest::get(probe).with_auth(auth.clone()))
            .await?;
        if !response.is_success() {
            debug!("Version probe {probe} returned HTTP {}", response.status);
            failures.push(format!("{probe}: HTTP {}", response.status));
            continue;
        }

        let body = response.into_json().ok().flatten();
        let Some(version_string) = body
            .as_ref()
            .and_then(|b| b.get("version"))
            .and_then(Value::as_str)
        else {
            failures.push(format!("{probe}: no version field"));
            continue;
        };

        let info = parse_version(version_string)?;
        info!("Detected {} (version {})", info.version, info.version_string);
        return Ok(info);
    }

    Err(AdapterError::VersionDetection {
        message: format!("no version endpoint answered ({})", failures.join(", ")),
    })
}
