use custom_error::custom_error;

custom_error! {
    /// Error taxonomy shared by the transport, the adapters and the factory.
    #[derive(Clone)]
    pub AdapterError
    Connectivity{message: String} = "Connection error: {message}",
    Auth{status: u16, message: String} = "Authentication failed (HTTP {status}): {message}",
    Api{status: u16, message: String} = "API error (HTTP {status}): {message}",
    NotFound{message: String} = "Not found: {message}",
    VersionDetection{message: String} = "Could not detect Airflow version: {message}",
    MalformedTriggerResponse{dag_id: String} = "Trigger response for DAG '{dag_id}' did not contain a dag_run_id",
    Decode{message: String} = "Failed to decode response: {message}",
    InvalidArgument{message: String} = "Invalid argument: {message}",
    Config{message: String} = "Invalid configuration: {message}",
}

impl AdapterError {
    pub fn decode(message: impl Into<String>) -> Self {
        AdapterError::Decode {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        AdapterError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AdapterError::NotFound { .. })
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            format!("request timed out: {e}")
        } else if e.is_connect() {
            format!("connection refused or unreachable: {e}")
        } else {
            e.to_string()
        };
        AdapterError::Connectivity { message }
    }
}

impl From<url::ParseError> for AdapterError {
    fn from(e: url::ParseError) -> Self {
        AdapterError::Config {
            message: format!("invalid URL: {e}"),
        }
    }
}

pub type AdapterResult<T> = Result<T, AdapterError>;
