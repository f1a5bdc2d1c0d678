use serde::Serialize;

/// Result of an operation that one API generation does not offer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Capability<T> {
    Supported(T),
    Unsupported(Unsupported),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unsupported {
    pub error: String,
    pub operation: &'static str,
    pub alternative: &'static str,
}

impl<T> Capability<T> {
    pub fn unsupported(operation: &'static str, alternative: &'static str, reason: &str) -> Self {
        Capability::Unsupported(Unsupported {
            error: format!("{operation} is not available on {reason}; use {alternative} instead"),
            operation,
            alternative,
        })
    }
}
