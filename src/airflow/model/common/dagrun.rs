use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// Run and task instance state. Anything the server reports beyond the
/// well-known values is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunState {
    Queued,
    Running,
    Success,
    Failed,
    UpstreamFailed,
    Other(String),
}

impl RunState {
    pub fn as_str(&self) -> &str {
        match self {
            RunState::Queued => "queued",
            RunState::Running => "running",
            RunState::Success => "success",
            RunState::Failed => "failed",
            RunState::UpstreamFailed => "upstream_failed",
            RunState::Other(state) => state,
        }
    }

    /// `success`, `failed` and `upstream_failed` end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Success | RunState::Failed | RunState::UpstreamFailed
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RunState::Failed | RunState::UpstreamFailed)
    }
}

impl From<&str> for RunState {
    fn from(value: &str) -> Self {
        match value {
            "queued" => RunState::Queued,
            "running" => RunState::Running,
            "success" => RunState::Success,
            "failed" => RunState::Failed,
            "upstream_failed" => RunState::UpstreamFailed,
            other => RunState::Other(other.to_string()),
        }
    }
}

impl From<String> for RunState {
    fn from(value: String) -> Self {
        RunState::from(value.as_str())
    }
}

impl From<RunState> for String {
    fn from(value: RunState) -> Self {
        value.as_str().to_string()
    }
}

impl Display for RunState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DAG run as returned by either API generation. Fields the adapter does
/// not interpret are carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DagRun {
    pub dag_id: String,
    pub dag_run_id: String,
    #[serde(default)]
    pub state: Option<RunState>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("success", true)]
    #[case("failed", true)]
    #[case("upstream_failed", true)]
    #[case("running", false)]
    #[case("queued", false)]
    #[case("up_for_retry", false)]
    fn test_terminal_states(#[case] state: &str, #[case] terminal: bool) {
        assert_eq!(RunState::from(state).is_terminal(), terminal);
    }

    #[test]
    fn test_unknown_state_round_trips_verbatim() {
        let state = RunState::from("deferred");
        assert_eq!(state, RunState::Other("deferred".to_string()));
        assert_eq!(serde_json::to_value(&state).unwrap(), json!("deferred"));
    }

    #[test]
    fn test_dag_run_keeps_unknown_fields() {
        let run: DagRun = serde_json::from_value(json!({
            "dag_id": "etl",
            "dag_run_id": "manual__2024-05-01T10:00:00+00:00",
            "state": "running",
            "start_date": "2024-05-01T10:00:01.123456+00:00",
            "end_date": null,
            "logical_date": "2024-05-01T10:00:00+00:00",
            "conf": {"full_refresh": true}
        }))
        .unwrap();

        assert_eq!(run.state, Some(RunState::Running));
        assert!(run.start_date.is_some());
        assert_eq!(run.end_date, None);
        assert_eq!(run.extra["conf"], json!({"full_refresh": true}));

        let back = serde_json::to_value(&run).unwrap();
        assert_eq!(back["logical_date"], json!("2024-05-01T10:00:00+00:00"));
        assert_eq!(back["state"], json!("running"));
    }
}
