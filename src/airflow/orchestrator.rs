use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use tokio::time::{sleep, Instant};

use crate::airflow::error::AdapterError;
use crate::airflow::model::common::{DagRun, Page, RunState, TaskInstance};
use crate::airflow::traits::AirflowAdapter;

const MIN_POLL_INTERVAL: Duration = Duration::from_secs(2);
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(30);
const TASK_INSTANCE_PAGE_LIMIT: u32 = 100;

/// A tenth of the timeout, kept within 2..=30 seconds.
pub fn default_poll_interval(timeout: Duration) -> Duration {
    (timeout / 10).clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL)
}

/// A task instance that ended the run in a failed state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedStepInfo {
    pub task_id: String,
    pub state: Option<RunState>,
    pub try_number: i64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
}

impl From<TaskInstance> for FailedStepInfo {
    fn from(value: TaskInstance) -> Self {
        FailedStepInfo {
            task_id: value.task_id,
            state: value.state,
            try_number: value.try_number,
            start_date: value.start_date,
            end_date: value.end_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerWaitResult {
    pub dag_id: String,
    pub run_id: Option<String>,
    pub state: Option<RunState>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
    pub timed_out: bool,
    pub elapsed_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_steps: Option<Vec<FailedStepInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TriggerWaitResult {
    fn failure(dag_id: &str, started: Instant, error: &AdapterError) -> Self {
        TriggerWaitResult {
            dag_id: dag_id.to_string(),
            run_id: None,
            state: None,
            start_time: None,
            end_time: None,
            timed_out: false,
            elapsed_seconds: started.elapsed().as_secs_f64(),
            failed_steps: None,
            error: Some(error.to_string()),
        }
    }
}

/// Triggers a DAG run and polls it until it reaches a terminal state or the
/// timeout elapses. Never fails: every outcome is a [`TriggerWaitResult`].
/// Dropping the returned future cancels the wait at the next poll boundary.
#[derive(Clone)]
pub struct TriggerAndWait {
    adapter: Arc<dyn AirflowAdapter>,
}

impl TriggerAndWait {
    pub fn new(adapter: Arc<dyn AirflowAdapter>) -> Self {
        Self { adapter }
    }

    pub async fn run(
        &self,
        dag_id: &str,
        conf: Option<Value>,
        timeout: Duration,
        poll_interval: Option<Duration>,
    ) -> TriggerWaitResult {
        let started = Instant::now();
        let poll_interval = poll_interval
            .map_or_else(|| default_poll_interval(timeout), |interval| {
                interval.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL)
            });

        let triggered = match self.adapter.trigger_dag_run(dag_id, conf).await {
            Ok(triggered) => triggered,
            Err(e) => {
                warn!("Failed to trigger {dag_id}: {e}");
                return TriggerWaitResult::failure(dag_id, started, &e);
            }
        };
        let Some(run_id) = triggered
            .get("dag_run_id")
            .and_then(Value::as_str)
            .map(str::to_string)
        else {
            let error = AdapterError::MalformedTriggerResponse {
                dag_id: dag_id.to_string(),
            };
            warn!("{error}: {triggered}");
            return TriggerWaitResult::failure(dag_id, started, &error);
        };

        info!("Triggered {dag_id} run {run_id}, polling every {poll_interval:?} for up to {timeout:?}");
        let mut last_state = triggered
            .get("state")
            .and_then(Value::as_str)
            .map(RunState::from);
        let mut last_run: Option<DagRun> = None;

        loop {
            let elapsed = started.elapsed();
            if elapsed >= timeout {
                info!("Run {run_id} of {dag_id} still {last_state:?} after {timeout:?}");
                return Self::result(dag_id, run_id, last_state, last_run.as_ref(), started, true);
            }

            // Never sleep past the deadline
            sleep(poll_interval.min(timeout - elapsed)).await;

            match self.adapter.get_dag_run(dag_id, &run_id).await {
                Ok(Some(run)) => {
                    debug!("Run {run_id} of {dag_id} is {:?}", run.state);
                    last_state = run.state.clone();
                    let terminal = run.state.as_ref().is_some_and(RunState::is_terminal);
                    last_run = Some(run);
                    if terminal {
                        break;
                    }
                }
                Ok(None) => warn!("Run {run_id} of {dag_id} not found, still polling"),
                Err(e) => warn!("Polling run {run_id} of {dag_id} failed: {e}"),
            }
        }

        let mut result = Self::result(dag_id, run_id, last_state, last_run.as_ref(), started, false);
        if result.state != Some(RunState::Success) {
            result.failed_steps = Some(self.failed_steps(dag_id, result.run_id.as_deref()).await);
        }
        info!("Run of {dag_id} finished as {:?} in {:.1}s", result.state, result.elapsed_seconds);
        result
    }

    fn result(
        dag_id: &str,
        run_id: String,
        state: Option<RunState>,
        run: Option<&DagRun>,
        started: Instant,
        timed_out: bool,
    ) -> TriggerWaitResult {
        TriggerWaitResult {
            dag_id: dag_id.to_string(),
            run_id: Some(run_id),
            state,
            start_time: run.and_then(|r| r.start_date),
            end_time: run.and_then(|r| r.end_date),
            timed_out,
            elapsed_seconds: started.elapsed().as_secs_f64(),
            failed_steps: None,
            error: None,
        }
    }

    /// Pages through every task instance of the run. Best effort: a failed
    /// lookup ends the listing with whatever was collected so far.
    async fn failed_steps(&self, dag_id: &str, run_id: Option<&str>) -> Vec<FailedStepInfo> {
        let Some(run_id) = run_id else {
            return Vec::new();
        };

        let mut failed = Vec::new();
        let mut page = Page::new(TASK_INSTANCE_PAGE_LIMIT, 0);
        loop {
            let instances = match self.adapter.list_task_instances(dag_id, run_id, page).await {
                Ok(instances) => instances,
                Err(e) => {
                    warn!("Could not list task instances of {dag_id}/{run_id}: {e}");
                    break;
                }
            };
            if instances.is_empty() {
                break;
            }

            #[allow(clippy::cast_possible_truncation)]
            let fetched = instances.len() as u32;
            let total_entries = instances.total_entries;
            failed.extend(
                instances
                    .items
                    .into_iter()
                    .filter(|ti| ti.state.as_ref().is_some_and(RunState::is_failure))
                    .map(FailedStepInfo::from),
            );

            page.offset += fetched;
            if i64::from(page.offset) >= total_entries {
                break;
            }
            debug!("Fetching more task instances of {dag_id}/{run_id} from offset {}", page.offset);
        }
        failed
    }
}
