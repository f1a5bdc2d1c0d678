use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde::Serialize;
use serde_json::{json, Value};

use crate::airflow::error::{AdapterError, AdapterResult};
use crate::airflow::model::common::Page;
use crate::airflow::orchestrator::TriggerAndWait;
use crate::airflow::traits::{AirflowAdapter, ALL_DAGS};

/// Timeout used by `trigger_dag_and_wait` when the caller gives none.
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 3600;

pub const TOOL_NAMES: &[&str] = &[
    "list_dags",
    "get_dag",
    "get_dag_source",
    "pause_dag",
    "unpause_dag",
    "list_dag_runs",
    "get_dag_run",
    "trigger_dag_run",
    "trigger_dag_and_wait",
    "list_task_instances",
    "get_task_instance",
    "list_tasks",
    "list_assets",
    "list_connections",
    "list_variables",
    "get_variable",
    "list_pools",
    "list_import_errors",
    "get_config",
    "get_version",
    "get_health",
    "get_dag_stats",
];

/// Exposes every adapter operation as a named tool taking JSON arguments
/// and returning JSON text. Failures are rendered as `{"error": "..."}`.
#[derive(Clone)]
pub struct ToolRegistry {
    adapter: Arc<dyn AirflowAdapter>,
    orchestrator: TriggerAndWait,
}

impl ToolRegistry {
    pub fn new(adapter: Arc<dyn AirflowAdapter>) -> Self {
        Self {
            orchestrator: TriggerAndWait::new(adapter.clone()),
            adapter,
        }
    }

    pub fn names(&self) -> &'static [&'static str] {
        TOOL_NAMES
    }

    pub async fn call(&self, name: &str, args: &Value) -> String {
        debug!("Calling tool {name} with {args}");
        let result = match self.dispatch(name, args).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Tool {name} failed: {e}");
                json!({"error": e.to_string()})
            }
        };
        result.to_string()
    }

    async fn dispatch(&self, name: &str, args: &Value) -> AdapterResult<Value> {
        let adapter = &self.adapter;
        match name {
            "list_dags" => to_json(&adapter.list_dags(page(args)?).await?),
            "get_dag" => {
                let dag_id = required_str(args, "dag_id")?;
                found(adapter.get_dag(dag_id).await?, "DAG", dag_id)
            }
            "get_dag_source" => {
                let dag_id = required_str(args, "dag_id")?;
                found(adapter.get_dag_source(dag_id).await?, "DAG source for", dag_id)
            }
            "pause_dag" => to_json(&adapter.pause_dag(required_str(args, "dag_id")?, true).await?),
            "unpause_dag" => to_json(&adapter.pause_dag(required_str(args, "dag_id")?, false).await?),
            "list_dag_runs" => {
                let dag_id = optional_str(args, "dag_id").unwrap_or(ALL_DAGS);
                to_json(&adapter.list_dag_runs(dag_id, page(args)?).await?)
            }
            "get_dag_run" => {
                let dag_id = required_str(args, "dag_id")?;
                let run_id = required_str(args, "dag_run_id")?;
                found(adapter.get_dag_run(dag_id, run_id).await?, "DAG run", run_id)
            }
            "trigger_dag_run" => {
                let dag_id = required_str(args, "dag_id")?;
                adapter.trigger_dag_run(dag_id, conf(args)?).await
            }
            "trigger_dag_and_wait" => {
                let dag_id = required_str(args, "dag_id")?;
                let timeout = optional_u64(args, "timeout")?.unwrap_or(DEFAULT_WAIT_TIMEOUT_SECS);
                let poll_interval = optional_u64(args, "poll_interval")?.map(Duration::from_secs);
                let result = self
                    .orchestrator
                    .run(dag_id, conf(args)?, Duration::from_secs(timeout), poll_interval)
                    .await;
                to_json(&result)
            }
            "list_task_instances" => {
                let dag_id = required_str(args, "dag_id")?;
                let run_id = required_str(args, "dag_run_id")?;
                to_json(&adapter.list_task_instances(dag_id, run_id, page(args)?).await?)
            }
            "get_task_instance" => {
                let dag_id = required_str(args, "dag_id")?;
                let run_id = required_str(args, "dag_run_id")?;
                let task_id = required_str(args, "task_id")?;
                found(
                    adapter.get_task_instance(dag_id, run_id, task_id).await?,
                    "Task instance",
                    task_id,
                )
            }
            "list_tasks" => to_json(&adapter.list_tasks(required_str(args, "dag_id")?).await?),
            "list_assets" => to_json(&adapter.list_assets(page(args)?).await?),
            "list_connections" => to_json(&adapter.list_connections(page(args)?).await?),
            "list_variables" => to_json(&adapter.list_variables(page(args)?).await?),
            "get_variable" => {
                let key = required_str(args, "key")?;
                found(adapter.get_variable(key).await?, "Variable", key)
            }
            "list_pools" => to_json(&adapter.list_pools(page(args)?).await?),
            "list_import_errors" => to_json(&adapter.list_import_errors(page(args)?).await?),
            "get_config" => adapter.get_config().await,
            "get_version" => adapter.get_version().await,
            "get_health" => adapter.get_health().await,
            "get_dag_stats" => {
                let dag_ids = string_list(args, "dag_ids")?;
                to_json(&adapter.get_dag_stats(&dag_ids).await?)
            }
            _ => Err(AdapterError::invalid_argument(format!("unknown tool '{name}'"))),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> AdapterResult<Value> {
    serde_json::to_value(value).map_err(|e| AdapterError::decode(e.to_string()))
}

/// Absence is a normal result, rendered as an error object naming what was missing.
fn found<T: Serialize>(value: Option<T>, kind: &str, id: &str) -> AdapterResult<Value> {
    match value {
        Some(value) => to_json(&value),
        None => Ok(json!({"error": format!("{kind} '{id}' not found")})),
    }
}

fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn required_str<'a>(args: &'a Value, key: &str) -> AdapterResult<&'a str> {
    optional_str(args, key)
        .ok_or_else(|| AdapterError::invalid_argument(format!("missing required argument '{key}'")))
}

fn optional_u64(args: &Value, key: &str) -> AdapterResult<Option<u64>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            AdapterError::invalid_argument(format!("'{key}' must be a non-negative integer"))
        }),
    }
}

fn page(args: &Value) -> AdapterResult<Page> {
    let default = Page::default();
    let to_u32 = |key: &str, fallback: u32| -> AdapterResult<u32> {
        optional_u64(args, key)?.map_or(Ok(fallback), |v| {
            u32::try_from(v)
                .map_err(|_| AdapterError::invalid_argument(format!("'{key}' is too large")))
        })
    };
    Ok(Page::new(
        to_u32("limit", default.limit)?,
        to_u32("offset", default.offset)?,
    ))
}

fn conf(args: &Value) -> AdapterResult<Option<Value>> {
    match args.get("conf") {
        None | Some(Value::Null) => Ok(None),
        Some(conf @ Value::Object(_)) => Ok(Some(conf.clone())),
        // Callers sometimes pass the conf as a JSON-encoded string
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(conf @ Value::Object(_)) => Ok(Some(conf)),
            _ => Err(AdapterError::invalid_argument("'conf' must be a JSON object")),
        },
        Some(_) => Err(AdapterError::invalid_argument("'conf' must be a JSON object")),
    }
}

fn string_list(args: &Value, key: &str) -> AdapterResult<Vec<String>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(one)) => Ok(one
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    AdapterError::invalid_argument(format!("'{key}' must hold strings"))
                })
            })
            .collect(),
        Some(_) => Err(AdapterError::invalid_argument(format!(
            "'{key}' must be a list of strings"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airflow::client::testing::ScriptedTransport;
    use crate::airflow::client::{v1, v2};
    use crate::airflow::model::common::connection::REDACTED;

    fn call_json(output: &str) -> Value {
        serde_json::from_str(output).unwrap()
    }

    fn legacy() -> (Arc<ScriptedTransport>, ToolRegistry) {
        let (transport, adapter) = v1::tests::scripted_adapter();
        (transport, ToolRegistry::new(Arc::new(adapter)))
    }

    fn current() -> (Arc<ScriptedTransport>, ToolRegistry) {
        let (transport, adapter) = v2::tests::scripted_adapter();
        (transport, ToolRegistry::new(Arc::new(adapter)))
    }

    #[tokio::test]
    async fn test_every_tool_name_dispatches() {
        let (_transport, tools) = current();
        for name in tools.names() {
            let output = call_json(&tools.call(name, &json!({})).await);
            if let Some(error) = output.get("error").and_then(Value::as_str) {
                assert!(!error.contains("unknown tool"), "{name}: {error}");
            }
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_json() {
        let (_transport, tools) = current();
        let output = call_json(&tools.call("drop_database", &json!({})).await);
        assert!(output["error"].as_str().unwrap().contains("unknown tool"));
    }

    #[tokio::test]
    async fn test_missing_argument_is_error_json() {
        let (transport, tools) = current();
        let output = call_json(&tools.call("get_dag", &json!({})).await);
        assert!(output["error"].as_str().unwrap().contains("dag_id"));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_not_found_is_rendered_as_value() {
        let (transport, tools) = current();
        transport.push_json(404, json!({"detail": "not there"}));
        let output = call_json(&tools.call("get_dag", &json!({"dag_id": "ghost"})).await);
        assert_eq!(output, json!({"error": "DAG 'ghost' not found"}));
    }

    #[tokio::test]
    async fn test_legacy_assets_are_renamed() {
        let (transport, tools) = legacy();
        transport.push_json(
            200,
            json!({
                "datasets": [{"uri": "s3://bucket/raw", "consuming_dags": [{"dag_id": "etl"}]}],
                "total_entries": 1
            }),
        );

        let output = tools.call("list_assets", &json!({"limit": 10})).await;
        let parsed = call_json(&output);
        assert_eq!(parsed["assets"][0]["scheduled_dags"], json!([{"dag_id": "etl"}]));
        assert!(!output.contains("datasets"));
        assert!(!output.contains("consuming_dags"));
        assert_eq!(transport.calls(), vec!["GET api/v1/datasets"]);
    }

    #[tokio::test]
    async fn test_connections_never_leak_passwords() {
        let (transport, tools) = legacy();
        transport.push_json(
            200,
            json!({
                "connections": [{"connection_id": "pg", "conn_type": "postgres", "password": "hunter2"}],
                "total_entries": 1
            }),
        );

        let output = tools.call("list_connections", &json!({})).await;
        assert!(!output.contains("hunter2"));
        assert_eq!(call_json(&output)["connections"][0]["password"], json!(REDACTED));
    }

    #[tokio::test]
    async fn test_dag_stats_unsupported_on_legacy() {
        let (transport, tools) = legacy();
        let output = call_json(&tools.call("get_dag_stats", &json!({"dag_ids": ["etl"]})).await);
        assert_eq!(output["alternative"], json!("list_dag_runs"));
        assert!(output["error"].is_string());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_unpause_dag_passes_through_dag_fields() {
        let (transport, tools) = current();
        transport.push_json(200, json!({"dag_id": "etl", "is_paused": false, "owners": ["data"]}));

        let output = call_json(&tools.call("unpause_dag", &json!({"dag_id": "etl"})).await);
        assert_eq!(output, json!({"dag_id": "etl", "is_paused": false, "owners": ["data"]}));
        assert_eq!(transport.requests()[0].body, Some(json!({"is_paused": false})));
    }

    #[tokio::test]
    async fn test_list_dag_runs_defaults_to_all_dags() {
        let (transport, tools) = current();
        transport.push_json(200, json!({"dag_runs": [], "total_entries": 0}));
        let output = call_json(&tools.call("list_dag_runs", &json!({})).await);
        assert_eq!(output, json!({"dag_runs": [], "total_entries": 0}));
        assert_eq!(transport.calls(), vec!["GET api/v2/dags/~/dagRuns"]);
    }

    #[tokio::test]
    async fn test_trigger_accepts_string_conf() {
        let (transport, tools) = current();
        transport.push_json(200, json!({"dag_id": "etl", "dag_run_id": "manual__1", "state": "queued"}));
        let output = call_json(
            &tools
                .call("trigger_dag_run", &json!({"dag_id": "etl", "conf": "{\"full\": true}"}))
                .await,
        );
        assert_eq!(output["dag_run_id"], json!("manual__1"));
        assert_eq!(
            transport.requests()[0].body,
            Some(json!({"logical_date": null, "conf": {"full": true}}))
        );
    }

    #[tokio::test]
    async fn test_invalid_conf_is_rejected() {
        let (transport, tools) = current();
        let output = call_json(
            &tools
                .call("trigger_dag_run", &json!({"dag_id": "etl", "conf": [1, 2]}))
                .await,
        );
        assert!(output["error"].as_str().unwrap().contains("conf"));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_and_wait_tool() {
        let (transport, tools) = current();
        transport.push_json(200, json!({"dag_id": "etl", "dag_run_id": "manual__1", "state": "queued"}));
        transport.push_json(200, json!({"dag_id": "etl", "dag_run_id": "manual__1", "state": "success"}));

        let output = call_json(
            &tools
                .call(
                    "trigger_dag_and_wait",
                    &json!({"dag_id": "etl", "timeout": 60, "poll_interval": 5}),
                )
                .await,
        );
        assert_eq!(output["state"], json!("success"));
        assert_eq!(output["timed_out"], json!(false));
        assert!(output.get("failed_steps").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_and_wait_zero_interval_is_bounded() {
        let (transport, tools) = current();
        transport.push_json(200, json!({"dag_id": "etl", "dag_run_id": "manual__1", "state": "queued"}));
        transport.push_json(200, json!({"dag_id": "etl", "dag_run_id": "manual__1", "state": "running"}));

        let output = call_json(
            &tools
                .call(
                    "trigger_dag_and_wait",
                    &json!({"dag_id": "etl", "timeout": 1, "poll_interval": 0}),
                )
                .await,
        );
        assert_eq!(output["timed_out"], json!(true));
        assert_eq!(
            transport.calls(),
            vec!["POST api/v2/dags/etl/dagRuns", "GET api/v2/dags/etl/dagRuns/manual__1"]
        );
    }

    #[rstest::rstest]
    #[case(json!({}), Page::default())]
    #[case(json!({"limit": 5}), Page::new(5, 0))]
    #[case(json!({"limit": 5, "offset": 20}), Page::new(5, 20))]
    fn test_page_arguments(#[case] args: Value, #[case] expected: Page) {
        assert_eq!(page(&args).unwrap(), expected);
    }

    #[test]
    fn test_negative_limit_is_rejected() {
        assert!(page(&json!({"limit": -1})).is_err());
    }
}
