//! Version-adaptive adapters over the Airflow REST API (v1 for Airflow 2,
//! v2 for Airflow 3), a trigger-and-wait orchestrator, and a JSON tool
//! surface on top of both.

pub mod airflow;
pub mod tools;
