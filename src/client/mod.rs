//! The contract between compiled chains and the remote execution engine.
//!
//! Transport is left to implementors of [`ExecutionClient`]; this module only
//! defines the request/response shapes and the glue that submits a compiled
//! chain. Timeouts, retries and cancellation belong to the client.

use crate::chain::Chain;
use crate::compiler::CompiledChain;
use crate::error::ExecutionError;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, warn};

pub mod config;

pub use config::{ClientConfig, EnvLoader};

/// Submits chains to the remote engine.
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    async fn run_chain(&self, request: RunChainRequest) -> Result<RunChainResponse, ExecutionError>;
}

/// Body of a trigger call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunChainRequest {
    pub studio_id: String,
    pub params: Map<String, Value>,
    #[serde(default)]
    pub return_state: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Runs this graph instead of the deployed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub studio_override: Option<CompiledChain>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Complete,
    InProgress,
    Failed,
    Cancelled,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunStatus::Complete => "complete",
            RunStatus::InProgress => "inprogress",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", label)
    }
}

/// An error record reported by the remote engine, relayed as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    pub raw: String,
    pub body: String,
    #[serde(rename = "stepName", default, skip_serializing_if = "Option::is_none")]
    pub step_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunChainResponse {
    pub status: RunStatus,
    #[serde(default)]
    pub output: Map<String, Value>,
    #[serde(rename = "executionTime", default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,
    #[serde(default)]
    pub errors: Vec<RunError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ChainState>,
}

impl RunChainResponse {
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Complete
    }

    /// The chain output, or [`ExecutionError::Incomplete`] carrying the
    /// engine's errors when the run did not complete.
    pub fn into_output(self) -> Result<Map<String, Value>, ExecutionError> {
        if self.is_complete() {
            return Ok(self.output);
        }
        warn!(status = %self.status, errors = self.errors.len(), "chain run did not complete");
        Err(ExecutionError::Incomplete {
            status: self.status,
            errors: self.errors,
        })
    }
}

/// Execution state returned when a run is triggered with `return_state`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChainState {
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub steps: IndexMap<String, StepState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepState {
    #[serde(default)]
    pub execution_time: f64,
    #[serde(default)]
    pub output: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,
    /// Only present on iterated steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Map<String, Value>>>,
    /// Only present on iterated steps with skipped items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped_items: Option<Vec<Map<String, Value>>>,
}

impl Chain {
    /// Compiles the chain and submits it as an override of the deployed graph.
    pub async fn run(
        &self,
        client: &dyn ExecutionClient,
        params: Map<String, Value>,
    ) -> Result<RunChainResponse, ExecutionError> {
        let compiled = self.compile()?;
        debug!(studio_id = %compiled.studio_id, "submitting chain run");
        let request = RunChainRequest {
            studio_id: compiled.studio_id.clone(),
            params,
            return_state: true,
            version: None,
            studio_override: Some(compiled),
        };
        client.run_chain(request).await
    }
}
