//! Tool contract offered to the language-model orchestrator.
//!
//! Each tool pairs an explicit JSON Schema declaration with a handler that
//! takes raw JSON arguments and always answers with text.

pub mod arguments;
pub mod fetch;

pub use arguments::ToolArguments;
pub use fetch::{FetchAnalyticsTool, FETCH_ANALYTICS};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::token_source_from_config;
use crate::backend::SearchConsoleBackend;
use crate::config::Config;
use crate::pipeline::{AnalyticsPipeline, CachedPipeline};

/// Wire-level description of a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the argument object
    pub parameters: Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    /// Run the tool. Failures are reported inside the returned text.
    async fn invoke(&self, arguments: Value) -> String;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.definition().name, tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Definitions ordered by tool name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }
}

/// Wire credentials, backend, pipeline and cache into a registry holding
/// `fetchAnalytics`.
pub fn registry_from_config(config: &Config) -> Result<ToolRegistry> {
    let timeout = Duration::from_secs(config.backend.request_timeout_secs);
    let tokens = token_source_from_config(&config.backend.credentials);
    let backend = SearchConsoleBackend::new(
        &config.backend.api_base,
        config.backend.site_id.clone(),
        tokens,
        timeout,
    )?;

    let pipeline = AnalyticsPipeline::new(Arc::new(backend), config.backend.site_root.clone(), timeout);
    let cached = CachedPipeline::new(pipeline, Duration::from_secs(config.cache.ttl_secs));

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(FetchAnalyticsTool::new(
        Arc::new(cached),
        config.query.clone(),
    )));
    Ok(registry)
}
