//! Whole-model compilation
//!
//! [`ConfigCompiler`] walks the model's listeners in order. Three modes are
//! offered:
//!
//! - [`ConfigCompiler::compile`] stops at the first listener that fails.
//! - [`ConfigCompiler::compile_each`] isolates failures per listener.
//! - [`ConfigCompiler::compile_parallel`] isolates failures and compiles each
//!   listener on a blocking tokio task. The model must not be mutated while a
//!   pass is running; sharing it behind an `Arc` enforces that for safe code.

use serde::Serialize;
use std::sync::Arc;

use crate::compile_span;
use crate::envoy::listener::{compile_listener, ListenerRecord};
use crate::errors::{Error, Result};
use crate::model::RoutingModel;

/// Ordered listener records, serialized as `{"listeners": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledConfig {
    pub listeners: Vec<ListenerRecord>,
}

impl CompiledConfig {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of compiling a single listener in isolation
#[derive(Debug)]
pub struct ListenerOutcome {
    /// Position of the listener in the model
    pub index: usize,
    pub result: Result<ListenerRecord>,
}

impl ListenerOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Compiles every listener of a routing model
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigCompiler;

impl ConfigCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Compile all listeners, aborting on the first structural error
    pub fn compile(&self, model: &RoutingModel) -> Result<CompiledConfig> {
        let span = compile_span!("compile", model.listeners.len());
        let _enter = span.enter();

        let listeners = model
            .listeners
            .iter()
            .enumerate()
            .map(|(index, listener)| compile_listener(model, listener, index))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(listeners = listeners.len(), routes = model.groups.len(), "Compiled routing model");

        Ok(CompiledConfig { listeners })
    }

    /// Compile every listener independently so one malformed listener does
    /// not block the rest
    pub fn compile_each(&self, model: &RoutingModel) -> Vec<ListenerOutcome> {
        let span = compile_span!("compile_each", model.listeners.len());
        let _enter = span.enter();

        model
            .listeners
            .iter()
            .enumerate()
            .map(|(index, listener)| ListenerOutcome {
                index,
                result: compile_listener(model, listener, index),
            })
            .collect()
    }

    /// Compile listeners concurrently. Outcomes come back in model order and
    /// match [`ConfigCompiler::compile_each`] exactly.
    pub async fn compile_parallel(&self, model: Arc<RoutingModel>) -> Vec<ListenerOutcome> {
        let handles: Vec<_> = (0..model.listeners.len())
            .map(|index| {
                let model = Arc::clone(&model);
                tokio::task::spawn_blocking(move || {
                    compile_listener(&model, &model.listeners[index], index)
                })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (index, handle) in handles.into_iter().enumerate() {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(Error::internal(format!("compile task for listener #{} failed: {}", index, e))),
            };
            outcomes.push(ListenerOutcome { index, result });
        }

        tracing::info!(
            listeners = outcomes.len(),
            failed = outcomes.iter().filter(|o| !o.is_ok()).count(),
            "Compiled routing model in parallel"
        );

        outcomes
    }

    /// Keep the successful listeners, logging a warning for each failure
    pub fn collect_successes(outcomes: Vec<ListenerOutcome>) -> CompiledConfig {
        let listeners = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome.result {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(listener = outcome.index, error = %e, "Skipping listener that failed to compile");
                    None
                }
            })
            .collect();

        CompiledConfig { listeners }
    }
}
