use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{RunError, TaskError};

/// A pluggable benchmark implementation.
///
/// The whole contract is here: given a benchmark identifier, produce a result
/// document or fail. Engines are expected to take a long time and may touch
/// the filesystem or network. There is no cancellation, so a hung engine
/// blocks its worker until it returns.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn run(&self, benchmark_id: &str) -> anyhow::Result<Value>;
}

/// Name-to-engine table. Populated once before dispatch starts, read-only
/// afterwards, shared across workers behind an `Arc`.
#[derive(Default)]
pub struct EngineRegistry {
    engines: HashMap<String, Arc<dyn Engine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates an identifier with an engine. A duplicate identifier is
    /// rejected rather than silently overwritten.
    pub fn register(
        &mut self,
        engine_id: impl Into<String>,
        engine: Arc<dyn Engine>,
    ) -> Result<(), RunError> {
        let engine_id = engine_id.into();
        if self.engines.contains_key(&engine_id) {
            return Err(RunError::DuplicateEngine { engine_id });
        }
        self.engines.insert(engine_id, engine);
        Ok(())
    }

    pub fn lookup(&self, engine_id: &str) -> Result<Arc<dyn Engine>, TaskError> {
        self.engines
            .get(engine_id)
            .cloned()
            .ok_or_else(|| TaskError::UnknownEngine {
                engine_id: engine_id.to_string(),
            })
    }

    pub fn engine_ids(&self) -> impl Iterator<Item = &str> {
        self.engines.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoEngine;

    #[async_trait]
    impl Engine for EchoEngine {
        async fn run(&self, benchmark_id: &str) -> anyhow::Result<Value> {
            Ok(json!({ "benchmark": benchmark_id }))
        }
    }

    #[test]
    fn test_register_rejects_duplicate_identifier() {
        let mut registry = EngineRegistry::new();
        registry.register("PMP", Arc::new(EchoEngine)).unwrap();

        let err = registry.register("PMP", Arc::new(EchoEngine)).unwrap_err();
        match err {
            RunError::DuplicateEngine { engine_id } => assert_eq!(engine_id, "PMP"),
            other => panic!("expected DuplicateEngine, got {other:?}"),
        }
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_unknown_identifier_fails() {
        let registry = EngineRegistry::new();
        match registry.lookup("ILAMB") {
            Err(TaskError::UnknownEngine { engine_id }) => assert_eq!(engine_id, "ILAMB"),
            Err(other) => panic!("expected UnknownEngine, got {other:?}"),
            Ok(_) => panic!("expected lookup of an unregistered engine to fail"),
        }
    }

    #[tokio::test]
    async fn test_lookup_returns_registered_engine() {
        let mut registry = EngineRegistry::new();
        registry.register("PMP", Arc::new(EchoEngine)).unwrap();

        let engine = registry.lookup("PMP").unwrap();
        let output = engine.run("AMOC").await.unwrap();
        assert_eq!(output, json!({ "benchmark": "AMOC" }));
    }
}
