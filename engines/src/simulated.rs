use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bench_pool_core::{Engine, EngineRegistry, RunError};
use rand::Rng;
use serde_json::{json, Value};

/// The canonical engine identifiers the demos register.
pub const PMP: &str = "PMP";
pub const ILAMB: &str = "ILAMB";
pub const ESMVALTOOL: &str = "ESMValTool";

/// Stand-in for a real benchmark package: sleeps for a random duration drawn
/// from the configured range, then reports a canned result document. Real
/// engines would shell out to PMP, ILAMB or ESMValTool here.
pub struct SimulatedEngine {
    name: String,
    latency_ms: Range<u64>,
}

impl SimulatedEngine {
    pub fn new(name: impl Into<String>, latency_ms: Range<u64>) -> Self {
        Self {
            name: name.into(),
            latency_ms,
        }
    }
}

#[async_trait]
impl Engine for SimulatedEngine {
    async fn run(&self, benchmark_id: &str) -> anyhow::Result<Value> {
        let millis = if self.latency_ms.is_empty() {
            self.latency_ms.start
        } else {
            rand::rng().random_range(self.latency_ms.clone())
        };
        tokio::time::sleep(Duration::from_millis(millis)).await;

        Ok(json!({
            "engine": self.name,
            "benchmark": benchmark_id,
            "elapsed_ms": millis,
            "status": "ok",
        }))
    }
}

/// Registry holding the three canonical engines, each answering within
/// `latency_ms`.
pub fn sample_registry(latency_ms: Range<u64>) -> Result<EngineRegistry, RunError> {
    let mut registry = EngineRegistry::new();
    for name in [PMP, ILAMB, ESMVALTOOL] {
        registry.register(name, Arc::new(SimulatedEngine::new(name, latency_ms.clone())))?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_registry_holds_the_canonical_engines() {
        let registry = sample_registry(0..1).unwrap();
        assert_eq!(registry.len(), 3);
        for name in [PMP, ILAMB, ESMVALTOOL] {
            assert!(registry.lookup(name).is_ok(), "missing {name}");
        }
    }

    #[tokio::test]
    async fn test_simulated_engine_echoes_its_inputs() {
        let engine = SimulatedEngine::new(PMP, 0..1);
        let output = engine.run("AMOC").await.unwrap();
        assert_eq!(output["engine"], "PMP");
        assert_eq!(output["benchmark"], "AMOC");
        assert_eq!(output["status"], "ok");
    }
}
