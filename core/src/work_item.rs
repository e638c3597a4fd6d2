use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// One requested unit of work: which engine to invoke and which benchmark to
/// hand it. Immutable once submitted. The same pair may appear many times in
/// a work list; every occurrence is an independent task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkItem {
    pub engine_id: String,
    pub benchmark_id: String,
}

impl WorkItem {
    pub fn new(engine_id: impl Into<String>, benchmark_id: impl Into<String>) -> Self {
        Self {
            engine_id: engine_id.into(),
            benchmark_id: benchmark_id.into(),
        }
    }
}

/// The outcome of one executed work item. Exactly one of these exists per
/// submitted item, whether the engine succeeded, failed, or was never found.
///
/// Carries the originating item so callers can re-correlate results that
/// arrive in completion order rather than submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub item: WorkItem,
    outcome: Result<serde_json::Value, TaskError>,
}

impl TaskResult {
    pub fn success(item: WorkItem, output: serde_json::Value) -> Self {
        Self {
            item,
            outcome: Ok(output),
        }
    }

    pub fn failure(item: WorkItem, error: TaskError) -> Self {
        Self {
            item,
            outcome: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The engine's output document, when the task succeeded.
    pub fn output(&self) -> Option<&serde_json::Value> {
        self.outcome.as_ref().ok()
    }

    /// The captured per-task error, when the task failed.
    pub fn error(&self) -> Option<&TaskError> {
        self.outcome.as_ref().err()
    }

    pub fn into_outcome(self) -> Result<serde_json::Value, TaskError> {
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_exposes_output_or_error_never_both() {
        let ok = TaskResult::success(WorkItem::new("PMP", "AMOC"), json!({"status": "ok"}));
        assert!(ok.is_success());
        assert!(ok.output().is_some());
        assert!(ok.error().is_none());

        let failed = TaskResult::failure(
            WorkItem::new("nope", "AMOC"),
            TaskError::UnknownEngine {
                engine_id: "nope".to_string(),
            },
        );
        assert!(!failed.is_success());
        assert!(failed.output().is_none());
        assert!(failed.error().is_some());
    }

    #[test]
    fn test_result_survives_serialization() {
        let original = TaskResult::failure(
            WorkItem::new("ILAMB", "nbp"),
            TaskError::EngineExecution {
                engine_id: "ILAMB".to_string(),
                message: "out of disk".to_string(),
            },
        );
        let wire = serde_json::to_string(&original).unwrap();
        let decoded: TaskResult = serde_json::from_str(&wire).unwrap();
        assert_eq!(decoded.item, original.item);
        assert_eq!(decoded.error(), original.error());
        assert!(decoded.into_outcome().is_err());
    }
}
