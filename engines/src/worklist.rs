use bench_pool_core::{RunError, WorkItem};
use rand::Rng;
use serde::Deserialize;

use crate::simulated::{ESMVALTOOL, ILAMB, PMP};

/// The (engine, benchmark) pairs the demos draw from.
fn canonical_pairs() -> [WorkItem; 3] {
    [
        WorkItem::new(PMP, "AMOC"),
        WorkItem::new(ESMVALTOOL, "TCRE"),
        WorkItem::new(ILAMB, "nbp"),
    ]
}

/// Draws `n` work items from the canonical pairs, repeats included. Repeats
/// are deliberate: each occurrence is dispatched as its own task.
pub fn sample_work_list(rng: &mut impl Rng, n: usize) -> Vec<WorkItem> {
    let pairs = canonical_pairs();
    (0..n)
        .map(|_| pairs[rng.random_range(0..pairs.len())].clone())
        .collect()
}

/// On-disk shape of one work-list entry, as external tooling writes it.
#[derive(Debug, Deserialize)]
struct WorkListEntry {
    engine: String,
    benchmark: String,
}

/// Reads a JSON work list of the form
/// `[{"engine": "PMP", "benchmark": "AMOC"}, ...]`.
///
/// Unreadable files, malformed JSON and empty identifiers are all reported
/// as work-specification errors naming the offending path.
pub fn load_work_list(path: &str) -> Result<Vec<WorkItem>, RunError> {
    let spec_error = |reason: String| RunError::WorkSpecParse {
        path: path.to_string(),
        reason,
    };

    let contents = std::fs::read_to_string(path).map_err(|e| spec_error(e.to_string()))?;
    let entries: Vec<WorkListEntry> =
        serde_json::from_str(&contents).map_err(|e| spec_error(e.to_string()))?;

    let mut items = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        if entry.engine.is_empty() || entry.benchmark.is_empty() {
            return Err(spec_error(format!(
                "entry {index}: engine and benchmark must be non-empty"
            )));
        }
        items.push(WorkItem::new(entry.engine, entry.benchmark));
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sample_work_list_draws_from_canonical_pairs() {
        let mut rng = rand::rng();
        let items = sample_work_list(&mut rng, 20);
        assert_eq!(items.len(), 20);

        let pairs = canonical_pairs();
        for item in &items {
            assert!(pairs.contains(item), "unexpected item {item:?}");
        }
    }

    #[test]
    fn test_load_work_list_reads_engine_benchmark_pairs() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"engine": "PMP", "benchmark": "AMOC"}}, {{"engine": "ILAMB", "benchmark": "nbp"}}]"#
        )
        .unwrap();

        let items = load_work_list(file.path().to_str().unwrap()).unwrap();
        assert_eq!(
            items,
            vec![WorkItem::new("PMP", "AMOC"), WorkItem::new("ILAMB", "nbp")]
        );
    }

    #[test]
    fn test_load_work_list_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not a work list").unwrap();

        let err = load_work_list(file.path().to_str().unwrap()).unwrap_err();
        match err {
            RunError::WorkSpecParse { path, .. } => {
                assert_eq!(path, file.path().to_str().unwrap());
            }
            other => panic!("expected WorkSpecParse, got {other:?}"),
        }
    }

    #[test]
    fn test_load_work_list_rejects_empty_identifiers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"engine": "", "benchmark": "AMOC"}}]"#).unwrap();

        let err = load_work_list(file.path().to_str().unwrap()).unwrap_err();
        match err {
            RunError::WorkSpecParse { reason, .. } => {
                assert!(reason.contains("entry 0"), "reason was {reason:?}");
            }
            other => panic!("expected WorkSpecParse, got {other:?}"),
        }
    }

    #[test]
    fn test_load_work_list_reports_missing_file() {
        let err = load_work_list("/no/such/worklist.json").unwrap_err();
        assert!(matches!(err, RunError::WorkSpecParse { .. }));
    }
}
