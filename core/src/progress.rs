use std::io::Write;
use std::time::Instant;

use crate::work_item::TaskResult;

/// Observes a run from the side. Called synchronously on the coordinator's
/// path, so implementations must return quickly and must never apply
/// back-pressure to dispatch.
pub trait ProgressObserver: Send {
    fn run_started(&mut self, total: usize);
    /// `completed` counts this result, so it runs 1..=total.
    fn task_completed(&mut self, result: &TaskResult, completed: usize, total: usize);
    fn run_finished(&mut self, results: &[TaskResult]);
}

/// Drops every event. For callers that bring their own reporting.
pub struct NullProgress;

impl ProgressObserver for NullProgress {
    fn run_started(&mut self, _total: usize) {}
    fn task_completed(&mut self, _result: &TaskResult, _completed: usize, _total: usize) {}
    fn run_finished(&mut self, _results: &[TaskResult]) {}
}

/// Single rewriting stderr line in the shape
/// `desc:  45% 9/20 [1.3 benchmark/s]`, finalized with a failure tally.
pub struct ConsoleProgress {
    desc: String,
    started: Option<Instant>,
}

impl ConsoleProgress {
    pub fn new(desc: impl Into<String>) -> Self {
        Self {
            desc: desc.into(),
            started: None,
        }
    }

    fn rate(&self, completed: usize) -> f64 {
        let Some(started) = self.started else {
            return 0.0;
        };
        let elapsed = started.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            completed as f64 / elapsed
        } else {
            0.0
        }
    }
}

fn percent(completed: usize, total: usize) -> usize {
    if total == 0 {
        100
    } else {
        completed * 100 / total
    }
}

impl ProgressObserver for ConsoleProgress {
    fn run_started(&mut self, total: usize) {
        self.started = Some(Instant::now());
        eprint!("{}:   0% 0/{} [0.0 benchmark/s]", self.desc, total);
        let _ = std::io::stderr().flush();
    }

    fn task_completed(&mut self, _result: &TaskResult, completed: usize, total: usize) {
        eprint!(
            "\r{}: {:3}% {}/{} [{:.1} benchmark/s]",
            self.desc,
            percent(completed, total),
            completed,
            total,
            self.rate(completed)
        );
        let _ = std::io::stderr().flush();
    }

    fn run_finished(&mut self, results: &[TaskResult]) {
        let failed = results.iter().filter(|r| !r.is_success()).count();
        eprintln!();
        if failed > 0 {
            eprintln!("{}: {failed} of {} tasks failed", self.desc, results.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_spans_zero_to_hundred() {
        assert_eq!(percent(0, 20), 0);
        assert_eq!(percent(9, 20), 45);
        assert_eq!(percent(20, 20), 100);
        assert_eq!(percent(1, 3), 33);
    }

    #[test]
    fn test_rate_is_zero_before_start() {
        let progress = ConsoleProgress::new("run");
        assert_eq!(progress.rate(5), 0.0);
    }
}
