use std::collections::HashMap;

use crate::completion_stream::{Completion, CompletionStream};
use crate::error::RunError;
use crate::progress::ProgressObserver;
use crate::work_channel::WorkChannel;
use crate::work_item::{TaskResult, WorkItem};
use crate::worker_handle::WorkerHandle;

/// One provisioned worker as the coordinator sees it: who it is and how to
/// hand it work.
pub struct PoolMember<C> {
    pub handle: WorkerHandle,
    pub channel: C,
}

/// Farms a work list out to a fixed pool of workers and collects the results.
///
/// Assignment is pull-based: each worker holds at most one item, and every
/// completion frees its worker for the next unassigned item, so faster
/// workers end up absorbing more of the list. Results are returned in
/// completion order; each one carries its originating item, so callers that
/// need submission order can sort on that.
pub struct Coordinator<C, S> {
    members: Vec<PoolMember<C>>,
    completions: S,
}

impl<C, S> Coordinator<C, S>
where
    C: WorkChannel,
    S: CompletionStream,
{
    pub fn new(members: Vec<PoolMember<C>>, completions: S) -> Self {
        Self {
            members,
            completions,
        }
    }

    pub fn pool_size(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> &[PoolMember<C>] {
        &self.members
    }

    /// Runs the whole work list to completion.
    ///
    /// Produces exactly one result per submitted item. Per-task failures ride
    /// inside those results; only an unreachable worker aborts the run, with
    /// an error naming the ranks whose tasks were abandoned.
    pub async fn run<O>(
        &mut self,
        work_items: Vec<WorkItem>,
        observer: &mut O,
    ) -> Result<Vec<TaskResult>, RunError>
    where
        O: ProgressObserver,
    {
        let total = work_items.len();
        observer.run_started(total);
        if total == 0 {
            observer.run_finished(&[]);
            return Ok(Vec::new());
        }
        if self.members.is_empty() {
            return Err(RunError::EmptyPool);
        }

        let members = &self.members;
        let completions = &mut self.completions;

        tracing::debug!(total, workers = members.len(), "dispatching work list");

        let mut pending = work_items.into_iter();
        let mut in_flight: HashMap<usize, WorkItem> = HashMap::new();
        let mut results: Vec<TaskResult> = Vec::with_capacity(total);

        // Seed every worker with its first item. With more workers than
        // items, the tail of the pool stays idle for the whole run.
        for member in members {
            let Some(item) = pending.next() else {
                break;
            };
            member.channel.dispatch(item.clone()).await?;
            in_flight.insert(member.handle.rank, item);
        }

        let mut draining = false;
        while !in_flight.is_empty() {
            let Some(Completion { rank, result }) = completions.next().await else {
                let mut ranks: Vec<usize> = in_flight.keys().copied().collect();
                ranks.sort_unstable();
                return Err(RunError::WorkerUnavailable {
                    ranks,
                    reason: "completion stream closed with tasks in flight".to_string(),
                });
            };

            // The result path may deliver a completion twice; only the item
            // currently assigned to this rank counts.
            if in_flight.get(&rank) != Some(&result.item) {
                tracing::warn!(rank, item = ?result.item, "completion matches no assignment");
                continue;
            }
            in_flight.remove(&rank);

            observer.task_completed(&result, results.len() + 1, total);
            results.push(result);

            let Some(member) = members.iter().find(|m| m.handle.rank == rank) else {
                tracing::warn!(rank, "completion from unknown rank");
                continue;
            };

            if let Some(item) = pending.next() {
                member.channel.dispatch(item.clone()).await?;
                in_flight.insert(rank, item);
            } else if !draining {
                draining = true;
                tracing::debug!(outstanding = in_flight.len(), "work list exhausted");
            }
        }

        tracing::debug!(completed = results.len(), "run complete");
        observer.run_finished(&results);
        Ok(results)
    }
}
