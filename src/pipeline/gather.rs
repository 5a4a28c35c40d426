// src/pipeline/gather.rs

//! Bounded, failure-isolated fan-out.
//!
//! Runs a batch of fallible futures with at most `max_concurrent` in flight
//! and a single deadline for the whole batch. Every input gets exactly one
//! outcome, reported in input order.
//!
//! Tasks are grouped into lanes (one per source). Each lane owns an equal
//! share of the concurrency budget and all lanes are polled together, so a
//! throttled or stalled source only ever holds its own slots.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use thiserror::Error;

use crate::error::SourceError;

/// Why a task produced no page.
#[derive(Error, Debug)]
pub enum TaskFailure {
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Still running (or not yet started) when the deadline hit
    #[error("cancelled by discovery timeout")]
    TimedOut,
}

/// Tagged result of one task.
#[derive(Debug)]
pub enum TaskOutcome<T> {
    Succeeded(T),
    Failed(TaskFailure),
}

impl<T> TaskOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// Outcomes of a gathered batch.
#[derive(Debug)]
pub struct Gathered<T> {
    /// One entry per input, in input order
    pub outcomes: Vec<TaskOutcome<T>>,
    /// The deadline elapsed before every task finished
    pub timed_out: bool,
}

/// Run `(lane, task)` pairs concurrently and collect one outcome per task.
///
/// Each lane gets `max_concurrent / lanes` slots, never fewer than one. A
/// failing task never cancels its siblings. Tasks still pending when
/// `deadline` elapses are dropped and reported as `TaskFailure::TimedOut`.
pub async fn gather_isolated<I, K, F, T>(
    tasks: I,
    max_concurrent: usize,
    deadline: Duration,
) -> Gathered<T>
where
    I: IntoIterator<Item = (K, F)>,
    K: Ord,
    F: Future<Output = Result<T, SourceError>>,
{
    let mut lanes: BTreeMap<K, Vec<(usize, F)>> = BTreeMap::new();
    let mut total = 0;
    for (index, (lane, task)) in tasks.into_iter().enumerate() {
        lanes.entry(lane).or_default().push((index, task));
        total += 1;
    }
    let mut slots: Vec<Option<TaskOutcome<T>>> = (0..total).map(|_| None).collect();
    let per_lane = (max_concurrent.max(1) / lanes.len().max(1)).max(1);

    let mut in_flight = stream::select_all(lanes.into_values().map(|lane| {
        Box::pin(
            stream::iter(lane)
                .map(|(index, task)| async move { (index, task.await) })
                .buffer_unordered(per_lane),
        )
    }));

    let drain = async {
        while let Some((index, result)) = in_flight.next().await {
            slots[index] = Some(match result {
                Ok(value) => TaskOutcome::Succeeded(value),
                Err(error) => TaskOutcome::Failed(TaskFailure::Source(error)),
            });
        }
    };
    let timed_out = tokio::time::timeout(deadline, drain).await.is_err();
    drop(in_flight);

    let outcomes = slots
        .into_iter()
        .map(|slot| slot.unwrap_or(TaskOutcome::Failed(TaskFailure::TimedOut)))
        .collect();

    Gathered { outcomes, timed_out }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::models::SourceKind;

    type BoxedTask = std::pin::Pin<Box<dyn Future<Output = Result<u32, SourceError>> + Send>>;

    fn one_lane<F>(tasks: Vec<F>) -> Vec<(u8, F)> {
        tasks.into_iter().map(|task| (0, task)).collect()
    }

    fn ok_after(ms: u64, value: u32) -> BoxedTask {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(value)
        })
    }

    fn fail_after(ms: u64) -> BoxedTask {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Err(SourceError::unparsable(SourceKind::PNet, "broken"))
        })
    }

    #[tokio::test(start_paused = true)]
    async fn outcomes_follow_input_order() {
        let tasks = vec![ok_after(300, 1), ok_after(100, 2), ok_after(200, 3)];
        let gathered = gather_isolated(one_lane(tasks), 8, Duration::from_secs(5)).await;

        let values: Vec<u32> = gathered
            .outcomes
            .into_iter()
            .map(|o| match o {
                TaskOutcome::Succeeded(v) => v,
                TaskOutcome::Failed(e) => panic!("unexpected failure: {e}"),
            })
            .collect();
        assert_eq!(values, vec![1, 2, 3]);
        assert!(!gathered.timed_out);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_does_not_cancel_siblings() {
        let tasks = vec![fail_after(10), ok_after(500, 7)];
        let gathered = gather_isolated(one_lane(tasks), 8, Duration::from_secs(5)).await;

        assert!(matches!(
            gathered.outcomes[0],
            TaskOutcome::Failed(TaskFailure::Source(_))
        ));
        assert!(matches!(gathered.outcomes[1], TaskOutcome::Succeeded(7)));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_cancels_pending_tasks() {
        let tasks = vec![ok_after(100, 1), ok_after(60_000, 2)];
        let gathered = gather_isolated(one_lane(tasks), 8, Duration::from_secs(1)).await;

        assert!(gathered.timed_out);
        assert!(gathered.outcomes[0].is_success());
        assert!(matches!(
            gathered.outcomes[1],
            TaskOutcome::Failed(TaskFailure::TimedOut)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrency_is_bounded() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..10)
            .map(|i| {
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, SourceError>(i)
                }
            })
            .collect();

        let gathered = gather_isolated(one_lane(tasks), 3, Duration::from_secs(5)).await;
        assert_eq!(gathered.outcomes.len(), 10);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_lane_does_not_starve_others() {
        // Lane 0 hangs; lane 1 queued behind it must still run to completion.
        let mut tasks: Vec<(u8, BoxedTask)> = (0..8).map(|i| (0, ok_after(3_600_000, i))).collect();
        tasks.extend((0..4).map(|i| (1, ok_after(10, 100 + i))));

        let gathered = gather_isolated(tasks, 4, Duration::from_secs(5)).await;
        assert!(gathered.timed_out);
        assert!(gathered.outcomes[..8].iter().all(|o| !o.is_success()));
        assert!(gathered.outcomes[8..].iter().all(TaskOutcome::is_success));
    }

    #[tokio::test(start_paused = true)]
    async fn lanes_share_the_budget() {
        let active = Arc::new([AtomicUsize::new(0), AtomicUsize::new(0)]);
        let peak = Arc::new([AtomicUsize::new(0), AtomicUsize::new(0)]);

        let tasks: Vec<_> = (0..12)
            .map(|i| {
                let lane = i % 2;
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                let task = async move {
                    let now = active[lane].fetch_add(1, Ordering::SeqCst) + 1;
                    peak[lane].fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    active[lane].fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, SourceError>(i)
                };
                (lane, task)
            })
            .collect();

        let gathered = gather_isolated(tasks, 4, Duration::from_secs(5)).await;
        assert!(gathered.outcomes.iter().all(TaskOutcome::is_success));
        assert_eq!(peak[0].load(Ordering::SeqCst), 2);
        assert_eq!(peak[1].load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_batch() {
        let tasks: Vec<BoxedTask> = Vec::new();
        let gathered = gather_isolated(one_lane(tasks), 4, Duration::from_secs(1)).await;
        assert!(gathered.outcomes.is_empty());
        assert!(!gathered.timed_out);
    }
}
