//! Task groups: spawn N, join N
//!
//! A `TaskGroup` either runs its tasks concurrently on tokio or, when
//! parallelism is disabled, runs them one after the other in spawn order.
//! Blocking probe calls go to the blocking pool in both modes. Both modes
//! return results in spawn order, and only once every task has reported.

use crate::error::TaskFailure;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use tokio::task::JoinSet;
use tracing::error;

type Outcome<T> = Result<T, Box<dyn Any + Send + 'static>>;

enum Mode<T> {
    Concurrent(JoinSet<(usize, Outcome<T>)>),
    // `None` when the task never reported back
    Sequential(Vec<BoxFuture<'static, Option<Outcome<T>>>>),
}

pub struct TaskGroup<T> {
    mode: Mode<T>,
    labels: Vec<String>,
}

impl<T: Send + 'static> TaskGroup<T> {
    /// New group; `parallel = false` forces sequential execution
    pub fn new(parallel: bool) -> Self {
        let mode = if parallel {
            Mode::Concurrent(JoinSet::new())
        } else {
            Mode::Sequential(Vec::new())
        };
        Self { mode, labels: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Add an async task
    pub fn spawn<F>(&mut self, label: impl Into<String>, task: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        let index = self.labels.len();
        self.labels.push(label.into());

        match &mut self.mode {
            Mode::Concurrent(set) => {
                set.spawn(async move { (index, AssertUnwindSafe(task).catch_unwind().await) });
            }
            Mode::Sequential(queue) => {
                queue.push(AssertUnwindSafe(task).catch_unwind().map(Some).boxed());
            }
        }
    }

    /// Add a blocking task (a probe call)
    pub fn spawn_blocking<F>(&mut self, label: impl Into<String>, task: F)
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let index = self.labels.len();
        self.labels.push(label.into());

        match &mut self.mode {
            Mode::Concurrent(set) => {
                set.spawn_blocking(move || (index, panic::catch_unwind(AssertUnwindSafe(task))));
            }
            Mode::Sequential(queue) => queue.push(
                async move {
                    tokio::task::spawn_blocking(move || panic::catch_unwind(AssertUnwindSafe(task)))
                        .await
                        .ok()
                }
                .boxed(),
            ),
        }
    }

    /// Wait for every task; results come back in spawn order
    pub async fn join_all(self) -> Vec<Result<T, TaskFailure>> {
        self.join_all_labeled()
            .await
            .into_iter()
            .map(|(_, result)| result)
            .collect()
    }

    /// Same as `join_all`, paired with the label each task was spawned with
    pub async fn join_all_labeled(self) -> Vec<(String, Result<T, TaskFailure>)> {
        let labels = self.labels;
        let mut slots: Vec<Option<Outcome<T>>> = labels.iter().map(|_| None).collect();

        match self.mode {
            Mode::Concurrent(mut set) => {
                while let Some(joined) = set.join_next().await {
                    match joined {
                        Ok((index, outcome)) => slots[index] = Some(outcome),
                        Err(e) => error!("Task did not complete: {}", e),
                    }
                }
            }
            Mode::Sequential(queue) => {
                for (slot, task) in slots.iter_mut().zip(queue) {
                    *slot = task.await;
                }
            }
        }

        slots
            .into_iter()
            .zip(labels)
            .map(|(slot, label)| {
                let result = match slot {
                    Some(Ok(value)) => Ok(value),
                    Some(Err(payload)) => Err(TaskFailure::Panicked {
                        label: label.clone(),
                        message: panic_message(payload.as_ref()),
                    }),
                    None => Err(TaskFailure::Lost { label: label.clone() }),
                };
                (label, result)
            })
            .collect()
    }
}

/// Run one blocking probe call off the async workers
pub async fn run_blocking<T, F>(label: &str, task: F) -> Result<T, TaskFailure>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(value) => Ok(value),
        Err(e) if e.is_panic() => Err(TaskFailure::Panicked {
            label: label.to_string(),
            message: panic_message(e.into_panic().as_ref()),
        }),
        Err(_) => Err(TaskFailure::Lost { label: label.to_string() }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
