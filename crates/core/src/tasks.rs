//! Background task plumbing for the moderation session.
//!
//! Content generation runs ahead of the family where possible: dialogue
//! inspection starts while the child is still composing, and example
//! messages are drafted as soon as guides exist. Each task carries a tag so
//! a result can be matched against the request that is still current, and
//! superseded work is aborted rather than awaited.

use std::collections::HashMap;
use std::future::Future;

use anyhow::Result;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::model::ParentExampleMessage;

/// A spawned task together with the tag it was started under.
#[derive(Debug)]
pub struct TaggedTask<T> {
    task_id: Uuid,
    handle: JoinHandle<Result<T>>,
}

impl<T> TaggedTask<T> {
    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    /// Requests cancellation. Harmless on a task that already finished.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl<T: Send + 'static> TaggedTask<T> {
    /// Spawns `future` on the current runtime under `task_id`.
    pub fn spawn<F>(task_id: Uuid, future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            task_id,
            handle: tokio::spawn(future),
        }
    }

    /// Waits for the task and flattens cancellation into the error.
    pub async fn join(self) -> Result<T> {
        self.handle.await?
    }
}

/// Replaces the task in `slot` with `next`, aborting whatever was there.
///
/// Passing `None` clears the slot.
pub fn supersede<T>(slot: &mut Option<TaggedTask<T>>, next: Option<TaggedTask<T>>) {
    if let Some(previous) = slot.take() {
        previous.abort();
    }
    *slot = next;
}

/// Speculative example generation tasks for one guide recommendation,
/// keyed by guide id.
#[derive(Debug)]
pub struct ExampleTaskSet {
    recommendation_id: Uuid,
    tasks: HashMap<Uuid, TaggedTask<ParentExampleMessage>>,
}

impl ExampleTaskSet {
    pub fn new(recommendation_id: Uuid) -> Self {
        Self {
            recommendation_id,
            tasks: HashMap::new(),
        }
    }

    /// Id of the guide recommendation these tasks belong to.
    pub fn recommendation_id(&self) -> Uuid {
        self.recommendation_id
    }

    pub fn insert(&mut self, guide_id: Uuid, task: TaggedTask<ParentExampleMessage>) {
        self.tasks.insert(guide_id, task);
    }

    /// Removes and returns the task for `guide_id`. A task can only be
    /// joined once, so callers that miss here fall back to storage.
    pub fn take(&mut self, guide_id: Uuid) -> Option<TaggedTask<ParentExampleMessage>> {
        self.tasks.remove(&guide_id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Aborts every remaining task in the set.
    pub fn abort_all(self) {
        for task in self.tasks.values() {
            task.abort();
        }
    }
}
