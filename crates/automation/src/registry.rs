//! Process-wide store of in-flight work items.
//!
//! [`WorkItemRegistry`] answers "is this job still active". It is built once
//! at startup and shared via `Arc`. Every terminal transition goes through
//! [`remove_if_present`](WorkItemRegistry::remove_if_present): whoever gets
//! `Some` back owns the transition, everyone else gets `None`.

use std::collections::HashMap;

use tokio::sync::RwLock;
use viewpress_core::error::CoreError;
use viewpress_core::types::WorkItemId;
use viewpress_core::workitem::WorkItem;

/// Entity name used in `NotFound` errors.
const ENTITY: &str = "WorkItem";

/// In-memory map of correlation id to tracked work item.
///
/// Thread-safe via an interior `RwLock`; callers never see the lock.
pub struct WorkItemRegistry {
    items: RwLock<HashMap<WorkItemId, WorkItem>>,
}

impl WorkItemRegistry {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }

    /// Start tracking `item`.
    ///
    /// Fails with `Conflict` if the id is already tracked.
    pub async fn put(&self, item: WorkItem) -> Result<(), CoreError> {
        let mut items = self.items.write().await;
        if items.contains_key(&item.id) {
            return Err(CoreError::Conflict(format!(
                "Work item {} is already tracked",
                item.id
            )));
        }
        items.insert(item.id.clone(), item);
        Ok(())
    }

    /// Snapshot of a tracked item.
    pub async fn get(&self, id: &str) -> Result<WorkItem, CoreError> {
        self.items
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: ENTITY,
                id: id.to_string(),
            })
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.items.read().await.contains_key(id)
    }

    /// Stop tracking `id`, returning the item if this call removed it.
    ///
    /// Linearizable per id: of any number of concurrent callers at most
    /// one receives `Some`.
    pub async fn remove_if_present(&self, id: &str) -> Option<WorkItem> {
        self.items.write().await.remove(id)
    }

    /// Number of tracked items.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Ids still tracked, oldest submission first.
    pub async fn ids(&self) -> Vec<WorkItemId> {
        let items = self.items.read().await;
        let mut tracked: Vec<&WorkItem> = items.values().collect();
        tracked.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then_with(|| a.id.cmp(&b.id)));
        tracked.into_iter().map(|item| item.id.clone()).collect()
    }
}

impl Default for WorkItemRegistry {
    fn default() -> Self {
        Self::new()
    }
}
