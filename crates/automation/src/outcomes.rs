//! Bounded memory of recently finalized work items.
//!
//! Once a work item leaves the [`WorkItemRegistry`](crate::WorkItemRegistry)
//! its output location is gone with it. A client that polls after the
//! callback (or after its own earlier poll) won the claim still needs that
//! location, so the manager records each outcome here. Oldest entries are
//! evicted first.

use std::collections::{HashMap, VecDeque};

use tokio::sync::RwLock;
use viewpress_core::types::WorkItemId;
use viewpress_core::workitem::{WorkItem, WorkItemStatus};

/// How many finalized outcomes are remembered by default.
pub const DEFAULT_OUTCOME_CAPACITY: usize = 1024;

/// Final status and retrieval location of one work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: WorkItemStatus,
    pub extra_info: Option<String>,
}

#[derive(Default)]
struct Entries {
    order: VecDeque<WorkItemId>,
    by_id: HashMap<WorkItemId, Outcome>,
}

/// FIFO-evicting map of work item id to final [`Outcome`].
pub struct FinalizedOutcomes {
    capacity: usize,
    entries: RwLock<Entries>,
}

impl FinalizedOutcomes {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RwLock::new(Entries::default()),
        }
    }

    /// Remember how `item` ended.
    pub async fn record(&self, item: &WorkItem) {
        let mut entries = self.entries.write().await;
        let outcome = Outcome {
            status: item.status,
            extra_info: item.extra_info.clone(),
        };
        if entries.by_id.insert(item.id.clone(), outcome).is_none() {
            entries.order.push_back(item.id.clone());
        }
        while entries.order.len() > self.capacity {
            if let Some(evicted) = entries.order.pop_front() {
                entries.by_id.remove(&evicted);
            }
        }
    }

    pub async fn get(&self, id: &str) -> Option<Outcome> {
        self.entries.read().await.by_id.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.order.len()
    }
}

impl Default for FinalizedOutcomes {
    fn default() -> Self {
        Self::new(DEFAULT_OUTCOME_CAPACITY)
    }
}
