use std::collections::VecDeque;

use super::item::WorkItem;

/// In-memory FIFO of work items awaiting a fetch
///
/// Every item held here is already persisted as Pending in the ledger, so
/// dropping the queue never loses work.
#[derive(Debug, Default, Clone)]
pub struct WorkQueue {
    items: VecDeque<WorkItem>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&mut self, item: WorkItem) {
        self.items.push_back(item);
    }

    pub fn extend<I: IntoIterator<Item = WorkItem>>(&mut self, items: I) {
        self.items.extend(items);
    }

    pub fn pop_front(&mut self) -> Option<WorkItem> {
        self.items.pop_front()
    }

    /// Discard the current contents and load `items` in order
    pub fn replace<I: IntoIterator<Item = WorkItem>>(&mut self, items: I) {
        self.items.clear();
        self.items.extend(items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
