use std::collections::HashMap;
use taskboard_core::api::TaskJson;

/// Identifies one cached query result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Result of listing tasks with the given search term.
    TaskList { search: String },
}

impl CacheKey {
    pub fn task_list(search: impl Into<String>) -> Self {
        CacheKey::TaskList {
            search: search.into(),
        }
    }
}

/// Client-side copy of list results. Never authoritative.
///
/// Invalidation rule: any mutation drops every task-list entry, whatever
/// its search term.
#[derive(Debug, Default)]
pub struct TaskCache {
    entries: HashMap<CacheKey, Vec<TaskJson>>,
}

impl TaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&[TaskJson]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn insert(&mut self, key: CacheKey, tasks: Vec<TaskJson>) {
        self.entries.insert(key, tasks);
    }

    /// Applies the invalidation rule after a create, update, delete or status change.
    pub fn invalidate_mutation(&mut self) {
        self.entries
            .retain(|key, _| !matches!(key, CacheKey::TaskList { .. }));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
