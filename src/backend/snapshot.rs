use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

/// Last successfully fetched list per backend endpoint.
///
/// When a list fetch fails the screen keeps showing what it had before,
/// alongside the error banner.
#[derive(Clone, Default)]
pub struct SnapshotStore {
    lists: Arc<RwLock<HashMap<String, Vec<Value>>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, endpoint: &str, items: &[Value]) {
        let mut map = self.lists.write().unwrap_or_else(|e| e.into_inner());
        map.insert(endpoint.to_string(), items.to_vec());
    }

    pub fn get(&self, endpoint: &str) -> Option<Vec<Value>> {
        let map = self.lists.read().unwrap_or_else(|e| e.into_inner());
        map.get(endpoint).cloned()
    }
}
