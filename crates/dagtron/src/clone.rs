use std::any::Any;
use std::collections::HashMap;

use crate::task::Task;

/// Identity map used while structurally cloning a graph: original node
/// identity to the already-built clone. A parent shared by two children is
/// cloned once and the clone is shared by both cloned children.
#[derive(Default)]
pub(crate) struct CloneCache {
    map: HashMap<usize, Box<dyn Any>>,
}

impl CloneCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get<T>(&self, key: usize) -> Option<Task<T>>
    where
        T: Clone + Send + 'static,
    {
        self.map
            .get(&key)
            .and_then(|entry| entry.downcast_ref::<Task<T>>())
            .cloned()
    }

    pub(crate) fn put<T>(&mut self, key: usize, clone: Task<T>)
    where
        T: Clone + Send + 'static,
    {
        self.map.insert(key, Box::new(clone));
    }
}
