use std::sync::{Arc, Mutex};

use crate::builders::{make_root, make_wait};
use crate::errors::TaskError;
use crate::executors::SharedExecutor;
use crate::parents::ParentList;
use crate::task::Task;
use crate::types::TaskResult;

/// Builds a graph applying `op` to every element: one root task per
/// element plus a wait-kind sink to join on. Nothing runs until the
/// returned task is scheduled.
pub fn for_each<V, Op>(items: Vec<V>, op: Op) -> TaskResult<Task<()>>
where
    V: Send + Sync + 'static,
    Op: Fn(&V) + Send + Sync + 'static,
{
    if items.is_empty() {
        return Err(TaskError::invalid_parameter("items"));
    }

    let op = Arc::new(op);
    let roots = items
        .into_iter()
        .map(|item| {
            let op = Arc::clone(&op);
            make_root(move || {
                op(&item);
                Ok(())
            })
        })
        .collect::<Vec<_>>();

    Ok(make_wait(|| Ok(()), ParentList::new(roots)?))
}

/// Like [`for_each`] but additionally schedules the whole graph through
/// the given executor.
pub fn for_each_scheduled<V, Op>(
    executor: &SharedExecutor,
    items: Vec<V>,
    op: Op,
) -> TaskResult<Task<()>>
where
    V: Send + Sync + 'static,
    Op: Fn(&V) + Send + Sync + 'static,
{
    let task = for_each(items, op)?;
    task.schedule_all_with(executor)?;
    Ok(task)
}

/// Builds a graph mapping every element through `op` into the matching
/// slot of `out`: one root task per element plus a wait-kind sink to join
/// on. `out` must already hold at least `items.len()` slots.
pub fn transform<V, R, Op>(
    items: Vec<V>,
    out: &Arc<Mutex<Vec<R>>>,
    op: Op,
) -> TaskResult<Task<()>>
where
    V: Send + Sync + 'static,
    R: Send + 'static,
    Op: Fn(&V) -> R + Send + Sync + 'static,
{
    if items.is_empty() {
        return Err(TaskError::invalid_parameter("items"));
    }
    if out.lock().unwrap().len() < items.len() {
        return Err(TaskError::invalid_parameter("out"));
    }

    let op = Arc::new(op);
    let roots = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let op = Arc::clone(&op);
            let out = Arc::clone(out);
            make_root(move || {
                let value = op(&item);
                out.lock().unwrap()[index] = value;
                Ok(())
            })
        })
        .collect::<Vec<_>>();

    Ok(make_wait(|| Ok(()), ParentList::new(roots)?))
}

/// Like [`transform`] but additionally schedules the whole graph through
/// the given executor.
pub fn transform_scheduled<V, R, Op>(
    executor: &SharedExecutor,
    items: Vec<V>,
    out: &Arc<Mutex<Vec<R>>>,
    op: Op,
) -> TaskResult<Task<()>>
where
    V: Send + Sync + 'static,
    R: Send + 'static,
    Op: Fn(&V) -> R + Send + Sync + 'static,
{
    let task = transform(items, out, op)?;
    task.schedule_all_with(executor)?;
    Ok(task)
}
