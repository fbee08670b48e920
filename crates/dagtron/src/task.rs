use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, Weak};

use crate::builders;
use crate::cancel::CancelToken;
use crate::cell::{CellSnapshot, ResultCell, TaskFuture};
use crate::clone::CloneCache;
use crate::dot::node_label;
use crate::errors::TaskError;
use crate::events::{SharedListener, TaskEvent};
use crate::executors::SharedExecutor;
use crate::graph::{traversal_order, Edge};
use crate::node::{CustomData, GraphNode, NodeCore};
use crate::runners::TaskBody;
use crate::synca::OnSignal;
use crate::types::{TaskKind, TaskResult};

/// A shared handle onto one node of a task graph. Cloning the handle does
/// not clone the node; use [`Task::clone_graph`] for a structural copy of
/// the whole subgraph.
pub struct Task<T> {
    inner: Arc<TaskInner<T>>,
}

impl<T> Clone for Task<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// The node state behind a [`Task`] handle: untyped core, the current
/// cycle's result cell and the kind-specific body holding parents and
/// functor. Children hold strong handles to parents; runners hold a weak
/// one back to their task so a dropped graph resolves in-flight cells
/// with a destroyed error instead of leaking waiters.
pub(crate) struct TaskInner<T> {
    pub(crate) core: NodeCore,
    pub(crate) cell: Mutex<Arc<ResultCell<T>>>,
    pub(crate) body: Box<dyn TaskBody<T>>,
    pub(crate) ordered: Mutex<Option<Vec<Arc<dyn GraphNode>>>>,
    pub(crate) self_weak: Weak<TaskInner<T>>,
}

/// Builds a task from its parts, wiring levels and child counts into the
/// parents the moment the node is constructed.
pub(crate) fn assemble<T>(
    kind: TaskKind,
    canceled: Arc<OnSignal>,
    body: Box<dyn TaskBody<T>>,
    initial_cell: ResultCell<T>,
    schedule_enabled: bool,
) -> Task<T>
where
    T: Clone + Send + 'static,
{
    let core = NodeCore::new(kind, canceled);
    core.schedule_enabled
        .store(schedule_enabled, Ordering::Release);

    let parents = body.parent_nodes();
    let mut level = 0;
    for parent in &parents {
        level = level.max(parent.level() + 1);
    }
    core.level.store(level, Ordering::Release);

    let inner = Arc::new_cyclic(|weak| TaskInner {
        core,
        cell: Mutex::new(Arc::new(initial_cell)),
        body,
        ordered: Mutex::new(None),
        self_weak: weak.clone(),
    });

    for parent in &parents {
        parent.increment_child_count();
    }

    Task { inner }
}

impl<T> TaskInner<T>
where
    T: Clone + Send + 'static,
{
    pub(crate) fn current_cell(&self) -> Arc<ResultCell<T>> {
        Arc::clone(&self.cell.lock().unwrap())
    }

    /// Swaps the result cell and notifies listeners of the change.
    fn swap_cell(&self, cell: ResultCell<T>) {
        *self.cell.lock().unwrap() = Arc::new(cell);
        self.raise_event(TaskEvent::AfterFutureChanged);
    }

    pub(crate) fn label(&self, separator: &str) -> String {
        node_label(self, separator)
    }

    /// Mutations are only legal while no run is in flight: the cell either
    /// never entered a cycle or has already resolved.
    pub(crate) fn ensure_not_running(&self) -> TaskResult<()> {
        if self.was_scheduled() && !self.is_resolved() {
            return Err(TaskError::control(format!(
                "task currently running: {}",
                self.label(" ")
            )));
        }
        Ok(())
    }

    fn ensure_scheduled(&self) -> TaskResult<()> {
        if !self.was_scheduled() {
            return Err(TaskError::control(format!(
                "task was not scheduled: {}",
                self.label(" ")
            )));
        }
        Ok(())
    }

    /// One schedule cycle: arm the refcount, build the runner, swap in a
    /// fresh pending cell and dispatch on the effective executor.
    fn schedule_cycle_impl(&self, executor: Option<&SharedExecutor>, reset: bool) {
        if !self.core.schedule_enabled.load(Ordering::Acquire) {
            return;
        }
        if self.was_scheduled() && !reset {
            return;
        }

        let span = tracing::trace_span!("Task::schedule_cycle", id = self.id());
        let _enter = span.enter();

        if reset {
            self.core.canceled.set(false);
        }
        self.core.refcount.store(
            self.core.child_count.load(Ordering::Acquire),
            Ordering::Release,
        );

        let repr = self.id().to_string();
        let cell = Arc::new(ResultCell::pending());
        let job = self
            .body
            .make_job(self.self_weak.clone(), Arc::clone(&cell), repr);

        self.raise_event(TaskEvent::BeforeScheduled);
        *self.cell.lock().unwrap() = Arc::clone(&cell);
        self.raise_event(TaskEvent::AfterFutureChanged);

        let chosen = {
            let override_executor = self.core.executor.lock().unwrap();
            override_executor.clone().or_else(|| executor.cloned())
        };
        match chosen {
            Some(executor) => executor.execute(job, self),
            None => job(),
        }
    }

    /// The finalized `(level, id)` order for the subgraph this task
    /// terminates, computed once and reused afterwards.
    pub(crate) fn finalize(&self) -> Vec<Arc<dyn GraphNode>> {
        let mut ordered = self.ordered.lock().unwrap();
        if let Some(cached) = &*ordered {
            return cached.clone();
        }
        let terminal = self.to_shared();
        let computed = traversal_order(&terminal);
        *ordered = Some(computed.clone());
        computed
    }

    pub(crate) fn clone_with(&self, cache: &mut CloneCache) -> TaskResult<Task<T>> {
        if let Some(existing) = cache.get::<T>(self.key()) {
            return Ok(existing);
        }
        self.ensure_not_running()?;

        let body = self.body.clone_body(cache)?;
        let cell = match self.current_cell().snapshot() {
            CellSnapshot::Ready(value) => ResultCell::ready(value),
            CellSnapshot::Failed(error) => ResultCell::failed(error),
            CellSnapshot::Unresolved => ResultCell::idle(),
        };

        let core = self.core.duplicate();
        let inner = Arc::new_cyclic(|weak| TaskInner {
            core,
            cell: Mutex::new(Arc::new(cell)),
            body,
            ordered: Mutex::new(None),
            self_weak: weak.clone(),
        });

        let clone = Task { inner };
        cache.put(self.key(), clone.clone());
        Ok(clone)
    }
}

impl<T> GraphNode for TaskInner<T>
where
    T: Clone + Send + 'static,
{
    fn kind(&self) -> TaskKind {
        self.core.kind
    }

    fn id(&self) -> usize {
        self.core.id.load(Ordering::Acquire)
    }

    fn level(&self) -> usize {
        self.core.level.load(Ordering::Acquire)
    }

    fn name(&self) -> Option<String> {
        self.core.name.lock().unwrap().clone()
    }

    fn set_name(&self, name: Option<String>) {
        *self.core.name.lock().unwrap() = name;
    }

    fn priority(&self) -> i64 {
        self.core.priority.load(Ordering::Acquire)
    }

    fn set_priority(&self, priority: i64) -> TaskResult<()> {
        self.ensure_not_running()?;
        self.core.priority.store(priority, Ordering::Release);
        Ok(())
    }

    fn custom_data(&self) -> Option<CustomData> {
        self.core.custom_data.lock().unwrap().clone()
    }

    fn set_custom_data(&self, data: CustomData) -> TaskResult<()> {
        self.ensure_not_running()?;
        *self.core.custom_data.lock().unwrap() = Some(data);
        self.raise_event(TaskEvent::AfterCustomDataSet);
        Ok(())
    }

    fn remove_custom_data(&self) -> TaskResult<()> {
        self.ensure_not_running()?;
        *self.core.custom_data.lock().unwrap() = None;
        Ok(())
    }

    fn canceled(&self) -> bool {
        self.core.canceled.probe()
    }

    fn cancel(&self, flag: bool) {
        self.core.canceled.set(flag);
    }

    fn executor(&self) -> Option<SharedExecutor> {
        self.core.executor.lock().unwrap().clone()
    }

    fn set_executor(&self, executor: SharedExecutor) -> TaskResult<()> {
        self.ensure_not_running()?;
        *self.core.executor.lock().unwrap() = Some(executor);
        Ok(())
    }

    fn remove_executor(&self) -> TaskResult<()> {
        self.ensure_not_running()?;
        *self.core.executor.lock().unwrap() = None;
        Ok(())
    }

    fn avg_idle_us(&self) -> i64 {
        self.core.avg_idle_us.load(Ordering::Acquire)
    }

    fn avg_wait_us(&self) -> i64 {
        self.core.avg_wait_us.load(Ordering::Acquire)
    }

    fn avg_run_us(&self) -> i64 {
        self.core.avg_run_us.load(Ordering::Acquire)
    }

    fn set_avg_idle_us(&self, us: i64) {
        self.core.avg_idle_us.store(us, Ordering::Release);
    }

    fn set_avg_wait_us(&self, us: i64) {
        self.core.avg_wait_us.store(us, Ordering::Release);
    }

    fn set_avg_run_us(&self, us: i64) {
        self.core.avg_run_us.store(us, Ordering::Release);
    }

    fn key(&self) -> usize {
        std::ptr::addr_of!(self.core) as usize
    }

    fn child_count(&self) -> usize {
        self.core.child_count.load(Ordering::Acquire)
    }

    fn increment_child_count(&self) {
        self.core.child_count.fetch_add(1, Ordering::AcqRel);
    }

    fn was_scheduled(&self) -> bool {
        self.current_cell().entered_cycle()
    }

    fn is_resolved(&self) -> bool {
        self.current_cell().poll()
    }

    fn to_shared(&self) -> Arc<dyn GraphNode> {
        let alive = self
            .self_weak
            .upgrade()
            .expect("task alive while traversing its graph");
        alive
    }

    fn parent_nodes(&self) -> Vec<Arc<dyn GraphNode>> {
        self.body.parent_nodes()
    }

    fn mark_visited(&self) -> bool {
        !self.core.visited.swap(true, Ordering::AcqRel)
    }

    fn clear_visited(&self) {
        self.core.visited.store(false, Ordering::Release);
    }

    fn assign_id(&self, id: usize) {
        self.core.id.store(id, Ordering::Release);
    }

    fn schedule_cycle(&self, executor: Option<&SharedExecutor>, reset: bool) {
        self.schedule_cycle_impl(executor, reset);
    }

    fn reset(&self) -> TaskResult<()> {
        self.ensure_not_running()?;
        self.core.canceled.set(false);
        self.core.schedule_enabled.store(true, Ordering::Release);
        self.core.refcount.store(
            self.core.child_count.load(Ordering::Acquire),
            Ordering::Release,
        );
        self.swap_cell(ResultCell::idle());
        Ok(())
    }

    fn clear_result(&self) {
        self.swap_cell(ResultCell::idle());
    }

    fn decrement_refcount(&self) {
        let previous = self
            .core
            .refcount
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                count.checked_sub(1)
            });
        if previous == Ok(1) {
            self.raise_event(TaskEvent::AfterSatisfied);
        }
    }

    fn add_listener(&self, listener: SharedListener) -> TaskResult<()> {
        self.ensure_not_running()?;
        self.core.listeners.add(&listener);
        Ok(())
    }

    fn add_listener_for(&self, event: TaskEvent, listener: SharedListener) -> TaskResult<()> {
        self.ensure_not_running()?;
        self.core.listeners.add_for(event, &listener);
        Ok(())
    }

    fn remove_listener(&self, listener: &SharedListener) -> TaskResult<()> {
        self.ensure_not_running()?;
        self.core.listeners.remove(listener);
        Ok(())
    }

    fn remove_listener_for(&self, event: TaskEvent, listener: &SharedListener) -> TaskResult<()> {
        self.ensure_not_running()?;
        self.core.listeners.remove_for(event, listener);
        Ok(())
    }

    fn remove_listeners(&self) -> TaskResult<()> {
        self.ensure_not_running()?;
        self.core.listeners.clear();
        Ok(())
    }

    fn remove_listeners_for(&self, event: TaskEvent) -> TaskResult<()> {
        self.ensure_not_running()?;
        self.core.listeners.clear_for(event);
        Ok(())
    }

    fn raise_event(&self, event: TaskEvent) {
        let listeners = self.core.listeners.snapshot_for(event);
        for listener in listeners {
            listener.on_event(event, self);
        }
    }
}

impl<T> Task<T>
where
    T: Clone + Send + 'static,
{
    /// The untyped node view of this task.
    #[must_use]
    pub fn as_node(&self) -> Arc<dyn GraphNode> {
        self.inner.clone()
    }

    /// Stable identity of the underlying node.
    #[must_use]
    pub fn key(&self) -> usize {
        self.inner.key()
    }

    /// Whether two handles point at the same node.
    #[must_use]
    pub fn same_task(&self, other: &Task<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn clone_with(&self, cache: &mut CloneCache) -> TaskResult<Task<T>> {
        self.inner.clone_with(cache)
    }

    #[must_use]
    pub fn kind(&self) -> TaskKind {
        self.inner.kind()
    }

    #[must_use]
    pub fn id(&self) -> usize {
        self.inner.id()
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.inner.level()
    }

    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.inner.name()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.inner.set_name(Some(name.into()));
    }

    /// Fluent rename, for use at construction time.
    #[must_use]
    pub fn named(self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    #[must_use]
    pub fn priority(&self) -> i64 {
        self.inner.priority()
    }

    pub fn set_priority(&self, priority: i64) -> TaskResult<()> {
        self.inner.set_priority(priority)
    }

    pub fn reset_priority(&self) -> TaskResult<()> {
        self.inner.set_priority(0)
    }

    pub fn set_priority_all(&self, priority: i64) -> TaskResult<()> {
        self.inner.ensure_not_running()?;
        for node in self.inner.finalize() {
            node.set_priority(priority)?;
        }
        Ok(())
    }

    pub fn reset_priority_all(&self) -> TaskResult<()> {
        self.set_priority_all(0)
    }

    #[must_use]
    pub fn custom_data(&self) -> Option<CustomData> {
        self.inner.custom_data()
    }

    pub fn set_custom_data(&self, data: CustomData) -> TaskResult<()> {
        self.inner.set_custom_data(data)
    }

    pub fn remove_custom_data(&self) -> TaskResult<()> {
        self.inner.remove_custom_data()
    }

    pub fn set_custom_data_all(&self, data: CustomData) -> TaskResult<()> {
        self.inner.ensure_not_running()?;
        for node in self.inner.finalize() {
            node.set_custom_data(Arc::clone(&data))?;
        }
        Ok(())
    }

    pub fn remove_custom_data_all(&self) -> TaskResult<()> {
        self.inner.ensure_not_running()?;
        for node in self.inner.finalize() {
            node.remove_custom_data()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn canceled(&self) -> bool {
        self.inner.canceled()
    }

    /// Sets or clears the cancel flag on this task only.
    pub fn cancel(&self, flag: bool) {
        self.inner.cancel(flag);
    }

    /// Sets or clears the cancel flag on every task in the subgraph.
    pub fn cancel_all(&self, flag: bool) {
        for node in self.inner.finalize() {
            node.cancel(flag);
        }
    }

    /// A cheap cloneable handle onto this task's cancel flag, usable as a
    /// cooperative cancel point inside long-running functors.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken::from_parts(Arc::clone(&self.inner.core.canceled), self.id().to_string())
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.inner.child_count()
    }

    #[must_use]
    pub fn avg_idle_us(&self) -> i64 {
        self.inner.avg_idle_us()
    }

    #[must_use]
    pub fn avg_wait_us(&self) -> i64 {
        self.inner.avg_wait_us()
    }

    #[must_use]
    pub fn avg_run_us(&self) -> i64 {
        self.inner.avg_run_us()
    }

    #[must_use]
    pub fn executor(&self) -> Option<SharedExecutor> {
        self.inner.executor()
    }

    /// Assigns an executor taking precedence over the one passed to the
    /// scheduling calls.
    pub fn set_executor(&self, executor: SharedExecutor) -> TaskResult<()> {
        self.inner.set_executor(executor)
    }

    pub fn remove_executor(&self) -> TaskResult<()> {
        self.inner.remove_executor()
    }

    pub fn set_executor_all(&self, executor: SharedExecutor) -> TaskResult<()> {
        self.inner.ensure_not_running()?;
        for node in self.inner.finalize() {
            node.set_executor(Arc::clone(&executor))?;
        }
        Ok(())
    }

    pub fn remove_executor_all(&self) -> TaskResult<()> {
        self.inner.ensure_not_running()?;
        for node in self.inner.finalize() {
            node.remove_executor()?;
        }
        Ok(())
    }

    /// A read handle onto the current cycle's result cell.
    #[must_use]
    pub fn future(&self) -> TaskFuture<T> {
        TaskFuture::new(self.inner.current_cell())
    }

    /// Blocks until resolved, then returns the value or re-raises the
    /// stored failure.
    pub fn get(&self) -> TaskResult<T> {
        self.inner.ensure_scheduled()?;
        self.inner.current_cell().get()
    }

    /// Blocks until the current cycle resolves.
    pub fn wait(&self) -> TaskResult<()> {
        self.inner.ensure_scheduled()?;
        self.inner.current_cell().wait()
    }

    /// Whether the task finished processing its current cycle.
    pub fn is_ready(&self) -> TaskResult<bool> {
        self.inner.ensure_scheduled()?;
        Ok(self.inner.is_resolved())
    }

    /// Like [`Task::is_ready`] but silently false when the task was never
    /// scheduled.
    #[must_use]
    pub fn has_result(&self) -> bool {
        self.inner.is_resolved()
    }

    #[must_use]
    pub fn was_scheduled(&self) -> bool {
        self.inner.was_scheduled()
    }

    /// Schedules this task only, resetting its cell first.
    pub fn schedule(&self) -> TaskResult<()> {
        self.schedule_opts(None, true)
    }

    /// Schedules this task only, through the given executor unless the
    /// task carries an override.
    pub fn schedule_with(&self, executor: &SharedExecutor) -> TaskResult<()> {
        self.schedule_opts(Some(executor), true)
    }

    /// Schedules this task only. When `reset` is false an already resolved
    /// cell is kept and the call is a no-op.
    pub fn schedule_opts(&self, executor: Option<&SharedExecutor>, reset: bool) -> TaskResult<()> {
        self.inner.ensure_not_running()?;
        self.inner.schedule_cycle(executor, reset);
        Ok(())
    }

    /// Finalizes the graph if needed, then schedules every task in
    /// `(level, id)` order so parents are always scheduled before any of
    /// their children.
    pub fn schedule_all(&self) -> TaskResult<()> {
        self.schedule_all_opts(None, true)
    }

    pub fn schedule_all_with(&self, executor: &SharedExecutor) -> TaskResult<()> {
        self.schedule_all_opts(Some(executor), true)
    }

    pub fn schedule_all_opts(
        &self,
        executor: Option<&SharedExecutor>,
        reset_all: bool,
    ) -> TaskResult<()> {
        self.inner.ensure_not_running()?;
        let span = tracing::trace_span!("Task::schedule_all", id = self.id());
        let _enter = span.enter();
        for node in self.inner.finalize() {
            node.schedule_cycle(executor, reset_all);
        }
        Ok(())
    }

    /// Clears the result cell, re-enables scheduling and re-arms the
    /// refcount.
    pub fn reset(&self) -> TaskResult<()> {
        self.inner.reset()
    }

    /// Resets every task in the subgraph.
    pub fn reset_all(&self) -> TaskResult<()> {
        for node in self.inner.finalize() {
            node.reset()?;
        }
        Ok(())
    }

    /// Assigns a value, as if the task had run and produced it. Scheduling
    /// is disabled until [`Task::reset`].
    pub fn set_value(&self, value: T) -> TaskResult<()> {
        self.inner.ensure_not_running()?;
        self.inner
            .core
            .schedule_enabled
            .store(false, Ordering::Release);
        *self.inner.cell.lock().unwrap() = Arc::new(ResultCell::ready(value));
        self.inner.raise_event(TaskEvent::AfterFutureChanged);
        Ok(())
    }

    /// Assigns a failure, as if the task had run and failed. Scheduling is
    /// disabled until [`Task::reset`].
    pub fn set_exception(&self, error: TaskError) -> TaskResult<()> {
        self.inner.ensure_not_running()?;
        self.inner
            .core
            .schedule_enabled
            .store(false, Ordering::Release);
        *self.inner.cell.lock().unwrap() = Arc::new(ResultCell::failed(error));
        self.inner.raise_event(TaskEvent::AfterFutureChanged);
        Ok(())
    }

    pub fn add_listener(&self, listener: SharedListener) -> TaskResult<()> {
        self.inner.add_listener(listener)
    }

    pub fn add_listener_for(&self, event: TaskEvent, listener: SharedListener) -> TaskResult<()> {
        self.inner.add_listener_for(event, listener)
    }

    pub fn remove_listener(&self, listener: &SharedListener) -> TaskResult<()> {
        self.inner.remove_listener(listener)
    }

    pub fn remove_listener_for(
        &self,
        event: TaskEvent,
        listener: &SharedListener,
    ) -> TaskResult<()> {
        self.inner.remove_listener_for(event, listener)
    }

    pub fn remove_listeners(&self) -> TaskResult<()> {
        self.inner.remove_listeners()
    }

    pub fn remove_listeners_for(&self, event: TaskEvent) -> TaskResult<()> {
        self.inner.remove_listeners_for(event)
    }

    pub fn add_listener_all(&self, listener: SharedListener) -> TaskResult<()> {
        self.inner.ensure_not_running()?;
        for node in self.inner.finalize() {
            node.add_listener(Arc::clone(&listener))?;
        }
        Ok(())
    }

    pub fn add_listener_for_all(
        &self,
        event: TaskEvent,
        listener: SharedListener,
    ) -> TaskResult<()> {
        self.inner.ensure_not_running()?;
        for node in self.inner.finalize() {
            node.add_listener_for(event, Arc::clone(&listener))?;
        }
        Ok(())
    }

    pub fn remove_listener_all(&self, listener: &SharedListener) -> TaskResult<()> {
        self.inner.ensure_not_running()?;
        for node in self.inner.finalize() {
            node.remove_listener(listener)?;
        }
        Ok(())
    }

    pub fn remove_listener_for_all(
        &self,
        event: TaskEvent,
        listener: &SharedListener,
    ) -> TaskResult<()> {
        self.inner.ensure_not_running()?;
        for node in self.inner.finalize() {
            node.remove_listener_for(event, listener)?;
        }
        Ok(())
    }

    pub fn remove_listeners_all(&self) -> TaskResult<()> {
        self.inner.ensure_not_running()?;
        for node in self.inner.finalize() {
            node.remove_listeners()?;
        }
        Ok(())
    }

    pub fn remove_listeners_for_all(&self, event: TaskEvent) -> TaskResult<()> {
        self.inner.ensure_not_running()?;
        for node in self.inner.finalize() {
            node.remove_listeners_for(event)?;
        }
        Ok(())
    }

    /// Every task of the subgraph this task terminates, finalized and
    /// sorted by `(level, id)`.
    pub fn tasks(&self) -> Vec<Arc<dyn GraphNode>> {
        self.inner.finalize()
    }

    /// Every parent-to-child edge of the finalized subgraph.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::new();
        for node in self.inner.finalize() {
            for parent in node.parent_nodes() {
                edges.push(Edge {
                    parent,
                    child: Arc::clone(&node),
                });
            }
        }
        edges
    }

    /// Structural copy of the finalized subgraph rooted here, preserving
    /// shared-parent topology. Fails while a run is in flight.
    pub fn clone_graph(&self) -> TaskResult<Task<T>> {
        self.inner.finalize();
        let mut cache = CloneCache::new();
        self.inner.clone_with(&mut cache)
    }

    /// A fresh `accept` child with this task as its single parent.
    pub fn then_accept<U, F>(&self, functor: F) -> Task<U>
    where
        U: Clone + Send + 'static,
        F: Fn(TaskFuture<T>) -> TaskResult<U> + Send + Sync + 'static,
    {
        builders::make_accept(functor, (self.clone(),))
    }

    /// A fresh `accept_any` child with this task as its single parent.
    pub fn then_accept_any<U, F>(&self, functor: F) -> Task<U>
    where
        U: Clone + Send + 'static,
        F: Fn(TaskFuture<T>) -> TaskResult<U> + Send + Sync + 'static,
    {
        builders::make_accept_any(functor, (self.clone(),))
    }

    /// A fresh `consume` child with this task as its single parent.
    pub fn then_consume<U, F>(&self, functor: F) -> Task<U>
    where
        U: Clone + Send + 'static,
        F: Fn(T) -> TaskResult<U> + Send + Sync + 'static,
    {
        builders::make_consume(functor, (self.clone(),))
    }

    /// A fresh `consume_any` child with this task as its single parent.
    pub fn then_consume_any<U, F>(&self, functor: F) -> Task<U>
    where
        U: Clone + Send + 'static,
        F: Fn(T) -> TaskResult<U> + Send + Sync + 'static,
    {
        builders::make_consume_any(functor, (self.clone(),))
    }

    /// A fresh `wait` child with this task as its single parent.
    pub fn then_wait<U, F>(&self, functor: F) -> Task<U>
    where
        U: Clone + Send + 'static,
        F: Fn() -> TaskResult<U> + Send + Sync + 'static,
    {
        builders::make_wait(functor, (self.clone(),))
    }

    /// A fresh `wait_any` child with this task as its single parent.
    pub fn then_wait_any<U, F>(&self, functor: F) -> Task<U>
    where
        U: Clone + Send + 'static,
        F: Fn() -> TaskResult<U> + Send + Sync + 'static,
    {
        builders::make_wait_any(functor, (self.clone(),))
    }
}
