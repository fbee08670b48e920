use std::collections::HashSet;

use dagtron::{make_root, TaskError, TaskPool};

#[test]
fn pool_bounds_are_validated() {
    let template = make_root(|| Ok(1));
    assert!(matches!(
        TaskPool::new(template.clone(), 0, 4),
        Err(TaskError::InvalidParameter(_))
    ));
    assert!(matches!(
        TaskPool::new(template, 5, 4),
        Err(TaskError::InvalidParameter(_))
    ));
}

#[test]
fn pool_grows_to_its_maximum_then_runs_dry() {
    let template = make_root(|| Ok(7));
    let mut pool = TaskPool::new(template, 2, 4).expect("valid bounds");
    assert_eq!(pool.size(), 2);
    assert_eq!(pool.minimum_size(), 2);
    assert_eq!(pool.maximum_size(), 4);

    let mut keys = HashSet::new();
    let mut handed_out = Vec::new();
    for _ in 0..4 {
        let task = pool.next_task(true).expect("pool can grow");
        assert!(keys.insert(task.key()), "pool handed out a busy task");
        handed_out.push(task);
    }
    assert_eq!(pool.size(), 4);

    assert!(pool.next_task(true).is_none());
    assert_eq!(pool.idle_count() + pool.busy_count(), 4);

    // Run all four clones to completion; their finished listeners hand
    // them back to the pool.
    for task in &handed_out {
        task.schedule().expect("clone is idle");
        assert_eq!(task.get().expect("resolved"), 7);
    }

    let recycled = pool.next_task(true).expect("finished tasks recycle");
    assert!(keys.contains(&recycled.key()));
    assert_eq!(pool.idle_count() + pool.busy_count(), 4);
}

#[test]
fn default_bounds_seed_the_minimum_number_of_clones() {
    let template = make_root(|| Ok(0));
    let pool = TaskPool::with_defaults(template).expect("default bounds");
    assert_eq!(pool.minimum_size(), 32);
    assert_eq!(pool.maximum_size(), 65_536);
    assert_eq!(pool.size(), 32);
    assert_eq!(pool.idle_count(), 32);
}

#[test]
fn recycled_tasks_rerun_after_a_reset() {
    let template = make_root(|| Ok(3));
    let mut pool = TaskPool::new(template, 1, 2).expect("valid bounds");

    let first = pool.next_task(true).expect("idle task available");
    first.schedule().expect("clone is idle");
    assert_eq!(first.get().expect("resolved"), 3);

    let again = pool.next_task(false).expect("finished task available");
    assert_eq!(again.key(), first.key());

    // The prior result is still observable until the caller resets.
    assert_eq!(again.get().expect("prior result"), 3);
    again.reset_all().expect("nothing in flight");
    again.schedule_all().expect("clone is idle");
    assert_eq!(again.get().expect("fresh result"), 3);
}

#[test]
fn shrinking_honors_the_minimum_and_only_evicts_idle_clones() {
    let template = make_root(|| Ok(1));
    let mut pool = TaskPool::new(template, 2, 8).expect("valid bounds");

    pool.resize(6);
    assert_eq!(pool.size(), 6);

    pool.resize(0);
    assert_eq!(pool.size(), 2);

    let busy = pool.next_task(false).expect("idle task available");
    pool.resize(0);
    // The busy clone cannot be evicted.
    assert_eq!(pool.size(), 2);
    drop(busy);
}

#[test]
fn wait_for_next_task_returns_an_idle_clone_immediately() {
    let template = make_root(|| Ok(1));
    let mut pool = TaskPool::new(template, 1, 2).expect("valid bounds");
    let task = pool.wait_for_next_task(true);
    assert_eq!(pool.busy_count(), 1);
    drop(task);
}

#[test]
fn idle_and_busy_counts_track_hand_outs() {
    let template = make_root(|| Ok(1));
    let mut pool = TaskPool::new(template, 2, 4).expect("valid bounds");
    assert_eq!(pool.idle_count(), 2);
    assert_eq!(pool.busy_count(), 0);

    let task = pool.next_task(false).expect("idle task available");
    assert_eq!(pool.idle_count(), 1);
    assert_eq!(pool.busy_count(), 1);
    assert_eq!(pool.size(), 2);
    drop(task);
}
