use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ntest::timeout;
use serial_test::serial;

use dagtron::executors::{SharedExecutor, ThreadPoolExecutor};
use dagtron::{make_root, make_root_with_token, CancelToken, TaskError};

use super::support::{eventually, Gate};

#[test]
#[serial]
#[timeout(10000)]
fn cancel_while_blocked_on_a_parent_poisons_the_child() {
    let gate = Gate::new();
    let t1 = {
        let gate = gate.clone();
        make_root(move || {
            gate.block_until_open();
            Ok(42)
        })
    };
    let t2 = t1.then_consume(|x| Ok(x + 13));

    let executor: SharedExecutor = ThreadPoolExecutor::shared(2).expect("two workers");

    t2.schedule_all_with(&executor).expect("graph is idle");
    t2.cancel_all(true);
    gate.open();

    assert!(matches!(t2.get(), Err(TaskError::Canceled(_))));

    // A fresh schedule clears the flags and the graph runs normally.
    t2.cancel_all(false);
    t2.schedule_all_with(&executor).expect("previous run finished");
    assert_eq!(t2.get().expect("resolved"), 55);
}

#[test]
fn scheduling_with_reset_clears_a_prior_cancel() {
    let t1 = make_root(|| Ok(42));
    let t2 = t1.then_consume(|x| Ok(x + 13));

    t2.cancel_all(true);
    t2.schedule_all().expect("graph is idle");
    assert_eq!(t2.get().expect("reset cleared the flags"), 55);
}

#[test]
fn scheduling_without_reset_honors_the_cancel_flag() {
    let task = make_root(|| Ok(1));
    task.cancel(true);
    task.schedule_opts(None, false).expect("task is idle");
    assert!(matches!(task.get(), Err(TaskError::Canceled(_))));
    assert!(task.canceled());
}

#[test]
#[timeout(10000)]
fn cancel_point_stops_a_running_functor() {
    let token = CancelToken::new();
    let entered = Gate::new();
    let proceed = Gate::new();
    let reached_end = Arc::new(AtomicBool::new(false));

    let task = {
        let token = token.clone();
        let entered = entered.clone();
        let proceed = proceed.clone();
        let reached_end = Arc::clone(&reached_end);
        make_root_with_token(&token.clone(), move || {
            entered.open();
            proceed.block_until_open();
            token.checkpoint()?;
            reached_end.store(true, Ordering::SeqCst);
            Ok(42)
        })
    };

    let executor: SharedExecutor =
        Arc::new(ThreadPoolExecutor::new(1).expect("one worker"));
    task.schedule_with(&executor).expect("task is idle");

    assert!(eventually(Duration::from_secs(5), || entered.is_open()));
    task.cancel(true);
    proceed.open();

    task.wait().expect("runner publishes the cancellation");
    assert!(!reached_end.load(Ordering::SeqCst));
    assert!(matches!(task.get(), Err(TaskError::Canceled(_))));
}

#[test]
fn cancel_token_reflects_the_tasks_flag() {
    let task = make_root(|| Ok(1));
    let token = task.cancel_token();

    assert!(token.checkpoint().is_ok());
    task.cancel(true);
    assert!(token.is_canceled());
    assert!(matches!(token.checkpoint(), Err(TaskError::Canceled(_))));

    task.cancel(false);
    assert!(token.checkpoint().is_ok());
}
