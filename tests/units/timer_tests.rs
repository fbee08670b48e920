use std::sync::Arc;
use std::thread;
use std::time::Duration;

use dagtron::listeners::TimerListener;
use dagtron::{make_root, node_label};

#[test]
fn timer_populates_all_three_averages_for_a_full_run() {
    let timer = Arc::new(TimerListener::new());
    let task = make_root(|| {
        thread::sleep(Duration::from_millis(2));
        Ok(1)
    });
    task.add_listener(timer).expect("task is idle");

    assert_eq!(task.avg_idle_us(), -1);
    assert_eq!(task.avg_wait_us(), -1);
    assert_eq!(task.avg_run_us(), -1);

    task.schedule().expect("task is idle");

    assert!(task.avg_idle_us() >= 0);
    assert!(task.avg_wait_us() >= 0);
    assert!(task.avg_run_us() >= 1_000, "got {}", task.avg_run_us());
}

#[test]
fn canceled_runs_record_wait_but_not_run_time() {
    let timer = Arc::new(TimerListener::new());
    let task = make_root(|| Ok(1));
    task.add_listener(timer).expect("task is idle");

    task.cancel(true);
    task.schedule_opts(None, false).expect("task is idle");

    assert!(task.avg_wait_us() >= 0);
    assert_eq!(task.avg_run_us(), -1);
}

#[test]
fn averages_accumulate_over_cycles() {
    let timer = Arc::new(TimerListener::new());
    let task = make_root(|| Ok(1));
    task.add_listener(timer).expect("task is idle");

    task.schedule().expect("task is idle");
    let first = task.avg_run_us();
    task.schedule().expect("nothing in flight");
    let second = task.avg_run_us();

    assert!(first >= 0);
    assert!(second >= 0);
}

#[test]
fn timer_reset_drops_gathered_tracks() {
    let timer = Arc::new(TimerListener::new());
    let task = make_root(|| Ok(1));
    task.add_listener(Arc::clone(&timer) as _).expect("task is idle");

    task.schedule().expect("task is idle");
    timer.reset();

    // A new cycle keeps working from a clean slate.
    task.schedule().expect("nothing in flight");
    assert!(task.avg_run_us() >= 0);
}

#[test]
fn recorded_timings_show_up_in_the_node_label() {
    let timer = Arc::new(TimerListener::new());
    let task = make_root(|| Ok(1));
    task.add_listener(timer).expect("task is idle");
    task.schedule().expect("task is idle");

    let node = task.as_node();
    let label = node_label(node.as_ref(), "\n");
    assert!(label.contains("avg-run-us="), "label was: {label}");
}
