use std::sync::{Arc, Mutex};

use dagtron::executors::{SequentialExecutor, SharedExecutor};
use dagtron::{for_each, for_each_scheduled, transform, transform_scheduled, TaskError};

#[test]
fn for_each_visits_every_element_once_scheduled() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let seen = Arc::clone(&seen);
        for_each(vec![1, 2, 3, 4, 5], move |value: &i32| {
            seen.lock().unwrap().push(*value);
        })
        .expect("non-empty input")
    };

    sink.schedule_all().expect("graph is idle");
    sink.get().expect("sink resolved");

    let mut collected = seen.lock().unwrap().clone();
    collected.sort_unstable();
    assert_eq!(collected, vec![1, 2, 3, 4, 5]);
}

#[test]
fn for_each_rejects_empty_input() {
    let result = for_each(Vec::<i32>::new(), |_value| {});
    assert!(matches!(result, Err(TaskError::InvalidParameter(_))));
}

#[test]
fn for_each_with_an_executor_schedules_immediately() {
    let seen = Arc::new(Mutex::new(0_i32));
    let executor: SharedExecutor = SequentialExecutor::shared();
    let sink = {
        let seen = Arc::clone(&seen);
        for_each_scheduled(&executor, vec![10, 20], move |value: &i32| {
            *seen.lock().unwrap() += value;
        })
        .expect("non-empty input")
    };

    sink.get().expect("already scheduled");
    assert_eq!(*seen.lock().unwrap(), 30);
}

#[test]
fn transform_fills_the_output_slots_in_order() {
    let out = Arc::new(Mutex::new(vec![0_i32; 3]));
    let sink = transform(vec![1, 2, 3], &out, |value: &i32| value * 2)
        .expect("non-empty input");

    sink.schedule_all().expect("graph is idle");
    sink.get().expect("sink resolved");
    assert_eq!(*out.lock().unwrap(), vec![2, 4, 6]);
}

#[test]
fn transform_requires_enough_output_slots() {
    let out = Arc::new(Mutex::new(vec![0_i32; 1]));
    let result = transform(vec![1, 2, 3], &out, |value: &i32| *value);
    assert!(matches!(result, Err(TaskError::InvalidParameter(_))));
}

#[test]
fn transform_with_an_executor_schedules_immediately() {
    let out = Arc::new(Mutex::new(vec![0_i32; 2]));
    let executor: SharedExecutor = Arc::new(SequentialExecutor::new());
    let sink = transform_scheduled(&executor, vec![5, 6], &out, |value: &i32| value + 1)
        .expect("non-empty input");

    sink.get().expect("already scheduled");
    assert_eq!(*out.lock().unwrap(), vec![6, 7]);
}
