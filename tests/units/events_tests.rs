use std::sync::Arc;

use dagtron::{make_consume, make_root, make_wait, ParentList, SharedListener, TaskEvent};

use super::support::Recorder;

#[test]
fn inline_schedule_raises_the_lifecycle_in_order() {
    let recorder = Recorder::new();
    let task = make_root(|| Ok(1));
    task.add_listener(recorder.clone()).expect("task is idle");

    task.schedule().expect("task is idle");

    assert_eq!(
        recorder.kinds(),
        vec![
            TaskEvent::BeforeScheduled,
            TaskEvent::AfterFutureChanged,
            TaskEvent::BeforeStarted,
            TaskEvent::BeforeInvoked,
            TaskEvent::AfterFinished,
        ]
    );
}

#[test]
fn canceled_tasks_skip_the_invocation_event() {
    let recorder = Recorder::new();
    let task = make_root(|| Ok(1));
    task.add_listener(recorder.clone()).expect("task is idle");

    task.cancel(true);
    task.schedule_opts(None, false).expect("task is idle");

    assert_eq!(
        recorder.kinds(),
        vec![
            TaskEvent::BeforeScheduled,
            TaskEvent::AfterFutureChanged,
            TaskEvent::BeforeStarted,
            TaskEvent::AfterCanceled,
            TaskEvent::AfterFinished,
        ]
    );
}

#[test]
fn after_satisfied_fires_exactly_once_per_cycle() {
    let recorder = Recorder::new();
    let p = make_root(|| Ok(10));
    p.add_listener_for(TaskEvent::AfterSatisfied, recorder.clone())
        .expect("task is idle");

    let c1 = p.then_consume(|x| Ok(x + 1));
    let c2 = p.then_consume(|x| Ok(x + 2));
    let sink = make_consume(|(a, b)| Ok(a + b), (c1, c2));

    sink.schedule_all().expect("graph is idle");
    assert_eq!(sink.get().expect("resolved"), 23);
    assert_eq!(recorder.count_of(TaskEvent::AfterSatisfied), 1);

    sink.reset_all().expect("nothing in flight");
    sink.schedule_all().expect("graph is idle");
    assert_eq!(recorder.count_of(TaskEvent::AfterSatisfied), 2);
}

#[test]
fn terminal_tasks_never_raise_after_satisfied() {
    let recorder = Recorder::new();
    let task = make_root(|| Ok(1));
    task.add_listener(recorder.clone()).expect("task is idle");
    task.schedule().expect("task is idle");
    assert_eq!(recorder.count_of(TaskEvent::AfterSatisfied), 0);
}

#[test]
fn duplicate_registrations_fire_twice_and_vanish_together() {
    let recorder = Recorder::new();
    let task = make_root(|| Ok(1));
    task.add_listener_for(TaskEvent::AfterFinished, recorder.clone())
        .expect("task is idle");
    task.add_listener_for(TaskEvent::AfterFinished, recorder.clone())
        .expect("task is idle");

    task.schedule().expect("task is idle");
    assert_eq!(recorder.count_of(TaskEvent::AfterFinished), 2);

    let handle: SharedListener = recorder.clone();
    task.remove_listener(&handle).expect("nothing in flight");
    task.schedule().expect("nothing in flight");
    assert_eq!(recorder.count_of(TaskEvent::AfterFinished), 2);
}

#[test]
fn set_value_notifies_future_changed() {
    let recorder = Recorder::new();
    let task = make_root(|| Ok(1));
    task.add_listener_for(TaskEvent::AfterFutureChanged, recorder.clone())
        .expect("task is idle");

    task.set_value(9).expect("task is idle");
    assert_eq!(recorder.count_of(TaskEvent::AfterFutureChanged), 1);

    task.reset().expect("nothing in flight");
    assert_eq!(recorder.count_of(TaskEvent::AfterFutureChanged), 2);
}

#[test]
fn custom_data_assignment_raises_its_event() {
    let recorder = Recorder::new();
    let task = make_root(|| Ok(1));
    task.add_listener_for(TaskEvent::AfterCustomDataSet, recorder.clone())
        .expect("task is idle");

    task.set_custom_data(Arc::new(5_i32)).expect("task is idle");
    assert_eq!(recorder.count_of(TaskEvent::AfterCustomDataSet), 1);
}

#[test]
fn listener_registration_across_the_graph() {
    let recorder = Recorder::new();
    let t1 = make_root(|| Ok(1));
    let t2 = make_root(|| Ok(2));
    let sink = make_wait(
        || Ok(()),
        ParentList::new(vec![t1, t2]).expect("two parents"),
    );

    sink.add_listener_for_all(TaskEvent::AfterFinished, recorder.clone())
        .expect("graph is idle");
    sink.schedule_all().expect("graph is idle");
    assert_eq!(recorder.count_of(TaskEvent::AfterFinished), 3);

    sink.remove_listeners_all().expect("nothing in flight");
    sink.reset_all().expect("nothing in flight");
    sink.schedule_all().expect("graph is idle");
    assert_eq!(recorder.count_of(TaskEvent::AfterFinished), 3);
}
