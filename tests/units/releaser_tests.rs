use std::sync::Arc;

use dagtron::listeners::Releaser;
use dagtron::{make_consume, make_root, TaskError, TaskEvent};

#[test]
fn releaser_drops_the_parent_result_once_children_consumed_it() {
    let p = make_root(|| Ok(42));
    p.add_listener_for(TaskEvent::AfterSatisfied, Arc::new(Releaser::new()))
        .expect("task is idle");

    let c1 = p.then_consume(|x| Ok(x + 1));
    let c2 = p.then_consume(|x| Ok(x + 2));
    let sink = make_consume(|(a, b)| Ok(a + b), (c1, c2));

    sink.schedule_all().expect("graph is idle");

    // The terminal value still flows; the parent's own cell is gone.
    assert_eq!(sink.get().expect("terminal resolved"), 87);
    assert!(!p.was_scheduled());
    assert!(matches!(p.get(), Err(TaskError::Control(_))));
}

#[test]
fn released_tasks_recover_on_the_next_cycle() {
    let p = make_root(|| Ok(1));
    p.add_listener_for(TaskEvent::AfterSatisfied, Arc::new(Releaser::new()))
        .expect("task is idle");
    let child = p.then_consume(|x| Ok(x + 1));

    child.schedule_all().expect("graph is idle");
    assert_eq!(child.get().expect("resolved"), 2);
    assert!(!p.was_scheduled());

    child.reset_all().expect("nothing in flight");
    child.schedule_all().expect("graph is idle");
    assert_eq!(child.get().expect("resolved again"), 2);
}

#[test]
fn releaser_without_children_never_triggers() {
    let task = make_root(|| Ok(3));
    task.add_listener_for(TaskEvent::AfterSatisfied, Arc::new(Releaser::new()))
        .expect("task is idle");

    task.schedule().expect("task is idle");
    assert_eq!(task.get().expect("result kept"), 3);
}
