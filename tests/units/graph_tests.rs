use std::collections::HashSet;

use dagtron::{make_consume, make_root, make_wait, ParentList};

#[test]
fn every_edge_goes_from_a_lower_to_a_higher_level() {
    let p = make_root(|| Ok(1));
    let c1 = p.then_consume(|x| Ok(x + 1));
    let c2 = p.then_consume(|x| Ok(x + 2));
    let sink = make_consume(|(a, b)| Ok(a + b), (c1, c2));

    for edge in sink.edges() {
        assert!(
            edge.parent.level() < edge.child.level(),
            "edge {} -> {} breaks the level order",
            edge.parent.id(),
            edge.child.id()
        );
    }
}

#[test]
fn tasks_are_sorted_by_level_then_id_with_dense_ids() {
    let p = make_root(|| Ok(1));
    let c1 = p.then_consume(|x| Ok(x + 1));
    let c2 = p.then_consume(|x| Ok(x + 2));
    let sink = make_consume(|(a, b)| Ok(a + b), (c1, c2));

    let tasks = sink.tasks();
    assert_eq!(tasks.len(), 4);

    let ids: HashSet<usize> = tasks.iter().map(|node| node.id()).collect();
    assert_eq!(ids.len(), 4);
    assert!(ids.iter().all(|id| *id < 4));

    for pair in tasks.windows(2) {
        let left = (pair[0].level(), pair[0].id());
        let right = (pair[1].level(), pair[1].id());
        assert!(left < right, "tasks out of order: {left:?} !< {right:?}");
    }
}

#[test]
fn linear_chain_with_shared_root_has_exactly_three_edges() {
    let t1 = make_root(|| Ok(1)).named("t1");
    let t2 = t1.then_consume(|x| Ok(x + 1)).named("t2");
    let t3 = make_consume(|(a, b)| Ok(a + b), (t1.clone(), t2.clone())).named("t3");

    let edges = t3.edges();
    assert_eq!(edges.len(), 3);

    let named: HashSet<(String, String)> = edges
        .iter()
        .map(|edge| {
            (
                edge.parent.name().expect("named"),
                edge.child.name().expect("named"),
            )
        })
        .collect();
    let expected: HashSet<(String, String)> = [("t1", "t2"), ("t1", "t3"), ("t2", "t3")]
        .into_iter()
        .map(|(a, b)| (a.to_owned(), b.to_owned()))
        .collect();
    assert_eq!(named, expected);

    assert_eq!(t1.level(), 0);
    assert_eq!(t2.level(), 1);
    assert_eq!(t3.level(), 2);
}

#[test]
fn finalization_is_idempotent() {
    let t1 = make_root(|| Ok(1));
    let t2 = t1.then_consume(|x| Ok(x + 1));

    let first: Vec<usize> = t2.tasks().iter().map(|node| node.id()).collect();
    let second: Vec<usize> = t2.tasks().iter().map(|node| node.id()).collect();
    assert_eq!(first, second);

    t2.schedule_all().expect("graph is idle");
    let third: Vec<usize> = t2.tasks().iter().map(|node| node.id()).collect();
    assert_eq!(first, third);
}

#[test]
fn child_counts_reflect_construction_time_wiring() {
    let p = make_root(|| Ok(1));
    assert_eq!(p.child_count(), 0);

    let c1 = p.then_consume(|x| Ok(x + 1));
    assert_eq!(p.child_count(), 1);

    let c2 = p.then_consume(|x| Ok(x + 2));
    assert_eq!(p.child_count(), 2);

    let sink = make_wait(|| Ok(()), ParentList::new(vec![c1, c2]).expect("two parents"));
    assert_eq!(sink.child_count(), 0);
}

#[test]
fn empty_parent_vectors_are_rejected() {
    let empty: Vec<dagtron::Task<i32>> = Vec::new();
    assert!(ParentList::new(empty).is_err());
}
