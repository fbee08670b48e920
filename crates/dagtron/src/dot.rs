use crate::graph::Edge;
use crate::node::GraphNode;

/// Renders the quoted label of a node, field by field with absent values
/// omitted: optional name, kind with id and level, optional executor
/// override, and the timing averages when the timer recorded them.
pub fn node_label(node: &dyn GraphNode, separator: &str) -> String {
    let mut label = String::from("\"");
    if let Some(name) = node.name() {
        label.push_str(&format!("<{name}>{separator}"));
    }
    label.push_str(&format!(
        "{} id={} lev={}",
        node.kind(),
        node.id(),
        node.level()
    ));
    if let Some(executor) = node.executor() {
        label.push_str(&format!("{separator}<{}>", executor.name()));
    }

    let timings = [
        ("avg-idle-us", node.avg_idle_us()),
        ("avg-wait-us", node.avg_wait_us()),
        ("avg-run-us", node.avg_run_us()),
    ];
    for (field, value) in timings {
        if value >= 0 {
            label.push_str(&format!("{separator}{field}={value}"));
        }
    }

    label.push('"');
    label
}

/// Renders one edge as `parent-label -> child-label`.
#[must_use]
pub fn edge_label(edge: &Edge, separator: &str) -> String {
    format!(
        "{} -> {}",
        node_label(edge.parent.as_ref(), separator),
        node_label(edge.child.as_ref(), separator)
    )
}

/// Creates a dot-style graph string from the given edges, one line per
/// parent-to-child pair.
#[must_use]
pub fn to_dot(edges: &[Edge]) -> String {
    to_dot_with(edges, "\n")
}

/// Like [`to_dot`] but with a custom separator between label fields and
/// edge lines.
#[must_use]
pub fn to_dot_with(edges: &[Edge], separator: &str) -> String {
    let mut dot = format!("digraph {{{separator}");
    for edge in edges {
        dot.push_str(&edge_label(edge, separator));
        dot.push_str(separator);
    }
    dot.push('}');
    dot
}
