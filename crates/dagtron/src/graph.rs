use std::sync::Arc;

use crate::node::GraphNode;

/// A directed edge of a finalized graph, parent to child.
pub struct Edge {
    pub parent: Arc<dyn GraphNode>,
    pub child: Arc<dyn GraphNode>,
}

/// Numbers and orders the subgraph rooted at `terminal`: depth-first from
/// the terminal, parents before the node itself, assigning dense ids in
/// visit order, then sorted by `(level, id)` so every parent precedes all
/// of its children in the returned list.
pub(crate) fn traversal_order(terminal: &Arc<dyn GraphNode>) -> Vec<Arc<dyn GraphNode>> {
    let mut collected = Vec::new();
    visit(terminal, &mut collected);

    for (id, node) in collected.iter().enumerate() {
        node.assign_id(id);
    }
    for node in &collected {
        node.clear_visited();
    }

    let mut ordered = collected;
    ordered.sort_by_key(|node| (node.level(), node.id()));
    ordered
}

fn visit(node: &Arc<dyn GraphNode>, out: &mut Vec<Arc<dyn GraphNode>>) {
    if !node.mark_visited() {
        return;
    }
    for parent in node.parent_nodes() {
        visit(&parent, out);
    }
    out.push(Arc::clone(node));
}
