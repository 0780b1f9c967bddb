//! Text rendering of a delegation tree.

use std::fmt::Write;

use ranklane_engine::HierarchyStore;
use ranklane_models::{UserNode, UserStatus};

/// One line per user, children indented under their parent, most senior
/// role first among siblings.
pub fn render_tree(hierarchy: &HierarchyStore) -> String {
    let mut roots: Vec<&UserNode> = hierarchy
        .nodes()
        .filter(|node| {
            node.parent_id
                .is_none_or(|parent| hierarchy.get(parent).is_none())
        })
        .collect();
    sort_siblings(&mut roots);

    let mut out = String::new();
    for root in roots {
        render_node(hierarchy, root, 0, &mut out);
    }
    out
}

fn render_node(hierarchy: &HierarchyStore, node: &UserNode, depth: usize, out: &mut String) {
    let status = match node.status {
        UserStatus::Active => String::new(),
        other => format!(" ({:?})", other).to_lowercase(),
    };
    let label = if node.name.is_empty() {
        node.user_id.to_string()
    } else {
        format!("{} <{}>", node.name, node.email)
    };
    let _ = writeln!(
        out,
        "{}- [{}] {}{}",
        "  ".repeat(depth),
        node.role,
        label,
        status
    );

    let mut children: Vec<&UserNode> = hierarchy.children(node.user_id).collect();
    sort_siblings(&mut children);
    for child in children {
        render_node(hierarchy, child, depth + 1, out);
    }
}

fn sort_siblings(nodes: &mut [&UserNode]) {
    nodes.sort_by(|a, b| {
        b.role
            .cmp(&a.role)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
}
