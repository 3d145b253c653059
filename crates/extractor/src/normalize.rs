use crate::document::{MatchedNode, NodeKind};
use crate::types::PomElement;

/// Turn matched nodes into elements, one per node, order preserved.
///
/// Names come from the node's local name, values from its full text content
/// exactly as written (no trimming). Unnamed nodes take their DOM node name,
/// so `/project/version/text()` yields `#TEXT`.
#[must_use]
pub fn normalize(nodes: &[MatchedNode<'_, '_>]) -> Vec<PomElement> {
    nodes
        .iter()
        .map(|node| PomElement::new(node_name(node), node.text_content()))
        .collect()
}

fn node_name<'a>(node: &MatchedNode<'a, '_>) -> &'a str {
    match node.kind() {
        NodeKind::Root => "#document",
        NodeKind::Text => "#text",
        NodeKind::Comment => "#comment",
        NodeKind::Element | NodeKind::Attribute | NodeKind::ProcessingInstruction => {
            node.local_name()
        }
    }
}
