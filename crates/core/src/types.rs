/// Identifier of a submitted expression (UUID v7, hyphenated).
pub type ExpressionId = String;

/// Identifier of a graph node, and of the task derived from it:
/// `"{expression_id}-{n}"` where `n` is the 1-based preorder position.
pub type NodeId = String;

/// Build the identifier of the `seq`-th node (preorder, 1-based) of an expression.
pub fn node_id(expression_id: &str, seq: usize) -> NodeId {
    format!("{expression_id}-{seq}")
}

/// Split a node identifier back into its expression id and sequence number.
///
/// Expression ids may themselves contain `-`, so the split happens on the
/// last separator only.
pub fn split_node_id(id: &str) -> Option<(&str, usize)> {
    let (expression_id, seq) = id.rsplit_once('-')?;
    let seq = seq.parse().ok()?;
    if expression_id.is_empty() || seq == 0 {
        return None;
    }
    Some((expression_id, seq))
}
