//! Arena-backed dependency graph for one expression.
//!
//! Every node lives in a single `Vec` owned by the [`Graph`]. Children and
//! the parent back-reference are indices into that vector, so the tree has a
//! single owner while still supporting O(1) upward walks when a result
//! arrives.
//!
//! Nodes are stored in preorder (root first, then the left subtree, then the
//! right subtree). The node at index `i` carries the id
//! `"{expression_id}-{i + 1}"`, which lets the orchestrator resolve a task id
//! back to its node without searching.

use crate::error::CoreError;
use crate::operator::Operator;
use crate::parser::{self, Ast};
use crate::types::{self, NodeId};

/// What a node computes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    /// A numeric literal from the source text.
    Literal,
    /// A binary operation over two child nodes (arena indices).
    Operation {
        op: Operator,
        left: usize,
        right: usize,
    },
}

/// A vertex of the dependency graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Literal value, or the reported result once `computed` is set.
    pub value: f64,
    pub computed: bool,
    /// Set exactly once, when the node's task is pushed to the dispatch queue.
    pub scheduled: bool,
    /// `None` only for the root.
    pub parent: Option<usize>,
}

impl Node {
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, NodeKind::Literal)
    }
}

/// The computation tree of a single expression.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
}

/// Parse `text` and build the dependency graph for `expression_id`.
pub fn compile(expression_id: &str, text: &str) -> Result<Graph, CoreError> {
    let ast = parser::parse(text)?;
    Ok(Graph::from_ast(expression_id, &ast))
}

impl Graph {
    /// Flatten an AST into the arena, assigning preorder ids and parent
    /// indices in the same pass.
    pub fn from_ast(expression_id: &str, ast: &Ast) -> Self {
        let mut graph = Graph { nodes: Vec::new() };
        graph.push(expression_id, ast, None);
        graph
    }

    fn push(&mut self, expression_id: &str, ast: &Ast, parent: Option<usize>) -> usize {
        let index = self.nodes.len();
        let id = types::node_id(expression_id, index + 1);

        match ast {
            Ast::Number(value) => {
                self.nodes.push(Node {
                    id,
                    kind: NodeKind::Literal,
                    value: *value,
                    computed: true,
                    scheduled: false,
                    parent,
                });
            }
            Ast::Binary { op, left, right } => {
                // Reserve the slot first so this node precedes its subtrees.
                self.nodes.push(Node {
                    id,
                    kind: NodeKind::Literal,
                    value: 0.0,
                    computed: false,
                    scheduled: false,
                    parent,
                });
                let left = self.push(expression_id, left, Some(index));
                let right = self.push(expression_id, right, Some(index));
                self.nodes[index].kind = NodeKind::Operation {
                    op: *op,
                    left,
                    right,
                };
            }
        }

        index
    }

    pub const ROOT: usize = 0;

    pub fn root(&self) -> &Node {
        &self.nodes[Self::ROOT]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve a node id to its arena index.
    pub fn position(&self, id: &str) -> Option<usize> {
        let (_, seq) = types::split_node_id(id)?;
        let index = seq - 1;
        self.nodes
            .get(index)
            .filter(|node| node.id == id)
            .map(|_| index)
    }

    /// An operation node whose two operands are both computed.
    pub fn is_ready(&self, index: usize) -> bool {
        match self.nodes.get(index).map(|n| n.kind) {
            Some(NodeKind::Operation { left, right, .. }) => {
                self.nodes[left].computed && self.nodes[right].computed
            }
            _ => false,
        }
    }

    /// Operator and operand values of a ready node.
    pub fn operands(&self, index: usize) -> Option<(Operator, f64, f64)> {
        if !self.is_ready(index) {
            return None;
        }
        match self.nodes[index].kind {
            NodeKind::Operation { op, left, right } => {
                Some((op, self.nodes[left].value, self.nodes[right].value))
            }
            NodeKind::Literal => None,
        }
    }

    /// Depth-first (preorder) scan for nodes that are ready, uncomputed and
    /// not yet scheduled.
    pub fn schedulable(&self) -> Vec<usize> {
        let mut found = Vec::new();
        let mut stack = vec![Self::ROOT];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if let NodeKind::Operation { left, right, .. } = node.kind {
                if !node.computed && !node.scheduled && self.is_ready(index) {
                    found.push(index);
                }
                stack.push(right);
                stack.push(left);
            }
        }
        found
    }

    pub(crate) fn mark_scheduled(&mut self, index: usize) {
        self.nodes[index].scheduled = true;
    }

    pub(crate) fn record(&mut self, index: usize, value: f64) {
        let node = &mut self.nodes[index];
        node.value = value;
        node.computed = true;
    }
}
