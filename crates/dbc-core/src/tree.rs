//! SyntaxTree: the read-only arena holding function bodies.
//!
//! Nodes live in a `StableGraph` with a `Contains` edge from every parent to
//! each of its children. Ordered child lists are carried by the node's
//! [`SyntaxKind`]; the edges exist so that parent and ancestor queries are
//! cheap. A node is attached to at most one parent, which keeps the arena a
//! forest of trees (one per function body).
//!
//! Once built, the analysis layers only ever read the tree.

use petgraph::stable_graph::StableGraph;
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::NodeId;
use crate::syntax::{Literal, LoopKind, SyntaxKind, UnaryOp};

/// Edge from a parent node to one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contains {
    /// Position of the child in the parent's child list.
    pub slot: u16,
}

/// Arena of syntax nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyntaxTree {
    graph: StableGraph<SyntaxKind, Contains, Directed, u32>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        SyntaxTree {
            graph: StableGraph::new(),
        }
    }

    /// Adds a node whose children already exist in the tree.
    ///
    /// Returns [`CoreError::NodeNotFound`] if a child does not exist and
    /// [`CoreError::NodeAlreadyAttached`] if a child already has a parent.
    pub fn add(&mut self, kind: SyntaxKind) -> Result<NodeId, CoreError> {
        let children = kind.children();
        for (i, child) in children.iter().enumerate() {
            if self.kind(*child).is_none() {
                return Err(CoreError::NodeNotFound { id: *child });
            }
            if self.parent(*child).is_some() || children[..i].contains(child) {
                return Err(CoreError::NodeAlreadyAttached { id: *child });
            }
        }

        let id = NodeId::from(self.graph.add_node(kind));
        for (slot, child) in children.into_iter().enumerate() {
            self.graph
                .add_edge(id.into(), child.into(), Contains { slot: slot as u16 });
        }
        Ok(id)
    }

    /// Returns the kind of a node, or `None` if it does not exist.
    pub fn kind(&self, id: NodeId) -> Option<&SyntaxKind> {
        self.graph.node_weight(id.into())
    }

    /// Child nodes in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).map(SyntaxKind::children).unwrap_or_default()
    }

    /// The parent of a node, or `None` for a root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        if self.kind(id).is_none() {
            return None;
        }
        self.graph
            .edges_directed(id.into(), Direction::Incoming)
            .next()
            .map(|edge| NodeId::from(edge.source()))
    }

    /// Ancestors from the direct parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            result.push(node);
            current = self.parent(node);
        }
        result
    }

    /// The root of the tree containing `id`.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().copied().unwrap_or(id)
    }

    /// All nodes below `id` (excluding `id`) in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            result.push(node);
            stack.extend(self.children(node).into_iter().rev());
        }
        result
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Skips any number of enclosing parentheses.
    pub fn strip_parens(&self, mut id: NodeId) -> NodeId {
        while let Some(SyntaxKind::Parenthesized { inner }) = self.kind(id) {
            id = *inner;
        }
        id
    }

    /// Flattens an identifier / member-access chain into its segments,
    /// e.g. `System.String.Empty` into `["System", "String", "Empty"]`.
    ///
    /// Returns `None` if the chain is rooted in anything other than an
    /// identifier.
    pub fn dotted_segments(&self, id: NodeId) -> Option<Vec<String>> {
        match self.kind(self.strip_parens(id))? {
            SyntaxKind::Identifier { name } => Some(vec![name.clone()]),
            SyntaxKind::MemberAccess { target, member } => {
                let mut segments = self.dotted_segments(*target)?;
                segments.push(member.clone());
                Some(segments)
            }
            _ => None,
        }
    }

    /// The dotted chain as a single string, e.g. `"Contract.Requires"`.
    pub fn dotted_path(&self, id: NodeId) -> Option<String> {
        self.dotted_segments(id).map(|segments| segments.join("."))
    }

    /// Renders a node back to compact, single-line source text.
    ///
    /// Compound statements render only their header (`if (x == null) ...`),
    /// which is what diagnostics quote.
    pub fn render(&self, id: NodeId) -> String {
        let Some(kind) = self.kind(id) else {
            return String::from("<missing>");
        };
        match kind {
            SyntaxKind::Identifier { name } => name.clone(),
            SyntaxKind::MemberAccess { target, member } => {
                format!("{}.{}", self.render(*target), member)
            }
            SyntaxKind::Invocation {
                callee,
                type_args,
                args,
            } => {
                let generics = if type_args.is_empty() {
                    String::new()
                } else {
                    let names: Vec<String> = type_args.iter().map(|t| t.to_string()).collect();
                    format!("<{}>", names.join(", "))
                };
                format!(
                    "{}{}({})",
                    self.render(*callee),
                    generics,
                    self.render_list(args)
                )
            }
            SyntaxKind::Binary { op, lhs, rhs } => {
                format!("{} {} {}", self.render(*lhs), op.symbol(), self.render(*rhs))
            }
            SyntaxKind::Unary { op, operand } => match op {
                UnaryOp::Not => format!("!{}", self.render(*operand)),
                UnaryOp::Negate => format!("-{}", self.render(*operand)),
            },
            SyntaxKind::Literal(literal) => match literal {
                Literal::Null => "null".into(),
                Literal::Bool(b) => b.to_string(),
                Literal::Int(i) => i.to_string(),
                Literal::String(s) => format!("\"{}\"", s),
            },
            SyntaxKind::ObjectCreation { ty, args } => {
                format!("new {}({})", ty, self.render_list(args))
            }
            SyntaxKind::Assignment { target, value } => {
                format!("{} = {}", self.render(*target), self.render(*value))
            }
            SyntaxKind::Parenthesized { inner } => format!("({})", self.render(*inner)),
            SyntaxKind::OtherExpression { text } | SyntaxKind::OtherStatement { text } => {
                text.clone()
            }
            SyntaxKind::ExpressionStatement { expr } => format!("{};", self.render(*expr)),
            SyntaxKind::LocalDeclaration { name, ty, init } => {
                let ty = ty.as_ref().map(|t| t.to_string()).unwrap_or_else(|| "var".into());
                match init {
                    Some(init) => format!("{} {} = {};", ty, name, self.render(*init)),
                    None => format!("{} {};", ty, name),
                }
            }
            SyntaxKind::If {
                condition,
                then_branch,
                ..
            } => match self.kind(*then_branch) {
                Some(SyntaxKind::Block { .. }) => format!("if ({}) {{ ... }}", self.render(*condition)),
                _ => format!("if ({}) {}", self.render(*condition), self.render(*then_branch)),
            },
            SyntaxKind::Block { .. } => "{ ... }".into(),
            SyntaxKind::Throw { expr } => match expr {
                Some(expr) => format!("throw {};", self.render(*expr)),
                None => "throw;".into(),
            },
            SyntaxKind::Return { expr } => match expr {
                Some(expr) => format!("return {};", self.render(*expr)),
                None => "return;".into(),
            },
            SyntaxKind::Loop { kind, condition, .. } => {
                let keyword = match kind {
                    LoopKind::While => "while",
                    LoopKind::DoWhile => "do-while",
                    LoopKind::For => "for",
                    LoopKind::ForEach => "foreach",
                };
                match condition {
                    Some(c) => format!("{} ({}) {{ ... }}", keyword, self.render(*c)),
                    None => format!("{} {{ ... }}", keyword),
                }
            }
            SyntaxKind::Switch { subject, .. } => {
                format!("switch ({}) {{ ... }}", self.render(*subject))
            }
            SyntaxKind::SwitchSection { .. } => "case ...:".into(),
            SyntaxKind::Try { .. } => "try { ... }".into(),
            SyntaxKind::Catch { exception_type, .. } => match exception_type {
                Some(ty) => format!("catch ({}) {{ ... }}", ty),
                None => "catch { ... }".into(),
            },
            SyntaxKind::Using { resource, .. } => match resource {
                Some(r) => format!("using ({}) {{ ... }}", self.render(*r)),
                None => "using { ... }".into(),
            },
        }
    }

    fn render_list(&self, ids: &[NodeId]) -> String {
        ids.iter()
            .map(|id| self.render(*id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
