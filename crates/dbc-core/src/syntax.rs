//! Syntax node kinds for the host language.
//!
//! Each [`SyntaxKind`] variant carries its own payload (names, operators,
//! literal values) plus the [`NodeId`]s of its children in source order.
//! Nodes are built bottom-up, so a parent always refers to children that
//! already exist in the [`SyntaxTree`](crate::tree::SyntaxTree).
//!
//! Only the shapes the contract grammar needs are modelled precisely; every
//! other expression or statement is carried as `OtherExpression` /
//! `OtherStatement` with its source text.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::id::NodeId;
use crate::types::TypeRef;

/// Literal values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    String(String),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessOrEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterOrEqual => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }

    /// Returns `true` for operators producing a boolean.
    pub fn is_boolean(self) -> bool {
        !matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div
        )
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Not,
    Negate,
}

/// Loop statement flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopKind {
    While,
    DoWhile,
    For,
    ForEach,
}

/// The kind of a syntax node, with child references in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SyntaxKind {
    // -- Expressions --
    Identifier {
        name: String,
    },
    /// `target.member`
    MemberAccess {
        target: NodeId,
        member: String,
    },
    /// `callee<type_args>(args)`
    Invocation {
        callee: NodeId,
        type_args: Vec<TypeRef>,
        args: SmallVec<[NodeId; 2]>,
    },
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Literal(Literal),
    /// `new T(args)`
    ObjectCreation {
        ty: TypeRef,
        args: Vec<NodeId>,
    },
    Assignment {
        target: NodeId,
        value: NodeId,
    },
    Parenthesized {
        inner: NodeId,
    },
    OtherExpression {
        text: String,
    },

    // -- Statements --
    ExpressionStatement {
        expr: NodeId,
    },
    LocalDeclaration {
        name: String,
        ty: Option<TypeRef>,
        init: Option<NodeId>,
    },
    If {
        condition: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    Block {
        statements: Vec<NodeId>,
    },
    Throw {
        expr: Option<NodeId>,
    },
    Return {
        expr: Option<NodeId>,
    },
    Loop {
        kind: LoopKind,
        condition: Option<NodeId>,
        body: NodeId,
    },
    Switch {
        subject: NodeId,
        sections: Vec<NodeId>,
    },
    SwitchSection {
        statements: Vec<NodeId>,
    },
    /// `try { body } catch ... finally { finally }`; `body` and `finally`
    /// are blocks, `catches` are `Catch` nodes.
    Try {
        body: NodeId,
        catches: Vec<NodeId>,
        finally: Option<NodeId>,
    },
    Catch {
        exception_type: Option<TypeRef>,
        body: NodeId,
    },
    Using {
        resource: Option<NodeId>,
        body: NodeId,
    },
    OtherStatement {
        text: String,
    },
}

impl SyntaxKind {
    /// All child node IDs in source order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            SyntaxKind::Identifier { .. }
            | SyntaxKind::Literal(_)
            | SyntaxKind::OtherExpression { .. }
            | SyntaxKind::OtherStatement { .. } => Vec::new(),
            SyntaxKind::MemberAccess { target, .. } => vec![*target],
            SyntaxKind::Invocation { callee, args, .. } => {
                let mut children = vec![*callee];
                children.extend(args.iter().copied());
                children
            }
            SyntaxKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            SyntaxKind::Unary { operand, .. } => vec![*operand],
            SyntaxKind::ObjectCreation { args, .. } => args.clone(),
            SyntaxKind::Assignment { target, value } => vec![*target, *value],
            SyntaxKind::Parenthesized { inner } => vec![*inner],
            SyntaxKind::ExpressionStatement { expr } => vec![*expr],
            SyntaxKind::LocalDeclaration { init, .. } => init.iter().copied().collect(),
            SyntaxKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut children = vec![*condition, *then_branch];
                children.extend(else_branch.iter().copied());
                children
            }
            SyntaxKind::Block { statements } | SyntaxKind::SwitchSection { statements } => {
                statements.clone()
            }
            SyntaxKind::Throw { expr } | SyntaxKind::Return { expr } => {
                expr.iter().copied().collect()
            }
            SyntaxKind::Loop {
                condition, body, ..
            } => {
                let mut children: Vec<NodeId> = condition.iter().copied().collect();
                children.push(*body);
                children
            }
            SyntaxKind::Switch { subject, sections } => {
                let mut children = vec![*subject];
                children.extend(sections.iter().copied());
                children
            }
            SyntaxKind::Try {
                body,
                catches,
                finally,
            } => {
                let mut children = vec![*body];
                children.extend(catches.iter().copied());
                children.extend(finally.iter().copied());
                children
            }
            SyntaxKind::Catch { body, .. } => vec![*body],
            SyntaxKind::Using { resource, body } => {
                let mut children: Vec<NodeId> = resource.iter().copied().collect();
                children.push(*body);
                children
            }
        }
    }

    /// Returns `true` if this node is a statement (as opposed to an
    /// expression).
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            SyntaxKind::ExpressionStatement { .. }
                | SyntaxKind::LocalDeclaration { .. }
                | SyntaxKind::If { .. }
                | SyntaxKind::Block { .. }
                | SyntaxKind::Throw { .. }
                | SyntaxKind::Return { .. }
                | SyntaxKind::Loop { .. }
                | SyntaxKind::Switch { .. }
                | SyntaxKind::SwitchSection { .. }
                | SyntaxKind::Try { .. }
                | SyntaxKind::Catch { .. }
                | SyntaxKind::Using { .. }
                | SyntaxKind::OtherStatement { .. }
        )
    }

    pub fn is_expression(&self) -> bool {
        !self.is_statement()
    }

    /// Short human-readable name of the node kind.
    pub fn label(&self) -> &'static str {
        match self {
            SyntaxKind::Identifier { .. } => "identifier",
            SyntaxKind::MemberAccess { .. } => "member access",
            SyntaxKind::Invocation { .. } => "invocation",
            SyntaxKind::Binary { .. } => "binary expression",
            SyntaxKind::Unary { .. } => "unary expression",
            SyntaxKind::Literal(_) => "literal",
            SyntaxKind::ObjectCreation { .. } => "object creation",
            SyntaxKind::Assignment { .. } => "assignment",
            SyntaxKind::Parenthesized { .. } => "parenthesized expression",
            SyntaxKind::OtherExpression { .. } => "expression",
            SyntaxKind::ExpressionStatement { .. } => "expression statement",
            SyntaxKind::LocalDeclaration { .. } => "local declaration",
            SyntaxKind::If { .. } => "if statement",
            SyntaxKind::Block { .. } => "block",
            SyntaxKind::Throw { .. } => "throw statement",
            SyntaxKind::Return { .. } => "return statement",
            SyntaxKind::Loop { .. } => "loop",
            SyntaxKind::Switch { .. } => "switch statement",
            SyntaxKind::SwitchSection { .. } => "switch section",
            SyntaxKind::Try { .. } => "try statement",
            SyntaxKind::Catch { .. } => "catch clause",
            SyntaxKind::Using { .. } => "using statement",
            SyntaxKind::OtherStatement { .. } => "statement",
        }
    }
}
