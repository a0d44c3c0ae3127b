//! Core error types for dbc-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! failure modes of building a program model: malformed trees, duplicate
//! declarations, and dangling references.

use crate::id::{FunctionId, NodeId};
use thiserror::Error;

/// Core errors produced by the dbc-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Attempting to register a type name that already exists in the symbol table.
    #[error("duplicate type name: '{name}'")]
    DuplicateType { name: String },

    /// A node was not found in the syntax tree.
    #[error("node not found: NodeId({id})", id = id.0)]
    NodeNotFound { id: NodeId },

    /// A node already has a parent and cannot be attached again.
    #[error("node already attached: NodeId({id})", id = id.0)]
    NodeAlreadyAttached { id: NodeId },

    /// A function ID was not found.
    #[error("function not found: FunctionId({id})", id = id.0)]
    FunctionNotFound { id: FunctionId },

    /// A function body is not a free-standing block.
    #[error("invalid function body: {reason}")]
    InvalidBody { reason: String },

    /// A program description could not be turned into a program model.
    #[error("invalid program: {reason}")]
    InvalidProgram { reason: String },
}
