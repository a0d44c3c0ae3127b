//! Operational errors for dbc-check.
//!
//! Malformed contract blocks are not errors: they are reported as
//! [`Diagnostic`](crate::validate::Diagnostic)s. These variants cover the
//! cases where the analysis cannot run at all.

use dbc_core::{CoreError, FunctionId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    /// A function ID was not found in the program.
    #[error("function not found: FunctionId({id})", id = id.0)]
    FunctionNotFound { id: FunctionId },

    /// No function matches the given name.
    #[error("no function named '{name}'")]
    FunctionNameNotFound { name: String },

    /// More than one function matches the given simple name.
    #[error("function name '{name}' is ambiguous ({count} matches); qualify it with the declaring type")]
    AmbiguousFunctionName { name: String, count: usize },

    /// The options document could not be parsed.
    #[error("invalid options: {reason}")]
    InvalidOptions { reason: String },

    /// An error from the program model.
    #[error(transparent)]
    Core(#[from] CoreError),
}
