//! Contract recognition and contract-block validation.
//!
//! The crate reads function bodies through [`dbc_core::SemanticModel`] and
//! never mutates them. It has two independent outputs:
//!
//! - **Recognition** ([`assertion`], [`predicate`], [`message`],
//!   [`statement`]): turns statements into typed [`ContractStatement`]s.
//! - **Validation** ([`block`], [`validate`]): flattens a body, locates the
//!   contract section and runs a [`RuleSet`] over it, producing
//!   [`Diagnostic`]s.
//!
//! [`enumerate`] lists the contracts of functions and types without
//! validating them.

pub mod assertion;
pub mod block;
pub mod enumerate;
pub mod error;
pub mod message;
pub mod options;
pub mod predicate;
pub mod statement;
pub mod validate;

#[cfg(test)]
mod test_support;

pub use assertion::{
    classify_statement, parse_statement, AssertionKind, AssertionShape, ContractExpression,
    PreconditionKind,
};
pub use block::{extract_block, ContractBlock, Nesting, ProcessedStatement};
pub use enumerate::{
    contracts_of_function, function_by_name, invariants_of_type, preconditions_of_function,
};
pub use error::CheckError;
pub use message::Message;
pub use options::CheckOptions;
pub use predicate::{ArgumentTarget, PredicateArgument, PredicateCheck};
pub use statement::{ContractForm, ContractStatement};
pub use validate::{
    validate_function, validate_program, Diagnostic, RuleSet, Severity, ValidationResult,
};
