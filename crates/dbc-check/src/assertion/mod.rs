//! Assertion model and statement classification.
//!
//! Recognition happens in two layers:
//!
//! - [`AssertionShape`] answers "what does this statement look like?" without
//!   looking at the condition: a call to `Contract.Requires`, an if-throw
//!   guard, a validator call. Block-level ordering rules work on shapes, so
//!   `Contract.Requires(count > 0)` still counts as a precondition even though
//!   its condition is not a modelled predicate.
//! - [`ContractExpression`] is the fully parsed assertion with its predicates,
//!   message and kind-specific types. It only exists when the condition yields
//!   at least one predicate (or, for postconditions and `EndContractBlock`,
//!   when no predicate is needed).

pub mod parse;

pub use parse::{classify_statement, parse_statement};

use std::fmt;

use dbc_core::{NodeId, TypeRef};
use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::predicate::PredicateCheck;

/// The contract method an assertion call invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionKind {
    Requires,
    Ensures,
    /// Postcondition that holds when the method throws a given exception.
    EnsuresOnThrow,
    Invariant,
    Assert,
    Assume,
    EndContractBlock,
}

impl AssertionKind {
    /// Maps a member of the contract entry point to its kind. Helper members
    /// such as `Result`, `OldValue` or `ForAll` are not assertions.
    pub fn from_member_name(name: &str) -> Option<AssertionKind> {
        match name {
            "Requires" => Some(AssertionKind::Requires),
            "Ensures" => Some(AssertionKind::Ensures),
            "EnsuresOnThrow" => Some(AssertionKind::EnsuresOnThrow),
            "Invariant" => Some(AssertionKind::Invariant),
            "Assert" => Some(AssertionKind::Assert),
            "Assume" => Some(AssertionKind::Assume),
            "EndContractBlock" => Some(AssertionKind::EndContractBlock),
            _ => None,
        }
    }

    pub fn member_name(self) -> &'static str {
        match self {
            AssertionKind::Requires => "Requires",
            AssertionKind::Ensures => "Ensures",
            AssertionKind::EnsuresOnThrow => "EnsuresOnThrow",
            AssertionKind::Invariant => "Invariant",
            AssertionKind::Assert => "Assert",
            AssertionKind::Assume => "Assume",
            AssertionKind::EndContractBlock => "EndContractBlock",
        }
    }

    pub fn is_postcondition(self) -> bool {
        matches!(self, AssertionKind::Ensures | AssertionKind::EnsuresOnThrow)
    }

    /// Kinds that are only recognized when their condition yields at least
    /// one predicate.
    pub fn requires_predicates(self) -> bool {
        matches!(
            self,
            AssertionKind::Requires
                | AssertionKind::Invariant
                | AssertionKind::Assert
                | AssertionKind::Assume
        )
    }
}

impl fmt::Display for AssertionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Contract.{}", self.member_name())
    }
}

/// How a precondition is expressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "precondition", content = "exception_type", rename_all = "snake_case")]
pub enum PreconditionKind {
    /// `Contract.Requires<E>(...)`
    GenericRequires(TypeRef),
    /// `Contract.Requires(...)`
    PlainRequires,
    /// `if (cond) throw new E(...);`
    IfThrowPrecondition(TypeRef),
    /// A call to a `[ContractArgumentValidator]` method.
    GuardBasedPrecondition,
}

/// A parsed assertion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractExpression {
    pub kind: AssertionKind,
    pub predicates: Vec<PredicateCheck>,
    pub message: Message,
    /// `E` of `Requires<E>` or `EnsuresOnThrow<E>`.
    pub exception_type: Option<TypeRef>,
    /// `T` of the first `Contract.Result<T>()` in a postcondition.
    pub result_type: Option<TypeRef>,
}

impl ContractExpression {
    pub fn precondition_kind(&self) -> Option<PreconditionKind> {
        match (self.kind, &self.exception_type) {
            (AssertionKind::Requires, Some(ty)) => Some(PreconditionKind::GenericRequires(ty.clone())),
            (AssertionKind::Requires, None) => Some(PreconditionKind::PlainRequires),
            _ => None,
        }
    }
}

/// The predicate-independent form of a contract-looking statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum AssertionShape {
    /// An expression statement calling the contract entry point.
    Assertion {
        kind: AssertionKind,
        invocation: NodeId,
        exception_type: Option<TypeRef>,
    },
    /// `if (condition) throw new E(...);` with `E` an argument exception.
    IfThrow {
        condition: NodeId,
        exception_type: TypeRef,
    },
    /// A call to a `[ContractArgumentValidator]` method.
    Guard { method: String, invocation: NodeId },
    /// A call to a `[ContractAbbreviator]` method.
    Abbreviator { method: String, invocation: NodeId },
}

impl AssertionShape {
    pub fn assertion_kind(&self) -> Option<AssertionKind> {
        match self {
            AssertionShape::Assertion { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is(&self, kind: AssertionKind) -> bool {
        self.assertion_kind() == Some(kind)
    }

    pub fn is_postcondition(&self) -> bool {
        self.assertion_kind().is_some_and(AssertionKind::is_postcondition)
    }

    /// If-throw and guard preconditions: the forms that predate
    /// `Contract.Requires`.
    pub fn is_legacy_precondition(&self) -> bool {
        matches!(self, AssertionShape::IfThrow { .. } | AssertionShape::Guard { .. })
    }

    pub fn is_precondition(&self) -> bool {
        self.is(AssertionKind::Requires) || self.is_legacy_precondition()
    }

    /// Statements that extend the contract section up to themselves.
    ///
    /// If-throw guards are not markers on their own: an `if` followed by
    /// ordinary code is ordinary code. They join the section when a later
    /// marker (typically `EndContractBlock`) follows them.
    pub fn is_block_marker(&self) -> bool {
        match self {
            AssertionShape::Assertion { kind, .. } => !matches!(
                kind,
                AssertionKind::Assert | AssertionKind::Assume
            ),
            AssertionShape::Guard { .. } | AssertionShape::Abbreviator { .. } => true,
            AssertionShape::IfThrow { .. } => false,
        }
    }
}
