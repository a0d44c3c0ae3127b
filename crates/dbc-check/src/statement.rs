//! ContractStatement: one source statement paired with its parsed contract.

use dbc_core::{NodeId, TypeRef};
use serde::{Deserialize, Serialize};

use crate::assertion::{AssertionKind, ContractExpression, PreconditionKind};
use crate::message::Message;
use crate::predicate::PredicateCheck;

static NO_MESSAGE: Message = Message::NoMessage;

/// The parsed contract of a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum ContractForm {
    /// A call to the contract entry point.
    Assertion(ContractExpression),
    /// `if (cond) throw new E(...);` with the checks of `!cond`.
    IfThrow {
        predicates: Vec<PredicateCheck>,
        exception_type: TypeRef,
    },
    /// A call to a `[ContractArgumentValidator]` method.
    Guard {
        method: String,
        predicates: Vec<PredicateCheck>,
    },
}

/// A statement recognized as a contract. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractStatement {
    pub statement: NodeId,
    pub form: ContractForm,
}

impl ContractStatement {
    /// The assertion kind for calls to the contract entry point.
    pub fn kind(&self) -> Option<AssertionKind> {
        match &self.form {
            ContractForm::Assertion(expr) => Some(expr.kind),
            _ => None,
        }
    }

    pub fn expression(&self) -> Option<&ContractExpression> {
        match &self.form {
            ContractForm::Assertion(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn precondition_kind(&self) -> Option<PreconditionKind> {
        match &self.form {
            ContractForm::Assertion(expr) => expr.precondition_kind(),
            ContractForm::IfThrow { exception_type, .. } => {
                Some(PreconditionKind::IfThrowPrecondition(exception_type.clone()))
            }
            ContractForm::Guard { .. } => Some(PreconditionKind::GuardBasedPrecondition),
        }
    }

    pub fn predicates(&self) -> &[PredicateCheck] {
        match &self.form {
            ContractForm::Assertion(expr) => &expr.predicates,
            ContractForm::IfThrow { predicates, .. } | ContractForm::Guard { predicates, .. } => {
                predicates
            }
        }
    }

    /// The assertion message. If-throw and guard forms have none.
    pub fn message(&self) -> &Message {
        match &self.form {
            ContractForm::Assertion(expr) => &expr.message,
            _ => &NO_MESSAGE,
        }
    }

    pub fn is_precondition(&self) -> bool {
        self.precondition_kind().is_some()
    }

    pub fn is_postcondition(&self) -> bool {
        self.kind().is_some_and(AssertionKind::is_postcondition)
    }

    /// `T` of `Contract.Result<T>()` for postconditions.
    pub fn result_type(&self) -> Option<&TypeRef> {
        self.expression().and_then(|expr| expr.result_type.as_ref())
    }

    /// Returns `true` if any predicate asserts that `name` is not null.
    pub fn checks_for_not_null(&self, name: &str) -> bool {
        self.predicates().iter().any(|p| p.checks_for_not_null(name))
    }

    /// Returns `true` if any predicate asserts that `name` is null.
    pub fn checks_for_null(&self, name: &str) -> bool {
        self.predicates().iter().any(|p| p.checks_for_null(name))
    }

    /// Short label such as `Contract.Requires` or `if-throw precondition`.
    pub fn label(&self) -> String {
        match &self.form {
            ContractForm::Assertion(expr) => expr.kind.to_string(),
            ContractForm::IfThrow { exception_type, .. } => {
                format!("if-throw precondition ({})", exception_type)
            }
            ContractForm::Guard { method, .. } => format!("guard precondition ({})", method),
        }
    }
}
