//! Diagnostic model for contract block validation.
//!
//! Every rule produces a [`ValidationResult`]; the engine wraps non-empty
//! results in a [`Diagnostic`] that points back at the statement it was
//! computed for.

use std::fmt;

use dbc_core::{FunctionId, NodeId};
use serde::{Deserialize, Serialize};

/// Malformed-contract errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    VoidReturnMethodCall,
    AssignmentInContractBlock,
    AssertOrAssumeInContractBlock,
    RequiresAfterEnsures,
    EnsuresBeforeLegacyPrecondition,
    ContractAfterEndContractBlock,
    DuplicatedEndContractBlock,
    ContractStatementInTheMiddleOfMethod,
    ContractInTryBlock,
    EnsuresResultTypeMismatch,
    EnsuresInVoidReturnMethod,
    InvalidContractMessage,
    InvariantOutsideInvariantMethod,
    InconsistentExceptionVisibility,
    InconsistentPredicateVisibility,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::VoidReturnMethodCall => "void-return-method-call",
            ErrorKind::AssignmentInContractBlock => "assignment-in-contract-block",
            ErrorKind::AssertOrAssumeInContractBlock => "assert-or-assume-in-contract-block",
            ErrorKind::RequiresAfterEnsures => "requires-after-ensures",
            ErrorKind::EnsuresBeforeLegacyPrecondition => "ensures-before-legacy-precondition",
            ErrorKind::ContractAfterEndContractBlock => "contract-after-end-contract-block",
            ErrorKind::DuplicatedEndContractBlock => "duplicated-end-contract-block",
            ErrorKind::ContractStatementInTheMiddleOfMethod => "contract-in-the-middle-of-method",
            ErrorKind::ContractInTryBlock => "contract-in-try-block",
            ErrorKind::EnsuresResultTypeMismatch => "ensures-result-type-mismatch",
            ErrorKind::EnsuresInVoidReturnMethod => "ensures-in-void-return-method",
            ErrorKind::InvalidContractMessage => "invalid-contract-message",
            ErrorKind::InvariantOutsideInvariantMethod => "invariant-outside-invariant-method",
            ErrorKind::InconsistentExceptionVisibility => "inconsistent-exception-visibility",
            ErrorKind::InconsistentPredicateVisibility => "inconsistent-predicate-visibility",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ErrorKind::VoidReturnMethodCall => {
                "Detected call to method that returns void in the contract section"
            }
            ErrorKind::AssignmentInContractBlock => "Assignment in the contract section",
            ErrorKind::AssertOrAssumeInContractBlock => {
                "Contract.Assert/Contract.Assume cannot be used in the contract section"
            }
            ErrorKind::RequiresAfterEnsures => "Precondition follows a postcondition",
            ErrorKind::EnsuresBeforeLegacyPrecondition => {
                "Postcondition precedes a legacy (if-throw or guard) precondition"
            }
            ErrorKind::ContractAfterEndContractBlock => {
                "Contract statement follows Contract.EndContractBlock"
            }
            ErrorKind::DuplicatedEndContractBlock => "Duplicated Contract.EndContractBlock",
            ErrorKind::ContractStatementInTheMiddleOfMethod => {
                "Contract statements must appear at the start of the method"
            }
            ErrorKind::ContractInTryBlock => "Contract statement inside a try block",
            ErrorKind::EnsuresResultTypeMismatch => {
                "Contract.Result type is not compatible with the method return type"
            }
            ErrorKind::EnsuresInVoidReturnMethod => {
                "Contract.Result cannot be used in a method returning void"
            }
            ErrorKind::InvalidContractMessage => {
                "Contract message must be a literal or a static member at least as visible as internal"
            }
            ErrorKind::InvariantOutsideInvariantMethod => {
                "Contract.Invariant outside an invariant method"
            }
            ErrorKind::InconsistentExceptionVisibility => {
                "Exception type is less visible than the enclosing method"
            }
            ErrorKind::InconsistentPredicateVisibility => {
                "Member referenced in a precondition is less visible than the enclosing method"
            }
        }
    }
}

/// Suspicious but legal contract code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    NonVoidReturnMethodCall,
    LegacyPreconditionWithoutEndContractBlock,
}

impl WarningKind {
    pub fn code(self) -> &'static str {
        match self {
            WarningKind::NonVoidReturnMethodCall => "non-void-return-method-call",
            WarningKind::LegacyPreconditionWithoutEndContractBlock => {
                "legacy-precondition-without-end-contract-block"
            }
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            WarningKind::NonVoidReturnMethodCall => {
                "Detected call to method that returns a value in the contract section; the result is ignored"
            }
            WarningKind::LegacyPreconditionWithoutEndContractBlock => {
                "If-throw precondition mixed with contract calls; add Contract.EndContractBlock()"
            }
        }
    }
}

/// Advisory findings about runtime behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomWarningKind {
    PreconditionInAsyncMethod,
    PreconditionInIteratorMethod,
    ExceptionWithoutMessageConstructor,
}

impl CustomWarningKind {
    pub fn code(self) -> &'static str {
        match self {
            CustomWarningKind::PreconditionInAsyncMethod => "precondition-in-async-method",
            CustomWarningKind::PreconditionInIteratorMethod => "precondition-in-iterator-method",
            CustomWarningKind::ExceptionWithoutMessageConstructor => {
                "exception-without-message-constructor"
            }
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CustomWarningKind::PreconditionInAsyncMethod => {
                "Precondition in an async method surfaces through the returned task, not at the call"
            }
            CustomWarningKind::PreconditionInIteratorMethod => {
                "Precondition in an iterator runs on first enumeration, not at the call"
            }
            CustomWarningKind::ExceptionWithoutMessageConstructor => {
                "Exception type has no (string) or (string, string) constructor; the runtime falls back to a generic exception"
            }
        }
    }
}

/// Outcome of one rule for one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ValidationResult {
    NoError,
    Error { kind: ErrorKind, message: String },
    Warning { kind: WarningKind },
    CustomWarning { kind: CustomWarningKind },
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Advisory,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Advisory => write!(f, "advisory"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl ValidationResult {
    /// An error whose message is the kind's description.
    pub fn error(kind: ErrorKind) -> Self {
        ValidationResult::Error {
            kind,
            message: kind.description().to_string(),
        }
    }

    /// An error with a statement-specific message.
    pub fn error_with(kind: ErrorKind, message: impl Into<String>) -> Self {
        ValidationResult::Error {
            kind,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ValidationResult::Error { .. })
    }

    pub fn severity(&self) -> Option<Severity> {
        match self {
            ValidationResult::NoError => None,
            ValidationResult::Error { .. } => Some(Severity::Error),
            ValidationResult::Warning { .. } => Some(Severity::Warning),
            ValidationResult::CustomWarning { .. } => Some(Severity::Advisory),
        }
    }

    pub fn code(&self) -> Option<&'static str> {
        match self {
            ValidationResult::NoError => None,
            ValidationResult::Error { kind, .. } => Some(kind.code()),
            ValidationResult::Warning { kind } => Some(kind.code()),
            ValidationResult::CustomWarning { kind } => Some(kind.code()),
        }
    }

    /// The rendered message.
    pub fn message(&self) -> String {
        match self {
            ValidationResult::NoError => String::new(),
            ValidationResult::Error { message, .. } => message.clone(),
            ValidationResult::Warning { kind } => kind.description().to_string(),
            ValidationResult::CustomWarning { kind } => kind.description().to_string(),
        }
    }
}

/// The statement a diagnostic is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRef {
    /// Position in the flattened statement list of the function.
    pub index: usize,
    pub node: NodeId,
}

/// A non-empty validation result attached to its statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub function: FunctionId,
    pub statement: StatementRef,
    /// Name of the rule that produced the result.
    pub rule: String,
    pub result: ValidationResult,
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        self.result.severity().unwrap_or(Severity::Advisory)
    }

    pub fn is_error(&self) -> bool {
        self.result.is_error()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] statement {}: {}",
            self.severity(),
            self.result.code().unwrap_or("none"),
            self.statement.index,
            self.result.message()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities() {
        assert_eq!(ValidationResult::NoError.severity(), None);
        assert_eq!(
            ValidationResult::error(ErrorKind::DuplicatedEndContractBlock).severity(),
            Some(Severity::Error)
        );
        assert_eq!(
            ValidationResult::Warning {
                kind: WarningKind::NonVoidReturnMethodCall
            }
            .severity(),
            Some(Severity::Warning)
        );
        assert!(Severity::Error > Severity::Warning);
    }

    #[test]
    fn diagnostic_display() {
        let diagnostic = Diagnostic {
            function: FunctionId(0),
            statement: StatementRef {
                index: 2,
                node: NodeId(17),
            },
            rule: "requires_after_ensures".into(),
            result: ValidationResult::error(ErrorKind::RequiresAfterEnsures),
        };
        insta::assert_snapshot!(
            diagnostic.to_string(),
            @"error[requires-after-ensures] statement 2: Precondition follows a postcondition"
        );
    }

    #[test]
    fn diagnostic_json_shape() {
        let diagnostic = Diagnostic {
            function: FunctionId(1),
            statement: StatementRef {
                index: 0,
                node: NodeId(3),
            },
            rule: "precondition_in_async_method".into(),
            result: ValidationResult::CustomWarning {
                kind: CustomWarningKind::PreconditionInAsyncMethod,
            },
        };
        insta::assert_json_snapshot!(diagnostic, @r#"
        {
          "function": 1,
          "statement": {
            "index": 0,
            "node": 3
          },
          "rule": "precondition_in_async_method",
          "result": {
            "result": "custom_warning",
            "kind": "precondition_in_async_method"
          }
        }
        "#);
    }
}
