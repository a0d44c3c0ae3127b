//! Visibility consistency of preconditions.
//!
//! A precondition is part of the method's public surface: callers must be
//! able to see the exception it throws and every member it reads. The
//! required level is the method's own visibility combined with that of its
//! declaring type.

use dbc_core::{FunctionDecl, NodeId, SemanticModel, SyntaxKind, TypeRef, Visibility};

use super::diagnostics::{CustomWarningKind, ErrorKind, ValidationResult};
use super::{Rule, RuleContext};
use crate::assertion::PreconditionKind;
use crate::block::ProcessedStatement;

pub const INCONSISTENT_EXCEPTION_VISIBILITY: Rule = Rule {
    name: "inconsistent_exception_visibility",
    check: inconsistent_exception_visibility,
};

pub const INCONSISTENT_PREDICATE_VISIBILITY: Rule = Rule {
    name: "inconsistent_predicate_visibility",
    check: inconsistent_predicate_visibility,
};

pub const EXCEPTION_WITHOUT_MESSAGE_CONSTRUCTOR: Rule = Rule {
    name: "exception_without_message_constructor",
    check: exception_without_message_constructor,
};

/// Combined visibility of the function being validated.
pub fn required_visibility(model: &dyn SemanticModel, function: &FunctionDecl) -> Visibility {
    let owner = model
        .symbols()
        .effective_visibility(&function.declaring_type)
        .unwrap_or(Visibility::Public);
    function.visibility.combine(owner)
}

/// The `E` of a `Contract.Requires<E>` statement.
fn generic_requires_exception(stmt: &ProcessedStatement) -> Option<TypeRef> {
    match stmt.contract.as_ref()?.precondition_kind()? {
        PreconditionKind::GenericRequires(ty) => Some(ty),
        _ => None,
    }
}

fn inconsistent_exception_visibility(
    ctx: &RuleContext<'_>,
    stmt: &ProcessedStatement,
) -> ValidationResult {
    let Some(exception) = generic_requires_exception(stmt) else {
        return ValidationResult::NoError;
    };
    // unknown types are assumed to be framework types
    let actual = ctx
        .model
        .symbols()
        .effective_visibility(exception.canonical_name())
        .unwrap_or(Visibility::Public);
    let required = required_visibility(ctx.model, ctx.function);
    if actual.is_at_least(required) {
        return ValidationResult::NoError;
    }
    ValidationResult::error_with(
        ErrorKind::InconsistentExceptionVisibility,
        format!(
            "Exception type '{}' is {} but method '{}' is {}",
            exception,
            actual.keyword(),
            ctx.function.qualified_name(),
            required.keyword()
        ),
    )
}

fn exception_without_message_constructor(
    ctx: &RuleContext<'_>,
    stmt: &ProcessedStatement,
) -> ValidationResult {
    let Some(exception) = generic_requires_exception(stmt) else {
        return ValidationResult::NoError;
    };
    let Some(info) = ctx.model.symbols().get_ref(&exception) else {
        return ValidationResult::NoError;
    };
    let string = TypeRef::named("string");
    let has_message_constructor = info.has_constructor(std::slice::from_ref(&string))
        || info.has_constructor(&[string.clone(), string.clone()]);
    if has_message_constructor {
        ValidationResult::NoError
    } else {
        ValidationResult::CustomWarning {
            kind: CustomWarningKind::ExceptionWithoutMessageConstructor,
        }
    }
}

/// Nodes along a member access chain: `a.b.c` yields `a.b.c`, `a.b`, `a`.
fn member_chain(model: &dyn SemanticModel, node: NodeId) -> Vec<NodeId> {
    let mut chain = Vec::new();
    let mut current = Some(model.tree().strip_parens(node));
    while let Some(node) = current {
        chain.push(node);
        current = match model.kind(node) {
            Some(SyntaxKind::MemberAccess { target, .. }) => Some(model.tree().strip_parens(*target)),
            _ => None,
        };
    }
    chain
}

fn inconsistent_predicate_visibility(
    ctx: &RuleContext<'_>,
    stmt: &ProcessedStatement,
) -> ValidationResult {
    let Some(contract) = stmt.contract.as_ref().filter(|c| c.is_precondition()) else {
        return ValidationResult::NoError;
    };
    let required = required_visibility(ctx.model, ctx.function);
    let symbols = ctx.model.symbols();

    for predicate in contract.predicates() {
        for node in member_chain(ctx.model, predicate.argument().node) {
            let Some(member) = ctx.model.resolve_member(node) else {
                continue;
            };
            if member.public_surrogate_name().is_some() {
                continue;
            }
            let owner = symbols
                .effective_visibility(&member.declaring_type)
                .unwrap_or(Visibility::Public);
            let actual = member.visibility.combine(owner);
            if !actual.is_at_least(required) {
                return ValidationResult::error_with(
                    ErrorKind::InconsistentPredicateVisibility,
                    format!(
                        "Member '{}' is {} but is referenced in a precondition of {} method '{}'",
                        member.name,
                        actual.keyword(),
                        required.keyword(),
                        ctx.function.qualified_name()
                    ),
                );
            }
        }
    }
    ValidationResult::NoError
}
