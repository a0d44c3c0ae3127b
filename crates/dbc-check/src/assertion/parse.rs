//! Statement classification and assertion parsing.

use dbc_core::{NodeId, SemanticModel, SyntaxKind, TypeRef, ARGUMENT_EXCEPTION};
use tracing::debug;

use super::{AssertionKind, AssertionShape, ContractExpression};
use crate::message::extract_message;
use crate::predicate::{extract_predicates, is_result_call, Polarity};
use crate::statement::{ContractForm, ContractStatement};

/// Classifies a statement by shape, trying in order: if-throw, contract
/// entry point call, validator call, abbreviator call.
///
/// Returns `None` for ordinary statements. Never panics on unexpected tree
/// shapes.
pub fn classify_statement(model: &dyn SemanticModel, statement: NodeId) -> Option<AssertionShape> {
    match model.kind(statement)? {
        SyntaxKind::If {
            condition,
            then_branch,
            else_branch: None,
        } => if_throw_exception(model, *then_branch).map(|exception_type| AssertionShape::IfThrow {
            condition: *condition,
            exception_type,
        }),
        SyntaxKind::ExpressionStatement { expr } => {
            let invocation = model.tree().strip_parens(*expr);
            let SyntaxKind::Invocation { type_args, .. } = model.kind(invocation)? else {
                return None;
            };
            let method = model.resolve_invocation(invocation)?;
            if method.is_contract_method() {
                let kind = AssertionKind::from_member_name(&method.name)?;
                let exception_type = match kind {
                    AssertionKind::Requires | AssertionKind::EnsuresOnThrow => type_args.first().cloned(),
                    _ => None,
                };
                Some(AssertionShape::Assertion {
                    kind,
                    invocation,
                    exception_type,
                })
            } else if method.is_argument_validator() {
                Some(AssertionShape::Guard {
                    method: method.name.clone(),
                    invocation,
                })
            } else if method.is_abbreviator() {
                Some(AssertionShape::Abbreviator {
                    method: method.name.clone(),
                    invocation,
                })
            } else {
                None
            }
        }
        _ => None,
    }
}

/// The exception type of `throw new E(...)`, if `node` is such a throw (or a
/// block holding exactly that throw) and `E` is an argument exception.
fn if_throw_exception(model: &dyn SemanticModel, node: NodeId) -> Option<TypeRef> {
    let throw = match model.kind(node)? {
        SyntaxKind::Block { statements } if statements.len() == 1 => statements[0],
        SyntaxKind::Block { .. } => return None,
        _ => node,
    };
    let SyntaxKind::Throw { expr: Some(expr) } = model.kind(throw)? else {
        return None;
    };
    let created = model.tree().strip_parens(*expr);
    let SyntaxKind::ObjectCreation { ty, .. } = model.kind(created)? else {
        return None;
    };
    model
        .symbols()
        .is_subtype_of(ty, &TypeRef::named(ARGUMENT_EXCEPTION))
        .then(|| ty.clone())
}

/// Parses a statement into a [`ContractStatement`].
///
/// Fails soft: statements that are not contract-shaped, `Requires` /
/// `Invariant` / `Assert` / `Assume` calls without a recognized predicate, and
/// assertion calls without arguments all return `None`.
pub fn parse_statement(model: &dyn SemanticModel, statement: NodeId) -> Option<ContractStatement> {
    let shape = classify_statement(model, statement)?;
    parse_shape(model, statement, &shape)
}

/// Parses an already classified statement.
pub fn parse_shape(
    model: &dyn SemanticModel,
    statement: NodeId,
    shape: &AssertionShape,
) -> Option<ContractStatement> {
    let form = match shape {
        AssertionShape::Assertion {
            kind,
            invocation,
            exception_type,
        } => ContractForm::Assertion(parse_assertion(
            model,
            *kind,
            *invocation,
            exception_type.clone(),
        )?),
        AssertionShape::IfThrow {
            condition,
            exception_type,
        } => {
            let predicates = extract_predicates(model, *condition, Polarity::Refuted);
            if predicates.is_empty() {
                return None;
            }
            ContractForm::IfThrow {
                predicates,
                exception_type: exception_type.clone(),
            }
        }
        AssertionShape::Guard { method, invocation } => {
            let predicates = invocation_args(model, *invocation)
                .into_iter()
                .flat_map(|arg| extract_predicates(model, arg, Polarity::Asserted))
                .collect();
            ContractForm::Guard {
                method: method.clone(),
                predicates,
            }
        }
        AssertionShape::Abbreviator { .. } => return None,
    };
    debug!(statement = statement.0, "parsed contract statement");
    Some(ContractStatement { statement, form })
}

fn parse_assertion(
    model: &dyn SemanticModel,
    kind: AssertionKind,
    invocation: NodeId,
    exception_type: Option<TypeRef>,
) -> Option<ContractExpression> {
    let args = invocation_args(model, invocation);
    let Some(&condition) = args.first() else {
        return (kind == AssertionKind::EndContractBlock).then_some(ContractExpression {
            kind,
            predicates: Vec::new(),
            message: extract_message(model, None),
            exception_type: None,
            result_type: None,
        });
    };

    let predicates = extract_predicates(model, condition, Polarity::Asserted);
    if kind.requires_predicates() && predicates.is_empty() {
        return None;
    }
    let result_type = if kind.is_postcondition() {
        declared_result_type(model, condition)
    } else {
        None
    };
    Some(ContractExpression {
        kind,
        predicates,
        message: extract_message(model, args.get(1).copied()),
        exception_type,
        result_type,
    })
}

fn invocation_args(model: &dyn SemanticModel, invocation: NodeId) -> Vec<NodeId> {
    match model.kind(invocation) {
        Some(SyntaxKind::Invocation { args, .. }) => args.to_vec(),
        _ => Vec::new(),
    }
}

/// `T` of the first `Contract.Result<T>()` anywhere in a condition.
fn declared_result_type(model: &dyn SemanticModel, condition: NodeId) -> Option<TypeRef> {
    std::iter::once(condition)
        .chain(model.tree().descendants(condition))
        .find(|node| is_result_call(model, *node))
        .and_then(|call| match model.kind(call) {
            Some(SyntaxKind::Invocation { type_args, .. }) if !type_args.is_empty() => {
                type_args.first().cloned()
            }
            _ => model.expression_type(call),
        })
}
