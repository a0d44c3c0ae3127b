//! Built-in structural rules.
//!
//! Each rule looks at one [`ProcessedStatement`] and may consult the rest of
//! the block for ordering and membership. Rules never mutate anything.

use dbc_core::{SyntaxKind, TypeRef};

use super::conversion::is_compatible_result_type;
use super::diagnostics::{CustomWarningKind, ErrorKind, ValidationResult, WarningKind};
use super::{Rule, RuleContext};
use crate::assertion::AssertionKind;
use crate::block::{Nesting, ProcessedStatement};
use crate::message::is_valid_contract_message;

// ---------------------------------------------------------------------------
// Contract section content
// ---------------------------------------------------------------------------

pub const VOID_RETURN_METHOD_CALL: Rule = Rule {
    name: "void_return_method_call",
    check: void_return_method_call,
};

pub const NON_VOID_RETURN_METHOD_CALL: Rule = Rule {
    name: "non_void_return_method_call",
    check: non_void_return_method_call,
};

pub const ASSIGNMENT_IN_CONTRACT_BLOCK: Rule = Rule {
    name: "assignment_in_contract_block",
    check: assignment_in_contract_block,
};

pub const ASSERT_OR_ASSUME_IN_CONTRACT_BLOCK: Rule = Rule {
    name: "assert_or_assume_in_contract_block",
    check: assert_or_assume_in_contract_block,
};

/// Return type of a plain (non-contract) call statement at the top of the
/// contract section, if the callee resolves.
fn plain_call_return_type(ctx: &RuleContext<'_>, stmt: &ProcessedStatement) -> Option<(String, TypeRef)> {
    if !stmt.is_top_level() || stmt.shape.is_some() || !ctx.block.in_contract_section(stmt.index) {
        return None;
    }
    let SyntaxKind::ExpressionStatement { expr } = ctx.model.kind(stmt.node)? else {
        return None;
    };
    let call = ctx.model.tree().strip_parens(*expr);
    if !matches!(ctx.model.kind(call), Some(SyntaxKind::Invocation { .. })) {
        return None;
    }
    let method = ctx.model.resolve_invocation(call)?;
    Some((method.name.clone(), method.return_type.clone()))
}

fn void_return_method_call(ctx: &RuleContext<'_>, stmt: &ProcessedStatement) -> ValidationResult {
    match plain_call_return_type(ctx, stmt) {
        Some((name, ty)) if ty.is_void() => ValidationResult::error_with(
            ErrorKind::VoidReturnMethodCall,
            format!(
                "Detected call to method '{}' that returns void in the contract section",
                name
            ),
        ),
        _ => ValidationResult::NoError,
    }
}

fn non_void_return_method_call(ctx: &RuleContext<'_>, stmt: &ProcessedStatement) -> ValidationResult {
    match plain_call_return_type(ctx, stmt) {
        Some((_, ty)) if !ty.is_void() => ValidationResult::Warning {
            kind: WarningKind::NonVoidReturnMethodCall,
        },
        _ => ValidationResult::NoError,
    }
}

fn assignment_in_contract_block(ctx: &RuleContext<'_>, stmt: &ProcessedStatement) -> ValidationResult {
    if !stmt.is_top_level() || !ctx.block.in_contract_section(stmt.index) {
        return ValidationResult::NoError;
    }
    let is_assignment = match ctx.model.kind(stmt.node) {
        Some(SyntaxKind::ExpressionStatement { expr }) => matches!(
            ctx.model.kind(ctx.model.tree().strip_parens(*expr)),
            Some(SyntaxKind::Assignment { .. })
        ),
        Some(SyntaxKind::LocalDeclaration { init, .. }) => init.is_some(),
        _ => false,
    };
    if is_assignment {
        ValidationResult::error(ErrorKind::AssignmentInContractBlock)
    } else {
        ValidationResult::NoError
    }
}

fn assert_or_assume_in_contract_block(
    ctx: &RuleContext<'_>,
    stmt: &ProcessedStatement,
) -> ValidationResult {
    let is_assert = stmt.is(AssertionKind::Assert) || stmt.is(AssertionKind::Assume);
    if is_assert && ctx.block.in_contract_section(stmt.index) {
        ValidationResult::error(ErrorKind::AssertOrAssumeInContractBlock)
    } else {
        ValidationResult::NoError
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

pub const REQUIRES_AFTER_ENSURES: Rule = Rule {
    name: "requires_after_ensures",
    check: requires_after_ensures,
};

pub const ENSURES_BEFORE_LEGACY_PRECONDITION: Rule = Rule {
    name: "ensures_before_legacy_precondition",
    check: ensures_before_legacy_precondition,
};

pub const CONTRACT_AFTER_END_CONTRACT_BLOCK: Rule = Rule {
    name: "contract_after_end_contract_block",
    check: contract_after_end_contract_block,
};

pub const DUPLICATED_END_CONTRACT_BLOCK: Rule = Rule {
    name: "duplicated_end_contract_block",
    check: duplicated_end_contract_block,
};

fn requires_after_ensures(ctx: &RuleContext<'_>, stmt: &ProcessedStatement) -> ValidationResult {
    if !stmt.is(AssertionKind::Requires) {
        return ValidationResult::NoError;
    }
    let after_ensures = ctx.block.statements[..stmt.index]
        .iter()
        .any(ProcessedStatement::is_postcondition);
    if after_ensures {
        ValidationResult::error(ErrorKind::RequiresAfterEnsures)
    } else {
        ValidationResult::NoError
    }
}

/// Reported on the postcondition, scanning forward from it.
fn ensures_before_legacy_precondition(
    ctx: &RuleContext<'_>,
    stmt: &ProcessedStatement,
) -> ValidationResult {
    if !stmt.is_postcondition() {
        return ValidationResult::NoError;
    }
    let later = ctx.block.statements[stmt.index + 1..].iter().find(|s| {
        s.is_top_level() && s.is_legacy_precondition() && ctx.block.in_contract_section(s.index)
    });
    match later {
        Some(precondition) => ValidationResult::error_with(
            ErrorKind::EnsuresBeforeLegacyPrecondition,
            format!(
                "Postcondition precedes the legacy precondition '{}'",
                ctx.model.tree().render(precondition.node)
            ),
        ),
        None => ValidationResult::NoError,
    }
}

fn contract_after_end_contract_block(
    ctx: &RuleContext<'_>,
    stmt: &ProcessedStatement,
) -> ValidationResult {
    let is_contract = stmt.is(AssertionKind::Requires) || stmt.is_postcondition();
    match ctx.block.first_end_contract_block() {
        Some(end) if is_contract && stmt.index > end => {
            ValidationResult::error(ErrorKind::ContractAfterEndContractBlock)
        }
        _ => ValidationResult::NoError,
    }
}

fn duplicated_end_contract_block(
    ctx: &RuleContext<'_>,
    stmt: &ProcessedStatement,
) -> ValidationResult {
    if !stmt.is(AssertionKind::EndContractBlock) {
        return ValidationResult::NoError;
    }
    match ctx.block.first_end_contract_block() {
        Some(first) if first < stmt.index => {
            ValidationResult::error(ErrorKind::DuplicatedEndContractBlock)
        }
        _ => ValidationResult::NoError,
    }
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

pub const CONTRACT_IN_THE_MIDDLE_OF_METHOD: Rule = Rule {
    name: "contract_in_the_middle_of_method",
    check: contract_in_the_middle_of_method,
};

pub const CONTRACT_IN_TRY_BLOCK: Rule = Rule {
    name: "contract_in_try_block",
    check: contract_in_try_block,
};

fn contract_in_the_middle_of_method(
    _ctx: &RuleContext<'_>,
    stmt: &ProcessedStatement,
) -> ValidationResult {
    let is_block_statement = stmt.is(AssertionKind::Requires)
        || stmt.is_postcondition()
        || stmt.is(AssertionKind::EndContractBlock);
    // try bodies have their own rule
    let misplaced = !matches!(stmt.nesting, Nesting::TopLevel | Nesting::Try);
    if is_block_statement && misplaced {
        ValidationResult::error(ErrorKind::ContractStatementInTheMiddleOfMethod)
    } else {
        ValidationResult::NoError
    }
}

fn contract_in_try_block(_ctx: &RuleContext<'_>, stmt: &ProcessedStatement) -> ValidationResult {
    let is_contract = stmt.is(AssertionKind::Requires)
        || stmt.is_postcondition()
        || stmt.is(AssertionKind::Invariant);
    if is_contract && stmt.nesting == Nesting::Try {
        ValidationResult::error(ErrorKind::ContractInTryBlock)
    } else {
        ValidationResult::NoError
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

pub const ENSURES_IN_VOID_RETURN_METHOD: Rule = Rule {
    name: "ensures_in_void_return_method",
    check: ensures_in_void_return_method,
};

pub const ENSURES_RESULT_TYPE_MISMATCH: Rule = Rule {
    name: "ensures_result_type_mismatch",
    check: ensures_result_type_mismatch,
};

fn declared_result_type(stmt: &ProcessedStatement) -> Option<&TypeRef> {
    stmt.contract
        .as_ref()
        .filter(|c| c.is_postcondition())
        .and_then(|c| c.result_type())
}

fn ensures_in_void_return_method(
    ctx: &RuleContext<'_>,
    stmt: &ProcessedStatement,
) -> ValidationResult {
    match declared_result_type(stmt) {
        Some(_) if ctx.function.returns_void() => {
            ValidationResult::error(ErrorKind::EnsuresInVoidReturnMethod)
        }
        _ => ValidationResult::NoError,
    }
}

fn ensures_result_type_mismatch(
    ctx: &RuleContext<'_>,
    stmt: &ProcessedStatement,
) -> ValidationResult {
    if ctx.function.returns_void() {
        return ValidationResult::NoError;
    }
    let Some(result_type) = declared_result_type(stmt) else {
        return ValidationResult::NoError;
    };
    let returned = &ctx.function.return_type;
    if is_compatible_result_type(ctx.model.symbols(), result_type, returned) {
        ValidationResult::NoError
    } else {
        ValidationResult::error_with(
            ErrorKind::EnsuresResultTypeMismatch,
            format!(
                "Contract.Result<{}>() is not compatible with the method return type '{}'",
                result_type, returned
            ),
        )
    }
}

// ---------------------------------------------------------------------------
// Messages, invariants and method flavours
// ---------------------------------------------------------------------------

pub const INVALID_CONTRACT_MESSAGE: Rule = Rule {
    name: "invalid_contract_message",
    check: invalid_contract_message,
};

pub const INVARIANT_OUTSIDE_INVARIANT_METHOD: Rule = Rule {
    name: "invariant_outside_invariant_method",
    check: invariant_outside_invariant_method,
};

pub const PRECONDITION_IN_ASYNC_METHOD: Rule = Rule {
    name: "precondition_in_async_method",
    check: precondition_in_async_method,
};

pub const PRECONDITION_IN_ITERATOR_METHOD: Rule = Rule {
    name: "precondition_in_iterator_method",
    check: precondition_in_iterator_method,
};

pub const LEGACY_PRECONDITION_WITHOUT_END_CONTRACT_BLOCK: Rule = Rule {
    name: "legacy_precondition_without_end_contract_block",
    check: legacy_precondition_without_end_contract_block,
};

fn invalid_contract_message(ctx: &RuleContext<'_>, stmt: &ProcessedStatement) -> ValidationResult {
    let Some(contract) = &stmt.contract else {
        return ValidationResult::NoError;
    };
    let message = contract.message();
    if is_valid_contract_message(ctx.model, message) {
        ValidationResult::NoError
    } else {
        ValidationResult::error_with(
            ErrorKind::InvalidContractMessage,
            format!(
                "Contract message ({}) must be a literal or a static member at least as visible as internal",
                message.describe()
            ),
        )
    }
}

fn invariant_outside_invariant_method(
    ctx: &RuleContext<'_>,
    stmt: &ProcessedStatement,
) -> ValidationResult {
    if stmt.is(AssertionKind::Invariant) && !ctx.function.is_invariant_method() {
        ValidationResult::error(ErrorKind::InvariantOutsideInvariantMethod)
    } else {
        ValidationResult::NoError
    }
}

fn is_precondition_shape(stmt: &ProcessedStatement) -> bool {
    stmt.shape.as_ref().is_some_and(|s| s.is_precondition())
}

fn precondition_in_async_method(
    ctx: &RuleContext<'_>,
    stmt: &ProcessedStatement,
) -> ValidationResult {
    if ctx.function.is_async && is_precondition_shape(stmt) {
        ValidationResult::CustomWarning {
            kind: CustomWarningKind::PreconditionInAsyncMethod,
        }
    } else {
        ValidationResult::NoError
    }
}

fn precondition_in_iterator_method(
    ctx: &RuleContext<'_>,
    stmt: &ProcessedStatement,
) -> ValidationResult {
    if ctx.function.is_iterator && is_precondition_shape(stmt) {
        ValidationResult::CustomWarning {
            kind: CustomWarningKind::PreconditionInIteratorMethod,
        }
    } else {
        ValidationResult::NoError
    }
}

/// An if-throw guard followed by contract calls, with nothing marking where
/// the legacy block ends.
fn legacy_precondition_without_end_contract_block(
    ctx: &RuleContext<'_>,
    stmt: &ProcessedStatement,
) -> ValidationResult {
    let is_if_throw = stmt.is_top_level()
        && matches!(stmt.shape, Some(crate::assertion::AssertionShape::IfThrow { .. }));
    if !is_if_throw || ctx.block.first_end_contract_block().is_some() {
        return ValidationResult::NoError;
    }
    let contract_follows = ctx.block.statements[stmt.index + 1..]
        .iter()
        .any(|s| s.is(AssertionKind::Requires) || s.is_postcondition());
    if contract_follows {
        ValidationResult::Warning {
            kind: WarningKind::LegacyPreconditionWithoutEndContractBlock,
        }
    } else {
        ValidationResult::NoError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use dbc_core::surface::{Expr, Stmt};
    use dbc_core::FunctionKind;

    /// (statement index, error/warning code) pairs for a method body.
    fn codes(body: Vec<Stmt>) -> Vec<(usize, &'static str)> {
        codes_for(method(body))
    }

    #[test]
    fn void_call_in_contract_section_is_an_error() {
        assert_eq!(
            codes(vec![
                requires(not_null("name")),
                Stmt::call("Log", vec![]),
                end_contract_block(),
            ]),
            vec![(1, "void-return-method-call")]
        );
    }

    #[test]
    fn non_void_call_in_contract_section_is_a_warning() {
        assert_eq!(
            codes(vec![Stmt::call("Compute", vec![]), requires(not_null("name"))]),
            vec![(0, "non-void-return-method-call")]
        );
    }

    #[test]
    fn calls_after_the_section_are_ordinary_code() {
        assert!(codes(vec![
            requires(not_null("name")),
            Stmt::call("Log", vec![]),
            Stmt::call("Compute", vec![]),
        ])
        .is_empty());
    }

    #[test]
    fn unresolved_calls_are_skipped() {
        assert!(codes(vec![
            Stmt::call("Helpers.Trace", vec![]),
            requires(not_null("name")),
        ])
        .is_empty());
    }

    #[test]
    fn assignments_in_contract_section() {
        assert_eq!(
            codes(vec![
                Stmt::expr(Expr::assign(Expr::ident("count"), Expr::int(0))),
                Stmt::local("copy", None, Some(Expr::ident("name"))),
                Stmt::local("unset", Some(TypeRef::named("int")), None),
                requires(not_null("name")),
            ]),
            vec![
                (0, "assignment-in-contract-block"),
                (1, "assignment-in-contract-block"),
            ]
        );
    }

    #[test]
    fn assert_in_contract_section() {
        assert_eq!(
            codes(vec![
                Stmt::call("Contract.Assert", vec![not_null("name")]),
                requires(not_null("value")),
                Stmt::call("Contract.Assume", vec![not_null("value")]),
            ]),
            vec![(0, "assert-or-assume-in-contract-block")]
        );
    }

    #[test]
    fn requires_after_ensures_fires_once_at_the_requires() {
        assert_eq!(
            codes(vec![
                requires(not_null("name")),
                ensures(not_null("value")),
                requires(not_null("value")),
            ]),
            vec![(2, "requires-after-ensures")]
        );
    }

    #[test]
    fn ensures_before_if_throw() {
        assert_eq!(
            codes(vec![
                ensures(not_null("value")),
                if_null_throw("name"),
                end_contract_block(),
            ]),
            vec![(0, "ensures-before-legacy-precondition")]
        );
    }

    #[test]
    fn ensures_before_guard() {
        assert_eq!(
            codes(vec![
                ensures(not_null("value")),
                Stmt::call("NotNull", vec![Expr::ident("name"), Expr::string("name")]),
            ]),
            vec![(0, "ensures-before-legacy-precondition")]
        );
    }

    #[test]
    fn requires_after_end_contract_block() {
        assert_eq!(
            codes(vec![
                requires(not_null("name")),
                end_contract_block(),
                requires(not_null("value")),
            ]),
            vec![(2, "contract-after-end-contract-block")]
        );
    }

    #[test]
    fn duplicated_end_contract_block() {
        assert_eq!(
            codes(vec![
                if_null_throw("name"),
                end_contract_block(),
                end_contract_block(),
            ]),
            vec![(3, "duplicated-end-contract-block")]
        );
    }

    #[test]
    fn nested_contract_statements() {
        assert_eq!(
            codes(vec![Stmt::if_then(
                Expr::ident("flag"),
                Stmt::block(vec![requires(not_null("name"))]),
            )]),
            vec![(1, "contract-in-the-middle-of-method")]
        );
        assert_eq!(
            codes(vec![Stmt::using(None, vec![end_contract_block()])]),
            vec![(1, "contract-in-the-middle-of-method")]
        );
    }

    #[test]
    fn contract_in_try_block() {
        assert_eq!(
            codes(vec![Stmt::try_finally(
                vec![requires(not_null("name"))],
                vec![Stmt::other("Cleanup();")],
            )]),
            vec![(1, "contract-in-try-block")]
        );
    }

    #[test]
    fn ensures_result_type_against_return_type() {
        let ensures_string = || ensures(Expr::ne(result_of(TypeRef::named("string")), Expr::null()));
        let ensures_object = || ensures(Expr::ne(result_of(TypeRef::named("object")), Expr::null()));

        assert_eq!(
            codes(vec![ensures_string()]),
            vec![(0, "ensures-in-void-return-method")]
        );
        assert!(codes_for(method(vec![ensures_string()]).returning(TypeRef::named("object"))).is_empty());
        assert_eq!(
            codes_for(method(vec![ensures_object()]).returning(TypeRef::named("string"))),
            vec![(0, "ensures-result-type-mismatch")]
        );
    }

    #[test]
    fn ensures_result_type_unwraps_tasks() {
        let task_of_string = TypeRef::generic("Task", vec![TypeRef::named("string")]);
        let body = vec![ensures(Expr::ne(result_of(TypeRef::named("string")), Expr::null()))];
        assert!(codes_for(method(body).returning(task_of_string).asynchronous()).is_empty());
    }

    #[test]
    fn mismatch_message_names_both_types() {
        let diagnostics = diagnostics_for(
            method(vec![ensures(Expr::ne(result_of(TypeRef::named("object")), Expr::null()))])
                .returning(TypeRef::named("string")),
        );
        insta::assert_snapshot!(
            diagnostics[0].result.message(),
            @"Contract.Result<object>() is not compatible with the method return type 'string'"
        );
    }

    #[test]
    fn invalid_messages() {
        assert_eq!(
            codes(vec![
                requires_msg(not_null("name"), Expr::invoke("Describe", vec![])),
                requires_msg(not_null("value"), Expr::ident("DefaultMessage")),
                requires_msg(not_null("value"), Expr::path("Widget.secretMessage")),
            ]),
            vec![
                (0, "invalid-contract-message"),
                (2, "invalid-contract-message"),
            ]
        );
    }

    #[test]
    fn invariant_only_in_invariant_methods() {
        let invariant = || Stmt::call("Contract.Invariant", vec![not_null("items")]);
        assert_eq!(
            codes(vec![invariant()]),
            vec![(0, "invariant-outside-invariant-method")]
        );
        assert!(codes_for(
            method(vec![invariant()])
                .kind(FunctionKind::InvariantMethod)
                .visibility(dbc_core::Visibility::Private)
        )
        .is_empty());
    }

    #[test]
    fn preconditions_in_async_and_iterator_methods() {
        let body = || vec![requires(not_null("name")), if_null_throw("value"), end_contract_block()];
        assert_eq!(
            codes_for(method(body()).asynchronous()),
            vec![
                (0, "precondition-in-async-method"),
                (1, "precondition-in-async-method"),
            ]
        );
        assert_eq!(
            codes_for(method(body()).iterator()),
            vec![
                (0, "precondition-in-iterator-method"),
                (1, "precondition-in-iterator-method"),
            ]
        );
    }

    #[test]
    fn if_throw_mixed_with_requires_needs_end_contract_block() {
        assert_eq!(
            codes(vec![if_null_throw("value"), requires(not_null("name"))]),
            vec![(0, "legacy-precondition-without-end-contract-block")]
        );
        assert!(codes(vec![
            if_null_throw("value"),
            requires(not_null("name")),
            end_contract_block(),
        ])
        .is_empty());
    }

    #[test]
    fn well_formed_blocks_are_clean() {
        assert!(codes(vec![
            requires(not_null("name")),
            Stmt::expr(Expr::generic_call(
                Expr::path("Contract.Requires"),
                vec![TypeRef::named("ArgumentNullException")],
                vec![not_null("value"), Expr::string("value")],
            )),
            ensures(not_null("value")),
            Stmt::other("DoWork();"),
        ])
        .is_empty());
        assert!(codes(vec![
            if_null_throw("name"),
            Stmt::call("NotNull", vec![Expr::ident("value"), Expr::string("value")]),
            end_contract_block(),
            Stmt::call("Log", vec![]),
        ])
        .is_empty());
    }
}
