//! Contract block validation.
//!
//! A [`Rule`] is a pure function from one statement (plus read access to the
//! whole block) to a [`ValidationResult`]. A [`RuleSet`] evaluates every rule
//! against every statement, statement-major and in declaration order, and
//! keeps the non-empty results as [`Diagnostic`]s. Several rules may fire on
//! the same statement; each rule reports at most one result per statement.
//!
//! Validation is pure and deterministic: validating an unchanged program
//! twice yields the same diagnostics.

pub mod conversion;
pub mod diagnostics;
pub mod rules;
pub mod visibility;

pub use diagnostics::{
    CustomWarningKind, Diagnostic, ErrorKind, Severity, StatementRef, ValidationResult, WarningKind,
};

use dbc_core::{FunctionDecl, FunctionId, SemanticModel};
use tracing::debug;

use crate::block::{extract_block, ContractBlock, ProcessedStatement};
use crate::error::CheckError;
use crate::options::CheckOptions;
use crate::statement::ContractForm;

/// Everything a rule may look at.
pub struct RuleContext<'a> {
    pub model: &'a dyn SemanticModel,
    pub function: &'a FunctionDecl,
    pub block: &'a ContractBlock,
    pub options: &'a CheckOptions,
}

/// Signature of a rule check.
pub type RuleFn = fn(&RuleContext<'_>, &ProcessedStatement) -> ValidationResult;

/// A named rule.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub check: RuleFn,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// An ordered list of rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet::default()
    }

    /// The built-in rules, with the optional groups selected by `options`.
    pub fn standard(options: &CheckOptions) -> Self {
        let mut set = RuleSet::new()
            .with(rules::VOID_RETURN_METHOD_CALL)
            .with(rules::NON_VOID_RETURN_METHOD_CALL)
            .with(rules::ASSIGNMENT_IN_CONTRACT_BLOCK)
            .with(rules::ASSERT_OR_ASSUME_IN_CONTRACT_BLOCK)
            .with(rules::REQUIRES_AFTER_ENSURES)
            .with(rules::ENSURES_BEFORE_LEGACY_PRECONDITION)
            .with(rules::CONTRACT_AFTER_END_CONTRACT_BLOCK)
            .with(rules::DUPLICATED_END_CONTRACT_BLOCK)
            .with(rules::CONTRACT_IN_THE_MIDDLE_OF_METHOD)
            .with(rules::CONTRACT_IN_TRY_BLOCK)
            .with(rules::ENSURES_IN_VOID_RETURN_METHOD)
            .with(rules::ENSURES_RESULT_TYPE_MISMATCH)
            .with(rules::INVARIANT_OUTSIDE_INVARIANT_METHOD)
            .with(rules::LEGACY_PRECONDITION_WITHOUT_END_CONTRACT_BLOCK);
        if options.check_messages {
            set = set.with(rules::INVALID_CONTRACT_MESSAGE);
        }
        if options.check_visibility {
            set = set
                .with(visibility::INCONSISTENT_EXCEPTION_VISIBILITY)
                .with(visibility::INCONSISTENT_PREDICATE_VISIBILITY);
        }
        if options.advisory_warnings {
            set = set
                .with(rules::PRECONDITION_IN_ASYNC_METHOD)
                .with(rules::PRECONDITION_IN_ITERATOR_METHOD)
                .with(visibility::EXCEPTION_WITHOUT_MESSAGE_CONSTRUCTOR);
        }
        set
    }

    pub fn with(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Runs every rule against every statement of the block.
    ///
    /// # Panics
    ///
    /// Panics if the block holds a `Requires`, `Invariant`, `Assert` or
    /// `Assume` expression without predicates; the parser never builds one.
    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        for statement in &ctx.block.statements {
            if let Some(ContractForm::Assertion(expr)) = statement.contract.as_ref().map(|c| &c.form) {
                assert!(
                    !expr.kind.requires_predicates() || !expr.predicates.is_empty(),
                    "{} at statement {} has no predicates",
                    expr.kind,
                    statement.index
                );
            }
        }

        let mut diagnostics = Vec::new();
        for statement in &ctx.block.statements {
            for rule in &self.rules {
                let result = (rule.check)(ctx, statement);
                if result == ValidationResult::NoError {
                    continue;
                }
                debug!(
                    function = ctx.block.function.0,
                    statement = statement.index,
                    rule = rule.name,
                    code = result.code().unwrap_or_default(),
                    "contract diagnostic"
                );
                diagnostics.push(Diagnostic {
                    function: ctx.block.function,
                    statement: StatementRef {
                        index: statement.index,
                        node: statement.node,
                    },
                    rule: rule.name.to_string(),
                    result,
                });
            }
        }
        diagnostics
    }
}

/// Validates the contract block of one function.
pub fn validate_function(
    model: &dyn SemanticModel,
    function: FunctionId,
    options: &CheckOptions,
) -> Result<Vec<Diagnostic>, CheckError> {
    let decl = model
        .function(function)
        .ok_or(CheckError::FunctionNotFound { id: function })?;
    let block = extract_block(model, function)?;
    let ctx = RuleContext {
        model,
        function: decl,
        block: &block,
        options,
    };
    let diagnostics = RuleSet::standard(options).evaluate(&ctx);
    debug!(
        function = %decl.qualified_name(),
        diagnostics = diagnostics.len(),
        "validated contract block"
    );
    Ok(diagnostics)
}

/// Validates every function of a program, in declaration order.
pub fn validate_program(
    model: &dyn SemanticModel,
    options: &CheckOptions,
) -> Result<Vec<Diagnostic>, CheckError> {
    let mut diagnostics = Vec::new();
    for function in model.function_ids() {
        diagnostics.extend(validate_function(model, function, options)?);
    }
    Ok(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn optional_groups_are_selected_by_options() {
        let all = RuleSet::standard(&CheckOptions::default());
        let none = RuleSet::standard(&CheckOptions {
            check_visibility: false,
            advisory_warnings: false,
            check_messages: false,
        });
        assert_eq!(all.rules().len(), none.rules().len() + 6);
        assert!(none
            .rules()
            .iter()
            .all(|r| r.name != "inconsistent_exception_visibility"));
    }

    #[test]
    fn custom_rule_sets_run_only_their_rules() {
        let (program, fid) = program_of(method(vec![
            requires(not_null("name")),
            ensures(not_null("value")),
            requires(not_null("value")),
        ]));
        let block = extract_block(&program, fid).unwrap();
        let function = program_function(&program, fid);
        let options = CheckOptions::default();
        let ctx = RuleContext {
            model: &program,
            function,
            block: &block,
            options: &options,
        };
        let diagnostics = RuleSet::new().with(rules::REQUIRES_AFTER_ENSURES).evaluate(&ctx);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].statement.index, 2);
        assert_eq!(diagnostics[0].rule, "requires_after_ensures");

        let nothing = RuleSet::new().evaluate(&ctx);
        assert!(nothing.is_empty());
    }

    #[test]
    fn validate_program_covers_every_function() {
        let source = program_source(vec![
            method(vec![end_contract_block(), end_contract_block()]),
            method_named("Other", vec![requires(not_null("name"))]),
        ]);
        let program = source.into_program().unwrap();
        let diagnostics = validate_program(&program, &CheckOptions::default()).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].result,
            ValidationResult::error(ErrorKind::DuplicatedEndContractBlock)
        );
    }

    #[test]
    fn unknown_function_is_reported() {
        let (program, _) = program_of(method(vec![]));
        let err = validate_function(&program, FunctionId(42), &CheckOptions::default()).unwrap_err();
        assert!(matches!(err, CheckError::FunctionNotFound { .. }));
    }
}
