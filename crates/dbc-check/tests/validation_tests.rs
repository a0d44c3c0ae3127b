//! End-to-end tests: program description in, contracts and diagnostics out.
//!
//! Tests cover:
//! - Predicate extraction for null and null-or-empty checks
//! - Ordering of preconditions, postconditions and EndContractBlock
//! - Result type checks on postconditions
//! - Exception visibility for `Requires<E>`
//! - JSON program descriptions
//! - Determinism of repeated validation

mod common;

use common::*;

use dbc_check::{
    contracts_of_function, validate_function, CheckOptions, Diagnostic, PredicateCheck, Severity,
};
use dbc_core::surface::{Expr, ProgramSource, Stmt};
use dbc_core::{FunctionId, Program, TypeRef, Visibility};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn validate(program: &Program, fid: FunctionId) -> Vec<Diagnostic> {
    validate_function(program, fid, &CheckOptions::default()).expect("function exists")
}

fn codes(diagnostics: &[Diagnostic]) -> Vec<(usize, &'static str)> {
    diagnostics
        .iter()
        .map(|d| (d.statement.index, d.result.code().unwrap_or("none")))
        .collect()
}

fn diagnose(body: Vec<Stmt>) -> Vec<(usize, &'static str)> {
    let (program, fid) = build(submit(TypeRef::void(), body));
    codes(&validate(&program, fid))
}

// ---------------------------------------------------------------------------
// Recognition
// ---------------------------------------------------------------------------

#[test]
fn requires_not_null_yields_one_equality_check() {
    let (program, fid) = build(submit(
        TypeRef::void(),
        vec![contract("Requires", vec![not_null("customer")])],
    ));
    let contracts = contracts_of_function(&program, fid).unwrap();
    assert_eq!(contracts.len(), 1);

    let predicates = contracts[0].predicates();
    assert_eq!(predicates.len(), 1);
    match &predicates[0] {
        PredicateCheck::Equality {
            argument,
            equals_null,
            ..
        } => {
            assert!(argument.refers_to("customer"));
            assert!(!equals_null);
        }
        other => panic!("expected an equality check, got {:?}", other),
    }
    assert!(contracts[0].checks_for_not_null("customer"));
    assert!(!contracts[0].checks_for_null("customer"));
}

#[test]
fn negated_is_null_or_empty_checks_for_not_null() {
    let condition = Expr::not(Expr::invoke(
        "string.IsNullOrEmpty",
        vec![Expr::ident("customer")],
    ));
    let (program, fid) = build(submit(
        TypeRef::void(),
        vec![contract("Requires", vec![condition])],
    ));
    let contracts = contracts_of_function(&program, fid).unwrap();
    assert_eq!(contracts.len(), 1);
    assert!(contracts[0].checks_for_not_null("customer"));
    assert!(!contracts[0].checks_for_null("customer"));
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[test]
fn precondition_after_postcondition() {
    let diagnostics = diagnose(vec![
        contract("Requires", vec![not_null("customer")]),
        contract("Ensures", vec![not_null("amount")]),
        contract("Requires", vec![not_null("amount")]),
    ]);
    assert_eq!(diagnostics, vec![(2, "requires-after-ensures")]);
}

#[test]
fn requires_after_end_contract_block() {
    let diagnostics = diagnose(vec![
        contract("Requires", vec![not_null("customer")]),
        contract("EndContractBlock", vec![]),
        contract("Requires", vec![not_null("amount")]),
    ]);
    assert_eq!(diagnostics, vec![(2, "contract-after-end-contract-block")]);
}

#[test]
fn ensures_before_if_throw_is_reported_once() {
    let diagnostics = diagnose(vec![
        contract("Ensures", vec![not_null("amount")]),
        Stmt::if_then(
            Expr::eq(Expr::ident("customer"), Expr::null()),
            Stmt::throw(Expr::new_object(
                ty("ArgumentNullException"),
                vec![Expr::string("customer")],
            )),
        ),
        contract("EndContractBlock", vec![]),
    ]);
    assert_eq!(diagnostics, vec![(0, "ensures-before-legacy-precondition")]);
}

#[test]
fn well_formed_block_is_clean() {
    let diagnostics = diagnose(vec![
        generic_contract(
            "Requires",
            "ArgumentNullException",
            vec![not_null("customer"), Expr::string("customer")],
        ),
        contract("Requires", vec![not_null("amount")]),
        contract("Ensures", vec![not_null("lines")]),
        Stmt::other("Post(customer, amount);"),
    ]);
    assert!(diagnostics.is_empty(), "unexpected: {:?}", diagnostics);
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

fn ensures_result(result: &str) -> Stmt {
    contract("Ensures", vec![Expr::ne(result_of(result), Expr::null())])
}

#[test]
fn result_in_void_method() {
    let (program, fid) = build(submit(TypeRef::void(), vec![ensures_result("string")]));
    assert_eq!(
        codes(&validate(&program, fid)),
        vec![(0, "ensures-in-void-return-method")]
    );
}

#[test]
fn narrower_result_type_is_compatible() {
    let (program, fid) = build(submit(ty("object"), vec![ensures_result("string")]));
    assert!(validate(&program, fid).is_empty());
}

#[test]
fn wider_result_type_is_incompatible() {
    let (program, fid) = build(submit(ty("string"), vec![ensures_result("object")]));
    let diagnostics = validate(&program, fid);
    assert_eq!(codes(&diagnostics), vec![(0, "ensures-result-type-mismatch")]);
    assert_eq!(diagnostics[0].severity(), Severity::Error);
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

#[test]
fn private_exception_type_in_public_method() {
    let body = vec![generic_contract(
        "Requires",
        "InvoiceException",
        vec![not_null("customer")],
    )];
    let (program, fid) = build(submit(TypeRef::void(), body.clone()));
    assert_eq!(
        codes(&validate(&program, fid)),
        vec![(0, "inconsistent-exception-visibility")]
    );

    let (program, fid) = build(submit(TypeRef::void(), body).visibility(Visibility::Private));
    assert!(validate(&program, fid).is_empty());
}

#[test]
fn public_exception_type_is_fine() {
    let (program, fid) = build(submit(
        TypeRef::void(),
        vec![generic_contract(
            "Requires",
            "Acme.Billing.BillingException",
            vec![not_null("customer")],
        )],
    ));
    assert!(validate(&program, fid).is_empty());
}

#[test]
fn visibility_checks_can_be_disabled() {
    let (program, fid) = build(submit(
        TypeRef::void(),
        vec![contract("Requires", vec![not_null("lines")])],
    ));
    assert_eq!(
        codes(&validate(&program, fid)),
        vec![(0, "inconsistent-predicate-visibility")]
    );

    let options = CheckOptions {
        check_visibility: false,
        ..CheckOptions::default()
    };
    assert!(validate_function(&program, fid, &options).unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// JSON program descriptions
// ---------------------------------------------------------------------------

#[test]
fn program_from_json() {
    let json = r#"{
        "types": [
            { "full_name": "Acme.Store", "members": [
                { "name": "cache", "kind": "field", "ty": { "name": "object" }, "visibility": "private" }
            ] }
        ],
        "functions": [
            {
                "name": "Get",
                "declaring_type": "Acme.Store",
                "return_type": { "name": "string" },
                "params": [ { "name": "key", "ty": { "name": "string" } } ],
                "body": [
                    { "kind": "expr", "expr": { "kind": "call",
                        "callee": { "kind": "member", "target": { "kind": "ident", "name": "Contract" }, "member": "Ensures" },
                        "args": [ { "kind": "binary", "op": "not_equal",
                            "lhs": { "kind": "ident", "name": "key" }, "rhs": { "kind": "null" } } ] } },
                    { "kind": "expr", "expr": { "kind": "call",
                        "callee": { "kind": "member", "target": { "kind": "ident", "name": "Contract" }, "member": "Requires" },
                        "args": [ { "kind": "binary", "op": "not_equal",
                            "lhs": { "kind": "ident", "name": "key" }, "rhs": { "kind": "null" } } ] } },
                    { "kind": "return", "expr": { "kind": "str", "value": "hit" } }
                ]
            }
        ]
    }"#;
    let source: ProgramSource = serde_json::from_str(json).unwrap();
    let program = source.into_program().unwrap();
    let fid = dbc_check::function_by_name(&program, "Store.Get").unwrap();
    let diagnostics = validate(&program, fid);
    assert_eq!(codes(&diagnostics), vec![(1, "requires-after-ensures")]);

    insta::assert_json_snapshot!(diagnostics[0].result, @r#"
    {
      "result": "error",
      "kind": "requires_after_ensures",
      "message": "Precondition follows a postcondition"
    }
    "#);
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

fn any_statement() -> impl Strategy<Value = Stmt> {
    let name = prop_oneof![Just("customer"), Just("amount"), Just("lines"), Just("Customer")];
    prop_oneof![
        name.clone().prop_map(|n| contract("Requires", vec![not_null(n)])),
        name.clone().prop_map(|n| contract("Ensures", vec![not_null(n)])),
        name.clone().prop_map(|n| contract("Assert", vec![not_null(n)])),
        name.clone().prop_map(|n| Stmt::if_then(
            Expr::eq(Expr::ident(n), Expr::null()),
            Stmt::throw(Expr::new_object(ty("ArgumentNullException"), vec![]))
        )),
        name.clone()
            .prop_map(|n| Stmt::expr(Expr::assign(Expr::ident(n), Expr::null()))),
        Just(contract("EndContractBlock", vec![])),
        Just(contract("Requires", vec![])),
        Just(ensures_result("string")),
        Just(Stmt::other("Work();")),
        name.prop_map(|n| Stmt::while_loop(
            Expr::ident("running"),
            vec![contract("Requires", vec![not_null(n)])]
        )),
    ]
}

proptest! {
    #[test]
    fn revalidation_is_identical(body in prop::collection::vec(any_statement(), 0..8)) {
        let (program, fid) = build(submit(ty("object"), body));
        let first = validate(&program, fid);
        let second = validate(&program, fid);
        prop_assert_eq!(first, second);
    }
}
