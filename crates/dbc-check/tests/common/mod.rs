//! Fixtures shared by the dbc-check integration tests.
//!
//! Programs are built the way the CLI builds them: a [`ProgramSource`]
//! lowered into a [`Program`].

#![allow(dead_code)]

use dbc_core::surface::{Expr, FunctionSource, ProgramSource, Stmt};
use dbc_core::{FunctionId, MemberInfo, Program, SemanticModel, TypeInfo, TypeRef, Visibility};

pub const INVOICE: &str = "Acme.Billing.Invoice";

pub fn ty(name: &str) -> TypeRef {
    TypeRef::named(name)
}

/// `Acme.Billing.Invoice` with a private nested exception and a private field.
pub fn billing_types() -> Vec<TypeInfo> {
    vec![
        TypeInfo::class(INVOICE)
            .with_member(MemberInfo::field("lines", ty("object")))
            .with_member(MemberInfo::property("Customer", ty("string"))),
        TypeInfo::class("Acme.Billing.Invoice.InvoiceException")
            .nested_in(INVOICE)
            .with_visibility(Visibility::Private)
            .with_base(ty("System.ArgumentException"))
            .with_constructor(vec![ty("string")]),
        TypeInfo::class("Acme.Billing.BillingException")
            .with_base(ty("System.ArgumentException"))
            .with_constructor(vec![ty("string")]),
    ]
}

/// `public <returns> Submit(string customer, object amount)` on the invoice.
pub fn submit(returns: TypeRef, body: Vec<Stmt>) -> FunctionSource {
    FunctionSource::new(INVOICE, "Submit", body)
        .returning(returns)
        .with_param("customer", ty("string"))
        .with_param("amount", ty("object"))
}

pub fn build(function: FunctionSource) -> (Program, FunctionId) {
    let mut source = ProgramSource::new();
    source.types = billing_types();
    source.functions.push(function);
    let program = source.into_program().expect("fixture program is well formed");
    let fid = program.function_ids()[0];
    (program, fid)
}

pub fn contract(method: &str, args: Vec<Expr>) -> Stmt {
    Stmt::call(&format!("Contract.{}", method), args)
}

pub fn generic_contract(method: &str, exception: &str, args: Vec<Expr>) -> Stmt {
    Stmt::expr(Expr::generic_call(
        Expr::path(&format!("Contract.{}", method)),
        vec![ty(exception)],
        args,
    ))
}

pub fn not_null(name: &str) -> Expr {
    Expr::ne(Expr::ident(name), Expr::null())
}

pub fn result_of(t: &str) -> Expr {
    Expr::generic_call(Expr::path("Contract.Result"), vec![ty(t)], vec![])
}
