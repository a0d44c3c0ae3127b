//! Shared fixtures for unit tests: a small `Acme.Widget` type and builders
//! for the statements the tests keep writing.

use dbc_core::surface::{Expr, FunctionSource, ProgramSource, Stmt};
use dbc_core::{
    ContractAttribute, FunctionDecl, FunctionId, MemberInfo, MethodInfo, NodeId, Program,
    SemanticModel, SyntaxKind, TypeInfo, TypeRef, Visibility,
};

use crate::options::CheckOptions;
use crate::validate::{validate_function, Diagnostic};

pub const WIDGET: &str = "Acme.Widget";

fn t(name: &str) -> TypeRef {
    TypeRef::named(name)
}

/// `Acme.Widget` plus two argument exceptions.
pub fn widget_types() -> Vec<TypeInfo> {
    vec![
        TypeInfo::class(WIDGET)
            .with_member(MemberInfo::field("items", t("object")))
            .with_member(
                MemberInfo::field("itemCount", t("int"))
                    .with_attribute(ContractAttribute::PublicPropertyName("ItemCount".into())),
            )
            .with_member(
                MemberInfo::field("DefaultMessage", t("string"))
                    .static_member()
                    .with_visibility(Visibility::Internal),
            )
            .with_member(MemberInfo::field("secretMessage", t("string")).static_member())
            .with_member(
                MemberInfo::field("instanceMessage", t("string")).with_visibility(Visibility::Public),
            )
            .with_member(MemberInfo::property("Name", t("string")))
            .with_method(MethodInfo::new("Log", TypeRef::void()))
            .with_method(MethodInfo::new("Compute", t("int")))
            .with_method(
                MethodInfo::new("NotNull", TypeRef::void())
                    .static_method()
                    .with_params(vec![t("object"), t("string")])
                    .with_attribute(ContractAttribute::ArgumentValidator),
            )
            .with_method(
                MethodInfo::new("RequireName", TypeRef::void())
                    .with_attribute(ContractAttribute::Abbreviator),
            )
            .with_method(MethodInfo::new("Describe", t("string")).static_method()),
        TypeInfo::class("Acme.Widget.HiddenException")
            .nested_in(WIDGET)
            .with_visibility(Visibility::Private)
            .with_base(t("System.ArgumentException"))
            .with_constructor(vec![t("string")]),
        TypeInfo::class("Acme.QuietException")
            .with_base(t("System.ArgumentException"))
            .with_constructor(vec![]),
    ]
}

/// `public void Run(string name, object value, int count)` on the widget.
pub fn method(body: Vec<Stmt>) -> FunctionSource {
    method_named("Run", body)
}

pub fn method_named(name: &str, body: Vec<Stmt>) -> FunctionSource {
    FunctionSource::new(WIDGET, name, body)
        .with_param("name", t("string"))
        .with_param("value", t("object"))
        .with_param("count", t("int"))
}

pub fn program_source(functions: Vec<FunctionSource>) -> ProgramSource {
    let mut source = ProgramSource::new();
    source.types = widget_types();
    source.functions = functions;
    source
}

pub fn program_of(function: FunctionSource) -> (Program, FunctionId) {
    let program = program_source(vec![function]).into_program().unwrap();
    let fid = program.function_ids()[0];
    (program, fid)
}

pub fn program_function(program: &Program, fid: FunctionId) -> &FunctionDecl {
    program.function(fid).unwrap()
}

/// The `index`-th statement of the function body.
pub fn top_statement(program: &Program, fid: FunctionId, index: usize) -> NodeId {
    let body = program_function(program, fid).body;
    match program.kind(body) {
        Some(SyntaxKind::Block { statements }) => statements[index],
        other => panic!("function body is not a block: {:?}", other),
    }
}

/// Lowers `expr` as the only statement of `Run` and returns the expression node.
pub fn expression_in_method(expr: Expr) -> (Program, NodeId) {
    let (program, fid) = program_of(method(vec![Stmt::expr(expr)]));
    let stmt = top_statement(&program, fid, 0);
    let node = match program.kind(stmt) {
        Some(SyntaxKind::ExpressionStatement { expr }) => *expr,
        other => panic!("expected an expression statement, got {:?}", other),
    };
    (program, node)
}

pub fn diagnostics_for(function: FunctionSource) -> Vec<Diagnostic> {
    let (program, fid) = program_of(function);
    validate_function(&program, fid, &CheckOptions::default()).unwrap()
}

/// `(statement index, code)` of every diagnostic, in order.
pub fn codes_for(function: FunctionSource) -> Vec<(usize, &'static str)> {
    diagnostics_for(function)
        .iter()
        .map(|d| (d.statement.index, d.result.code().unwrap()))
        .collect()
}

// ---------------------------------------------------------------------------
// Statement builders
// ---------------------------------------------------------------------------

pub fn requires(condition: Expr) -> Stmt {
    Stmt::call("Contract.Requires", vec![condition])
}

pub fn requires_msg(condition: Expr, message: Expr) -> Stmt {
    Stmt::call("Contract.Requires", vec![condition, message])
}

pub fn ensures(condition: Expr) -> Stmt {
    Stmt::call("Contract.Ensures", vec![condition])
}

pub fn end_contract_block() -> Stmt {
    Stmt::call("Contract.EndContractBlock", vec![])
}

/// `name != null`
pub fn not_null(name: &str) -> Expr {
    Expr::ne(Expr::ident(name), Expr::null())
}

/// `if (name == null) throw new ArgumentNullException("name");`
pub fn if_null_throw(name: &str) -> Stmt {
    Stmt::if_then(
        Expr::eq(Expr::ident(name), Expr::null()),
        Stmt::throw(Expr::new_object(
            t("ArgumentNullException"),
            vec![Expr::string(name)],
        )),
    )
}

/// `Contract.Result<T>()`
pub fn result_of(ty: TypeRef) -> Expr {
    Expr::generic_call(Expr::path("Contract.Result"), vec![ty], vec![])
}
