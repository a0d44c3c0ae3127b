//! Program: syntax tree, symbols and function declarations in one place.
//!
//! [`Program`] is the in-crate [`SemanticModel`]. Name resolution is
//! deliberately shallow and driven by the symbol table:
//!
//! 1. An explicit binding recorded with [`Program::bind_invocation`] /
//!    [`Program::bind_member`] always wins.
//! 2. `T.M(...)` where the dotted path `T` names a type (and its first segment
//!    is not a variable in scope) resolves to `M` on `T`.
//! 3. `x.M(...)` resolves to `M` on the static type of `x`.
//! 4. An unqualified `M(...)` resolves on the enclosing function's declaring
//!    type and its base types.
//!
//! Expression types come from parameters, local declarations, members,
//! invocation return types (with generic substitution, so
//! `Contract.Result<string>()` is `string`), literals and operators.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::CoreError;
use crate::function::{FunctionDecl, FunctionSignature};
use crate::id::{FunctionId, NodeId};
use crate::model::SemanticModel;
use crate::symbols::{MemberInfo, MethodInfo, SymbolTable};
use crate::syntax::{Literal, SyntaxKind, UnaryOp};
use crate::tree::SyntaxTree;
use crate::types::{TypeRef, STRING};

/// Recursion limit for `var` type inference chains.
const MAX_INFERENCE_DEPTH: u32 = 32;

/// An explicit resolution recorded for a node.
#[derive(Debug, Clone, PartialEq)]
enum Binding {
    Method { type_name: String, method: String },
    Member { type_name: String, member: String },
}

/// A complete host program.
#[derive(Debug, Clone, Default)]
pub struct Program {
    tree: SyntaxTree,
    symbols: SymbolTable,
    functions: IndexMap<FunctionId, FunctionDecl>,
    /// Body root node -> owning function.
    body_owners: HashMap<NodeId, FunctionId>,
    bindings: HashMap<NodeId, Binding>,
    expression_types: HashMap<NodeId, TypeRef>,
    next_function_id: u32,
}

impl Program {
    pub fn new(symbols: SymbolTable) -> Self {
        Program {
            symbols,
            ..Program::default()
        }
    }

    pub fn tree_mut(&mut self) -> &mut SyntaxTree {
        &mut self.tree
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// Adds a syntax node; shorthand for `tree_mut().add(kind)`.
    pub fn add_node(&mut self, kind: SyntaxKind) -> Result<NodeId, CoreError> {
        self.tree.add(kind)
    }

    /// Declares a function whose body is the given `Block` node.
    ///
    /// The body must be a root block not owned by another function, and the
    /// declaring type must be registered in the symbol table.
    pub fn add_function(
        &mut self,
        signature: FunctionSignature,
        body: NodeId,
    ) -> Result<FunctionId, CoreError> {
        match self.tree.kind(body) {
            None => return Err(CoreError::NodeNotFound { id: body }),
            Some(SyntaxKind::Block { .. }) => {}
            Some(other) => {
                return Err(CoreError::InvalidBody {
                    reason: format!("body of '{}' is a {}, not a block", signature.name, other.label()),
                })
            }
        }
        if self.tree.parent(body).is_some() || self.body_owners.contains_key(&body) {
            return Err(CoreError::NodeAlreadyAttached { id: body });
        }
        if self.symbols.get(&signature.declaring_type).is_none() {
            return Err(CoreError::InvalidProgram {
                reason: format!(
                    "function '{}' is declared on unknown type '{}'",
                    signature.name, signature.declaring_type
                ),
            });
        }

        let id = FunctionId(self.next_function_id);
        self.next_function_id += 1;
        self.body_owners.insert(body, id);
        self.functions
            .insert(id, FunctionDecl::from_signature(id, signature, body));
        Ok(id)
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.functions.values()
    }

    /// Records that the invocation `node` calls `type_name.method`.
    pub fn bind_invocation(
        &mut self,
        node: NodeId,
        type_name: impl Into<String>,
        method: impl Into<String>,
    ) {
        self.bindings.insert(
            node,
            Binding::Method {
                type_name: type_name.into(),
                method: method.into(),
            },
        );
    }

    /// Records that `node` refers to the field or property `type_name.member`.
    pub fn bind_member(
        &mut self,
        node: NodeId,
        type_name: impl Into<String>,
        member: impl Into<String>,
    ) {
        self.bindings.insert(
            node,
            Binding::Member {
                type_name: type_name.into(),
                member: member.into(),
            },
        );
    }

    /// Overrides the inferred static type of an expression.
    pub fn set_expression_type(&mut self, node: NodeId, ty: TypeRef) {
        self.expression_types.insert(node, ty);
    }

    // -----------------------------------------------------------------------
    // Resolution helpers
    // -----------------------------------------------------------------------

    fn enclosing_decl(&self, node: NodeId) -> Option<&FunctionDecl> {
        self.enclosing_function(node)
            .and_then(|id| self.functions.get(&id))
    }

    /// The declared type of a local variable in `function`'s body.
    fn local_type(&self, function: &FunctionDecl, name: &str, depth: u32) -> Option<TypeRef> {
        self.tree
            .descendants(function.body)
            .into_iter()
            .find_map(|node| match self.tree.kind(node) {
                Some(SyntaxKind::LocalDeclaration { name: n, ty, init }) if n == name => {
                    Some((ty.clone(), *init))
                }
                _ => None,
            })
            .and_then(|(ty, init)| match ty {
                Some(ty) => Some(ty),
                None => init.and_then(|init| self.type_of(init, depth + 1)),
            })
    }

    fn is_local(&self, function: &FunctionDecl, name: &str) -> bool {
        self.tree.descendants(function.body).into_iter().any(|node| {
            matches!(
                self.tree.kind(node),
                Some(SyntaxKind::LocalDeclaration { name: n, .. }) if n == name
            )
        })
    }

    /// Returns `true` if `name` is a variable (or instance/static member)
    /// visible inside `function`, which shadows any type of the same name.
    fn is_variable(&self, function: &FunctionDecl, name: &str) -> bool {
        name == "this"
            || function.parameter(name).is_some()
            || self.is_local(function, name)
            || self
                .symbols
                .find_member(&function.declaring_type, name)
                .is_some()
    }

    /// The full name of the type a dotted path names, e.g. `string` or
    /// `System.String` in `string.IsNullOrEmpty(x)`.
    fn type_named_by(&self, node: NodeId) -> Option<&str> {
        let segments = self.tree.dotted_segments(node)?;
        if let Some(function) = self.enclosing_decl(node) {
            if self.is_variable(function, &segments[0]) {
                return None;
            }
        }
        self.symbols
            .get(&segments.join("."))
            .map(|info| info.full_name.as_str())
    }

    fn type_of(&self, node: NodeId, depth: u32) -> Option<TypeRef> {
        if depth > MAX_INFERENCE_DEPTH {
            return None;
        }
        if let Some(ty) = self.expression_types.get(&node) {
            return Some(ty.clone());
        }
        match self.tree.kind(node)? {
            SyntaxKind::Identifier { name } => {
                let function = self.enclosing_decl(node)?;
                if name == "this" {
                    return Some(TypeRef::named(function.declaring_type.clone()));
                }
                if let Some(param) = function.parameter(name) {
                    return Some(param.ty.clone());
                }
                if let Some(ty) = self.local_type(function, name, depth) {
                    return Some(ty);
                }
                self.resolve_member(node).map(|m| m.ty.clone())
            }
            SyntaxKind::MemberAccess { .. } => self.resolve_member(node).map(|m| m.ty.clone()),
            SyntaxKind::Invocation { type_args, .. } => self
                .resolve_invocation(node)
                .map(|method| method.instantiated_return_type(type_args)),
            SyntaxKind::Literal(literal) => match literal {
                Literal::Null => None,
                Literal::Bool(_) => Some(TypeRef::named("System.Boolean")),
                Literal::Int(_) => Some(TypeRef::named("System.Int32")),
                Literal::String(_) => Some(TypeRef::named(STRING)),
            },
            SyntaxKind::ObjectCreation { ty, .. } => Some(ty.clone()),
            SyntaxKind::Binary { op, lhs, .. } => {
                if op.is_boolean() {
                    Some(TypeRef::named("System.Boolean"))
                } else {
                    self.type_of(*lhs, depth + 1)
                }
            }
            SyntaxKind::Unary { op, operand } => match op {
                UnaryOp::Not => Some(TypeRef::named("System.Boolean")),
                UnaryOp::Negate => self.type_of(*operand, depth + 1),
            },
            SyntaxKind::Parenthesized { inner } => self.type_of(*inner, depth + 1),
            SyntaxKind::Assignment { target, .. } => self.type_of(*target, depth + 1),
            _ => None,
        }
    }
}

impl SemanticModel for Program {
    fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    fn function(&self, id: FunctionId) -> Option<&FunctionDecl> {
        self.functions.get(&id)
    }

    fn function_ids(&self) -> Vec<FunctionId> {
        self.functions.keys().copied().collect()
    }

    fn enclosing_function(&self, node: NodeId) -> Option<FunctionId> {
        self.body_owners.get(&self.tree.root_of(node)).copied()
    }

    fn resolve_invocation(&self, node: NodeId) -> Option<&MethodInfo> {
        if let Some(Binding::Method { type_name, method }) = self.bindings.get(&node) {
            return self.symbols.find_method(type_name, method);
        }
        let SyntaxKind::Invocation { callee, .. } = self.tree.kind(node)? else {
            return None;
        };
        let callee = self.tree.strip_parens(*callee);
        match self.tree.kind(callee)? {
            SyntaxKind::Identifier { name } => {
                let function = self.enclosing_decl(node)?;
                self.symbols.find_method(&function.declaring_type, name)
            }
            SyntaxKind::MemberAccess { target, member } => {
                if let Some(type_name) = self.type_named_by(*target) {
                    return self.symbols.find_method(type_name, member);
                }
                let receiver = self.type_of(*target, 0)?;
                self.symbols.find_method(receiver.canonical_name(), member)
            }
            _ => None,
        }
    }

    fn resolve_member(&self, node: NodeId) -> Option<&MemberInfo> {
        if let Some(Binding::Member { type_name, member }) = self.bindings.get(&node) {
            return self.symbols.find_member(type_name, member);
        }
        match self.tree.kind(node)? {
            SyntaxKind::Identifier { name } => {
                let function = self.enclosing_decl(node)?;
                if function.parameter(name).is_some() || self.is_local(function, name) {
                    return None;
                }
                self.symbols.find_member(&function.declaring_type, name)
            }
            SyntaxKind::MemberAccess { target, member } => {
                if let Some(type_name) = self.type_named_by(*target) {
                    return self.symbols.find_member(type_name, member);
                }
                let owner = self.type_of(*target, 0)?;
                self.symbols.find_member(owner.canonical_name(), member)
            }
            _ => None,
        }
    }

    fn expression_type(&self, node: NodeId) -> Option<TypeRef> {
        self.type_of(node, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::Parameter;
    use crate::surface::{lower_expression, Expr};
    use crate::symbols::{MemberInfo, TypeInfo};
    use crate::types::Visibility;

    fn widget_symbols() -> SymbolTable {
        let mut symbols = SymbolTable::new();
        symbols
            .register(
                TypeInfo::class("Acme.Widget")
                    .with_method(MethodInfo::new("Reset", TypeRef::void()))
                    .with_method(MethodInfo::new("Name", TypeRef::named("string")))
                    .with_member(MemberInfo::field("size", TypeRef::named("int")))
                    .with_member(
                        MemberInfo::property("Owner", TypeRef::named("Acme.Widget"))
                            .with_visibility(Visibility::Internal),
                    ),
            )
            .unwrap();
        symbols
    }

    /// Lowers `expr` as the sole expression statement of `Acme.Widget.Run(string text)`.
    fn program_with(expr: Expr) -> (Program, NodeId) {
        let mut program = Program::new(widget_symbols());
        let node = lower_expression(program.tree_mut(), &expr).unwrap();
        let stmt = program
            .add_node(SyntaxKind::ExpressionStatement { expr: node })
            .unwrap();
        let body = program
            .add_node(SyntaxKind::Block {
                statements: vec![stmt],
            })
            .unwrap();
        let mut sig = FunctionSignature::method("Acme.Widget", "Run");
        sig.params = vec![Parameter::new("text", TypeRef::named("string"))];
        program.add_function(sig, body).unwrap();
        (program, node)
    }

    #[test]
    fn static_call_resolves_through_type_name() {
        let (program, call) = program_with(Expr::invoke(
            "Contract.Requires",
            vec![Expr::ne(Expr::ident("text"), Expr::null())],
        ));
        let method = program.resolve_invocation(call).unwrap();
        assert_eq!(method.name, "Requires");
        assert!(method.is_contract_method());
        assert!(program.enclosing_function(call).is_some());
    }

    #[test]
    fn keyword_alias_resolves_string_methods() {
        let (program, call) =
            program_with(Expr::invoke("string.IsNullOrEmpty", vec![Expr::ident("text")]));
        let method = program.resolve_invocation(call).unwrap();
        assert_eq!(method.declaring_type, "System.String");
        assert_eq!(
            program.expression_type(call),
            Some(TypeRef::named("System.Boolean"))
        );
    }

    #[test]
    fn unqualified_call_resolves_on_declaring_type() {
        let (program, call) = program_with(Expr::invoke("Reset", vec![]));
        let method = program.resolve_invocation(call).unwrap();
        assert_eq!(method.declaring_type, "Acme.Widget");
        assert!(method.return_type.is_void());
    }

    #[test]
    fn receiver_type_drives_instance_calls() {
        let (program, call) = program_with(Expr::invoke("this.Owner.Name", vec![]));
        let method = program.resolve_invocation(call).unwrap();
        assert_eq!(method.name, "Name");
        assert_eq!(program.expression_type(call), Some(TypeRef::named("string")));
    }

    #[test]
    fn generic_result_type_is_substituted() {
        let (program, call) = program_with(Expr::generic_call(
            Expr::path("Contract.Result"),
            vec![TypeRef::named("string")],
            vec![],
        ));
        assert_eq!(program.expression_type(call), Some(TypeRef::named("string")));
    }

    #[test]
    fn members_resolve_but_parameters_do_not() {
        let (program, node) = program_with(Expr::ident("size"));
        let member = program.resolve_member(node).unwrap();
        assert_eq!(member.name, "size");
        assert_eq!(program.expression_type(node), Some(TypeRef::named("int")));

        let (program, node) = program_with(Expr::ident("text"));
        assert!(program.resolve_member(node).is_none());
        assert_eq!(program.expression_type(node), Some(TypeRef::named("string")));
    }

    #[test]
    fn explicit_binding_wins() {
        let (mut program, call) = program_with(Expr::invoke("Reset", vec![]));
        program.bind_invocation(call, "System.String", "IsNullOrEmpty");
        let method = program.resolve_invocation(call).unwrap();
        assert_eq!(method.name, "IsNullOrEmpty");
    }

    #[test]
    fn unknown_calls_do_not_resolve() {
        let (program, call) = program_with(Expr::invoke("Helpers.Check", vec![]));
        assert!(program.resolve_invocation(call).is_none());
        assert!(program.expression_type(call).is_none());
    }

    #[test]
    fn body_must_be_a_free_block() {
        let mut program = Program::new(widget_symbols());
        let x = program
            .add_node(SyntaxKind::Identifier { name: "x".into() })
            .unwrap();
        let err = program
            .add_function(FunctionSignature::method("Acme.Widget", "Run"), x)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidBody { .. }));

        let body = program
            .add_node(SyntaxKind::Block { statements: vec![] })
            .unwrap();
        program
            .add_function(FunctionSignature::method("Acme.Widget", "Run"), body)
            .unwrap();
        let err = program
            .add_function(FunctionSignature::method("Acme.Widget", "Again"), body)
            .unwrap_err();
        assert!(matches!(err, CoreError::NodeAlreadyAttached { .. }));
    }

    #[test]
    fn unknown_declaring_type_is_rejected() {
        let mut program = Program::new(widget_symbols());
        let body = program
            .add_node(SyntaxKind::Block { statements: vec![] })
            .unwrap();
        let err = program
            .add_function(FunctionSignature::method("Acme.Missing", "Run"), body)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidProgram { .. }));
    }

    #[test]
    fn program_is_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<Program>();
    }
}
