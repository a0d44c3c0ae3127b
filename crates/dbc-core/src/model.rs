//! The `SemanticModel` capability trait.
//!
//! The contract analysis never walks host data structures directly. It asks a
//! [`SemanticModel`] for node kinds, tree navigation, and name resolution, so
//! any host able to answer these queries can be analyzed. [`Program`] is the
//! in-crate implementation.
//!
//! [`Program`]: crate::program::Program

use crate::function::FunctionDecl;
use crate::id::{FunctionId, NodeId};
use crate::symbols::{MemberInfo, MethodInfo, SymbolTable};
use crate::syntax::SyntaxKind;
use crate::tree::SyntaxTree;
use crate::types::TypeRef;

/// Read-only queries over a host program.
pub trait SemanticModel {
    /// The syntax arena holding all function bodies.
    fn tree(&self) -> &SyntaxTree;

    /// The type and member symbols.
    fn symbols(&self) -> &SymbolTable;

    fn function(&self, id: FunctionId) -> Option<&FunctionDecl>;

    /// All function IDs, in declaration order.
    fn function_ids(&self) -> Vec<FunctionId>;

    /// The function whose body contains `node`.
    fn enclosing_function(&self, node: NodeId) -> Option<FunctionId>;

    /// The method an `Invocation` node calls, if it can be resolved.
    fn resolve_invocation(&self, node: NodeId) -> Option<&MethodInfo>;

    /// The field or property an `Identifier` / `MemberAccess` node refers to,
    /// if it names one.
    fn resolve_member(&self, node: NodeId) -> Option<&MemberInfo>;

    /// The static type of an expression node, if known.
    fn expression_type(&self, node: NodeId) -> Option<TypeRef>;

    fn kind(&self, node: NodeId) -> Option<&SyntaxKind> {
        self.tree().kind(node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree().children(node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree().parent(node)
    }
}
