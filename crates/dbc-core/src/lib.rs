pub mod error;
pub mod function;
pub mod id;
pub mod model;
pub mod program;
pub mod surface;
pub mod symbols;
pub mod syntax;
pub mod tree;
pub mod types;

// Re-export commonly used types
pub use error::CoreError;
pub use function::{FunctionDecl, FunctionKind, FunctionSignature, Parameter};
pub use id::{FunctionId, NodeId};
pub use model::SemanticModel;
pub use program::Program;
pub use symbols::{
    ContractAttribute, MemberInfo, MemberKind, MethodInfo, SymbolTable, TypeInfo, TypeKind,
    ARGUMENT_EXCEPTION, CONTRACT_TYPE,
};
pub use syntax::{BinaryOp, Literal, LoopKind, SyntaxKind, UnaryOp};
pub use tree::SyntaxTree;
pub use types::{TypeRef, Visibility};
