//! Function declarations.
//!
//! [`FunctionDecl`] is the declaration metadata of a method, constructor or
//! accessor; its body lives as syntax nodes in the shared
//! [`SyntaxTree`](crate::tree::SyntaxTree), rooted at [`FunctionDecl::body`].

use serde::{Deserialize, Serialize};

use crate::id::{FunctionId, NodeId};
use crate::types::{TypeRef, Visibility};

/// What kind of member a function body belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    #[default]
    Method,
    Constructor,
    PropertyGetter,
    PropertySetter,
    /// A method holding `Contract.Invariant` calls
    /// (`[ContractInvariantMethod]`).
    InvariantMethod,
}

/// A named, typed parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Parameter {
            name: name.into(),
            ty,
        }
    }
}

/// Everything about a function except its identity and its body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    /// Full name of the declaring type.
    pub declaring_type: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub kind: FunctionKind,
    #[serde(default)]
    pub params: Vec<Parameter>,
    pub return_type: TypeRef,
    #[serde(default)]
    pub is_async: bool,
    /// `true` if the body contains `yield` statements.
    #[serde(default)]
    pub is_iterator: bool,
}

impl FunctionSignature {
    /// A public, void, parameterless method.
    pub fn method(declaring_type: impl Into<String>, name: impl Into<String>) -> Self {
        FunctionSignature {
            name: name.into(),
            declaring_type: declaring_type.into(),
            visibility: Visibility::Public,
            kind: FunctionKind::Method,
            params: Vec::new(),
            return_type: TypeRef::void(),
            is_async: false,
            is_iterator: false,
        }
    }
}

/// A function declaration with its body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub id: FunctionId,
    pub name: String,
    pub declaring_type: String,
    pub visibility: Visibility,
    pub kind: FunctionKind,
    pub params: Vec<Parameter>,
    pub return_type: TypeRef,
    /// Root `Block` node of the body.
    pub body: NodeId,
    pub is_async: bool,
    pub is_iterator: bool,
}

impl FunctionDecl {
    pub fn from_signature(id: FunctionId, signature: FunctionSignature, body: NodeId) -> Self {
        FunctionDecl {
            id,
            name: signature.name,
            declaring_type: signature.declaring_type,
            visibility: signature.visibility,
            kind: signature.kind,
            params: signature.params,
            return_type: signature.return_type,
            body,
            is_async: signature.is_async,
            is_iterator: signature.is_iterator,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn returns_void(&self) -> bool {
        self.return_type.is_void()
    }

    pub fn is_invariant_method(&self) -> bool {
        self.kind == FunctionKind::InvariantMethod
    }

    /// `Type.Name`, as used in diagnostics.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_type, self.name)
    }
}
