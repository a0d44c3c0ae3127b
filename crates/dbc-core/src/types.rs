//! Type references and the visibility lattice of the host language.
//!
//! A [`TypeRef`] names a type the way source code does (`string`,
//! `ArgumentNullException`, `Task<int>`). Comparisons always go through
//! [`canonical_type_name`], which maps keyword aliases to their `System.*`
//! names, so `string` and `System.String` are the same type.
//!
//! [`Visibility`] forms a lattice: combining a member's visibility with its
//! declaring type's visibility yields the member's effective ("combined")
//! visibility. The lattice is the only place this combination is defined.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Full name of the `void` type.
pub const VOID: &str = "System.Void";
/// Full name of the root of the type hierarchy.
pub const OBJECT: &str = "System.Object";
/// Full name of the string type.
pub const STRING: &str = "System.String";

const TASK: &str = "System.Threading.Tasks.Task";
const VALUE_TASK: &str = "System.Threading.Tasks.ValueTask";

/// Maps a keyword alias (`int`, `string`, ...) to the full type name.
///
/// Names that are not aliases are returned unchanged.
pub fn canonical_type_name(name: &str) -> &str {
    match name {
        "object" => OBJECT,
        "string" => STRING,
        "void" => VOID,
        "bool" => "System.Boolean",
        "byte" => "System.Byte",
        "sbyte" => "System.SByte",
        "short" => "System.Int16",
        "ushort" => "System.UInt16",
        "int" => "System.Int32",
        "uint" => "System.UInt32",
        "long" => "System.Int64",
        "ulong" => "System.UInt64",
        "char" => "System.Char",
        "float" => "System.Single",
        "double" => "System.Double",
        "decimal" => "System.Decimal",
        other => other,
    }
}

/// Returns the last segment of a dotted type name.
pub fn simple_type_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// A reference to a (possibly generic) type as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    /// Type name: a keyword alias, a simple name, or a full dotted name.
    pub name: String,
    /// Generic type arguments, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<TypeRef>,
}

impl TypeRef {
    /// A non-generic type reference.
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A generic type reference such as `Task<int>`.
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef {
            name: name.into(),
            args,
        }
    }

    /// The `void` type.
    pub fn void() -> Self {
        TypeRef::named(VOID)
    }

    /// The full name with keyword aliases resolved.
    pub fn canonical_name(&self) -> &str {
        canonical_type_name(&self.name)
    }

    /// The last segment of the canonical name.
    pub fn simple_name(&self) -> &str {
        simple_type_name(self.canonical_name())
    }

    pub fn is_void(&self) -> bool {
        self.canonical_name() == VOID
    }

    pub fn is_object(&self) -> bool {
        self.canonical_name() == OBJECT
    }

    pub fn is_string(&self) -> bool {
        self.canonical_name() == STRING
    }

    /// Returns `true` for `Task`, `Task<T>`, `ValueTask` and `ValueTask<T>`,
    /// whether written with a full or a simple name.
    pub fn is_task_like(&self) -> bool {
        let name = self.canonical_name();
        name == TASK || name == VALUE_TASK || name == "Task" || name == "ValueTask"
    }

    /// Structural type identity: canonical names match and all type
    /// arguments are the same types.
    ///
    /// A simple name matches a full name with the same last segment, since
    /// source code usually refers to imported types by simple name.
    pub fn same_type(&self, other: &TypeRef) -> bool {
        names_match(self.canonical_name(), other.canonical_name())
            && self.args.len() == other.args.len()
            && self
                .args
                .iter()
                .zip(&other.args)
                .all(|(a, b)| a.same_type(b))
    }
}

/// Compares two canonical names, allowing one side to be a simple name.
pub fn names_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let a_qualified = a.contains('.');
    let b_qualified = b.contains('.');
    match (a_qualified, b_qualified) {
        (true, false) => simple_type_name(a) == b,
        (false, true) => simple_type_name(b) == a,
        _ => false,
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// Accessibility of a type or member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    /// Accessible from the same assembly or from derived types.
    ProtectedInternal,
    Internal,
    Protected,
    /// Accessible only from derived types in the same assembly.
    PrivateProtected,
    Private,
}

impl Visibility {
    /// Combines two visibilities into the narrower effective visibility.
    ///
    /// Public is the identity and private is absorbing. Internal and
    /// protected meet at private-protected; protected-internal combined
    /// with either of them yields that one.
    pub fn combine(self, other: Visibility) -> Visibility {
        use Visibility::*;
        match (self, other) {
            (Public, v) | (v, Public) => v,
            (Private, _) | (_, Private) => Private,
            (a, b) if a == b => a,
            (PrivateProtected, _) | (_, PrivateProtected) => PrivateProtected,
            (ProtectedInternal, v) | (v, ProtectedInternal) => v,
            // internal x protected
            _ => PrivateProtected,
        }
    }

    /// Returns `true` if `self` is at least as accessible as `required`.
    pub fn is_at_least(self, required: Visibility) -> bool {
        self.combine(required) == required
    }

    /// Source keyword(s) for this visibility.
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::ProtectedInternal => "protected internal",
            Visibility::Internal => "internal",
            Visibility::Protected => "protected",
            Visibility::PrivateProtected => "private protected",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
