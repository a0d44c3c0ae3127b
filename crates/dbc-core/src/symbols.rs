//! Type and member symbols for the host program.
//!
//! [`SymbolTable`] is the resolution service the contract analysis relies on:
//! it knows every type's base type, interfaces, visibility, constructors and
//! members. [`SymbolTable::new`] pre-registers the built-in types the
//! contract grammar refers to (primitives, the standard argument exceptions,
//! tasks, and the contract entry point [`CONTRACT_TYPE`]).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{
    canonical_type_name, names_match, simple_type_name, TypeRef, Visibility, OBJECT, STRING,
};

/// Full name of the type declaring the contract assertion methods.
pub const CONTRACT_TYPE: &str = "System.Diagnostics.Contracts.Contract";
/// Full name of the root of the argument exception hierarchy.
pub const ARGUMENT_EXCEPTION: &str = "System.ArgumentException";

/// Contract-related annotations on methods and members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "attribute", content = "value", rename_all = "snake_case")]
pub enum ContractAttribute {
    /// The method is a reusable precondition validator
    /// (`[ContractArgumentValidator]`).
    ArgumentValidator,
    /// The method body is a contract section that callers inline
    /// (`[ContractAbbreviator]`).
    Abbreviator,
    /// The method holds object invariants (`[ContractInvariantMethod]`).
    InvariantMethod,
    /// A non-public field exposed to contracts under a public surrogate name
    /// (`[ContractPublicPropertyName("Name")]`).
    PublicPropertyName(String),
    /// The method has no visible side effects (`[Pure]`).
    Pure,
}

/// Whether a member is a field or a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field,
    Property,
}

/// Declared type flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Struct,
    Interface,
}

/// A method declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    /// Full name of the declaring type. Filled in on registration.
    #[serde(default)]
    pub declaring_type: String,
    pub return_type: TypeRef,
    #[serde(default)]
    pub params: Vec<TypeRef>,
    /// Generic parameter names, e.g. `["T"]` for `Result<T>()`.
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub attributes: Vec<ContractAttribute>,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        MethodInfo {
            name: name.into(),
            declaring_type: String::new(),
            return_type,
            params: Vec::new(),
            type_params: Vec::new(),
            visibility: Visibility::Public,
            is_static: false,
            attributes: Vec::new(),
        }
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_params(mut self, params: Vec<TypeRef>) -> Self {
        self.params = params;
        self
    }

    pub fn with_type_params(mut self, names: &[&str]) -> Self {
        self.type_params = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_attribute(mut self, attribute: ContractAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn has_attribute(&self, attribute: &ContractAttribute) -> bool {
        self.attributes.contains(attribute)
    }

    pub fn is_argument_validator(&self) -> bool {
        self.has_attribute(&ContractAttribute::ArgumentValidator)
    }

    pub fn is_abbreviator(&self) -> bool {
        self.has_attribute(&ContractAttribute::Abbreviator)
    }

    /// Returns `true` if this method is declared on the contract entry point.
    pub fn is_contract_method(&self) -> bool {
        self.declaring_type == CONTRACT_TYPE
    }

    /// The return type with generic parameters substituted by `type_args`.
    pub fn instantiated_return_type(&self, type_args: &[TypeRef]) -> TypeRef {
        self.type_params
            .iter()
            .position(|p| *p == self.return_type.name)
            .and_then(|i| type_args.get(i).cloned())
            .unwrap_or_else(|| self.return_type.clone())
    }
}

/// A field or property declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub name: String,
    /// Full name of the declaring type. Filled in on registration.
    #[serde(default)]
    pub declaring_type: String,
    pub kind: MemberKind,
    pub ty: TypeRef,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub attributes: Vec<ContractAttribute>,
}

impl MemberInfo {
    pub fn field(name: impl Into<String>, ty: TypeRef) -> Self {
        MemberInfo {
            name: name.into(),
            declaring_type: String::new(),
            kind: MemberKind::Field,
            ty,
            visibility: Visibility::Private,
            is_static: false,
            attributes: Vec::new(),
        }
    }

    pub fn property(name: impl Into<String>, ty: TypeRef) -> Self {
        MemberInfo {
            kind: MemberKind::Property,
            visibility: Visibility::Public,
            ..MemberInfo::field(name, ty)
        }
    }

    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_attribute(mut self, attribute: ContractAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// The public surrogate name, if this member declares one.
    pub fn public_surrogate_name(&self) -> Option<&str> {
        self.attributes.iter().find_map(|a| match a {
            ContractAttribute::PublicPropertyName(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

/// A constructor signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorInfo {
    #[serde(default)]
    pub params: Vec<TypeRef>,
    #[serde(default)]
    pub visibility: Visibility,
}

impl ConstructorInfo {
    pub fn new(params: Vec<TypeRef>) -> Self {
        ConstructorInfo {
            params,
            visibility: Visibility::Public,
        }
    }
}

/// A type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInfo {
    /// Full dotted name, e.g. `"Acme.Billing.Invoice"`.
    pub full_name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub base_type: Option<TypeRef>,
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
    /// Full name of the enclosing type for nested types.
    #[serde(default)]
    pub containing_type: Option<String>,
    #[serde(default)]
    pub constructors: Vec<ConstructorInfo>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
    #[serde(default)]
    pub members: Vec<MemberInfo>,
}

impl TypeInfo {
    /// A public class deriving from `System.Object`.
    pub fn class(full_name: impl Into<String>) -> Self {
        TypeInfo {
            full_name: full_name.into(),
            kind: TypeKind::Class,
            visibility: Visibility::Public,
            base_type: Some(TypeRef::named(OBJECT)),
            interfaces: Vec::new(),
            containing_type: None,
            constructors: Vec::new(),
            methods: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: TypeKind) -> Self {
        self.kind = kind;
        if kind == TypeKind::Interface {
            self.base_type = None;
        }
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.base_type = Some(base);
        self
    }

    pub fn with_interface(mut self, interface: TypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn nested_in(mut self, containing_type: impl Into<String>) -> Self {
        self.containing_type = Some(containing_type.into());
        self
    }

    pub fn with_constructor(mut self, params: Vec<TypeRef>) -> Self {
        self.constructors.push(ConstructorInfo::new(params));
        self
    }

    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_member(mut self, member: MemberInfo) -> Self {
        self.members.push(member);
        self
    }

    pub fn simple_name(&self) -> &str {
        simple_type_name(&self.full_name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn member(&self, name: &str) -> Option<&MemberInfo> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Returns `true` if a constructor takes exactly these parameter types.
    pub fn has_constructor(&self, params: &[TypeRef]) -> bool {
        self.constructors.iter().any(|c| {
            c.params.len() == params.len()
                && c.params.iter().zip(params).all(|(a, b)| a.same_type(b))
        })
    }

    /// Stamps the declaring type name onto all methods and members.
    fn with_owner_names(mut self) -> Self {
        let owner = self.full_name.clone();
        for method in &mut self.methods {
            method.declaring_type = owner.clone();
        }
        for member in &mut self.members {
            member.declaring_type = owner.clone();
        }
        self
    }
}

/// Registry of all declared types, keyed by full name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolTable {
    types: IndexMap<String, TypeInfo>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}

impl SymbolTable {
    /// Creates a table with the built-in types pre-registered.
    pub fn new() -> Self {
        let mut table = SymbolTable::empty();
        for info in builtin_types() {
            table.insert(info);
        }
        table
    }

    /// Creates a table with no types at all.
    pub fn empty() -> Self {
        SymbolTable {
            types: IndexMap::new(),
        }
    }

    /// Registers a type.
    ///
    /// Returns [`CoreError::DuplicateType`] if a type with the same full name
    /// already exists.
    pub fn register(&mut self, info: TypeInfo) -> Result<(), CoreError> {
        if self.types.contains_key(&info.full_name) {
            return Err(CoreError::DuplicateType {
                name: info.full_name,
            });
        }
        self.insert(info);
        Ok(())
    }

    fn insert(&mut self, info: TypeInfo) {
        let info = info.with_owner_names();
        self.types.insert(info.full_name.clone(), info);
    }

    /// Looks a type up by full name, keyword alias, or unique simple name.
    pub fn get(&self, name: &str) -> Option<&TypeInfo> {
        let canonical = canonical_type_name(name);
        if let Some(info) = self.types.get(canonical) {
            return Some(info);
        }
        let mut matches = self
            .types
            .values()
            .filter(|t| names_match(&t.full_name, canonical));
        let first = matches.next()?;
        match matches.next() {
            Some(_) => None, // ambiguous simple name
            None => Some(first),
        }
    }

    /// Looks up the declaration behind a [`TypeRef`].
    pub fn get_ref(&self, ty: &TypeRef) -> Option<&TypeInfo> {
        self.get(&ty.name)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.values()
    }

    /// The base-type chain of `name`, nearest first. Stops at the first
    /// unknown type and guards against cycles.
    pub fn base_chain(&self, name: &str) -> Vec<&TypeInfo> {
        let mut chain: Vec<&TypeInfo> = Vec::new();
        let mut current = self.get(name).and_then(|t| t.base_type.as_ref());
        while let Some(base) = current {
            let Some(info) = self.get_ref(base) else {
                break;
            };
            if chain.iter().any(|t| t.full_name == info.full_name) {
                break;
            }
            chain.push(info);
            current = info.base_type.as_ref();
        }
        chain
    }

    /// Returns `true` if `ty` is `ancestor` or derives from / implements it.
    ///
    /// Generic arguments are compared only when `ancestor` carries them.
    pub fn is_subtype_of(&self, ty: &TypeRef, ancestor: &TypeRef) -> bool {
        if ty.same_type(ancestor) {
            return true;
        }
        let mut visited: Vec<String> = Vec::new();
        let mut pending: Vec<TypeRef> = vec![ty.clone()];
        while let Some(current) = pending.pop() {
            let Some(info) = self.get_ref(&current) else {
                continue;
            };
            if visited.contains(&info.full_name) {
                continue;
            }
            visited.push(info.full_name.clone());

            let supertypes = info.base_type.iter().chain(info.interfaces.iter());
            for parent in supertypes {
                let name_matches = self
                    .get_ref(parent)
                    .map(|p| names_match(&p.full_name, ancestor.canonical_name()))
                    .unwrap_or_else(|| parent.same_type(ancestor));
                if name_matches && (ancestor.args.is_empty() || parent.same_type(ancestor)) {
                    return true;
                }
                pending.push(parent.clone());
            }
        }
        false
    }

    /// Finds a method on `type_name` or its base types.
    pub fn find_method(&self, type_name: &str, method: &str) -> Option<&MethodInfo> {
        let own = self.get(type_name)?;
        own.method(method)
            .or_else(|| self.base_chain(type_name).into_iter().find_map(|t| t.method(method)))
    }

    /// Finds a field or property on `type_name` or its base types.
    pub fn find_member(&self, type_name: &str, member: &str) -> Option<&MemberInfo> {
        let own = self.get(type_name)?;
        own.member(member)
            .or_else(|| self.base_chain(type_name).into_iter().find_map(|t| t.member(member)))
    }

    /// The effective visibility of a type: its own visibility combined with
    /// those of all enclosing types. `None` if the type is unknown.
    pub fn effective_visibility(&self, name: &str) -> Option<Visibility> {
        let info = self.get(name)?;
        let mut visibility = info.visibility;
        let mut seen = vec![info.full_name.as_str()];
        let mut containing = info.containing_type.as_deref();
        while let Some(outer_name) = containing {
            let Some(outer) = self.get(outer_name) else {
                break;
            };
            if seen.contains(&outer.full_name.as_str()) {
                break;
            }
            seen.push(outer.full_name.as_str());
            visibility = visibility.combine(outer.visibility);
            containing = outer.containing_type.as_deref();
        }
        Some(visibility)
    }
}

fn builtin_types() -> Vec<TypeInfo> {
    let string = || TypeRef::named(STRING);
    let exception = || TypeRef::named("System.Exception");
    let boolean = || TypeRef::named("System.Boolean");
    let void = TypeRef::void;

    let mut types = vec![
        TypeInfo {
            base_type: None,
            ..TypeInfo::class(OBJECT)
        },
        TypeInfo::class("System.ValueType"),
        TypeInfo::class("System.Void").with_kind(TypeKind::Struct),
        TypeInfo::class(STRING)
            .with_method(
                MethodInfo::new("IsNullOrEmpty", boolean())
                    .static_method()
                    .with_params(vec![string()]),
            )
            .with_method(
                MethodInfo::new("IsNullOrWhiteSpace", boolean())
                    .static_method()
                    .with_params(vec![string()]),
            )
            .with_method(
                MethodInfo::new("Format", string())
                    .static_method()
                    .with_params(vec![string()]),
            )
            .with_member(MemberInfo::field("Empty", string()).static_member().with_visibility(Visibility::Public))
            .with_member(MemberInfo::property("Length", TypeRef::named("System.Int32"))),
        TypeInfo::class("System.Exception")
            .with_constructor(vec![])
            .with_constructor(vec![string()])
            .with_constructor(vec![string(), exception()])
            .with_member(MemberInfo::property("Message", string())),
        TypeInfo::class("System.SystemException")
            .with_base(exception())
            .with_constructor(vec![])
            .with_constructor(vec![string()])
            .with_constructor(vec![string(), exception()]),
        TypeInfo::class(ARGUMENT_EXCEPTION)
            .with_base(TypeRef::named("System.SystemException"))
            .with_constructor(vec![])
            .with_constructor(vec![string()])
            .with_constructor(vec![string(), exception()])
            .with_constructor(vec![string(), string()])
            .with_member(MemberInfo::property("ParamName", string())),
        TypeInfo::class("System.ArgumentNullException")
            .with_base(TypeRef::named(ARGUMENT_EXCEPTION))
            .with_constructor(vec![])
            .with_constructor(vec![string()])
            .with_constructor(vec![string(), string()])
            .with_constructor(vec![string(), exception()]),
        TypeInfo::class("System.ArgumentOutOfRangeException")
            .with_base(TypeRef::named(ARGUMENT_EXCEPTION))
            .with_constructor(vec![])
            .with_constructor(vec![string()])
            .with_constructor(vec![string(), string()])
            .with_constructor(vec![string(), exception()]),
        TypeInfo::class("System.InvalidOperationException")
            .with_base(TypeRef::named("System.SystemException"))
            .with_constructor(vec![])
            .with_constructor(vec![string()])
            .with_constructor(vec![string(), exception()]),
        TypeInfo::class("System.NotSupportedException")
            .with_base(TypeRef::named("System.SystemException"))
            .with_constructor(vec![])
            .with_constructor(vec![string()]),
        TypeInfo::class("System.Threading.Tasks.Task"),
        TypeInfo::class("System.Threading.Tasks.ValueTask").with_kind(TypeKind::Struct),
        TypeInfo::class("System.Nullable").with_kind(TypeKind::Struct),
        TypeInfo::class("System.Collections.IEnumerable").with_kind(TypeKind::Interface),
        TypeInfo::class(CONTRACT_TYPE)
            .with_method(contract_method("Requires", void()).with_type_params(&["TException"]))
            .with_method(contract_method("Ensures", void()))
            .with_method(contract_method("EnsuresOnThrow", void()).with_type_params(&["TException"]))
            .with_method(contract_method("Invariant", void()))
            .with_method(contract_method("Assert", void()))
            .with_method(contract_method("Assume", void()))
            .with_method(MethodInfo::new("EndContractBlock", void()).static_method())
            .with_method(
                MethodInfo::new("Result", TypeRef::named("T"))
                    .static_method()
                    .with_type_params(&["T"]),
            )
            .with_method(
                MethodInfo::new("OldValue", TypeRef::named("T"))
                    .static_method()
                    .with_type_params(&["T"]),
            )
            .with_method(
                MethodInfo::new("ValueAtReturn", TypeRef::named("T"))
                    .static_method()
                    .with_type_params(&["T"]),
            )
            .with_method(MethodInfo::new("ForAll", boolean()).static_method())
            .with_method(MethodInfo::new("Exists", boolean()).static_method()),
    ];

    for primitive in [
        "System.Boolean",
        "System.Byte",
        "System.SByte",
        "System.Int16",
        "System.UInt16",
        "System.Int32",
        "System.UInt32",
        "System.Int64",
        "System.UInt64",
        "System.Char",
        "System.Single",
        "System.Double",
        "System.Decimal",
    ] {
        types.push(
            TypeInfo::class(primitive)
                .with_kind(TypeKind::Struct)
                .with_base(TypeRef::named("System.ValueType")),
        );
    }
    types
}

fn contract_method(name: &str, return_type: TypeRef) -> MethodInfo {
    MethodInfo::new(name, return_type)
        .static_method()
        .with_params(vec![TypeRef::named("System.Boolean"), TypeRef::named(STRING)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_preregistered() {
        let table = SymbolTable::new();
        assert!(table.get("string").is_some());
        assert!(table.get("System.Int32").is_some());
        assert!(table.get("ArgumentNullException").is_some());
        assert!(table.get(CONTRACT_TYPE).is_some());
        assert!(table.get("Contract").is_some());
        assert!(SymbolTable::empty().get("string").is_none());
    }

    #[test]
    fn methods_know_their_declaring_type() {
        let table = SymbolTable::new();
        let requires = table.find_method("Contract", "Requires").unwrap();
        assert_eq!(requires.declaring_type, CONTRACT_TYPE);
        assert!(requires.is_contract_method());
        assert!(requires.return_type.is_void());
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut table = SymbolTable::new();
        table.register(TypeInfo::class("Acme.Widget")).unwrap();
        let err = table.register(TypeInfo::class("Acme.Widget")).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateType { ref name } if name == "Acme.Widget"));
    }

    #[test]
    fn ambiguous_simple_name_does_not_resolve() {
        let mut table = SymbolTable::new();
        table.register(TypeInfo::class("Acme.Widget")).unwrap();
        table.register(TypeInfo::class("Other.Widget")).unwrap();
        assert!(table.get("Widget").is_none());
        assert!(table.get("Acme.Widget").is_some());
    }

    #[test]
    fn argument_exception_ancestry() {
        let table = SymbolTable::new();
        let arg = TypeRef::named(ARGUMENT_EXCEPTION);
        assert!(table.is_subtype_of(&TypeRef::named("ArgumentNullException"), &arg));
        assert!(table.is_subtype_of(&TypeRef::named("System.ArgumentOutOfRangeException"), &arg));
        assert!(table.is_subtype_of(&arg, &arg));
        assert!(!table.is_subtype_of(&TypeRef::named("InvalidOperationException"), &arg));
        assert!(table.is_subtype_of(&TypeRef::named("string"), &TypeRef::named("object")));
    }

    #[test]
    fn user_exception_derives_through_chain() {
        let mut table = SymbolTable::new();
        table
            .register(
                TypeInfo::class("Acme.BadInputException")
                    .with_base(TypeRef::named("ArgumentNullException")),
            )
            .unwrap();
        assert!(table.is_subtype_of(
            &TypeRef::named("BadInputException"),
            &TypeRef::named(ARGUMENT_EXCEPTION)
        ));
    }

    #[test]
    fn interfaces_count_as_supertypes() {
        let mut table = SymbolTable::new();
        table
            .register(TypeInfo::class("Acme.IShape").with_kind(TypeKind::Interface))
            .unwrap();
        table
            .register(TypeInfo::class("Acme.Circle").with_interface(TypeRef::named("IShape")))
            .unwrap();
        assert!(table.is_subtype_of(&TypeRef::named("Circle"), &TypeRef::named("Acme.IShape")));
        assert!(!table.is_subtype_of(&TypeRef::named("IShape"), &TypeRef::named("Circle")));
    }

    #[test]
    fn base_chain_survives_cycles() {
        let mut table = SymbolTable::empty();
        table
            .register(TypeInfo::class("A").with_base(TypeRef::named("B")))
            .unwrap();
        table
            .register(TypeInfo::class("B").with_base(TypeRef::named("A")))
            .unwrap();
        assert_eq!(table.base_chain("A").len(), 2);
        assert!(!table.is_subtype_of(&TypeRef::named("A"), &TypeRef::named("C")));
    }

    #[test]
    fn members_are_found_on_base_types() {
        let mut table = SymbolTable::new();
        table
            .register(
                TypeInfo::class("Acme.Base")
                    .with_member(MemberInfo::field("count", TypeRef::named("int"))),
            )
            .unwrap();
        table
            .register(TypeInfo::class("Acme.Derived").with_base(TypeRef::named("Acme.Base")))
            .unwrap();
        let member = table.find_member("Acme.Derived", "count").unwrap();
        assert_eq!(member.declaring_type, "Acme.Base");
        assert_eq!(member.visibility, Visibility::Private);
    }

    #[test]
    fn effective_visibility_combines_containing_types() {
        let mut table = SymbolTable::new();
        table
            .register(TypeInfo::class("Acme.Outer").with_visibility(Visibility::Internal))
            .unwrap();
        table
            .register(TypeInfo::class("Acme.Outer.Inner").nested_in("Acme.Outer"))
            .unwrap();
        assert_eq!(
            table.effective_visibility("Acme.Outer.Inner"),
            Some(Visibility::Internal)
        );
        assert_eq!(table.effective_visibility("Acme.Missing"), None);
    }

    #[test]
    fn generic_return_type_is_instantiated() {
        let table = SymbolTable::new();
        let result = table.find_method(CONTRACT_TYPE, "Result").unwrap();
        let ty = result.instantiated_return_type(&[TypeRef::named("string")]);
        assert_eq!(ty, TypeRef::named("string"));
        assert_eq!(result.instantiated_return_type(&[]), TypeRef::named("T"));
    }

    #[test]
    fn constructor_lookup_uses_type_identity() {
        let table = SymbolTable::new();
        let arg = table.get(ARGUMENT_EXCEPTION).unwrap();
        assert!(arg.has_constructor(&[TypeRef::named("string")]));
        assert!(arg.has_constructor(&[TypeRef::named("string"), TypeRef::named("string")]));
        assert!(!arg.has_constructor(&[TypeRef::named("int")]));
    }
}
