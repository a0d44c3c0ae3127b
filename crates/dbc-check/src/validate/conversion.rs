//! Implicit conversion rules used by the result type check.
//!
//! Conversions follow the host language's implicit, lossless policy:
//!
//! - Identity, and any type to `object`
//! - Reference conversions along the base type / interface chain
//! - Numeric widening (`int` to `long`, `float` to `double`, ...)
//! - `T` to `Nullable<T>`
//! - `void` converts to nothing

use dbc_core::{SymbolTable, TypeRef};

/// Returns `true` if a value of type `from` converts implicitly to `to`.
pub fn is_implicitly_convertible(symbols: &SymbolTable, from: &TypeRef, to: &TypeRef) -> bool {
    if from.is_void() || to.is_void() {
        return false;
    }
    if from.same_type(to) || to.is_object() {
        return true;
    }
    if widens_numerically(from.canonical_name(), to.canonical_name()) {
        return true;
    }
    if is_nullable(to) && to.args.len() == 1 && is_implicitly_convertible(symbols, from, &to.args[0]) {
        return true;
    }
    symbols.is_subtype_of(from, to)
}

/// Returns `true` if `Contract.Result<result>()` fits a method returning
/// `returned`.
///
/// For `Task<X>` / `ValueTask<X>` returns, a non-task result type is checked
/// against `X`.
pub fn is_compatible_result_type(symbols: &SymbolTable, result: &TypeRef, returned: &TypeRef) -> bool {
    if is_implicitly_convertible(symbols, result, returned) {
        return true;
    }
    returned.is_task_like()
        && returned.args.len() == 1
        && !result.is_task_like()
        && is_implicitly_convertible(symbols, result, &returned.args[0])
}

fn is_nullable(ty: &TypeRef) -> bool {
    matches!(ty.canonical_name(), "System.Nullable" | "Nullable")
}

/// Implicit numeric conversions.
fn widens_numerically(from: &str, to: &str) -> bool {
    let targets: &[&str] = match from {
        "System.SByte" => &[
            "System.Int16",
            "System.Int32",
            "System.Int64",
            "System.Single",
            "System.Double",
            "System.Decimal",
        ],
        "System.Byte" => &[
            "System.Int16",
            "System.UInt16",
            "System.Int32",
            "System.UInt32",
            "System.Int64",
            "System.UInt64",
            "System.Single",
            "System.Double",
            "System.Decimal",
        ],
        "System.Int16" => &[
            "System.Int32",
            "System.Int64",
            "System.Single",
            "System.Double",
            "System.Decimal",
        ],
        "System.UInt16" | "System.Char" => &[
            "System.Int32",
            "System.UInt32",
            "System.Int64",
            "System.UInt64",
            "System.Single",
            "System.Double",
            "System.Decimal",
        ],
        "System.Int32" => &["System.Int64", "System.Single", "System.Double", "System.Decimal"],
        "System.UInt32" => &[
            "System.Int64",
            "System.UInt64",
            "System.Single",
            "System.Double",
            "System.Decimal",
        ],
        "System.Int64" | "System.UInt64" => &["System.Single", "System.Double", "System.Decimal"],
        "System.Single" => &["System.Double"],
        _ => &[],
    };
    targets.contains(&to) || (from == "System.Char" && to == "System.UInt16")
}
