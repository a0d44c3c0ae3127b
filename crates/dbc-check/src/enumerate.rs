//! Contract enumeration: the parsed contracts of functions and types,
//! independent of validation.

use dbc_core::types::names_match;
use dbc_core::{FunctionId, SemanticModel};

use crate::block::extract_block;
use crate::error::CheckError;
use crate::statement::ContractStatement;

/// Every contract of a function, in body order.
pub fn contracts_of_function(
    model: &dyn SemanticModel,
    function: FunctionId,
) -> Result<Vec<ContractStatement>, CheckError> {
    let block = extract_block(model, function)?;
    Ok(block.contracts().cloned().collect())
}

/// The preconditions of a function: `Requires`, if-throw and guard forms.
pub fn preconditions_of_function(
    model: &dyn SemanticModel,
    function: FunctionId,
) -> Result<Vec<ContractStatement>, CheckError> {
    let mut contracts = contracts_of_function(model, function)?;
    contracts.retain(ContractStatement::is_precondition);
    Ok(contracts)
}

/// The invariants declared by every invariant method of `type_name`.
///
/// `type_name` may be simple or fully qualified.
pub fn invariants_of_type(
    model: &dyn SemanticModel,
    type_name: &str,
) -> Result<Vec<ContractStatement>, CheckError> {
    let mut invariants = Vec::new();
    for id in model.function_ids() {
        let Some(decl) = model.function(id) else {
            continue;
        };
        if !decl.is_invariant_method() || !names_match(&decl.declaring_type, type_name) {
            continue;
        }
        invariants.extend(
            contracts_of_function(model, id)?
                .into_iter()
                .filter(|c| c.kind() == Some(crate::assertion::AssertionKind::Invariant)),
        );
    }
    Ok(invariants)
}

/// Looks a function up by `Name`, `Type.Name` or `Namespace.Type.Name`.
pub fn function_by_name(model: &dyn SemanticModel, name: &str) -> Result<FunctionId, CheckError> {
    let suffix = format!(".{}", name);
    let matches: Vec<FunctionId> = model
        .function_ids()
        .into_iter()
        .filter(|id| {
            model.function(*id).is_some_and(|decl| {
                let qualified = decl.qualified_name();
                qualified == name || qualified.ends_with(&suffix)
            })
        })
        .collect();
    match matches.as_slice() {
        [] => Err(CheckError::FunctionNameNotFound {
            name: name.to_string(),
        }),
        [only] => Ok(*only),
        _ => Err(CheckError::AmbiguousFunctionName {
            name: name.to_string(),
            count: matches.len(),
        }),
    }
}
