//! Contract block extraction.
//!
//! [`extract_block`] flattens a function body into a pre-order list of
//! [`ProcessedStatement`]s, each tagged with the innermost construct that
//! encloses it, its shape, and its parsed contract (if any). Nothing is
//! validated here.
//!
//! The *contract section* is the prefix of that list ending at the last
//! top-level block marker (see [`AssertionShape::is_block_marker`]). Statements
//! nested inside constructs that start before the section end belong to the
//! section as well.

use dbc_core::{FunctionId, NodeId, SemanticModel, SyntaxKind};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::assertion::parse::parse_shape;
use crate::assertion::{classify_statement, AssertionKind, AssertionShape};
use crate::error::CheckError;
use crate::statement::ContractStatement;

/// The innermost construct enclosing a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nesting {
    TopLevel,
    If,
    Loop,
    SwitchSection,
    Try,
    Catch,
    Finally,
    Using,
    /// A bare nested `{ ... }` block.
    Block,
}

/// A body statement with its position, context and classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedStatement {
    /// Position in the flattened statement list.
    pub index: usize,
    pub node: NodeId,
    pub nesting: Nesting,
    /// Number of enclosing constructs; 0 for top-level statements.
    pub depth: usize,
    pub shape: Option<AssertionShape>,
    pub contract: Option<ContractStatement>,
}

impl ProcessedStatement {
    pub fn is_top_level(&self) -> bool {
        self.nesting == Nesting::TopLevel
    }

    pub fn is(&self, kind: AssertionKind) -> bool {
        self.shape.as_ref().is_some_and(|s| s.is(kind))
    }

    pub fn is_postcondition(&self) -> bool {
        self.shape.as_ref().is_some_and(AssertionShape::is_postcondition)
    }

    pub fn is_legacy_precondition(&self) -> bool {
        self.shape
            .as_ref()
            .is_some_and(AssertionShape::is_legacy_precondition)
    }
}

/// The flattened, classified body of one function.
#[derive(Debug, Clone)]
pub struct ContractBlock {
    pub function: FunctionId,
    pub statements: Vec<ProcessedStatement>,
    section_end: Option<usize>,
}

impl ContractBlock {
    /// The statements up to and including the last top-level block marker.
    pub fn contract_section(&self) -> &[ProcessedStatement] {
        match self.section_end {
            Some(end) => &self.statements[..=end],
            None => &[],
        }
    }

    pub fn in_contract_section(&self, index: usize) -> bool {
        self.section_end.is_some_and(|end| index <= end)
    }

    /// Index of the first `Contract.EndContractBlock()`, at any nesting.
    pub fn first_end_contract_block(&self) -> Option<usize> {
        self.statements
            .iter()
            .find(|s| s.is(AssertionKind::EndContractBlock))
            .map(|s| s.index)
    }

    /// Every parsed contract, in body order.
    pub fn contracts(&self) -> impl Iterator<Item = &ContractStatement> {
        self.statements.iter().filter_map(|s| s.contract.as_ref())
    }
}

/// Flattens and classifies the body of `function`.
pub fn extract_block(
    model: &dyn SemanticModel,
    function: FunctionId,
) -> Result<ContractBlock, CheckError> {
    let decl = model
        .function(function)
        .ok_or(CheckError::FunctionNotFound { id: function })?;

    let mut statements = Vec::new();
    walk_body(model, decl.body, Nesting::TopLevel, 0, &mut statements);

    let section_end = statements
        .iter()
        .filter(|s| s.is_top_level())
        .filter(|s| s.shape.as_ref().is_some_and(AssertionShape::is_block_marker))
        .map(|s| s.index)
        .last();
    trace!(
        function = function.0,
        statements = statements.len(),
        ?section_end,
        "extracted contract block"
    );

    Ok(ContractBlock {
        function,
        statements,
        section_end,
    })
}

/// Walks the statements of a construct body. A block body contributes its
/// statements; any other statement is walked directly.
fn walk_body(
    model: &dyn SemanticModel,
    body: NodeId,
    nesting: Nesting,
    depth: usize,
    out: &mut Vec<ProcessedStatement>,
) {
    match model.kind(body) {
        Some(SyntaxKind::Block { statements }) => {
            for stmt in statements {
                walk(model, *stmt, nesting, depth, out);
            }
        }
        Some(_) => walk(model, body, nesting, depth, out),
        None => {}
    }
}

fn walk(
    model: &dyn SemanticModel,
    node: NodeId,
    nesting: Nesting,
    depth: usize,
    out: &mut Vec<ProcessedStatement>,
) {
    let Some(kind) = model.kind(node) else {
        return;
    };
    if let SyntaxKind::Block { .. } = kind {
        walk_body(model, node, Nesting::Block, depth + 1, out);
        return;
    }

    let shape = classify_statement(model, node);
    let contract = shape.as_ref().and_then(|s| parse_shape(model, node, s));
    out.push(ProcessedStatement {
        index: out.len(),
        node,
        nesting,
        depth,
        shape,
        contract,
    });

    let inner = depth + 1;
    match kind {
        SyntaxKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            walk_body(model, *then_branch, Nesting::If, inner, out);
            if let Some(else_branch) = else_branch {
                walk_body(model, *else_branch, Nesting::If, inner, out);
            }
        }
        SyntaxKind::Loop { body, .. } => walk_body(model, *body, Nesting::Loop, inner, out),
        SyntaxKind::Switch { sections, .. } => {
            for section in sections {
                if let Some(SyntaxKind::SwitchSection { statements }) = model.kind(*section) {
                    for stmt in statements {
                        walk(model, *stmt, Nesting::SwitchSection, inner, out);
                    }
                }
            }
        }
        SyntaxKind::Try {
            body,
            catches,
            finally,
        } => {
            walk_body(model, *body, Nesting::Try, inner, out);
            for catch in catches {
                if let Some(SyntaxKind::Catch { body, .. }) = model.kind(*catch) {
                    walk_body(model, *body, Nesting::Catch, inner, out);
                }
            }
            if let Some(finally) = finally {
                walk_body(model, *finally, Nesting::Finally, inner, out);
            }
        }
        SyntaxKind::Using { body, .. } => walk_body(model, *body, Nesting::Using, inner, out),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use dbc_core::surface::{CatchClause, Expr, Stmt};

    fn block_of(body: Vec<Stmt>) -> ContractBlock {
        let (program, fid) = program_of(method(body));
        extract_block(&program, fid).unwrap()
    }

    fn nestings(block: &ContractBlock) -> Vec<Nesting> {
        block.statements.iter().map(|s| s.nesting).collect()
    }

    #[test]
    fn flattens_in_pre_order_with_nesting() {
        let block = block_of(vec![
            requires(not_null("name")),
            Stmt::if_then(Expr::ident("flag"), Stmt::block(vec![requires(not_null("value"))])),
            Stmt::try_catch(
                vec![Stmt::other("Work();")],
                vec![CatchClause {
                    exception_type: None,
                    body: vec![Stmt::other("Recover();")],
                }],
            ),
            Stmt::block(vec![Stmt::other("Inner();")]),
        ]);
        assert_eq!(
            nestings(&block),
            vec![
                Nesting::TopLevel,
                Nesting::TopLevel,
                Nesting::If,
                Nesting::TopLevel,
                Nesting::Try,
                Nesting::Catch,
                Nesting::Block,
            ]
        );
        assert_eq!(block.statements[2].depth, 1);
        assert!(block.statements[2].is(AssertionKind::Requires));
        let indices: Vec<usize> = block.statements.iter().map(|s| s.index).collect();
        assert_eq!(indices, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn section_ends_at_last_top_level_marker() {
        let block = block_of(vec![
            if_null_throw("value"),
            requires(not_null("name")),
            end_contract_block(),
            Stmt::other("DoWork();"),
            Stmt::other("DoMore();"),
        ]);
        // if-throw, its throw, requires, end-contract-block
        assert_eq!(block.contract_section().len(), 4);
        assert!(block.in_contract_section(3));
        assert!(!block.in_contract_section(4));
        assert_eq!(block.first_end_contract_block(), Some(3));
        assert_eq!(block.contracts().count(), 3);
    }

    #[test]
    fn if_throw_alone_does_not_open_a_section() {
        let block = block_of(vec![if_null_throw("value"), Stmt::other("DoWork();")]);
        assert!(block.contract_section().is_empty());
        assert!(block.statements[0].is_legacy_precondition());
    }

    #[test]
    fn nested_markers_do_not_extend_the_section() {
        let block = block_of(vec![
            requires(not_null("name")),
            Stmt::other("DoWork();"),
            Stmt::while_loop(Expr::ident("flag"), vec![requires(not_null("value"))]),
        ]);
        assert_eq!(block.contract_section().len(), 1);
    }

    #[test]
    fn unknown_function_is_an_error() {
        let (program, _) = program_of(method(vec![]));
        let err = extract_block(&program, FunctionId(99)).unwrap_err();
        assert!(matches!(err, CheckError::FunctionNotFound { .. }));
    }
}
