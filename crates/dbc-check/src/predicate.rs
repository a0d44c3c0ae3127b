//! Predicate model: the null checks an assertion condition makes.
//!
//! A condition is treated as a bag of checks. [`extract_predicates`] scans the
//! whole expression for comparisons against `null` and for
//! `string.IsNullOrEmpty` / `string.IsNullOrWhiteSpace` calls; `&&` and `||`
//! are not interpreted. An empty result means the condition is not a
//! recognized predicate.
//!
//! Extraction has a [`Polarity`]. Assertion calls state what must hold
//! (`Contract.Requires(!string.IsNullOrEmpty(s))`), while the condition of an
//! if-throw states what must *not* hold (`if (string.IsNullOrEmpty(s)) throw`),
//! so refuted extraction flips every check.

use dbc_core::{
    BinaryOp, Literal, NodeId, SemanticModel, SyntaxKind, TypeRef, UnaryOp, CONTRACT_TYPE,
};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// What a predicate argument refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum ArgumentTarget {
    /// A plain name: `x`, or `this.x`.
    Identifier { name: String },
    /// A member chain such as `x.Name.Length`; `owner` is its first segment.
    Qualified { owner: String, path: String },
    /// `Contract.Result<T>()`, or a member chain rooted in it.
    MethodResult,
}

impl ArgumentTarget {
    /// The name this target is about, for argument identity.
    pub fn referenced_name(&self) -> Option<&str> {
        match self {
            ArgumentTarget::Identifier { name } => Some(name),
            ArgumentTarget::Qualified { owner, .. } => Some(owner),
            ArgumentTarget::MethodResult => None,
        }
    }
}

/// The expression a predicate is about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredicateArgument {
    pub target: ArgumentTarget,
    pub declared_type: Option<TypeRef>,
    /// The expression the argument was read from.
    pub node: NodeId,
}

impl PredicateArgument {
    pub fn refers_to(&self, name: &str) -> bool {
        self.target.referenced_name() == Some(name)
    }

    pub fn is_method_result(&self) -> bool {
        self.target == ArgumentTarget::MethodResult
    }
}

// Arguments are the same when they name the same thing.
impl PartialEq for PredicateArgument {
    fn eq(&self, other: &Self) -> bool {
        match (&self.target, &other.target) {
            (ArgumentTarget::MethodResult, ArgumentTarget::MethodResult) => true,
            (a, b) => a.referenced_name().is_some() && a.referenced_name() == b.referenced_name(),
        }
    }
}

/// One check extracted from a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum PredicateCheck {
    /// `arg == null` / `arg != null`.
    Equality {
        argument: PredicateArgument,
        /// `true` for `==`.
        equals_null: bool,
        /// `true` if the comparison is inverted by an enclosing `!` (or by
        /// refuted polarity).
        is_negated: bool,
    },
    /// `!string.IsNullOrEmpty(arg)` and friends, normalized so the check
    /// always means "arg is not null or empty".
    NullOrEmptyMethod {
        argument: PredicateArgument,
        method_name: String,
    },
}

impl PredicateCheck {
    pub fn argument(&self) -> &PredicateArgument {
        match self {
            PredicateCheck::Equality { argument, .. }
            | PredicateCheck::NullOrEmptyMethod { argument, .. } => argument,
        }
    }

    /// Returns `true` if this check asserts that `name` is null.
    pub fn checks_for_null(&self, name: &str) -> bool {
        match self {
            PredicateCheck::Equality {
                argument,
                equals_null,
                is_negated,
            } => argument.refers_to(name) && (*equals_null != *is_negated),
            PredicateCheck::NullOrEmptyMethod { .. } => false,
        }
    }

    /// Returns `true` if this check asserts that `name` is not null.
    pub fn checks_for_not_null(&self, name: &str) -> bool {
        match self {
            PredicateCheck::Equality {
                argument,
                equals_null,
                is_negated,
            } => argument.refers_to(name) && (*equals_null == *is_negated),
            PredicateCheck::NullOrEmptyMethod { argument, .. } => argument.refers_to(name),
        }
    }
}

/// Whether a condition states what must hold or what must not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    /// Assertion calls: the condition must be true.
    Asserted,
    /// If-throw guards: the condition must be false.
    Refuted,
}

/// Extracts every recognized check from a boolean expression.
pub fn extract_predicates(
    model: &dyn SemanticModel,
    condition: NodeId,
    polarity: Polarity,
) -> Vec<PredicateCheck> {
    let mut checks = Vec::new();
    collect(model, condition, false, polarity == Polarity::Refuted, &mut checks);
    checks
}

fn collect(
    model: &dyn SemanticModel,
    node: NodeId,
    negated: bool,
    refuted: bool,
    out: &mut Vec<PredicateCheck>,
) {
    let node = model.tree().strip_parens(node);
    let Some(kind) = model.kind(node) else {
        return;
    };

    match kind {
        SyntaxKind::Unary {
            op: UnaryOp::Not,
            operand,
        } => collect(model, *operand, !negated, refuted, out),
        SyntaxKind::Binary {
            op: op @ (BinaryOp::Equal | BinaryOp::NotEqual),
            lhs,
            rhs,
        } => {
            let compared = if is_null_literal(model, *rhs) {
                Some(*lhs)
            } else if is_null_literal(model, *lhs) {
                Some(*rhs)
            } else {
                None
            };
            match compared.and_then(|n| predicate_argument(model, n)) {
                Some(argument) => {
                    trace!(node = node.0, "extracted null comparison");
                    out.push(PredicateCheck::Equality {
                        argument,
                        equals_null: *op == BinaryOp::Equal,
                        is_negated: negated != refuted,
                    });
                }
                None => {
                    collect(model, *lhs, negated, refuted, out);
                    collect(model, *rhs, negated, refuted, out);
                }
            }
        }
        SyntaxKind::Invocation { args, .. } => {
            if let Some(method_name) = null_or_empty_method(model, node) {
                if negated != refuted {
                    if let Some(argument) = args.first().and_then(|a| predicate_argument(model, *a)) {
                        trace!(node = node.0, method = %method_name, "extracted null-or-empty check");
                        out.push(PredicateCheck::NullOrEmptyMethod {
                            argument,
                            method_name,
                        });
                    }
                }
                return;
            }
            for child in model.children(node) {
                collect(model, child, negated, refuted, out);
            }
        }
        _ => {
            for child in model.children(node) {
                collect(model, child, negated, refuted, out);
            }
        }
    }
}

fn is_null_literal(model: &dyn SemanticModel, node: NodeId) -> bool {
    let node = model.tree().strip_parens(node);
    matches!(model.kind(node), Some(SyntaxKind::Literal(Literal::Null)))
}

/// The name of the string method if `node` calls `string.IsNullOrEmpty` or
/// `string.IsNullOrWhiteSpace` with one argument.
fn null_or_empty_method(model: &dyn SemanticModel, node: NodeId) -> Option<String> {
    let method = model.resolve_invocation(node)?;
    let is_string_method = TypeRef::named(method.declaring_type.as_str()).is_string();
    let is_check = matches!(method.name.as_str(), "IsNullOrEmpty" | "IsNullOrWhiteSpace");
    let one_arg = matches!(model.kind(node), Some(SyntaxKind::Invocation { args, .. }) if args.len() == 1);
    (is_string_method && is_check && one_arg).then(|| method.name.clone())
}

/// Returns `true` if `node` is a `Contract.Result<T>()` call.
pub fn is_result_call(model: &dyn SemanticModel, node: NodeId) -> bool {
    let node = model.tree().strip_parens(node);
    matches!(model.kind(node), Some(SyntaxKind::Invocation { .. }))
        && model
            .resolve_invocation(node)
            .is_some_and(|m| m.declaring_type == CONTRACT_TYPE && m.name == "Result")
}

/// Reads the argument an equality or null-or-empty check is about.
///
/// Returns `None` for shapes that do not name anything (literals, arbitrary
/// calls, arithmetic).
pub fn predicate_argument(model: &dyn SemanticModel, node: NodeId) -> Option<PredicateArgument> {
    let node = model.tree().strip_parens(node);
    let target = match model.tree().dotted_segments(node) {
        Some(mut segments) => {
            if segments.first().map(String::as_str) == Some("this") {
                segments.remove(0);
            }
            match segments.len() {
                0 => return None,
                1 => ArgumentTarget::Identifier {
                    name: segments.remove(0),
                },
                _ => ArgumentTarget::Qualified {
                    owner: segments[0].clone(),
                    path: segments.join("."),
                },
            }
        }
        None if rooted_in_result(model, node) => ArgumentTarget::MethodResult,
        None => return None,
    };
    Some(PredicateArgument {
        target,
        declared_type: model.expression_type(node),
        node,
    })
}

fn rooted_in_result(model: &dyn SemanticModel, node: NodeId) -> bool {
    let mut current = model.tree().strip_parens(node);
    loop {
        match model.kind(current) {
            Some(SyntaxKind::MemberAccess { target, .. }) => {
                current = model.tree().strip_parens(*target);
            }
            Some(SyntaxKind::Invocation { .. }) => return is_result_call(model, current),
            _ => return false,
        }
    }
}
