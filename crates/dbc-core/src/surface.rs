//! Surface format: nested, serde-friendly statements and expressions.
//!
//! The syntax arena is flat and ID-based, which is convenient for analysis
//! but awkward to write by hand. [`Expr`] and [`Stmt`] are the nested form
//! used for JSON program descriptions and for building test programs; the
//! `lower_*` functions add them to a [`SyntaxTree`] bottom-up.
//!
//! ```text
//! { "kind": "expr", "expr": { "kind": "call",
//!     "callee": { "kind": "member", "target": { "kind": "ident", "name": "Contract" }, "member": "Requires" },
//!     "args": [ ... ] } }
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::CoreError;
use crate::function::{FunctionKind, FunctionSignature, Parameter};
use crate::id::NodeId;
use crate::program::Program;
use crate::symbols::{SymbolTable, TypeInfo};
use crate::syntax::{BinaryOp, Literal, LoopKind, SyntaxKind, UnaryOp};
use crate::tree::SyntaxTree;
use crate::types::{TypeRef, Visibility};

/// A nested expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Ident {
        name: String,
    },
    Member {
        target: Box<Expr>,
        member: String,
    },
    Call {
        callee: Box<Expr>,
        #[serde(default)]
        type_args: Vec<TypeRef>,
        #[serde(default)]
        args: Vec<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Null,
    Bool {
        value: bool,
    },
    Int {
        value: i64,
    },
    Str {
        value: String,
    },
    New {
        ty: TypeRef,
        #[serde(default)]
        args: Vec<Expr>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Paren {
        inner: Box<Expr>,
    },
    Other {
        text: String,
    },
}

impl Expr {
    pub fn ident(name: &str) -> Expr {
        Expr::Ident { name: name.into() }
    }

    pub fn member(target: Expr, member: &str) -> Expr {
        Expr::Member {
            target: Box::new(target),
            member: member.into(),
        }
    }

    /// A dotted identifier chain: `path("System.String.Empty")`.
    pub fn path(dotted: &str) -> Expr {
        let mut segments = dotted.split('.');
        let first = Expr::ident(segments.next().unwrap_or_default());
        segments.fold(first, Expr::member)
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
        Expr::generic_call(callee, Vec::new(), args)
    }

    pub fn generic_call(callee: Expr, type_args: Vec<TypeRef>, args: Vec<Expr>) -> Expr {
        Expr::Call {
            callee: Box::new(callee),
            type_args,
            args,
        }
    }

    /// A call through a dotted path: `invoke("Contract.Requires", args)`.
    pub fn invoke(dotted: &str, args: Vec<Expr>) -> Expr {
        Expr::call(Expr::path(dotted), args)
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn eq(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Equal, lhs, rhs)
    }

    pub fn ne(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::NotEqual, lhs, rhs)
    }

    pub fn and(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::And, lhs, rhs)
    }

    pub fn or(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Or, lhs, rhs)
    }

    pub fn not(operand: Expr) -> Expr {
        Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        }
    }

    pub fn null() -> Expr {
        Expr::Null
    }

    pub fn string(value: &str) -> Expr {
        Expr::Str {
            value: value.into(),
        }
    }

    pub fn int(value: i64) -> Expr {
        Expr::Int { value }
    }

    pub fn new_object(ty: TypeRef, args: Vec<Expr>) -> Expr {
        Expr::New { ty, args }
    }

    pub fn assign(target: Expr, value: Expr) -> Expr {
        Expr::Assign {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    pub fn paren(inner: Expr) -> Expr {
        Expr::Paren {
            inner: Box::new(inner),
        }
    }
}

/// One `catch` clause of a [`Stmt::Try`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    #[serde(default)]
    pub exception_type: Option<TypeRef>,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

/// A nested statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stmt {
    Expr {
        expr: Expr,
    },
    Local {
        name: String,
        #[serde(default)]
        ty: Option<TypeRef>,
        #[serde(default)]
        init: Option<Expr>,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        #[serde(default)]
        else_branch: Option<Box<Stmt>>,
    },
    Block {
        #[serde(default)]
        statements: Vec<Stmt>,
    },
    Throw {
        #[serde(default)]
        expr: Option<Expr>,
    },
    Return {
        #[serde(default)]
        expr: Option<Expr>,
    },
    Loop {
        loop_kind: LoopKind,
        #[serde(default)]
        condition: Option<Expr>,
        body: Box<Stmt>,
    },
    Switch {
        subject: Expr,
        #[serde(default)]
        sections: Vec<Vec<Stmt>>,
    },
    Try {
        body: Vec<Stmt>,
        #[serde(default)]
        catches: Vec<CatchClause>,
        #[serde(default)]
        finally: Option<Vec<Stmt>>,
    },
    Using {
        #[serde(default)]
        resource: Option<Expr>,
        #[serde(default)]
        body: Vec<Stmt>,
    },
    Other {
        text: String,
    },
}

impl Stmt {
    pub fn expr(expr: Expr) -> Stmt {
        Stmt::Expr { expr }
    }

    /// An expression statement calling a dotted path.
    pub fn call(dotted: &str, args: Vec<Expr>) -> Stmt {
        Stmt::expr(Expr::invoke(dotted, args))
    }

    pub fn local(name: &str, ty: Option<TypeRef>, init: Option<Expr>) -> Stmt {
        Stmt::Local {
            name: name.into(),
            ty,
            init,
        }
    }

    pub fn if_then(condition: Expr, then_branch: Stmt) -> Stmt {
        Stmt::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch: None,
        }
    }

    pub fn if_else(condition: Expr, then_branch: Stmt, else_branch: Stmt) -> Stmt {
        Stmt::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch: Some(Box::new(else_branch)),
        }
    }

    pub fn block(statements: Vec<Stmt>) -> Stmt {
        Stmt::Block { statements }
    }

    pub fn throw(expr: Expr) -> Stmt {
        Stmt::Throw { expr: Some(expr) }
    }

    pub fn ret(expr: Option<Expr>) -> Stmt {
        Stmt::Return { expr }
    }

    pub fn while_loop(condition: Expr, body: Vec<Stmt>) -> Stmt {
        Stmt::Loop {
            loop_kind: LoopKind::While,
            condition: Some(condition),
            body: Box::new(Stmt::block(body)),
        }
    }

    pub fn try_catch(body: Vec<Stmt>, catches: Vec<CatchClause>) -> Stmt {
        Stmt::Try {
            body,
            catches,
            finally: None,
        }
    }

    pub fn try_finally(body: Vec<Stmt>, finally: Vec<Stmt>) -> Stmt {
        Stmt::Try {
            body,
            catches: Vec::new(),
            finally: Some(finally),
        }
    }

    pub fn using(resource: Option<Expr>, body: Vec<Stmt>) -> Stmt {
        Stmt::Using { resource, body }
    }

    pub fn other(text: &str) -> Stmt {
        Stmt::Other { text: text.into() }
    }
}

// ---------------------------------------------------------------------------
// Lowering
// ---------------------------------------------------------------------------

/// Adds an expression and all of its subexpressions to the tree.
pub fn lower_expression(tree: &mut SyntaxTree, expr: &Expr) -> Result<NodeId, CoreError> {
    let kind = match expr {
        Expr::Ident { name } => SyntaxKind::Identifier { name: name.clone() },
        Expr::Member { target, member } => SyntaxKind::MemberAccess {
            target: lower_expression(tree, target)?,
            member: member.clone(),
        },
        Expr::Call {
            callee,
            type_args,
            args,
        } => {
            let callee = lower_expression(tree, callee)?;
            let args = args
                .iter()
                .map(|arg| lower_expression(tree, arg))
                .collect::<Result<SmallVec<[NodeId; 2]>, _>>()?;
            SyntaxKind::Invocation {
                callee,
                type_args: type_args.clone(),
                args,
            }
        }
        Expr::Binary { op, lhs, rhs } => SyntaxKind::Binary {
            op: *op,
            lhs: lower_expression(tree, lhs)?,
            rhs: lower_expression(tree, rhs)?,
        },
        Expr::Unary { op, operand } => SyntaxKind::Unary {
            op: *op,
            operand: lower_expression(tree, operand)?,
        },
        Expr::Null => SyntaxKind::Literal(Literal::Null),
        Expr::Bool { value } => SyntaxKind::Literal(Literal::Bool(*value)),
        Expr::Int { value } => SyntaxKind::Literal(Literal::Int(*value)),
        Expr::Str { value } => SyntaxKind::Literal(Literal::String(value.clone())),
        Expr::New { ty, args } => SyntaxKind::ObjectCreation {
            ty: ty.clone(),
            args: lower_expressions(tree, args)?,
        },
        Expr::Assign { target, value } => SyntaxKind::Assignment {
            target: lower_expression(tree, target)?,
            value: lower_expression(tree, value)?,
        },
        Expr::Paren { inner } => SyntaxKind::Parenthesized {
            inner: lower_expression(tree, inner)?,
        },
        Expr::Other { text } => SyntaxKind::OtherExpression { text: text.clone() },
    };
    tree.add(kind)
}

fn lower_expressions(tree: &mut SyntaxTree, exprs: &[Expr]) -> Result<Vec<NodeId>, CoreError> {
    exprs.iter().map(|e| lower_expression(tree, e)).collect()
}

fn lower_optional(tree: &mut SyntaxTree, expr: &Option<Expr>) -> Result<Option<NodeId>, CoreError> {
    expr.as_ref().map(|e| lower_expression(tree, e)).transpose()
}

/// Adds a statement (and everything nested in it) to the tree.
pub fn lower_statement(tree: &mut SyntaxTree, stmt: &Stmt) -> Result<NodeId, CoreError> {
    let kind = match stmt {
        Stmt::Expr { expr } => SyntaxKind::ExpressionStatement {
            expr: lower_expression(tree, expr)?,
        },
        Stmt::Local { name, ty, init } => SyntaxKind::LocalDeclaration {
            name: name.clone(),
            ty: ty.clone(),
            init: lower_optional(tree, init)?,
        },
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => SyntaxKind::If {
            condition: lower_expression(tree, condition)?,
            then_branch: lower_statement(tree, then_branch)?,
            else_branch: else_branch
                .as_deref()
                .map(|s| lower_statement(tree, s))
                .transpose()?,
        },
        Stmt::Block { statements } => return lower_block(tree, statements),
        Stmt::Throw { expr } => SyntaxKind::Throw {
            expr: lower_optional(tree, expr)?,
        },
        Stmt::Return { expr } => SyntaxKind::Return {
            expr: lower_optional(tree, expr)?,
        },
        Stmt::Loop {
            loop_kind,
            condition,
            body,
        } => SyntaxKind::Loop {
            kind: *loop_kind,
            condition: lower_optional(tree, condition)?,
            body: lower_statement(tree, body)?,
        },
        Stmt::Switch { subject, sections } => {
            let subject = lower_expression(tree, subject)?;
            let mut lowered = Vec::with_capacity(sections.len());
            for section in sections {
                let statements = lower_statements(tree, section)?;
                lowered.push(tree.add(SyntaxKind::SwitchSection { statements })?);
            }
            SyntaxKind::Switch {
                subject,
                sections: lowered,
            }
        }
        Stmt::Try {
            body,
            catches,
            finally,
        } => {
            let body = lower_block(tree, body)?;
            let mut lowered = Vec::with_capacity(catches.len());
            for clause in catches {
                let catch_body = lower_block(tree, &clause.body)?;
                lowered.push(tree.add(SyntaxKind::Catch {
                    exception_type: clause.exception_type.clone(),
                    body: catch_body,
                })?);
            }
            let finally = finally
                .as_ref()
                .map(|f| lower_block(tree, f))
                .transpose()?;
            SyntaxKind::Try {
                body,
                catches: lowered,
                finally,
            }
        }
        Stmt::Using { resource, body } => SyntaxKind::Using {
            resource: lower_optional(tree, resource)?,
            body: lower_block(tree, body)?,
        },
        Stmt::Other { text } => SyntaxKind::OtherStatement { text: text.clone() },
    };
    tree.add(kind)
}

fn lower_statements(tree: &mut SyntaxTree, stmts: &[Stmt]) -> Result<Vec<NodeId>, CoreError> {
    stmts.iter().map(|s| lower_statement(tree, s)).collect()
}

/// Lowers a statement list into a `Block` node.
pub fn lower_block(tree: &mut SyntaxTree, stmts: &[Stmt]) -> Result<NodeId, CoreError> {
    let statements = lower_statements(tree, stmts)?;
    tree.add(SyntaxKind::Block { statements })
}

// ---------------------------------------------------------------------------
// Program descriptions
// ---------------------------------------------------------------------------

/// A function declaration with a nested body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSource {
    #[serde(flatten)]
    pub signature: FunctionSignature,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

impl FunctionSource {
    /// A public, void, parameterless method on `declaring_type`.
    pub fn new(declaring_type: &str, name: &str, body: Vec<Stmt>) -> Self {
        FunctionSource {
            signature: FunctionSignature::method(declaring_type, name),
            body,
        }
    }

    pub fn returning(mut self, ty: TypeRef) -> Self {
        self.signature.return_type = ty;
        self
    }

    pub fn with_param(mut self, name: &str, ty: TypeRef) -> Self {
        self.signature.params.push(Parameter::new(name, ty));
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.signature.visibility = visibility;
        self
    }

    pub fn kind(mut self, kind: FunctionKind) -> Self {
        self.signature.kind = kind;
        self
    }

    pub fn asynchronous(mut self) -> Self {
        self.signature.is_async = true;
        self
    }

    pub fn iterator(mut self) -> Self {
        self.signature.is_iterator = true;
        self
    }
}

/// A whole program description: user types plus functions.
///
/// Built-in types are always available and must not be redeclared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramSource {
    #[serde(default)]
    pub types: Vec<TypeInfo>,
    #[serde(default)]
    pub functions: Vec<FunctionSource>,
}

impl ProgramSource {
    pub fn new() -> Self {
        ProgramSource::default()
    }

    pub fn with_type(mut self, info: TypeInfo) -> Self {
        self.types.push(info);
        self
    }

    pub fn with_function(mut self, function: FunctionSource) -> Self {
        self.functions.push(function);
        self
    }

    /// Registers the types and lowers every function body into one program.
    pub fn into_program(self) -> Result<Program, CoreError> {
        let mut symbols = SymbolTable::new();
        for info in self.types {
            symbols.register(info)?;
        }
        let mut program = Program::new(symbols);
        for function in self.functions {
            let body = lower_block(program.tree_mut(), &function.body)?;
            program.add_function(function.signature, body)?;
        }
        Ok(program)
    }
}
