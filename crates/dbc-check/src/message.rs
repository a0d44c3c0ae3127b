//! Message model: the optional user message of an assertion call.

use dbc_core::{Literal, MemberInfo, NodeId, SemanticModel, SyntaxKind, Visibility};
use serde::{Deserialize, Serialize};

/// What the message argument of an assertion is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "message", content = "value", rename_all = "snake_case")]
pub enum Message {
    /// No message argument, or a shape that is not modelled.
    NoMessage,
    StringLiteral(String),
    /// A field or property, e.g. `Messages.NameRequired`.
    StaticMemberReference(MemberInfo),
    /// A method call producing the message.
    InvocationMessage(NodeId),
}

impl Message {
    /// Short description for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Message::NoMessage => "no message".into(),
            Message::StringLiteral(text) => format!("\"{}\"", text),
            Message::StaticMemberReference(member) => {
                format!("{}.{}", member.declaring_type, member.name)
            }
            Message::InvocationMessage(_) => "method call".into(),
        }
    }
}

/// Reads the message from the (optional) message argument of a call.
pub fn extract_message(model: &dyn SemanticModel, argument: Option<NodeId>) -> Message {
    let Some(argument) = argument else {
        return Message::NoMessage;
    };
    let node = model.tree().strip_parens(argument);
    match model.kind(node) {
        Some(SyntaxKind::Literal(Literal::String(text))) => Message::StringLiteral(text.clone()),
        Some(SyntaxKind::Invocation { .. }) => Message::InvocationMessage(node),
        Some(SyntaxKind::Identifier { .. } | SyntaxKind::MemberAccess { .. }) => model
            .resolve_member(node)
            .map(|member| Message::StaticMemberReference(member.clone()))
            .unwrap_or(Message::NoMessage),
        _ => Message::NoMessage,
    }
}

/// Returns `true` if the message may appear inside a contract call.
///
/// Member references must be static and at least internal once combined
/// with the declaring type's visibility. Invocations are never allowed.
pub fn is_valid_contract_message(model: &dyn SemanticModel, message: &Message) -> bool {
    match message {
        Message::NoMessage | Message::StringLiteral(_) => true,
        Message::StaticMemberReference(member) => {
            let owner = model
                .symbols()
                .effective_visibility(&member.declaring_type)
                .unwrap_or(Visibility::Public);
            member.is_static && member.visibility.combine(owner).is_at_least(Visibility::Internal)
        }
        Message::InvocationMessage(_) => false,
    }
}
