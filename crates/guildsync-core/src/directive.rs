use crate::types::UserId;
use serde::{Deserialize, Serialize};

/// Reason recorded when the operator supplies none.
pub const DEFAULT_REASON: &str = "No reason provided";

// ---------------------------------------------------------------------------
// DirectiveKind
// ---------------------------------------------------------------------------

/// The action family of a directive.
///
/// A closed sum type so dispatch is exhaustive `match`, never string routing.
/// `Mute` carries the raw duration token as entered by the operator; it is
/// parsed (and validated) once by the orchestrator's pre-dispatch guards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DirectiveKind {
    Ban,
    Mute { duration: String },
    Unmute,
    Unban,
    StatusQuery,
}

impl DirectiveKind {
    /// Uppercase action name used in report headers and audit records.
    pub fn action_name(&self) -> &'static str {
        match self {
            DirectiveKind::Ban => "BAN",
            DirectiveKind::Mute { .. } => "MUTE",
            DirectiveKind::Unmute => "UNMUTE",
            DirectiveKind::Unban => "UNBAN",
            DirectiveKind::StatusQuery => "STATUS",
        }
    }
}

// ---------------------------------------------------------------------------
// Directive
// ---------------------------------------------------------------------------

/// One moderation instruction issued by an operator, covering one target
/// across all configured communities. Immutable once created.
///
/// `target` is `None` only for [`DirectiveKind::StatusQuery`]; the provided
/// constructors maintain that invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub target: Option<UserId>,
    pub actor: UserId,
    pub reason: String,
}

impl Directive {
    pub fn ban(target: UserId, actor: UserId, reason: Option<String>) -> Self {
        Self {
            kind: DirectiveKind::Ban,
            target: Some(target),
            actor,
            reason: reason.unwrap_or_else(|| DEFAULT_REASON.to_string()),
        }
    }

    pub fn mute(
        target: UserId,
        actor: UserId,
        duration: impl Into<String>,
        reason: Option<String>,
    ) -> Self {
        Self {
            kind: DirectiveKind::Mute {
                duration: duration.into(),
            },
            target: Some(target),
            actor,
            reason: reason.unwrap_or_else(|| DEFAULT_REASON.to_string()),
        }
    }

    pub fn unmute(target: UserId, actor: UserId) -> Self {
        Self {
            kind: DirectiveKind::Unmute,
            target: Some(target),
            actor,
            reason: "Manual unmute".to_string(),
        }
    }

    pub fn unban(target: UserId, actor: UserId) -> Self {
        Self {
            kind: DirectiveKind::Unban,
            target: Some(target),
            actor,
            reason: "Manual unban".to_string(),
        }
    }

    pub fn status_query(actor: UserId) -> Self {
        Self {
            kind: DirectiveKind::StatusQuery,
            target: None,
            actor,
            reason: String::new(),
        }
    }

    /// The mute duration token, when this is a mute directive.
    pub fn duration_token(&self) -> Option<&str> {
        match &self.kind {
            DirectiveKind::Mute { duration } => Some(duration),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
