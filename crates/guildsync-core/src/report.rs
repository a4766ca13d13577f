use crate::directive::Directive;
use crate::types::CommunityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// OutcomeStatus
// ---------------------------------------------------------------------------

/// Per-community result of applying a directive. Closed enum: rendering maps
/// every variant through a total `match`, so adding a status without a label
/// is a compile error, not a runtime fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The action was applied.
    Applied,
    /// Nothing to do: precondition state did not hold (not in server,
    /// not banned, not muted).
    NotApplicable,
    /// The bot is not a member of the community.
    AbsentBot,
    /// The bot lacks the capability the action family requires.
    NoPermission,
    /// The target is a moderator-equivalent there; refused.
    ProtectedTarget,
    /// Unexpected failure from the platform; message captured in `detail`.
    Error,
}

impl OutcomeStatus {
    pub fn all() -> [OutcomeStatus; 6] {
        [
            OutcomeStatus::Applied,
            OutcomeStatus::NotApplicable,
            OutcomeStatus::AbsentBot,
            OutcomeStatus::NoPermission,
            OutcomeStatus::ProtectedTarget,
            OutcomeStatus::Error,
        ]
    }
}

// ---------------------------------------------------------------------------
// ActionOutcome
// ---------------------------------------------------------------------------

/// Display reference to a community: id plus the name resolved at dispatch
/// time ("unknown (<id>)" when the bot could not resolve it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityRef {
    pub id: CommunityId,
    pub name: String,
}

impl CommunityRef {
    pub fn new(id: CommunityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn unknown(id: CommunityId) -> Self {
        Self {
            id,
            name: format!("unknown ({id})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub community: CommunityRef,
    pub status: OutcomeStatus,
    /// Human annotation: precondition that failed, captured error message,
    /// or capability flags for a status query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ActionOutcome {
    pub fn new(community: CommunityRef, status: OutcomeStatus) -> Self {
        Self {
            community,
            status,
            detail: None,
        }
    }

    pub fn with_detail(
        community: CommunityRef,
        status: OutcomeStatus,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            community,
            status,
            detail: Some(detail.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// The result of one orchestration run. Created per invocation, consumed
/// once by the reporter, never persisted.
///
/// Either `rejection` is set and `outcomes` is empty (a pre-dispatch guard
/// fired), or `outcomes` has exactly one entry per targeted community, in
/// dispatch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub directive: Directive,
    pub issued_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
    pub outcomes: Vec<ActionOutcome>,
}

impl Report {
    pub fn new(directive: Directive) -> Self {
        Self {
            id: Uuid::new_v4(),
            directive,
            issued_at: Utc::now(),
            rejection: None,
            outcomes: Vec::new(),
        }
    }

    /// A run refused before any community was contacted.
    pub fn rejected(directive: Directive, reason: impl Into<String>) -> Self {
        Self {
            rejection: Some(reason.into()),
            ..Self::new(directive)
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
