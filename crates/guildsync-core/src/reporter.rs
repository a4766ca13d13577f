use crate::directive::DirectiveKind;
use crate::gateway::CommunityGateway;
use crate::report::{OutcomeStatus, Report};
use crate::types::ChannelId;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Status labels
// ---------------------------------------------------------------------------

/// Human label for each outcome status. Total over the closed enum: a new
/// status without a label fails to compile.
pub fn status_label(status: OutcomeStatus) -> &'static str {
    match status {
        OutcomeStatus::Applied => "applied",
        OutcomeStatus::NotApplicable => "nothing to do",
        OutcomeStatus::AbsentBot => "bot not in community",
        OutcomeStatus::NoPermission => "missing permission",
        OutcomeStatus::ProtectedTarget => "target is a moderator",
        OutcomeStatus::Error => "failed",
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render a report as a plain-text summary: one header block, then outcomes
/// grouped by status in a fixed order. Pure function of the report.
pub fn render(report: &Report) -> String {
    let d = &report.directive;
    let mut out = String::new();

    out.push_str(d.kind.action_name());
    if let Some(target) = d.target {
        out.push_str(&format!(" target={target}"));
    }
    out.push_str(&format!(" actor={}", d.actor));
    out.push('\n');

    if !d.reason.is_empty() {
        out.push_str(&format!("reason: {}\n", d.reason));
    }
    if let DirectiveKind::Mute { duration } = &d.kind {
        out.push_str(&format!("duration: {duration}\n"));
    }

    if let Some(rejection) = &report.rejection {
        out.push_str(&format!("rejected: {rejection}\n"));
        return out;
    }

    for status in OutcomeStatus::all() {
        let group: Vec<_> = report
            .outcomes
            .iter()
            .filter(|o| o.status == status)
            .collect();
        if group.is_empty() {
            continue;
        }
        out.push_str(&format!("{}:\n", status_label(status)));
        for outcome in group {
            match &outcome.detail {
                Some(detail) => {
                    out.push_str(&format!("  - {} ({detail})\n", outcome.community.name))
                }
                None => out.push_str(&format!("  - {}\n", outcome.community.name)),
            }
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Reporter
// ---------------------------------------------------------------------------

/// Renders reports and mirrors them to the audit destination.
///
/// Mirroring is strictly best-effort: an unset channel skips silently and a
/// delivery failure is logged at `warn`, never surfaced to the invoker.
pub struct Reporter {
    gateway: Arc<dyn CommunityGateway>,
    audit_channel: Option<ChannelId>,
}

impl Reporter {
    pub fn new(gateway: Arc<dyn CommunityGateway>, audit_channel: Option<ChannelId>) -> Self {
        Self {
            gateway,
            audit_channel,
        }
    }

    /// Render `report` and mirror the text to the audit channel.
    /// Returns the rendered summary for the invoker.
    pub async fn deliver(&self, report: &Report) -> String {
        let text = render(report);
        if let Some(channel) = self.audit_channel {
            if let Err(e) = self.gateway.send_audit(channel, &text).await {
                tracing::warn!(%channel, error = %e, "audit mirror failed");
            }
        }
        text
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::Directive;
    use crate::report::{ActionOutcome, CommunityRef};
    use crate::types::{CommunityId, UserId};

    fn sample_report() -> Report {
        let mut report = Report::new(Directive::ban(UserId(20), UserId(10), Some("spam".into())));
        report.outcomes = vec![
            ActionOutcome::new(
                CommunityRef::new(CommunityId(1), "Alpha"),
                OutcomeStatus::Applied,
            ),
            ActionOutcome::with_detail(
                CommunityRef::new(CommunityId(2), "Beta"),
                OutcomeStatus::Error,
                "api timeout",
            ),
            ActionOutcome::new(
                CommunityRef::new(CommunityId(3), "Gamma"),
                OutcomeStatus::Applied,
            ),
        ];
        report
    }

    #[test]
    fn render_groups_outcomes_by_status() {
        let text = render(&sample_report());
        assert!(text.starts_with("BAN target=20 actor=10\n"));
        assert!(text.contains("reason: spam\n"));

        let applied_at = text.find("applied:").unwrap();
        let failed_at = text.find("failed:").unwrap();
        assert!(applied_at < failed_at, "groups render in fixed status order");

        // Both applied communities sit in one group.
        let applied_block = &text[applied_at..failed_at];
        assert!(applied_block.contains("- Alpha"));
        assert!(applied_block.contains("- Gamma"));
        assert!(text.contains("- Beta (api timeout)"));
    }

    #[test]
    fn render_rejection_short_circuits_outcomes() {
        let report = Report::rejected(
            Directive::mute(UserId(20), UserId(10), "10x", None),
            "invalid duration '10x'",
        );
        let text = render(&report);
        assert!(text.contains("rejected: invalid duration '10x'"));
        assert!(text.contains("duration: 10x"));
        assert!(!text.contains("applied"));
    }

    mod deliver {
        use super::*;
        use crate::gateway::{CommunityProfile, MemberProfile};
        use crate::types::ChannelId;
        use crate::{Result, SyncError};
        use async_trait::async_trait;
        use std::sync::Mutex;

        /// Audit-only gateway double; the reporter never touches the
        /// moderation surface.
        #[derive(Default)]
        struct AuditSink {
            sent: Mutex<Vec<(ChannelId, String)>>,
            fail: bool,
        }

        #[async_trait]
        impl CommunityGateway for AuditSink {
            fn bot_user(&self) -> UserId {
                UserId(1)
            }
            async fn community_profile(
                &self,
                _: CommunityId,
            ) -> Result<Option<CommunityProfile>> {
                unreachable!("reporter only sends audit messages")
            }
            async fn member_profile(
                &self,
                _: CommunityId,
                _: UserId,
            ) -> Result<Option<MemberProfile>> {
                unreachable!("reporter only sends audit messages")
            }
            async fn is_banned(&self, _: CommunityId, _: UserId) -> Result<bool> {
                unreachable!("reporter only sends audit messages")
            }
            async fn ban(&self, _: CommunityId, _: UserId, _: &str) -> Result<()> {
                unreachable!("reporter only sends audit messages")
            }
            async fn unban(&self, _: CommunityId, _: UserId, _: &str) -> Result<()> {
                unreachable!("reporter only sends audit messages")
            }
            async fn mute(&self, _: CommunityId, _: UserId, _: u64, _: &str) -> Result<()> {
                unreachable!("reporter only sends audit messages")
            }
            async fn unmute(&self, _: CommunityId, _: UserId, _: &str) -> Result<()> {
                unreachable!("reporter only sends audit messages")
            }
            async fn send_audit(&self, channel: ChannelId, message: &str) -> Result<()> {
                if self.fail {
                    return Err(SyncError::Gateway("audit channel unavailable".into()));
                }
                self.sent.lock().unwrap().push((channel, message.to_string()));
                Ok(())
            }
        }

        #[tokio::test]
        async fn deliver_mirrors_to_audit_channel() {
            let sink = Arc::new(AuditSink::default());
            let reporter = Reporter::new(Arc::clone(&sink) as _, Some(ChannelId(42)));
            let text = reporter.deliver(&sample_report()).await;

            let sent = sink.sent.lock().unwrap();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].0, ChannelId(42));
            assert_eq!(sent[0].1, text);
        }

        #[tokio::test]
        async fn deliver_without_channel_skips_mirror() {
            let sink = Arc::new(AuditSink::default());
            let reporter = Reporter::new(Arc::clone(&sink) as _, None);
            let text = reporter.deliver(&sample_report()).await;
            assert!(text.contains("BAN"));
            assert!(sink.sent.lock().unwrap().is_empty());
        }

        #[tokio::test]
        async fn deliver_swallows_audit_failure() {
            let sink = Arc::new(AuditSink {
                fail: true,
                ..Default::default()
            });
            let reporter = Reporter::new(Arc::clone(&sink) as _, Some(ChannelId(42)));
            // The summary still comes back to the invoker.
            let text = reporter.deliver(&sample_report()).await;
            assert!(text.contains("- Beta (api timeout)"));
        }
    }

    #[test]
    fn every_status_has_a_label() {
        for status in OutcomeStatus::all() {
            assert!(!status_label(status).is_empty());
        }
    }

    #[test]
    fn labels_are_distinct() {
        let labels: Vec<_> = OutcomeStatus::all().map(status_label).to_vec();
        let mut dedup = labels.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(labels.len(), dedup.len());
    }
}
