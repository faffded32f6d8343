use chrono::{DateTime, Utc};
use crate::domain::models::policy::{CancellationOutcome, CancellationPolicy, CancellationResult};
use crate::domain::models::session::Session;

/// Who initiated the cancellation. Admin and system actors bypass the fee
/// tiers entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationActor {
    Client,
    Coach,
    Admin,
    System,
}

impl CancellationActor {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "client" => Some(Self::Client),
            "coach" => Some(Self::Coach),
            "admin" => Some(Self::Admin),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Admin | Self::System)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Coach => "coach",
            Self::Admin => "admin",
            Self::System => "system",
        }
    }
}

/// Evaluates the cancellation policy for a session. Never fails for
/// well-formed input; callers must check `is_allowed` instead of expecting
/// an error.
pub fn evaluate(
    policy: &CancellationPolicy,
    session: &Session,
    actor: CancellationActor,
    now: DateTime<Utc>,
) -> CancellationResult {
    if session.is_terminal() {
        return CancellationResult {
            outcome: CancellationOutcome::FullFee,
            fee_cents: 0,
            refund_percentage: 0,
            message: format!("Session cannot be cancelled in status {}", session.status),
            is_allowed: false,
        };
    }

    let hours_until = (session.scheduled_at - now).num_minutes() as f64 / 60.0;

    if actor.is_privileged() {
        return CancellationResult {
            outcome: CancellationOutcome::Free,
            fee_cents: 0,
            refund_percentage: 100,
            message: format!("Cancelled by {} with full refund", actor.label()),
            is_allowed: true,
        };
    }

    if hours_until >= policy.free_window_hours {
        return CancellationResult {
            outcome: CancellationOutcome::Free,
            fee_cents: 0,
            refund_percentage: 100,
            message: format!(
                "Free cancellation ({:.0} or more hours notice)",
                policy.free_window_hours
            ),
            is_allowed: true,
        };
    }

    // Tiers are ordered by decreasing threshold; the first tier not exceeding
    // the remaining time applies. A session already past its start matches
    // no tier and keeps the full fee.
    let refund = policy
        .fee_tiers
        .iter()
        .find(|tier| tier.hours_before <= hours_until)
        .map(|tier| tier.refund_percentage)
        .unwrap_or(0);

    let fee_cents = session.rate_cents * (100 - refund as i64) / 100;

    let (outcome, message) = match refund {
        100 => (
            CancellationOutcome::Free,
            "Free cancellation".to_string(),
        ),
        0 => (
            CancellationOutcome::FullFee,
            format!("No refund ({:.1} hours before session)", hours_until.max(0.0)),
        ),
        pct => (
            CancellationOutcome::Partial,
            format!("{}% refund ({:.1} hours before session)", pct, hours_until),
        ),
    };

    CancellationResult {
        outcome,
        fee_cents,
        refund_percentage: refund,
        message,
        is_allowed: true,
    }
}

/// Builds the reason string persisted on the cancelled session.
pub fn build_reason(
    actor: CancellationActor,
    result: &CancellationResult,
    free_text: Option<&str>,
    refund_requested: bool,
    reschedule_requested: bool,
) -> String {
    let mut reason = format!(
        "Cancelled by {}: {} (fee {} cents)",
        actor.label(),
        result.message,
        result.fee_cents
    );
    if let Some(text) = free_text
        && !text.is_empty()
    {
        reason.push_str(&format!(". Reason: {}", text));
    }
    if refund_requested {
        reason.push_str(". Refund requested");
    }
    if reschedule_requested {
        reason.push_str(". Reschedule requested");
    }
    reason
}
