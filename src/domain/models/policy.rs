use serde::{Deserialize, Serialize};

/// Maps time-before-session to refund percentage. Loaded from configuration,
/// immutable per evaluation, never persisted per-session.
#[derive(Debug, Clone)]
pub struct CancellationPolicy {
    pub free_window_hours: f64,
    /// Ordered by decreasing hours-before-session threshold.
    pub fee_tiers: Vec<FeeTier>,
}

#[derive(Debug, Clone, Copy)]
pub struct FeeTier {
    pub hours_before: f64,
    pub refund_percentage: u8,
}

impl Default for CancellationPolicy {
    fn default() -> Self {
        Self {
            free_window_hours: 24.0,
            fee_tiers: vec![
                FeeTier { hours_before: 12.0, refund_percentage: 50 },
                FeeTier { hours_before: 0.0, refund_percentage: 0 },
            ],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CancellationOutcome {
    Free,
    Partial,
    FullFee,
}

/// Transient evaluation result; only the derived reason string is persisted
/// on the session. Callers must branch on `is_allowed` - evaluation itself
/// never fails for well-formed input.
#[derive(Debug, Serialize, Clone)]
pub struct CancellationResult {
    #[serde(rename = "type")]
    pub outcome: CancellationOutcome,
    pub fee_cents: i64,
    pub refund_percentage: u8,
    pub message: String,
    pub is_allowed: bool,
}
