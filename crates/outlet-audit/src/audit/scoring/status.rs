use serde::{Deserialize, Serialize};

/// Minimum OK percentage for a [`ScoreStatus::Good`] rating.
pub const GOOD_THRESHOLD: f64 = 85.0;
/// Minimum OK percentage for a [`ScoreStatus::Warning`] rating.
pub const WARNING_THRESHOLD: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreStatus {
    Good,
    Warning,
    Critical,
}

impl ScoreStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Good, Self::Warning, Self::Critical]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }

    /// Hex colour the dashboard renders for the status badge.
    pub const fn color(self) -> &'static str {
        match self {
            Self::Good => "#4CAF50",
            Self::Warning => "#FF9800",
            Self::Critical => "#F44336",
        }
    }
}

/// Rate an OK percentage. Lower bounds are inclusive; NaN and infinities rate Critical.
pub fn classify(ok_percentage: f64) -> ScoreStatus {
    if !ok_percentage.is_finite() {
        return ScoreStatus::Critical;
    }

    if ok_percentage >= GOOD_THRESHOLD {
        ScoreStatus::Good
    } else if ok_percentage >= WARNING_THRESHOLD {
        ScoreStatus::Warning
    } else {
        ScoreStatus::Critical
    }
}
