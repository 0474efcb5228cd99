use super::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// A CVSS v3.1 base score in the closed interval [0.0, 10.0].
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    /// Round up to one decimal place.
    ///
    /// This is the v3.1 "round up" rule, not round-to-nearest: 4.21 becomes
    /// 4.3, and only exact one-decimal values pass through unchanged.
    pub fn roundup(value: f64) -> Self {
        Self((value * 10.0).ceil() / 10.0)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn severity(&self) -> Severity {
        self.0.into()
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}
