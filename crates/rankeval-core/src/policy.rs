//! Gain and discount policies for NDCG scoring.
//!
//! The defaults are linear gain over rank-derived grades and the usual
//! logarithmic position discount:
//!
//! ```text
//! gain(grade)   = grade
//! discount(i)   = 1 / log2(i + 1)        (i is 1-indexed)
//! ```
//!
//! Both are selectable from the `[evaluation]` table of the config file:
//!
//! ```toml
//! [evaluation]
//! depth = 20
//! gain = "exponential"     # 2^grade - 1
//! discount = "reciprocal"  # 1 / i
//! ```

use serde::{Deserialize, Serialize};

/// Default cutoff depth applied to both rankings before scoring.
pub const DEFAULT_DEPTH: usize = 20;

/// Maps a relevance grade to a gain value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gain {
    /// `gain = grade`.
    #[default]
    Linear,
    /// `gain = 2^grade - 1`.
    Exponential,
}

impl Gain {
    #[must_use]
    pub fn apply(self, grade: usize) -> f64 {
        let grade = as_f64(grade);
        match self {
            Self::Linear => grade,
            Self::Exponential => grade.exp2() - 1.0,
        }
    }

    /// `apply(grade)` divided by a factor that depends only on `top`, the
    /// highest grade of the list being scored.
    ///
    /// NDCG is a ratio of two sums over the same grades, so the factor
    /// cancels. Exponential gain is taken relative to `2^top`, which keeps
    /// every term in `[0, 1)` where `apply` would overflow past grade 1023.
    #[must_use]
    pub fn relative(self, grade: usize, top: usize) -> f64 {
        match self {
            Self::Linear => self.apply(grade),
            Self::Exponential => {
                let top = as_f64(top);
                (as_f64(grade) - top).exp2() - (-top).exp2()
            }
        }
    }
}

fn as_f64(n: usize) -> f64 {
    f64::from(u32::try_from(n).unwrap_or(u32::MAX))
}

/// Weight applied to the gain at a 1-indexed rank position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discount {
    /// `1 / log2(position + 1)`.
    #[default]
    Logarithmic,
    /// `1 / position`.
    Reciprocal,
}

impl Discount {
    /// Multiplier for the 1-indexed `position`. Position 0 is treated as 1.
    #[must_use]
    pub fn weight(self, position: usize) -> f64 {
        let position = as_f64(position.max(1));
        match self {
            Self::Logarithmic => 1.0 / (position + 1.0).log2(),
            Self::Reciprocal => 1.0 / position,
        }
    }
}

/// Complete scoring configuration: cutoff depth plus gain and discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    #[serde(default = "default_depth")]
    pub depth: usize,
    #[serde(default)]
    pub gain: Gain,
    #[serde(default)]
    pub discount: Discount,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            gain: Gain::default(),
            discount: Discount::default(),
        }
    }
}

const fn default_depth() -> usize {
    DEFAULT_DEPTH
}
