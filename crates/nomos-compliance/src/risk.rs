//! Inherent Risk Scoring
//!
//! Risk score is `probability × impact` on a 1–5 × 1–5 grid, so the score
//! always lands in 1..=25. Tiers are fixed bands over that range:
//!
//! | Tier   | Score   |
//! |--------|---------|
//! | LOW    | 1 – 8   |
//! | MEDIUM | 9 – 17  |
//! | HIGH   | 18 – 25 |

use serde::{Deserialize, Serialize};

/// One axis of the risk grid (probability or impact), always within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct RiskFactor(u8);

impl RiskFactor {
    /// Lowest grid value
    pub const MIN: u8 = 1;
    /// Highest grid value
    pub const MAX: u8 = 5;

    /// Create factor, clamping into the grid
    pub fn new(value: u8) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    /// Create factor, `None` outside 1..=5
    pub fn try_new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    /// Grid value in 1..=5
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for RiskFactor {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl From<u8> for RiskFactor {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<RiskFactor> for u8 {
    fn from(factor: RiskFactor) -> Self {
        factor.0
    }
}

/// Risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// All tiers, lowest first
    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Medium, RiskTier::High];

    /// Inclusive score band
    pub fn bounds(self) -> (u8, u8) {
        match self {
            Self::Low => (1, 8),
            Self::Medium => (9, 17),
            Self::High => (18, 25),
        }
    }

    /// Tier for a score; LOW when the score is outside every band
    pub fn from_score(score: u8) -> Self {
        Self::ALL
            .into_iter()
            .find(|tier| {
                let (min, max) = tier.bounds();
                (min..=max).contains(&score)
            })
            .unwrap_or(Self::Low)
    }

    /// Stable code, as serialized
    pub fn code(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// Tenant-facing label, used in maintenance matrix keys
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Baixo",
            Self::Medium => "Médio",
            Self::High => "Alto",
        }
    }

    /// Parse a code or tenant label, case-insensitive ("medio" accepted unaccented)
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        if value == "medio" {
            return Some(Self::Medium);
        }
        Self::ALL.into_iter().find(|tier| {
            value == tier.code().to_lowercase() || value == tier.label().to_lowercase()
        })
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Score and tier, always derived together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub probability: RiskFactor,
    pub impact: RiskFactor,
    pub score: u8,
    pub tier: RiskTier,
}

impl Default for RiskAssessment {
    fn default() -> Self {
        score(RiskFactor::default(), RiskFactor::default())
    }
}

/// Score a probability/impact pair
pub fn score(probability: RiskFactor, impact: RiskFactor) -> RiskAssessment {
    let score = probability.value() * impact.value();
    RiskAssessment {
        probability,
        impact,
        score,
        tier: RiskTier::from_score(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RiskTier::from_score(1), RiskTier::Low);
        assert_eq!(RiskTier::from_score(8), RiskTier::Low);
        assert_eq!(RiskTier::from_score(9), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(17), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(18), RiskTier::High);
        assert_eq!(RiskTier::from_score(25), RiskTier::High);
    }

    #[test]
    fn test_out_of_band_defaults_low() {
        assert_eq!(RiskTier::from_score(0), RiskTier::Low);
        assert_eq!(RiskTier::from_score(26), RiskTier::Low);
    }

    #[test]
    fn test_factor_clamps() {
        assert_eq!(RiskFactor::new(0).value(), 1);
        assert_eq!(RiskFactor::new(9).value(), 5);
        let parsed: RiskFactor = serde_json::from_str("7").unwrap();
        assert_eq!(parsed.value(), 5);
    }

    #[test]
    fn test_try_new_rejects_off_grid() {
        assert_eq!(RiskFactor::try_new(1).map(|f| f.value()), Some(1));
        assert_eq!(RiskFactor::try_new(5).map(|f| f.value()), Some(5));
        assert!(RiskFactor::try_new(0).is_none());
        assert!(RiskFactor::try_new(6).is_none());
    }

    #[test]
    fn test_score_grid_corners() {
        let low = score(RiskFactor::new(2), RiskFactor::new(4));
        assert_eq!((low.score, low.tier), (8, RiskTier::Low));

        let medium = score(RiskFactor::new(3), RiskFactor::new(3));
        assert_eq!((medium.score, medium.tier), (9, RiskTier::Medium));

        let high = score(RiskFactor::new(5), RiskFactor::new(4));
        assert_eq!((high.score, high.tier), (20, RiskTier::High));
    }

    #[test]
    fn test_parse_tier() {
        assert_eq!(RiskTier::parse("high"), Some(RiskTier::High));
        assert_eq!(RiskTier::parse("Médio"), Some(RiskTier::Medium));
        assert_eq!(RiskTier::parse("medio"), Some(RiskTier::Medium));
        assert_eq!(RiskTier::parse("Baixo"), Some(RiskTier::Low));
        assert_eq!(RiskTier::parse("severe"), None);
    }

    proptest! {
        #[test]
        fn prop_score_is_product_and_tier_matches_band(p in 1u8..=5, i in 1u8..=5) {
            let assessment = score(RiskFactor::new(p), RiskFactor::new(i));
            prop_assert_eq!(assessment.score, p * i);
            let (min, max) = assessment.tier.bounds();
            prop_assert!(min <= assessment.score && assessment.score <= max);
        }
    }
}
