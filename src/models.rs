//! Core data models for the portfolio advisor

use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskLevel {
    /// Every level, in the order keyword checks try them
    pub const ALL: [RiskLevel; 3] = [
        RiskLevel::Conservative,
        RiskLevel::Moderate,
        RiskLevel::Aggressive,
    ];

    /// Lowercase key used for lookups and keyword matching
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Conservative => "conservative",
            RiskLevel::Moderate => "moderate",
            RiskLevel::Aggressive => "aggressive",
        }
    }

    /// Capitalised display name
    pub fn title(&self) -> &'static str {
        match self {
            RiskLevel::Conservative => "Conservative",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::Aggressive => "Aggressive",
        }
    }

    /// Parse one of the literal keys. Anything else is `None`.
    pub fn parse(key: &str) -> Option<RiskLevel> {
        match key {
            "conservative" => Some(RiskLevel::Conservative),
            "moderate" => Some(RiskLevel::Moderate),
            "aggressive" => Some(RiskLevel::Aggressive),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//
// ================= Portfolio =================
//

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RiskProfile {
    pub level: RiskLevel,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InvestmentRecommendation {
    pub asset_class: &'static str,
    /// Percent of the portfolio, 0 means optional and not allocated
    pub allocation: u8,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PortfolioRecommendation {
    pub risk_profile: RiskProfile,
    pub recommendations: Vec<InvestmentRecommendation>,
}

impl PortfolioRecommendation {
    pub fn level(&self) -> RiskLevel {
        self.risk_profile.level
    }

    /// Entries with a non-zero allocation, in display order
    pub fn allocated(&self) -> impl Iterator<Item = &InvestmentRecommendation> {
        self.recommendations.iter().filter(|r| r.allocation > 0)
    }

    pub fn total_allocation(&self) -> u32 {
        self.recommendations.iter().map(|r| r.allocation as u32).sum()
    }
}

//
// ================= Chart =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartSlice {
    pub name: String,
    pub value: u8,
    pub description: String,
    pub color: String,
}
