//! Shared keyword table
//!
//! One list of phrases per intent. The response engine and the chart
//! trigger both read from here so they cannot drift apart.

use crate::models::RiskLevel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Creator,
    ChartRequest,
    Greeting,
    RiskAssessment,
    // Feature topics
    DataInsights,
    PortfolioOptimization,
    RiskManagement,
    Security,
    Privacy,
    Support,
    MarketAnalysis,
    // Generic portfolio vocabulary
    PortfolioGeneral,
    // Asset classes and topics
    Stocks,
    Bonds,
    Etfs,
    MutualFunds,
    Diversification,
    TimeHorizon,
    Retirement,
    TaxEfficiency,
    Inflation,
    Recession,
    Crypto,
    Esg,
    Fallback,
}

impl Intent {
    /// Phrases that trigger this intent (lowercase, substring match)
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Intent::Creator => &["who created", "creators", "team", "who made", "developers"],
            Intent::ChartRequest => &[
                "show graph",
                "display graph",
                "portfolio graph",
                "give me the graph",
                "show me a graph",
                "give me a graph",
                "display a chart",
                "show portfolio",
                "portfolio visualization",
            ],
            Intent::Greeting => &["hello", "hi", "hey", "greetings"],
            Intent::RiskAssessment => &["risk", "profile", "assessment", "tolerance", "comfortable"],
            Intent::DataInsights => &[
                "data-driven insights",
                "market trend",
                "data to improve",
                "data points",
                "economic indicators",
            ],
            Intent::PortfolioOptimization => &[
                "portfolio optimization",
                "optimize my portfolio",
                "asset allocation",
                "rebalance",
                "smart portfolio",
            ],
            Intent::RiskManagement => &["risk management", "manage risk", "stop-loss", "hedging"],
            Intent::Security => &["security", "secure investments", "security measures"],
            Intent::Privacy => &["privacy", "financial data", "data protected"],
            Intent::Support => &["support", "help with investments", "resources"],
            Intent::MarketAnalysis => &[
                "market analysis",
                "happening in the markets",
                "analyze market trends",
            ],
            Intent::PortfolioGeneral => &[
                "portfolio",
                "recommend",
                "allocation",
                "asset",
                "invest",
                "strategy",
            ],
            Intent::Stocks => &["stocks", "equities", "shares"],
            Intent::Bonds => &["bonds", "fixed income", "treasury"],
            Intent::Etfs => &["etf", "exchange traded", "exchange-traded"],
            Intent::MutualFunds => &["mutual fund", "fund"],
            Intent::Diversification => &["diversif", "spread", "allocation"],
            Intent::TimeHorizon => &["time horizon", "long term", "short term"],
            Intent::Retirement => &["retire", "pension", "401k", "ira"],
            Intent::TaxEfficiency => &["tax", "efficient", "taxes"],
            Intent::Inflation => &["inflation", "rising prices"],
            Intent::Recession => &["recession", "economic downturn", "bear market"],
            Intent::Crypto => &["crypto", "bitcoin", "ethereum", "blockchain"],
            Intent::Esg => &["esg", "sustainable", "ethical", "responsible"],
            Intent::Fallback => &[],
        }
    }

    /// Whether already-lowercased text contains any of this intent's phrases
    pub fn matches(&self, lower: &str) -> bool {
        contains_any(lower, self.keywords())
    }
}

/// Case-sensitive substring test. Callers lowercase first.
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

/// First risk word present, tried in conservative, moderate, aggressive order
pub fn mentioned_risk_level(lower: &str) -> Option<RiskLevel> {
    RiskLevel::ALL
        .into_iter()
        .find(|level| lower.contains(level.as_str()))
}

/// Phrases in a reply that mark a portfolio as being recommended
pub fn portfolio_phrases(level: RiskLevel) -> [&'static str; 2] {
    match level {
        RiskLevel::Conservative => ["conservative portfolio", "conservative allocation"],
        RiskLevel::Moderate => ["moderate portfolio", "moderate allocation"],
        RiskLevel::Aggressive => ["aggressive portfolio", "aggressive allocation"],
    }
}
