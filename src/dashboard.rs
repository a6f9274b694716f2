//! Sample dashboard data
//!
//! Hard-coded figures for the portfolio and investments pages.

use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PerformancePoint {
    pub month: &'static str,
    pub value: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Holding {
    pub name: &'static str,
    pub value: f64,
    /// Percent change today
    pub day_change: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PortfolioOverview {
    pub total_value: f64,
    pub day_change: f64,
    pub holdings: Vec<Holding>,
    pub performance: Vec<PerformancePoint>,
}

impl PortfolioOverview {
    /// Share of the total held in each holding, in percent
    pub fn weights(&self) -> Vec<(&'static str, f64)> {
        let total: f64 = self.holdings.iter().map(|h| h.value).sum();
        self.holdings
            .iter()
            .map(|h| (h.name, if total > 0.0 { h.value / total * 100.0 } else { 0.0 }))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeaturedFund {
    pub name: &'static str,
    pub risk_level: &'static str,
    pub five_year_return: f64,
    pub min_investment: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendedInvestment {
    pub name: &'static str,
    pub category: &'static str,
    pub risk: &'static str,
    pub one_year_return: f64,
    pub five_year_return: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InvestmentsOverview {
    pub featured: Vec<FeaturedFund>,
    pub recommended: Vec<RecommendedInvestment>,
}

pub fn portfolio_overview() -> PortfolioOverview {
    PortfolioOverview {
        total_value: 128_450.00,
        day_change: 5.3,
        holdings: vec![
            Holding { name: "Stocks", value: 84_320.00, day_change: 2.7 },
            Holding { name: "Bonds", value: 36_240.00, day_change: 0.5 },
            Holding { name: "Cash", value: 7_890.00, day_change: -0.2 },
        ],
        performance: vec![
            PerformancePoint { month: "Jan", value: 100_000 },
            PerformancePoint { month: "Feb", value: 105_000 },
            PerformancePoint { month: "Mar", value: 108_000 },
            PerformancePoint { month: "Apr", value: 112_000 },
            PerformancePoint { month: "May", value: 115_000 },
            PerformancePoint { month: "Jun", value: 128_450 },
        ],
    }
}

pub fn investments_overview() -> InvestmentsOverview {
    InvestmentsOverview {
        featured: vec![
            FeaturedFund {
                name: "Tech Growth Fund",
                risk_level: "Moderate",
                five_year_return: 68.45,
                min_investment: 1_000,
            },
            FeaturedFund {
                name: "Sustainable Energy",
                risk_level: "High",
                five_year_return: 81.32,
                min_investment: 2_500,
            },
            FeaturedFund {
                name: "Global Bond Index",
                risk_level: "Low",
                five_year_return: 12.25,
                min_investment: 500,
            },
        ],
        recommended: vec![
            RecommendedInvestment {
                name: "S&P 500 Index Fund",
                category: "Equity",
                risk: "Medium",
                one_year_return: 12.7,
                five_year_return: 53.2,
            },
            RecommendedInvestment {
                name: "Total Bond Market ETF",
                category: "Fixed Income",
                risk: "Low",
                one_year_return: -2.1,
                five_year_return: 8.3,
            },
            RecommendedInvestment {
                name: "Emerging Markets Fund",
                category: "Equity",
                risk: "High",
                one_year_return: 7.4,
                five_year_return: 34.8,
            },
            RecommendedInvestment {
                name: "REIT Index Fund",
                category: "Real Estate",
                risk: "Medium",
                one_year_return: -4.2,
                five_year_return: 22.1,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holdings_add_up_to_total() {
        let overview = portfolio_overview();
        let sum: f64 = overview.holdings.iter().map(|h| h.value).sum();
        assert!((sum - overview.total_value).abs() < 0.01);
        assert_eq!(overview.performance.last().unwrap().value, 128_450);
    }

    #[test]
    fn test_weights() {
        let weights = portfolio_overview().weights();
        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert_eq!(weights[0].0, "Stocks");
    }

    #[test]
    fn test_investments() {
        let overview = investments_overview();
        assert_eq!(overview.featured.len(), 3);
        assert_eq!(overview.recommended.len(), 4);
    }
}
