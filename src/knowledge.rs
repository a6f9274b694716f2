//! Static knowledge base
//!
//! Risk profiles, the three model portfolios and every canned answer the
//! advisor can give. Built once on first use and never mutated.

use crate::models::{InvestmentRecommendation, PortfolioRecommendation, RiskLevel, RiskProfile};
use lazy_static::lazy_static;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

//
// ================= Portfolios =================
//

lazy_static! {
    static ref RISK_PROFILES: HashMap<RiskLevel, RiskProfile> = {
        let mut profiles = HashMap::with_capacity(3);
        profiles.insert(RiskLevel::Conservative, RiskProfile {
            level: RiskLevel::Conservative,
            description: "This profile is suitable for investors who prioritize preserving capital and generating income, with minimal tolerance for volatility. Ideal for those nearing retirement or with short time horizons.",
        });
        profiles.insert(RiskLevel::Moderate, RiskProfile {
            level: RiskLevel::Moderate,
            description: "This profile is suitable for investors seeking a balance between growth and income, with moderate tolerance for market fluctuations. Good for mid-career professionals with medium-term goals.",
        });
        profiles.insert(RiskLevel::Aggressive, RiskProfile {
            level: RiskLevel::Aggressive,
            description: "This profile is suitable for investors focused on long-term growth, with high tolerance for volatility and market fluctuations. Best for younger investors with long time horizons.",
        });
        profiles
    };

    static ref PORTFOLIOS: HashMap<RiskLevel, PortfolioRecommendation> = {
        let mut portfolios = HashMap::with_capacity(3);
        portfolios.insert(RiskLevel::Conservative, PortfolioRecommendation {
            risk_profile: RISK_PROFILES[&RiskLevel::Conservative].clone(),
            recommendations: vec![
                entry("Bonds", 50, "High-quality government and corporate bonds"),
                entry("Stocks", 20, "Blue-chip dividend stocks and value-oriented ETFs"),
                entry("Cash", 15, "Money market funds and short-term CDs"),
                entry("Alternative Investments", 5, "REITs and preferred securities"),
                entry("International Bonds", 10, "Investment-grade foreign bonds"),
            ],
        });
        portfolios.insert(RiskLevel::Moderate, PortfolioRecommendation {
            risk_profile: RISK_PROFILES[&RiskLevel::Moderate].clone(),
            recommendations: vec![
                entry("Stocks", 45, "Mix of growth and value stocks, US and international"),
                entry("Bonds", 30, "Diversified bond portfolio including some high-yield"),
                entry("Alternative Investments", 15, "REITs, commodities, and infrastructure investments"),
                entry("Cash", 5, "Emergency fund and short-term needs"),
                entry("International Stocks", 5, "Emerging markets and developed markets"),
            ],
        });
        portfolios.insert(RiskLevel::Aggressive, PortfolioRecommendation {
            risk_profile: RISK_PROFILES[&RiskLevel::Aggressive].clone(),
            recommendations: vec![
                entry("Stocks", 65, "Growth-oriented stocks and small-cap stocks"),
                entry("Bonds", 10, "Strategic bond allocation for some stability"),
                entry("Alternative Investments", 10, "Private equity and specialized sector ETFs"),
                entry("International Stocks", 15, "Emerging markets and international growth stocks"),
                entry("Cryptocurrency", 0, "Bitcoin, Ethereum, and other digital assets (optional)"),
            ],
        });
        portfolios
    };
}

fn entry(
    asset_class: &'static str,
    allocation: u8,
    description: &'static str,
) -> InvestmentRecommendation {
    InvestmentRecommendation {
        asset_class,
        allocation,
        description,
    }
}

pub fn risk_profile(level: RiskLevel) -> &'static RiskProfile {
    &RISK_PROFILES[&level]
}

pub fn portfolio(level: RiskLevel) -> &'static PortfolioRecommendation {
    &PORTFOLIOS[&level]
}

/// Look up a portfolio by its literal key. Unknown keys are not available.
pub fn portfolio_by_key(key: &str) -> Option<&'static PortfolioRecommendation> {
    RiskLevel::parse(key).map(portfolio)
}

//
// ================= Canned Responses =================
//

pub const GREETING: &str = "Hello! I'm your investment portfolio advisor. How can I help you today? You can ask me about investment strategies, risk profiles, or specific asset classes.";

pub const RISK_ASSESSMENT: &str = "To provide personalized investment advice, I need to understand your risk tolerance. Would you describe your investment approach as conservative (low risk), moderate (balanced), or aggressive (higher risk)? Consider factors like your time horizon, financial goals, and comfort with market volatility.";

pub const CONTEXT_AWARE_PORTFOLIO_INTRO: &str = "Based on our previous conversation about risk tolerance, I can suggest a personalized portfolio allocation. Would you like me to recommend a conservative, moderate, or aggressive portfolio strategy?";

pub const CREATOR_CREDITS: &str = "This application was created by our talented team:\n\n1) Maha Lakshmi Naidu\n2) Varshitha\n3) Manikanta\n\nThey are passionate about making investment management accessible to everyone.";

/// Names listed in the credits, in order
pub const CREATORS: [&str; 3] = ["Maha Lakshmi Naidu", "Varshitha", "Manikanta"];

pub const FALLBACK: &str = "I'm not sure I understand that question. Could you rephrase it? You can ask me about investment strategies, risk profiles, asset classes, or portfolio recommendations.";

/// Lead sentence of a portfolio recommendation
pub fn recommendation_lead(level: Option<RiskLevel>) -> String {
    match level {
        Some(level) => format!(
            "Based on your {} risk profile, here's a recommended portfolio allocation:",
            level
        ),
        None => "I can recommend portfolios for conservative, moderate, or aggressive risk profiles. Which one would you like to learn about?".to_string(),
    }
}

//
// ================= Feature Topics =================
//

pub const DATA_INSIGHTS: &str = "Data-driven insights are crucial for making informed investment decisions. By analyzing market trends, economic indicators, and historical performance data, investors can identify patterns and potential opportunities. 

Some key data points to track include:
1. Price-to-earnings (P/E) ratios
2. Dividend yields
3. Economic indicators like GDP growth and unemployment rates
4. Sector performance trends
5. Volatility measurements

Would you like to know more about specific data metrics that could help with your investment strategy?";

pub const PORTFOLIO_OPTIMIZATION: &str = "Portfolio optimization involves strategically allocating your assets to maximize returns while managing risk based on your investment goals and time horizon.

Key portfolio optimization strategies include:
1. **Asset Allocation**: Dividing your portfolio among different asset classes (stocks, bonds, cash, alternatives)
2. **Diversification**: Spreading investments within asset classes to reduce risk
3. **Rebalancing**: Periodically adjusting your portfolio back to target allocations (typically every 6-12 months)
4. **Tax-efficiency**: Placing investments in accounts that minimize tax impact

Would you like me to explain more about any of these optimization techniques?";

pub const RISK_MANAGEMENT: &str = "Effective risk management is essential for protecting your investment portfolio. Here are some key risk management strategies:

1. **Diversification**: Spreading investments across different assets, sectors, and geographies
2. **Stop-loss orders**: Setting predetermined price points to sell assets and limit losses
3. **Position sizing**: Limiting how much of your portfolio is allocated to any single investment
4. **Hedging**: Using options, inverse ETFs, or other instruments to offset potential losses
5. **Regular assessment**: Periodically reviewing risk exposure as market conditions change

Would you like to discuss any of these risk management techniques in more detail?";

pub const SECURITY: &str = "Investment security is crucial for protecting your financial assets. Here are important security measures to consider:

1. **Brokerage protection**: Ensure your brokerage is covered by SIPC insurance (up to $500,000 per account)
2. **Two-factor authentication**: Always enable this on investment accounts
3. **Regular monitoring**: Check accounts frequently for unauthorized activity
4. **Secure connections**: Only access financial accounts on secure networks
5. **Fraud alerts**: Set up notifications for unusual account activities

Remember that while your investments may fluctuate in value due to market conditions, the security of your accounts should be robust against unauthorized access or fraud.";

pub const PRIVACY: &str = "Privacy in investing is important for protecting your financial information. Here are some privacy considerations:

1. **Data policies**: Review your brokerage's privacy policy to understand how your information is used
2. **Information sharing**: Opt out of information sharing when possible with financial institutions
3. **Digital footprint**: Be cautious about discussing specific investments on public forums
4. **Third-party apps**: Limit financial app connections to only those you fully trust
5. **Credit freezes**: Consider freezing your credit to prevent unauthorized accounts

Financial institutions are required to maintain certain privacy standards under regulations like Regulation S-P in the US, but you should still take active steps to protect your information.";

pub const SUPPORT: &str = "There are many resources available to help you with your investment journey:

1. **Financial advisors**: Professional guidance tailored to your situation
2. **Educational resources**: Books, courses, and reputable financial websites
3. **Brokerage tools**: Research tools, screeners, and educational content from your brokerage
4. **Government resources**: SEC's investor.gov website offers unbiased information
5. **Investment communities**: Forums like Bogleheads for peer discussion (use with caution)

For beginners, I recommend starting with educational resources to build a strong foundation of knowledge before making significant investment decisions. Would you like recommendations for specific resources based on your experience level?";

pub const MARKET_ANALYSIS: &str = "Market analysis helps investors understand current conditions and make informed decisions. Here's what's important to know:

1. **Technical Analysis**: Studying price charts and patterns to predict future movements
2. **Fundamental Analysis**: Evaluating companies based on financial health and economic factors
3. **Sentiment Analysis**: Gauging market psychology and investor emotions
4. **Economic Indicators**: Following data like employment rates, inflation, and GDP growth
5. **Global Events**: Understanding how geopolitical events impact markets

The most successful investors typically combine multiple analysis methods and maintain a long-term perspective despite short-term market fluctuations. Would you like to learn more about a specific type of market analysis?";

//
// ================= Educational Answers =================
//

pub const STOCKS: &str = "Stocks represent ownership in a company and can provide growth through price appreciation and income through dividends. They typically offer higher potential returns but come with higher volatility. Over long periods, U.S. stocks have historically returned around 10% annually, though past performance doesn't guarantee future results.";

pub const BONDS: &str = "Bonds are debt securities that pay interest over a fixed period. They're generally less volatile than stocks and can provide steady income, making them important for more conservative portfolios. Different types include government bonds, municipal bonds, corporate bonds, and high-yield bonds, each with different risk-return profiles.";

pub const ETFS: &str = "ETFs (Exchange-Traded Funds) are investment funds traded on stock exchanges. They typically track indexes and offer diversification, lower fees, and tax efficiency compared to actively managed funds. ETFs come in many varieties, including those focused on specific sectors, geographies, or investment strategies.";

pub const MUTUAL_FUNDS: &str = "Mutual funds pool money from multiple investors to purchase a diversified portfolio of stocks, bonds, or other securities. They offer professional management but typically have higher fees than ETFs. There are actively managed funds that aim to outperform the market and passive funds that track indexes.";

pub const DIVERSIFICATION: &str = "Diversification involves spreading investments across various asset classes to reduce risk. A well-diversified portfolio can help protect against significant losses when one market sector underperforms. The concept is often described as 'not putting all your eggs in one basket' and is considered fundamental to prudent investing.";

pub const TIME_HORIZON: &str = "Your investment time horizon is how long you plan to hold your investments before needing the funds. Longer time horizons generally allow for more aggressive strategies, as there's more time to recover from market downturns. Short-term goals (under 3 years) should typically use more conservative investments.";

pub const RETIREMENT: &str = "Retirement planning involves creating a strategy to ensure financial security during retirement. This typically includes tax-advantaged accounts like 401(k)s or IRAs, and adjusting your portfolio to become more conservative as you approach retirement age. The 4% rule is a common guideline for sustainable withdrawal rates during retirement.";

pub const TAX_EFFICIENCY: &str = "Tax-efficient investing strategies aim to minimize taxes on your investments. This includes utilizing tax-advantaged accounts, holding investments long-term for capital gains treatment, and considering tax-loss harvesting. Municipal bonds may offer tax-free income, making them attractive for investors in higher tax brackets.";

pub const INFLATION: &str = "Inflation erodes purchasing power over time. To combat this, investors should aim for returns that exceed the inflation rate. Stocks, TIPS (Treasury Inflation-Protected Securities), real estate, and some commodities traditionally act as inflation hedges.";

pub const RECESSION: &str = "During economic downturns, defensive assets like high-quality bonds, consumer staples stocks, utilities, and cash typically perform better than growth-oriented investments. Having a diversified portfolio that includes these defensive assets can help mitigate losses during recessions.";

pub const CRYPTO: &str = "Cryptocurrency is a highly volatile alternative asset class with potential for significant returns but also substantial risk. Most financial advisors suggest limiting crypto exposure to no more than 5% of a portfolio, and only for those with high risk tolerance and long time horizons.";

pub const ESG_INVESTING: &str = "ESG (Environmental, Social, and Governance) investing focuses on companies with positive practices in these areas. Research suggests that ESG strategies can match or exceed traditional investment returns while aligning with investors' values and potentially reducing certain types of investment risk.";

//
// ================= Suggested Questions =================
//

/// Starter questions offered under the chat input
pub const SUGGESTED_QUESTIONS: &[&str] = &[
    "What's a conservative portfolio?",
    "How should I invest during inflation?",
    "Tell me about ESG investing",
    "What are ETFs?",
    "How much should I invest for retirement?",
];

/// Feature buttons that send a canned question into the chat
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    DataInsights,
    PortfolioOptimization,
    RiskManagement,
    Security,
    Privacy,
    Support,
    SmartPortfolios,
    MarketAnalysis,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::DataInsights,
        Feature::PortfolioOptimization,
        Feature::RiskManagement,
        Feature::Security,
        Feature::Privacy,
        Feature::Support,
        Feature::SmartPortfolios,
        Feature::MarketAnalysis,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Feature::DataInsights => "data_insights",
            Feature::PortfolioOptimization => "portfolio_optimization",
            Feature::RiskManagement => "risk_management",
            Feature::Security => "security",
            Feature::Privacy => "privacy",
            Feature::Support => "support",
            Feature::SmartPortfolios => "smart_portfolios",
            Feature::MarketAnalysis => "market_analysis",
        }
    }

    pub fn parse(key: &str) -> Option<Feature> {
        let normalized = key.trim().to_lowercase().replace(['-', ' '], "_");
        Feature::ALL.into_iter().find(|f| f.key() == normalized)
    }

    pub fn questions(&self) -> &'static [&'static str] {
        match self {
            Feature::DataInsights => &[
                "Show me market trend analysis",
                "How can I use data to improve my portfolio?",
                "What data points should I track for my investments?",
                "What are the latest market trends?",
                "How do I interpret economic indicators?",
            ],
            Feature::PortfolioOptimization => &[
                "How can I optimize my portfolio?",
                "What is asset allocation?",
                "How often should I rebalance my portfolio?",
                "What's a smart portfolio strategy?",
                "Help me build a balanced investment portfolio",
            ],
            Feature::RiskManagement => &[
                "How can I manage risk in my investments?",
                "What is diversification?",
                "How do I set up stop-loss orders?",
            ],
            Feature::Security => &[
                "How secure are my investments?",
                "What security measures should I look for in investment platforms?",
            ],
            Feature::Privacy => &[
                "How is my financial data protected?",
                "What privacy concerns should I have with online investing?",
            ],
            Feature::Support => &[
                "How can I get help with my investments?",
                "What resources are available for new investors?",
            ],
            Feature::SmartPortfolios => &[
                "What makes a smart portfolio?",
                "How can AI help with portfolio management?",
                "What are modern portfolio strategies?",
            ],
            Feature::MarketAnalysis => &[
                "What's happening in the markets today?",
                "How do I analyze market trends?",
                "What economic indicators should I follow?",
            ],
        }
    }
}

/// Pick one of a feature's questions at random
pub fn random_feature_question<R: Rng + ?Sized>(feature: Feature, rng: &mut R) -> &'static str {
    feature
        .questions()
        .choose(rng)
        .copied()
        .unwrap_or(GREETING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_portfolio_lookup_by_key() {
        for level in RiskLevel::ALL {
            let portfolio = portfolio_by_key(level.as_str()).unwrap();
            assert_eq!(portfolio.level(), level);
            assert_eq!(portfolio.risk_profile, *risk_profile(level));
        }

        assert!(portfolio_by_key("balanced").is_none());
        assert!(portfolio_by_key("Conservative").is_none());
        assert!(portfolio_by_key("").is_none());
    }

    #[test]
    fn test_allocations_sum_to_hundred() {
        for level in RiskLevel::ALL {
            assert_eq!(portfolio(level).total_allocation(), 100, "{}", level);
        }
    }

    #[test]
    fn test_aggressive_crypto_is_optional() {
        let aggressive = portfolio(RiskLevel::Aggressive);
        let crypto = aggressive
            .recommendations
            .iter()
            .find(|r| r.asset_class == "Cryptocurrency")
            .unwrap();
        assert_eq!(crypto.allocation, 0);
        assert_eq!(aggressive.allocated().count(), 4);
    }

    #[test]
    fn test_data_insights_text_kept_verbatim() {
        assert!(DATA_INSIGHTS.contains("potential opportunities. \n\nSome key data points"));
        assert!(DATA_INSIGHTS.ends_with("your investment strategy?"));
    }

    #[test]
    fn test_recommendation_lead() {
        assert_eq!(
            recommendation_lead(Some(RiskLevel::Moderate)),
            "Based on your moderate risk profile, here's a recommended portfolio allocation:"
        );
        assert!(recommendation_lead(None).starts_with("I can recommend portfolios"));
    }

    #[test]
    fn test_feature_questions() {
        let mut rng = StdRng::seed_from_u64(7);
        for feature in Feature::ALL {
            let question = random_feature_question(feature, &mut rng);
            assert!(feature.questions().contains(&question));
        }

        assert_eq!(Feature::parse("Market Analysis"), Some(Feature::MarketAnalysis));
        assert_eq!(Feature::parse("risk-management"), Some(Feature::RiskManagement));
        assert_eq!(Feature::parse("weather"), None);
    }
}
