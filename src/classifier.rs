//! Response Engine
//!
//! Maps free text to one of the advisor's topic buckets with an ordered
//! list of keyword rules. The first rule that matches wins, so a later,
//! more specific rule never overrides an earlier one.

use crate::formatter::format_portfolio_recommendation;
use crate::intents::{mentioned_risk_level, Intent};
use crate::knowledge;
use crate::transcript::{ChatMessage, Role};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One entry in the cascade
struct Rule {
    intent: Intent,
    /// Also needs a risk level word in the input
    requires_risk_level: bool,
}

const fn rule(intent: Intent) -> Rule {
    Rule {
        intent,
        requires_risk_level: false,
    }
}

/// Evaluation order. Precedence is exactly the order of this table.
const RULES: &[Rule] = &[
    rule(Intent::Creator),
    Rule {
        intent: Intent::ChartRequest,
        requires_risk_level: true,
    },
    rule(Intent::Greeting),
    rule(Intent::RiskAssessment),
    rule(Intent::DataInsights),
    rule(Intent::PortfolioOptimization),
    rule(Intent::RiskManagement),
    rule(Intent::Security),
    rule(Intent::Privacy),
    rule(Intent::Support),
    rule(Intent::MarketAnalysis),
    rule(Intent::PortfolioGeneral),
    rule(Intent::Stocks),
    rule(Intent::Bonds),
    rule(Intent::Etfs),
    rule(Intent::MutualFunds),
    rule(Intent::Diversification),
    rule(Intent::TimeHorizon),
    rule(Intent::Retirement),
    rule(Intent::TaxEfficiency),
    rule(Intent::Inflation),
    rule(Intent::Recession),
    rule(Intent::Crypto),
    rule(Intent::Esg),
];

/// What the engine reads from earlier turns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversationContext {
    /// The assistant already asked the user for their risk tolerance
    pub risk_prompt_delivered: bool,
}

impl ConversationContext {
    pub fn from_history(prior: &[ChatMessage]) -> Self {
        Self {
            risk_prompt_delivered: prior
                .iter()
                .any(|m| m.role == Role::Assistant && m.content == knowledge::RISK_ASSESSMENT),
        }
    }
}

/// Engine output for one message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reply {
    pub intent: Intent,
    pub text: String,
}

/// Which bucket a message falls into. Never fails: unmatched input is `Fallback`.
pub fn classify(message: &str) -> Intent {
    let lower = message.to_lowercase();
    classify_lower(&lower)
}

fn classify_lower(lower: &str) -> Intent {
    RULES
        .iter()
        .find(|rule| {
            rule.intent.matches(lower)
                && (!rule.requires_risk_level || mentioned_risk_level(lower).is_some())
        })
        .map(|rule| rule.intent)
        .unwrap_or(Intent::Fallback)
}

/// Answer text for an already classified message. Total for every intent:
/// a chart request that names no risk level gets the generic lead.
pub fn respond(intent: Intent, message: &str, prior: &[ChatMessage]) -> String {
    let lower = message.to_lowercase();
    respond_lower(intent, &lower, ConversationContext::from_history(prior))
}

fn respond_lower(intent: Intent, lower: &str, context: ConversationContext) -> String {
    match intent {
        Intent::Creator => knowledge::CREATOR_CREDITS.to_string(),
        Intent::ChartRequest => match mentioned_risk_level(lower) {
            Some(level) => format!(
                "{}\n\n{}",
                knowledge::recommendation_lead(Some(level)),
                format_portfolio_recommendation(knowledge::portfolio(level))
            ),
            None => knowledge::recommendation_lead(None),
        },
        Intent::Greeting => knowledge::GREETING.to_string(),
        Intent::RiskAssessment => {
            if context.risk_prompt_delivered {
                knowledge::CONTEXT_AWARE_PORTFOLIO_INTRO.to_string()
            } else {
                knowledge::RISK_ASSESSMENT.to_string()
            }
        }
        Intent::DataInsights => knowledge::DATA_INSIGHTS.to_string(),
        Intent::PortfolioOptimization => knowledge::PORTFOLIO_OPTIMIZATION.to_string(),
        Intent::RiskManagement => knowledge::RISK_MANAGEMENT.to_string(),
        Intent::Security => knowledge::SECURITY.to_string(),
        Intent::Privacy => knowledge::PRIVACY.to_string(),
        Intent::Support => knowledge::SUPPORT.to_string(),
        Intent::MarketAnalysis => knowledge::MARKET_ANALYSIS.to_string(),
        // Lead sentence only, never the allocation block
        Intent::PortfolioGeneral => knowledge::recommendation_lead(mentioned_risk_level(lower)),
        Intent::Stocks => knowledge::STOCKS.to_string(),
        Intent::Bonds => knowledge::BONDS.to_string(),
        Intent::Etfs => knowledge::ETFS.to_string(),
        Intent::MutualFunds => knowledge::MUTUAL_FUNDS.to_string(),
        Intent::Diversification => knowledge::DIVERSIFICATION.to_string(),
        Intent::TimeHorizon => knowledge::TIME_HORIZON.to_string(),
        Intent::Retirement => knowledge::RETIREMENT.to_string(),
        Intent::TaxEfficiency => knowledge::TAX_EFFICIENCY.to_string(),
        Intent::Inflation => knowledge::INFLATION.to_string(),
        Intent::Recession => knowledge::RECESSION.to_string(),
        Intent::Crypto => knowledge::CRYPTO.to_string(),
        Intent::Esg => knowledge::ESG_INVESTING.to_string(),
        Intent::Fallback => knowledge::FALLBACK.to_string(),
    }
}

/// Classify and answer in one step
pub fn answer(message: &str, prior: &[ChatMessage]) -> Reply {
    let lower = message.to_lowercase();
    let context = ConversationContext::from_history(prior);
    let intent = classify_lower(&lower);

    debug!(?intent, history_len = prior.len(), "Rule matched");

    Reply {
        intent,
        text: respond_lower(intent, &lower, context),
    }
}

/// Answer text for a message given the conversation so far
pub fn generate_response(message: &str, prior: &[ChatMessage]) -> String {
    answer(message, prior).text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(message: &str) -> String {
        generate_response(message, &[])
    }

    #[test]
    fn test_fallback() {
        for input in ["", "   ", "xyz", "what about the weather?", "42"] {
            assert_eq!(reply(input), knowledge::FALLBACK, "input: {:?}", input);
            assert_eq!(classify(input), Intent::Fallback);
        }
    }

    #[test]
    fn test_creator_lists_three_names() {
        let text = reply("who created this");
        assert_eq!(classify("who created this"), Intent::Creator);
        for name in knowledge::CREATORS {
            assert!(text.contains(name));
        }
        let numbered = text
            .lines()
            .filter(|l| l.chars().next().is_some_and(|c| c.is_ascii_digit()))
            .count();
        assert_eq!(numbered, 3);
    }

    #[test]
    fn test_conservative_portfolio_question() {
        let text = reply("What's a conservative portfolio?");
        assert!(text.starts_with(
            "Based on your conservative risk profile, here's a recommended portfolio allocation:"
        ));
        assert!(!text.contains("**Recommended Allocation:**"));
    }

    #[test]
    fn test_generic_portfolio_without_level() {
        assert_eq!(reply("any advice on asset classes?"), knowledge::recommendation_lead(None));
    }

    #[test]
    fn test_chart_request_with_level() {
        let text = reply("Show me a graph of the aggressive portfolio");
        assert_eq!(classify("show graph for moderate"), Intent::ChartRequest);
        assert!(text.starts_with(&knowledge::recommendation_lead(Some(
            crate::models::RiskLevel::Aggressive
        ))));
        assert!(text.contains("**Aggressive Portfolio**"));
        assert!(!text.contains("Cryptocurrency"));
    }

    #[test]
    fn test_chart_request_without_level_falls_through() {
        assert_eq!(classify("show me a graph"), Intent::Fallback);
        assert_eq!(classify("show portfolio"), Intent::PortfolioGeneral);
    }

    #[test]
    fn test_feature_topic_beats_asset_class() {
        let text = reply("portfolio optimization with stocks");
        assert_eq!(text, knowledge::PORTFOLIO_OPTIMIZATION);
        assert_ne!(text, knowledge::STOCKS);
    }

    #[test]
    fn test_precedence_follows_table() {
        // greeting comes before risk
        assert_eq!(classify("hey, what is my risk?"), Intent::Greeting);
        // risk vocabulary shadows the risk management topic
        assert_eq!(classify("risk management tips"), Intent::RiskAssessment);
        // generic portfolio vocabulary shadows diversification
        assert_eq!(classify("allocation ideas"), Intent::PortfolioGeneral);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(reply("TELL ME ABOUT ETFS"), reply("tell me about etfs"));
        assert_eq!(reply("tell me about etfs"), knowledge::ETFS);
    }

    #[test]
    fn test_asset_class_answers() {
        let cases = [
            ("what are bonds", knowledge::BONDS),
            ("mutual fund basics", knowledge::MUTUAL_FUNDS),
            ("is bitcoin safe", knowledge::CRYPTO),
            ("esg please", knowledge::ESG_INVESTING),
            ("tell me about inflation", knowledge::INFLATION),
            ("bear market ahead?", knowledge::RECESSION),
            ("planning to retire early", knowledge::RETIREMENT),
            ("do i pay tax on gains", knowledge::TAX_EFFICIENCY),
            ("long term or short term", knowledge::TIME_HORIZON),
            ("should i spread my money", knowledge::DIVERSIFICATION),
            ("equities explained", knowledge::STOCKS),
        ];

        for (input, expected) in cases {
            assert_eq!(reply(input), expected, "input: {}", input);
        }
    }

    const FEATURE_TOPICS: [(Intent, &str); 7] = [
        (Intent::DataInsights, knowledge::DATA_INSIGHTS),
        (Intent::PortfolioOptimization, knowledge::PORTFOLIO_OPTIMIZATION),
        (Intent::RiskManagement, knowledge::RISK_MANAGEMENT),
        (Intent::Security, knowledge::SECURITY),
        (Intent::Privacy, knowledge::PRIVACY),
        (Intent::Support, knowledge::SUPPORT),
        (Intent::MarketAnalysis, knowledge::MARKET_ANALYSIS),
    ];

    fn rank(intent: Intent) -> usize {
        RULES
            .iter()
            .position(|rule| rule.intent == intent)
            .unwrap_or(RULES.len())
    }

    #[test]
    fn test_feature_topic_answers() {
        let cases = [
            ("show me data-driven insights", knowledge::DATA_INSIGHTS),
            ("explain economic indicators", knowledge::DATA_INSIGHTS),
            ("how often should i rebalance", knowledge::PORTFOLIO_OPTIMIZATION),
            ("how does a stop-loss order work", knowledge::RISK_MANAGEMENT),
            ("is hedging worth it", knowledge::RISK_MANAGEMENT),
            ("what security measures do you use", knowledge::SECURITY),
            ("is my financial data safe", knowledge::PRIVACY),
            ("where can i find learning resources", knowledge::SUPPORT),
            ("what's happening in the markets", knowledge::MARKET_ANALYSIS),
            ("give me a market analysis", knowledge::MARKET_ANALYSIS),
        ];

        for (input, expected) in cases {
            assert_eq!(reply(input), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_feature_keywords_answer_or_are_shadowed() {
        for (intent, paragraph) in FEATURE_TOPICS {
            let mut reachable = 0;
            for keyword in intent.keywords() {
                let winner = classify(keyword);
                if winner == intent {
                    reachable += 1;
                    assert_eq!(reply(keyword), paragraph, "keyword: {}", keyword);
                } else {
                    // only an earlier rule may take a topic keyword
                    assert!(
                        rank(winner) < rank(intent),
                        "keyword {:?} fell to {:?}",
                        keyword,
                        winner
                    );
                }
            }
            assert!(reachable > 0, "{:?} has no reachable keyword", intent);
        }

        // shadowed by the risk rule and by data insights respectively
        assert_eq!(classify("manage risk"), Intent::RiskAssessment);
        assert_eq!(classify("analyze market trends"), Intent::DataInsights);
    }

    #[test]
    fn test_greeting_text() {
        assert_eq!(
            reply("Hello there"),
            "Hello! I'm your investment portfolio advisor. How can I help you today? You can ask me about investment strategies, risk profiles, or specific asset classes."
        );
        assert_eq!(classify("greetings"), Intent::Greeting);
    }

    #[test]
    fn test_respond_is_total() {
        assert_eq!(
            respond(Intent::ChartRequest, "show me a graph", &[]),
            knowledge::recommendation_lead(None)
        );
        assert_eq!(respond(Intent::Fallback, "", &[]), knowledge::FALLBACK);

        let prior = vec![ChatMessage::assistant(knowledge::RISK_ASSESSMENT)];
        assert_eq!(
            respond(Intent::RiskAssessment, "my tolerance is low", &prior),
            knowledge::CONTEXT_AWARE_PORTFOLIO_INTRO
        );
    }

    #[test]
    fn test_risk_prompt_not_repeated() {
        let first = reply("what is my risk tolerance");
        assert_eq!(first, knowledge::RISK_ASSESSMENT);

        let prior = vec![
            ChatMessage::user("what is my risk tolerance"),
            ChatMessage::assistant(first),
        ];
        assert_eq!(
            generate_response("i am comfortable with risk", &prior),
            knowledge::CONTEXT_AWARE_PORTFOLIO_INTRO
        );
    }

    #[test]
    fn test_greeting_in_history_does_not_count_as_risk() {
        let prior = vec![ChatMessage::assistant(knowledge::GREETING)];
        assert_eq!(
            generate_response("assessment please", &prior),
            knowledge::RISK_ASSESSMENT
        );
    }
}
