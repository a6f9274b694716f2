//! Portfolio visualization
//!
//! Decides when the allocation chart is shown and builds the slices for
//! the most recently recommended portfolio.

use crate::intents::{contains_any, portfolio_phrases, Intent};
use crate::knowledge;
use crate::models::{ChartSlice, RiskLevel};
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_COLOR: &str = "#A0AEC0";

fn asset_color(asset_class: &str) -> &'static str {
    match asset_class {
        "Stocks" => "#38B2AC",
        "Bonds" => "#4299E1",
        "Cash" => "#ECC94B",
        "Alternative Investments" => "#9F7AEA",
        "International Bonds" => "#2B6CB0",
        "International Stocks" => "#4FD1C5",
        "Cryptocurrency" => "#F687B3",
        _ => DEFAULT_COLOR,
    }
}

/// Does the user's own message ask to see the chart?
pub fn wants_chart(user_message: &str) -> bool {
    Intent::ChartRequest.matches(&user_message.to_lowercase())
}

/// Which portfolio, if any, a reply is recommending
pub fn detect_portfolio(response: &str) -> Option<RiskLevel> {
    let lower = response.to_lowercase();
    RiskLevel::ALL
        .into_iter()
        .find(|level| contains_any(&lower, &portfolio_phrases(*level)))
}

/// Chart panel state carried across turns
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartState {
    /// Sticky until a later reply recommends a different portfolio
    pub current: Option<RiskLevel>,
    pub visible: bool,
}

impl ChartState {
    /// Update after a turn. Detection runs first, so a portfolio
    /// recommended in this very reply can be shown right away.
    pub fn apply_turn(&mut self, user_message: &str, response: &str) {
        if let Some(level) = detect_portfolio(response) {
            self.current = Some(level);
        }

        self.visible = wants_chart(user_message) && self.current.is_some();

        debug!(current = ?self.current, visible = self.visible, "Chart state updated");
    }

    /// The chart to render, if the panel is visible
    pub fn view(&self) -> Option<ChartView> {
        match (self.visible, self.current) {
            (true, Some(level)) => Some(chart_for(level)),
            _ => None,
        }
    }
}

/// Render-ready chart for one portfolio
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChartView {
    Available {
        title: String,
        slices: Vec<ChartSlice>,
    },
    NotAvailable {
        message: String,
    },
}

pub fn chart_for(level: RiskLevel) -> ChartView {
    let portfolio = knowledge::portfolio(level);

    let slices = portfolio
        .allocated()
        .map(|rec| ChartSlice {
            name: rec.asset_class.to_string(),
            value: rec.allocation,
            description: rec.description.to_string(),
            color: asset_color(rec.asset_class).to_string(),
        })
        .collect();

    ChartView::Available {
        title: format!("{} Portfolio Allocation", level.title()),
        slices,
    }
}

/// Chart lookup by literal key. Unknown keys are reported, not errors.
pub fn chart_view(key: &str) -> ChartView {
    match RiskLevel::parse(key) {
        Some(level) => chart_for(level),
        None => ChartView::NotAvailable {
            message: "Portfolio data not available".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::generate_response;

    #[test]
    fn test_no_chart_without_current_portfolio() {
        let mut state = ChartState::default();
        state.apply_turn("show me a graph", "I'm not sure I understand that question.");

        assert!(!state.visible);
        assert!(state.view().is_none());
    }

    #[test]
    fn test_chart_after_recommendation() {
        let mut state = ChartState::default();

        let first = generate_response("give me the graph for a moderate mix", &[]);
        state.apply_turn("give me the graph for a moderate mix", &first);
        assert_eq!(state.current, Some(RiskLevel::Moderate));
        assert!(state.visible);

        // Later turn without show intent hides the panel but keeps the portfolio
        state.apply_turn("what are bonds", "Bonds are debt securities.");
        assert!(!state.visible);
        assert_eq!(state.current, Some(RiskLevel::Moderate));
    }

    #[test]
    fn test_sticky_portfolio_shown_on_later_request() {
        let mut state = ChartState {
            current: Some(RiskLevel::Aggressive),
            visible: false,
        };

        let message = "show me a graph of the aggressive portfolio";
        let response = generate_response(message, &[]);
        state.apply_turn(message, &response);

        assert!(state.visible);
        match state.view() {
            Some(ChartView::Available { title, .. }) => {
                assert_eq!(title, "Aggressive Portfolio Allocation")
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[test]
    fn test_detect_portfolio() {
        assert_eq!(
            detect_portfolio("**Conservative Portfolio**\n\n..."),
            Some(RiskLevel::Conservative)
        );
        assert_eq!(
            detect_portfolio("a moderate allocation works"),
            Some(RiskLevel::Moderate)
        );
        assert_eq!(detect_portfolio("Based on your aggressive risk profile"), None);
    }

    #[test]
    fn test_chart_view_lookup() {
        match chart_view("aggressive") {
            ChartView::Available { slices, .. } => {
                assert_eq!(slices.len(), 4);
                assert!(slices.iter().all(|s| s.name != "Cryptocurrency"));
                assert_eq!(slices[0].color, "#38B2AC");
            }
            ChartView::NotAvailable { .. } => panic!("aggressive should exist"),
        }

        assert_eq!(
            chart_view("yolo"),
            ChartView::NotAvailable {
                message: "Portfolio data not available".to_string()
            }
        );
    }
}
