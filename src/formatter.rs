//! Text rendering of a portfolio recommendation
//!
//! Output uses light markdown emphasis for the chat renderer.

use crate::models::PortfolioRecommendation;
use std::fmt::Write;

/// Render title, description and every allocated entry in stored order.
/// Entries with a zero allocation are left out entirely.
pub fn format_portfolio_recommendation(portfolio: &PortfolioRecommendation) -> String {
    let profile = &portfolio.risk_profile;
    let mut result = String::with_capacity(512);

    let _ = write!(result, "**{} Portfolio**\n\n", profile.level.title());
    let _ = write!(result, "{}\n\n", profile.description);
    result.push_str("**Recommended Allocation:**\n");

    for rec in portfolio.allocated() {
        let _ = writeln!(
            result,
            "- {}: {}% ({})",
            rec.asset_class, rec.allocation, rec.description
        );
    }

    result
}
