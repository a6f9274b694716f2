//! Portfolio Advisor
//!
//! A chat-style investment advisor that:
//! - Matches free text against an ordered table of keyword rules
//! - Answers with canned guidance from a static knowledge base
//! - Recommends one of three fixed risk-profile portfolios
//! - Shows an allocation chart for the most recently recommended portfolio
//!
//! TURN FLOW:
//! INPUT → CLASSIFY → RESPOND → DETECT PORTFOLIO → CHART?

pub mod api;
pub mod chart;
pub mod classifier;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod formatter;
pub mod intents;
pub mod knowledge;
pub mod models;
pub mod session;
pub mod storage;
pub mod transcript;
pub mod voice;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use classifier::{generate_response, Reply};
pub use formatter::format_portfolio_recommendation;
pub use intents::Intent;
pub use session::{ChatSession, SessionController, TurnOutcome};
pub use transcript::{ChatMessage, Role, Transcript};
