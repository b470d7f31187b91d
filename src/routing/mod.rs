//! Message routing between the agent and direct handling.
//!
//! Each message is scored against weighted regex rules; the side with the
//! larger share of matched weight wins, ties going to direct handling.

mod router;
pub mod rules;


// Re-export public API
pub use router::{NO_MATCH_REASON, Router, RoutingDecision};
pub use rules::{PatternRule, RoutingRules, RuleSet, Side, TaggedRule};
