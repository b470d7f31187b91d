//! Message routing: agent or direct?

use super::rules::{RoutingRules, RuleSet, Side};
use crate::config::types::DEFAULT_AGENT_BIAS;
use crate::error::Result;
use serde::Serialize;
use tracing::debug;

/// Maximum number of matched rule labels quoted in a reason.
const MAX_REASON_LABELS: usize = 3;

pub const NO_MATCH_REASON: &str = "No strong patterns matched, defaulting to direct handling";
const NO_MATCH_AGENT_REASON: &str = "No strong patterns matched, defaulting to agent";

/// Outcome of routing one message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingDecision {
    /// Hand the message to the agent.
    pub use_delegate: bool,
    pub reason: String,
    /// Confidence in the chosen side, in `[0, 1]`.
    pub confidence: f64,
}

/// Scores messages against weighted rules.
///
/// Routing is pure computation over the compiled rules; it never fails and
/// never blocks.
#[derive(Debug, Clone)]
pub struct Router {
    rules: RuleSet,
    default_bias: f64,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Router over the built-in rules only.
    pub fn new() -> Self {
        Self::from_rule_set(RuleSet::builtin())
    }

    /// Built-in rules followed by the rules from a rule file.
    pub fn with_rules(custom: &RoutingRules) -> Result<Self> {
        let mut rules = RuleSet::builtin();
        rules.extend_from(custom)?;
        Ok(Self::from_rule_set(rules))
    }

    /// Router over exactly `rules`, with no built-ins.
    pub fn from_rule_set(rules: RuleSet) -> Self {
        Self {
            rules,
            default_bias: DEFAULT_AGENT_BIAS,
        }
    }

    /// Set the agent confidence assumed when nothing matches (clamped to `[0, 1]`).
    pub fn with_default_bias(mut self, bias: f64) -> Self {
        self.default_bias = bias.clamp(0.0, 1.0);
        self
    }

    /// Decide who should handle `message`.
    pub fn route(&self, message: &str) -> RoutingDecision {
        let normalized = message.trim().to_lowercase();

        let (agent_score, agent_matches) = self.score(Side::Agent, &normalized);
        let (direct_score, direct_matches) = self.score(Side::Direct, &normalized);

        let total = agent_score + direct_score;
        let decision = if total > 0.0 {
            let agent_fraction = agent_score / total;
            // Strictly greater: an even split stays direct.
            let use_delegate = agent_fraction > 0.5;
            let (side, matches, confidence) = if use_delegate {
                ("agent", &agent_matches, agent_fraction)
            } else {
                ("direct", &direct_matches, 1.0 - agent_fraction)
            };
            RoutingDecision {
                use_delegate,
                reason: format!(
                    "Matched {} patterns: {}",
                    side,
                    matches
                        .iter()
                        .take(MAX_REASON_LABELS)
                        .copied()
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                confidence,
            }
        } else if self.default_bias > 0.5 {
            RoutingDecision {
                use_delegate: true,
                reason: NO_MATCH_AGENT_REASON.to_string(),
                confidence: self.default_bias,
            }
        } else {
            RoutingDecision {
                use_delegate: false,
                reason: NO_MATCH_REASON.to_string(),
                confidence: 1.0 - self.default_bias,
            }
        };

        debug!(
            agent_score,
            direct_score,
            use_delegate = decision.use_delegate,
            confidence = decision.confidence,
            "routed message"
        );
        decision
    }

    /// Shorthand for `route(message).use_delegate`.
    pub fn should_delegate(&self, message: &str) -> bool {
        self.route(message).use_delegate
    }

    fn score<'a>(&'a self, side: Side, text: &str) -> (f64, Vec<&'a str>) {
        self.rules
            .side(side)
            .filter(|rule| rule.is_match(text))
            .fold((0.0, Vec::new()), |(score, mut labels), rule| {
                labels.push(rule.label.as_str());
                (score + rule.weight, labels)
            })
    }
}
