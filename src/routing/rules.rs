//! Weighted pattern rules and the routing rule file format.
//!
//! A rule is a regex, a positive weight and the side it votes for. The
//! built-in tables are the seed set; a JSON rule file can add more without a
//! rebuild:
//!
//! ```json
//! {
//!   "version": 1,
//!   "agent_triggers": ["\\bdeploy\\b"],
//!   "direct_triggers": ["\\brecipe\\b"],
//!   "rules": [{ "pattern": "\\bterraform\\b", "weight": 1.2, "side": "agent" }]
//! }
//! ```
//!
//! `claude_code_triggers` and `always_openclaw` are accepted as older names for
//! `agent_triggers` and `direct_triggers`.

use crate::error::{CoworkError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Weight of an untagged custom pattern voting for the agent.
pub const CUSTOM_AGENT_WEIGHT: f64 = 0.7;

/// Weight of an untagged custom pattern voting for direct handling.
pub const CUSTOM_DIRECT_WEIGHT: f64 = 0.8;

/// Which way a rule pushes the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Delegate to the agent.
    Agent,
    /// Let the caller handle it.
    Direct,
}

/// Agent-favoring seed rules.
const BUILTIN_AGENT_RULES: &[(&str, f64)] = &[
    // File operations
    (r"\b(file|folder|directory|path)\b", 0.7),
    (
        r"\b(read|write|edit|create|delete|modify|update)\s+(the\s+)?(file|code|script)",
        0.9,
    ),
    (r"\b(save|store)\s+(to|as|in)", 0.6),
    (
        r"\b[\w\-]+\.(py|rs|js|ts|tsx|jsx|go|java|rb|c|h|cpp|hpp|cs|sh|json|ya?ml|toml|md|txt|html|css|sql)\b",
        0.8,
    ),
    // Code operations
    (r"\b(code|script|program|function|class|module)\b", 0.6),
    (
        r"\b(analyze|review|check|debug|fix|refactor)\s+(the\s+)?(code|script|bug)",
        0.8,
    ),
    (
        r"\b(implement|build|develop|create)\s+(a\s+)?(feature|function|class)",
        0.8,
    ),
    // Search operations
    (
        r"\b(search|find|grep|look\s+for)\s+(in\s+)?(the\s+)?(codebase|files|project)",
        0.8,
    ),
    (r"\bwhere\s+is\b.*\b(defined|used|called)\b", 0.7),
    // Complex tasks
    (r"\b(run|execute|test|build|compile|deploy)\b", 0.7),
    (r"\b(install|setup|configure|init)\b", 0.6),
    // Explicit triggers
    (r"\b(use\s+)?(claude\s+code|cowork)\b", 1.0),
    (r"\b(with\s+)?file\s+access\b", 0.9),
];

/// Direct-favoring seed rules.
const BUILTIN_DIRECT_RULES: &[(&str, f64)] = &[
    (r"^(hi|hello|hey|good\s+(morning|afternoon|evening))", 0.9),
    (r"\b(what|who|when|where|why|how)\s+(is|are|was|were|do|does|did)\b", 0.5),
    (r"\b(weather|time|date|news)\b", 0.8),
    (r"\b(tell\s+me|explain|describe)\s+(about|what)", 0.4),
    (r"\b(thanks|thank\s+you|bye|goodbye)\b", 0.9),
];

/// A compiled routing rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub regex: Regex,
    /// Identifier reported in routing reasons.
    pub label: String,
    pub weight: f64,
    pub side: Side,
}

impl PatternRule {
    /// Compile a rule, rejecting bad regexes and non-positive weights.
    pub fn new(pattern: &str, label: impl Into<String>, weight: f64, side: Side) -> Result<Self> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(CoworkError::ConfigError(format!(
                "routing rule '{}' has invalid weight {} (must be a positive number)",
                pattern, weight
            )));
        }

        let regex = Regex::new(pattern).map_err(|e| {
            CoworkError::ConfigError(format!(
                "invalid regex pattern in routing rules: '{}' - {}\n\
                 Fix: edit the rule file and correct or remove this pattern.",
                pattern, e
            ))
        })?;

        Ok(Self {
            regex,
            label: label.into(),
            weight,
            side,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Ordered collection of rules. Order only affects which labels are reported.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<PatternRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The seed tables (agent rules first, then direct rules).
    pub fn builtin() -> Self {
        let rules = BUILTIN_AGENT_RULES
            .iter()
            .map(|&(p, w)| (p, w, Side::Agent))
            .chain(BUILTIN_DIRECT_RULES.iter().map(|&(p, w)| (p, w, Side::Direct)))
            .map(|(pattern, weight, side)| {
                PatternRule::new(pattern, pattern, weight, side)
                    .expect("built-in routing rules are valid")
            })
            .collect();
        Self { rules }
    }

    pub fn push(&mut self, rule: PatternRule) {
        self.rules.push(rule);
    }

    /// Append every rule from a rule file.
    pub fn extend_from(&mut self, file: &RoutingRules) -> Result<()> {
        self.rules.extend(file.compile()?);
        Ok(())
    }

    /// Rules voting for `side`, in order.
    pub fn side(&self, side: Side) -> impl Iterator<Item = &PatternRule> {
        self.rules.iter().filter(move |r| r.side == side)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// One explicitly weighted entry in a rule file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedRule {
    pub pattern: String,
    pub weight: f64,
    pub side: Side,
    /// Label shown in routing reasons (defaults to `custom:<pattern>`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// On-disk routing rule file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    /// Patterns that add [`CUSTOM_AGENT_WEIGHT`] toward delegation.
    #[serde(alias = "claude_code_triggers")]
    pub agent_triggers: Vec<String>,

    /// Patterns that add [`CUSTOM_DIRECT_WEIGHT`] toward direct handling.
    #[serde(alias = "always_openclaw")]
    pub direct_triggers: Vec<String>,

    /// Rules with explicit weight and side.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<TaggedRule>,
}

impl RoutingRules {
    /// Load a rule file. Returns `Ok(None)` if it does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            CoworkError::ConfigError(format!(
                "failed to read routing rules '{}': {}",
                path.display(),
                e
            ))
        })?;

        let rules = Self::from_json(&content).map_err(|e| match e {
            CoworkError::ConfigError(msg) => {
                CoworkError::ConfigError(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })?;
        Ok(Some(rules))
    }

    /// Parse and validate a rule file from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: RoutingRules = serde_json::from_str(json).map_err(|e| {
            CoworkError::ConfigError(format!("failed to parse routing rules JSON: {}", e))
        })?;
        rules.compile()?;
        Ok(rules)
    }

    /// Compile every entry, agent triggers first, then direct, then tagged.
    pub fn compile(&self) -> Result<Vec<PatternRule>> {
        let agent = self
            .agent_triggers
            .iter()
            .map(|p| (p, CUSTOM_AGENT_WEIGHT, Side::Agent, None));
        let direct = self
            .direct_triggers
            .iter()
            .map(|p| (p, CUSTOM_DIRECT_WEIGHT, Side::Direct, None));
        let tagged = self
            .rules
            .iter()
            .map(|r| (&r.pattern, r.weight, r.side, r.label.as_ref()));

        agent
            .chain(direct)
            .chain(tagged)
            .map(|(pattern, weight, side, label)| {
                let label = label
                    .cloned()
                    .unwrap_or_else(|| format!("custom:{}", pattern));
                PatternRule::new(pattern, label, weight, side)
            })
            .collect()
    }
}
