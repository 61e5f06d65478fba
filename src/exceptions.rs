use std::collections::BTreeMap;

use http::Method;

use crate::config::{ExceptionRule, RuleKind};

/// What the gate should do with a request after looking at the exception rules.
///
/// Variants are ordered by precedence: when several rules match, the greatest decision wins, so a `full` rule
/// always beats a `refresh` rule no matter how the rules are stored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum RouteDecision {
    Enforce,
    RelaxExpiry { rule: String },
    Bypass { rule: String },
}

#[derive(Debug, Clone, Default)]
pub struct RouteExceptions {
    rules: BTreeMap<String, ExceptionRule>,
}

impl RouteExceptions {
    pub fn new(rules: BTreeMap<String, ExceptionRule>) -> Self {
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn evaluate(&self, method: &Method, path: &str) -> RouteDecision {
        self.rules
            .iter()
            .filter(|(_, rule)| rule.matches(method, path))
            .map(|(name, rule)| match rule.kind {
                RuleKind::Full => RouteDecision::Bypass { rule: name.clone() },
                RuleKind::Refresh => RouteDecision::RelaxExpiry { rule: name.clone() },
            })
            .max()
            .unwrap_or(RouteDecision::Enforce)
    }
}
