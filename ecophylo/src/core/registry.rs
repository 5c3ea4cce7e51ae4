//! Per-rule parameter whitelists.

use serde::Serialize;
use serde_json::Value;

use crate::core::error::ParameterViolation;

/// Sentinel parameter that lets a rule accept any key; validation of those
/// keys is left to the external tool the rule runs.
pub const ADDITIONAL_PARAMS: &str = "additional_params";

/// Parameter every rule accepts.
pub const THREADS: &str = "threads";

/// A named rule and the configuration keys it may read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSpec {
    pub name: String,
    pub params: Vec<String>,
}

impl RuleSpec {
    /// Build a rule that accepts `params` plus the universal `threads` key.
    pub fn new(name: impl Into<String>, params: &[&str]) -> Self {
        let mut params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
        if !params.iter().any(|p| p == THREADS) {
            params.push(THREADS.to_string());
        }
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn accepts(&self, key: &str) -> bool {
        self.params
            .iter()
            .any(|param| param == key || param == ADDITIONAL_PARAMS)
    }
}

/// Ordered set of rules, unique by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleRegistry {
    rules: Vec<RuleSpec>,
}

impl RuleRegistry {
    /// Add `spec`, replacing any earlier rule with the same name in place.
    pub fn register(&mut self, spec: RuleSpec) {
        match self.rules.iter_mut().find(|rule| rule.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.rules.push(spec),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RuleSpec> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    pub fn rules(&self) -> &[RuleSpec] {
        &self.rules
    }

    /// True if `rule` exists and accepts `key`.
    pub fn validate(&self, rule: &str, key: &str) -> bool {
        self.get(rule).is_some_and(|spec| spec.accepts(key))
    }

    /// Walk a configuration document and report every key no rule accepts.
    ///
    /// Top-level keys listed in `general_params` are skipped; they are
    /// validated by their own consumers.
    pub fn collect_violations(
        &self,
        document: &Value,
        general_params: &[&str],
    ) -> Vec<ParameterViolation> {
        let mut violations = Vec::new();
        let Some(sections) = document.as_object() else {
            return violations;
        };
        for (section, value) in sections {
            if general_params.contains(&section.as_str()) {
                continue;
            }
            let Some(spec) = self.get(section) else {
                violations.push(ParameterViolation::UnknownSection {
                    key: section.clone(),
                });
                continue;
            };
            let Some(params) = value.as_object() else {
                violations.push(ParameterViolation::NotAMapping {
                    rule: section.clone(),
                });
                continue;
            };
            for key in params.keys() {
                if !spec.accepts(key) {
                    violations.push(ParameterViolation::UnknownParameter {
                        rule: section.clone(),
                        key: key.clone(),
                    });
                }
            }
        }
        violations
    }
}
