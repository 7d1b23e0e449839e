//! Rules: scope-patterns attached to a configuration entry that select
//! which finer scopes it applies to.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::engine::config::object::ConfigurationObject;
use crate::engine::config::scope::Scope;

/// `{expression, flags?, invert?}` — a regex pattern as carried in the
/// on-disk manifest format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegexPattern {
    pub expression: String,
    #[serde(default)]
    pub flags: String,
    #[serde(default)]
    pub invert: bool,
}

impl RegexPattern {
    fn matches(&self, value: &str) -> bool {
        let pattern = if self.flags.contains('i') { format!("(?i){}", self.expression) } else { self.expression.clone() };
        let is_match = regex::Regex::new(&pattern).is_ok_and(|re| re.is_match(value));
        is_match != self.invert
    }
}

/// Either a literal string or a regex, as accepted for `uuid`/`name` in a
/// manifest rule's scope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Pattern {
    Exact(String),
    Regex(RegexPattern),
}

impl Pattern {
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Exact(s) => s == value,
            Self::Regex(re) => re.matches(value),
        }
    }
}

/// The granularity a rule targets. Window is the finest level a rule can
/// target; a rule cannot target `service` or `desktop` (those are always
/// addressed by adding an entry directly at that scope).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    Application,
    Window,
}

impl RuleLevel {
    #[must_use]
    pub const fn numeric(self) -> u8 {
        match self {
            Self::Application => 2,
            Self::Window => 3,
        }
    }
}

/// `{ scope: {level, uuid?, name?}, config }` — one entry in a manifest's
/// `rules` array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rule {
    pub level: RuleLevel,
    #[serde(default)]
    pub uuid: Option<Pattern>,
    #[serde(default)]
    pub name: Option<Pattern>,
    pub config: ConfigurationObject,
}

impl Rule {
    /// Whether this rule contributes to scope `target`. A rule cascades to
    /// narrower scopes exactly like a plain entry's source scope would: an
    /// `application` rule also applies to windows of that application, a
    /// `window` rule applies only to that exact window.
    #[must_use]
    pub fn applies_to(&self, target: &Scope) -> bool {
        match (self.level, target) {
            (RuleLevel::Application, Scope::Application { uuid }) => self.uuid_matches(uuid),
            (RuleLevel::Application, Scope::Window { uuid, .. }) => self.uuid_matches(uuid),
            (RuleLevel::Window, Scope::Window { uuid, name }) => self.uuid_matches(uuid) && self.name_matches(name),
            _ => false,
        }
    }

    fn uuid_matches(&self, uuid: &str) -> bool { self.uuid.as_ref().is_none_or(|p| p.matches(uuid)) }

    fn name_matches(&self, name: &str) -> bool { self.name.as_ref().is_none_or(|p| p.matches(name)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_rule_cascades_to_its_windows() {
        let rule = Rule {
            level: RuleLevel::Application,
            uuid: Some(Pattern::Exact("app".into())),
            name: None,
            config: ConfigurationObject::default(),
        };
        assert!(rule.applies_to(&Scope::Application { uuid: "app".into() }));
        assert!(rule.applies_to(&Scope::Window { uuid: "app".into(), name: "w".into() }));
        assert!(!rule.applies_to(&Scope::Window { uuid: "other".into(), name: "w".into() }));
    }

    #[test]
    fn window_rule_does_not_cascade_to_application() {
        let rule = Rule {
            level: RuleLevel::Window,
            uuid: Some(Pattern::Exact("app".into())),
            name: Some(Pattern::Exact("w1".into())),
            config: ConfigurationObject::default(),
        };
        assert!(rule.applies_to(&Scope::Window { uuid: "app".into(), name: "w1".into() }));
        assert!(!rule.applies_to(&Scope::Window { uuid: "app".into(), name: "w2".into() }));
        assert!(!rule.applies_to(&Scope::Application { uuid: "app".into() }));
    }

    #[test]
    fn regex_pattern_with_invert() {
        let pattern = Pattern::Regex(RegexPattern { expression: "^test-".into(), flags: String::new(), invert: true });
        assert!(!pattern.matches("test-window"));
        assert!(pattern.matches("other-window"));
    }
}
