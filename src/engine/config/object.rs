//! The recognized configuration options and their deep-merge.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A partial configuration object. Every field is optional so that deep
/// merging is "narrower overrides broader, only where it actually says
/// something".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigurationObject {
    /// Master switch for engine participation. Defaults to `true`.
    pub enabled: Option<bool>,
    pub features: Option<Features>,
    pub tabstrip: Option<TabstripConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Features {
    pub snap: Option<bool>,
    pub tab: Option<bool>,
    pub dock: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct TabstripConfig {
    pub url: Option<String>,
    pub height: Option<f64>,
}

impl ConfigurationObject {
    /// Recursive deep-merge: fields set in `override_` win; unset fields
    /// fall through to `self`.
    #[must_use]
    pub fn merged_with(&self, override_: &Self) -> Self {
        Self {
            enabled: override_.enabled.or(self.enabled),
            features: merge_option(&self.features, &override_.features, Features::merged_with),
            tabstrip: merge_option(&self.tabstrip, &override_.tabstrip, TabstripConfig::merged_with),
        }
    }

    /// Effective `enabled`, defaulting to `true` per §4.7.
    #[must_use]
    pub fn is_enabled(&self) -> bool { self.enabled.unwrap_or(true) }
}

impl Features {
    #[must_use]
    pub fn merged_with(&self, override_: &Self) -> Self {
        Self {
            snap: override_.snap.or(self.snap),
            tab: override_.tab.or(self.tab),
            dock: override_.dock.or(self.dock),
        }
    }
}

impl TabstripConfig {
    #[must_use]
    pub fn merged_with(&self, override_: &Self) -> Self {
        Self { url: override_.url.clone().or_else(|| self.url.clone()), height: override_.height.or(self.height) }
    }
}

fn merge_option<T: Clone>(base: &Option<T>, over: &Option<T>, merge: impl Fn(&T, &T) -> T) -> Option<T> {
    match (base, over) {
        (Some(b), Some(o)) => Some(merge(b, o)),
        (Some(b), None) => Some(b.clone()),
        (None, Some(o)) => Some(o.clone()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_where_it_says_something() {
        let base = ConfigurationObject {
            enabled: Some(true),
            features: Some(Features { snap: Some(true), tab: Some(true), dock: None }),
            tabstrip: None,
        };
        let over =
            ConfigurationObject { enabled: None, features: Some(Features { snap: Some(false), ..Default::default() }), tabstrip: None };
        let merged = base.merged_with(&over);
        assert_eq!(merged.enabled, Some(true));
        let features = merged.features.unwrap();
        assert_eq!(features.snap, Some(false));
        assert_eq!(features.tab, Some(true));
    }

    #[test]
    fn default_enabled_is_true() {
        assert!(ConfigurationObject::default().is_enabled());
    }
}
