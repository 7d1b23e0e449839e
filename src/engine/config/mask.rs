//! Masked config queries: a parallel tree of booleans mirroring
//! [`crate::engine::config::object::ConfigurationObject`]. `query` walks
//! mask and source in lock-step, copying leaves where the mask is true.

use crate::engine::config::object::{ConfigurationObject, Features, TabstripConfig};

#[derive(Clone, Copy, Debug, Default)]
pub struct ConfigMask {
    pub enabled: bool,
    pub features: FeaturesMask,
    pub tabstrip: TabstripMask,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FeaturesMask {
    pub snap: bool,
    pub tab: bool,
    pub dock: bool,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TabstripMask {
    pub url: bool,
    pub height: bool,
}

impl ConfigMask {
    #[must_use]
    pub const fn all() -> Self {
        Self {
            enabled: true,
            features: FeaturesMask { snap: true, tab: true, dock: true },
            tabstrip: TabstripMask { url: true, height: true },
        }
    }

    #[must_use]
    pub const fn enabled_only() -> Self { Self { enabled: true, ..Self::none() } }

    #[must_use]
    pub const fn none() -> Self {
        Self {
            enabled: false,
            features: FeaturesMask { snap: false, tab: false, dock: false },
            tabstrip: TabstripMask { url: false, height: false },
        }
    }

    #[must_use]
    pub fn apply(&self, source: &ConfigurationObject) -> ConfigurationObject {
        ConfigurationObject {
            enabled: self.enabled.then_some(source.enabled).flatten(),
            features: source.features.as_ref().map(|f| self.features.apply(f)),
            tabstrip: source.tabstrip.as_ref().map(|t| self.tabstrip.apply(t)),
        }
    }
}

impl FeaturesMask {
    #[must_use]
    pub fn apply(&self, source: &Features) -> Features {
        Features {
            snap: self.snap.then_some(source.snap).flatten(),
            tab: self.tab.then_some(source.tab).flatten(),
            dock: self.dock.then_some(source.dock).flatten(),
        }
    }
}

impl TabstripMask {
    #[must_use]
    pub fn apply(&self, source: &TabstripConfig) -> TabstripConfig {
        TabstripConfig {
            url: self.url.then(|| source.url.clone()).flatten(),
            height: self.height.then_some(source.height).flatten(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_hides_unmasked_leaves() {
        let source = ConfigurationObject {
            enabled: Some(false),
            features: Some(Features { snap: Some(true), tab: Some(false), dock: None }),
            tabstrip: None,
        };
        let masked = ConfigMask::enabled_only().apply(&source);
        assert_eq!(masked.enabled, Some(false));
        assert!(masked.features.is_none());
    }
}
