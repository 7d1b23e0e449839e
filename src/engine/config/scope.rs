//! Configuration scopes: `service ⊂ desktop ⊂ application(uuid) ⊂ window(uuid, name)`.

use serde::{Deserialize, Serialize};

/// A level in the configuration hierarchy. Lower numeric value is broader.
///
/// This is the exact runtime scope used by `add`/`query`; the manifest's
/// on-disk rule scope (`{level, uuid?, name?}` with glob/regex patterns) is
/// a distinct, looser shape handled by [`crate::engine::config::rule`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Scope {
    Service,
    Desktop,
    Application { uuid: String },
    Window { uuid: String, name: String },
}

impl Scope {
    /// Numeric level: `service=0 < desktop=1 < application=2 < window=3`.
    #[must_use]
    pub const fn level(&self) -> u8 {
        match self {
            Self::Service => 0,
            Self::Desktop => 1,
            Self::Application { .. } => 2,
            Self::Window { .. } => 3,
        }
    }

    /// Whether `self`, as a source scope, is broader-than-or-equal to
    /// `other` and `other` falls under it (equal at the common prefix,
    /// with `self`'s finer components wildcarded).
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Service, _) => true,
            (Self::Desktop, Self::Service) => false,
            (Self::Desktop, _) => true,
            (Self::Application { .. }, Self::Service | Self::Desktop) => false,
            (Self::Application { uuid }, Self::Application { uuid: other_uuid }) => uuid == other_uuid,
            (Self::Application { uuid }, Self::Window { uuid: other_uuid, .. }) => uuid == other_uuid,
            (Self::Window { uuid, name }, Self::Window { uuid: ou, name: on }) => uuid == ou && name == on,
            (Self::Window { .. }, _) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_contains_everything() {
        assert!(Scope::Service.contains(&Scope::Window { uuid: "a".into(), name: "w".into() }));
    }

    #[test]
    fn application_does_not_contain_sibling_application() {
        let a = Scope::Application { uuid: "a".into() };
        let b = Scope::Window { uuid: "b".into(), name: "w".into() };
        assert!(!a.contains(&b));
    }

    #[test]
    fn application_contains_its_own_window() {
        let a = Scope::Application { uuid: "a".into() };
        let w = Scope::Window { uuid: "a".into(), name: "w".into() };
        assert!(a.contains(&w));
    }

    #[test]
    fn window_does_not_contain_a_different_window() {
        let w1 = Scope::Window { uuid: "a".into(), name: "w1".into() };
        let w2 = Scope::Window { uuid: "a".into(), name: "w2".into() };
        assert!(!w1.contains(&w2));
    }
}
