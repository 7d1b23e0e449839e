//! The scoped configuration store: a flat collection of `(source, config,
//! rules)` entries, queried by deep-merging everything that matches a
//! target scope in ascending priority order.
//!
//! Like the rest of the engine's model state, the store has a single
//! owner and is mutated through `&mut self`; watchers are notified via
//! `tokio::sync::watch` channels rather than shared interior mutability.

use tokio::sync::watch;

use crate::engine::config::mask::ConfigMask;
use crate::engine::config::object::ConfigurationObject;
use crate::engine::config::rule::Rule;
use crate::engine::config::scope::Scope;
use crate::error::{LayoutError, LayoutResult};

#[derive(Clone, Debug)]
struct Entry {
    source: Scope,
    config: ConfigurationObject,
    rules: Vec<Rule>,
}

impl Entry {
    fn matches(&self, target: &Scope) -> bool {
        self.source.contains(target) && (self.rules.is_empty() || self.rules.iter().any(|r| r.applies_to(target)))
    }
}

struct Watcher {
    scope: Scope,
    mask: ConfigMask,
    last: ConfigurationObject,
    tx: watch::Sender<ConfigurationObject>,
}

/// A layered, rule-matched configuration tree. Mirrors the shape described
/// for `service ⊂ desktop ⊂ application ⊂ window` scoping: broader entries
/// apply first, narrower entries override.
#[derive(Default)]
pub struct ConfigurationStore {
    entries: Vec<Entry>,
    watchers: Vec<Watcher>,
}

impl ConfigurationStore {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Inserts an entry. A rule's level must be at or below the level it
    /// narrows from — a rule can only target scopes at or finer than the
    /// scope its entry was added at.
    pub fn add(&mut self, source: Scope, config: ConfigurationObject, rules: Vec<Rule>) -> LayoutResult<()> {
        for rule in &rules {
            if rule.level.numeric() < source.level() {
                return Err(LayoutError::InvalidScope(format!(
                    "rule level {:?} is broader than its source scope {source:?}",
                    rule.level
                )));
            }
        }
        self.entries.push(Entry { source, config, rules });
        self.notify_watchers();
        Ok(())
    }

    /// Drops every entry whose source scope equals `source`.
    pub fn remove_from_source(&mut self, source: &Scope) {
        let before = self.entries.len();
        self.entries.retain(|e| &e.source != source);
        if self.entries.len() != before {
            self.notify_watchers();
        }
    }

    /// The masked effective config at `target`: every matching entry,
    /// deep-merged broadest-first, then masked.
    #[must_use]
    pub fn query(&self, target: &Scope, mask: &ConfigMask) -> ConfigurationObject {
        mask.apply(&Self::resolve(&self.entries, target))
    }

    fn resolve(entries: &[Entry], target: &Scope) -> ConfigurationObject {
        let mut matching: Vec<&Entry> = entries.iter().filter(|e| e.matches(target)).collect();
        matching.sort_by_key(|e| e.source.level());
        matching.iter().fold(ConfigurationObject::default(), |acc, e| acc.merged_with(&e.config))
    }

    /// Registers a watch on the masked query at `target`; the returned
    /// receiver yields a fresh value each time a subsequent `add`/
    /// `remove_from_source` changes the masked result.
    pub fn watch(&mut self, target: Scope, mask: ConfigMask) -> watch::Receiver<ConfigurationObject> {
        let initial = self.query(&target, &mask);
        let (tx, rx) = watch::channel(initial.clone());
        self.watchers.push(Watcher { scope: target, mask, last: initial, tx });
        rx
    }

    fn notify_watchers(&mut self) {
        let entries = &self.entries;
        for watcher in &mut self.watchers {
            let current = watcher.mask.apply(&Self::resolve(entries, &watcher.scope));
            if current != watcher.last {
                watcher.last = current.clone();
                let _ = watcher.tx.send(current);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::mask::ConfigMask;
    use crate::engine::config::rule::{Pattern, RuleLevel};

    #[test]
    fn broader_entry_is_overridden_by_narrower() {
        let mut store = ConfigurationStore::new();
        store
            .add(Scope::Service, ConfigurationObject { enabled: Some(true), ..Default::default() }, Vec::new())
            .unwrap();
        store
            .add(
                Scope::Window { uuid: "app".into(), name: "w".into() },
                ConfigurationObject { enabled: Some(false), ..Default::default() },
                Vec::new(),
            )
            .unwrap();

        let effective =
            store.query(&Scope::Window { uuid: "app".into(), name: "w".into() }, &ConfigMask::enabled_only());
        assert_eq!(effective.enabled, Some(false));
    }

    #[test]
    fn unmatched_window_is_unaffected_by_entry_for_a_different_window() {
        let mut store = ConfigurationStore::new();
        store
            .add(
                Scope::Window { uuid: "app".into(), name: "other".into() },
                ConfigurationObject { enabled: Some(false), ..Default::default() },
                Vec::new(),
            )
            .unwrap();
        let effective =
            store.query(&Scope::Window { uuid: "app".into(), name: "w".into() }, &ConfigMask::enabled_only());
        assert_eq!(effective.enabled, None);
    }

    #[test]
    fn rule_broader_than_its_source_scope_is_rejected() {
        let mut store = ConfigurationStore::new();
        let rule =
            Rule { level: RuleLevel::Application, uuid: None, name: None, config: ConfigurationObject::default() };
        let result = store.add(
            Scope::Window { uuid: "app".into(), name: "w".into() },
            ConfigurationObject::default(),
            vec![rule],
        );
        assert!(result.is_err());
    }

    #[test]
    fn rule_scopes_a_service_level_entry_to_matching_applications_only() {
        let mut store = ConfigurationStore::new();
        let rule = Rule {
            level: RuleLevel::Application,
            uuid: Some(Pattern::Exact("target-app".into())),
            name: None,
            config: ConfigurationObject { enabled: Some(false), ..Default::default() },
        };
        store.add(Scope::Service, ConfigurationObject::default(), vec![rule]).unwrap();

        let matched =
            store.query(&Scope::Window { uuid: "target-app".into(), name: "w".into() }, &ConfigMask::enabled_only());
        assert_eq!(matched.enabled, Some(false));

        let unmatched =
            store.query(&Scope::Window { uuid: "other-app".into(), name: "w".into() }, &ConfigMask::enabled_only());
        assert_eq!(unmatched.enabled, None);
    }

    #[test]
    fn remove_from_source_drops_its_entries() {
        let mut store = ConfigurationStore::new();
        let scope = Scope::Application { uuid: "app".into() };
        store
            .add(scope.clone(), ConfigurationObject { enabled: Some(false), ..Default::default() }, Vec::new())
            .unwrap();
        store.remove_from_source(&scope);
        let effective =
            store.query(&Scope::Window { uuid: "app".into(), name: "w".into() }, &ConfigMask::enabled_only());
        assert_eq!(effective.enabled, None);
    }

    #[test]
    fn entry_addition_that_does_not_match_leaves_query_unchanged() {
        let mut store = ConfigurationStore::new();
        let target = Scope::Window { uuid: "app".into(), name: "w".into() };
        let before = store.query(&target, &ConfigMask::enabled_only());
        store
            .add(
                Scope::Window { uuid: "other".into(), name: "w2".into() },
                ConfigurationObject { enabled: Some(false), ..Default::default() },
                Vec::new(),
            )
            .unwrap();
        let after = store.query(&target, &ConfigMask::enabled_only());
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn watch_yields_on_change_and_skips_unrelated_updates() {
        let mut store = ConfigurationStore::new();
        let target = Scope::Window { uuid: "app".into(), name: "w".into() };
        let mut rx = store.watch(target.clone(), ConfigMask::enabled_only());

        store
            .add(target.clone(), ConfigurationObject { enabled: Some(false), ..Default::default() }, Vec::new())
            .unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().enabled, Some(false));

        // An unrelated entry must not re-trigger this watcher.
        store
            .add(
                Scope::Window { uuid: "other".into(), name: "w2".into() },
                ConfigurationObject { enabled: Some(true), ..Default::default() },
                Vec::new(),
            )
            .unwrap();
        let timeout = tokio::time::timeout(std::time::Duration::from_millis(20), rx.changed()).await;
        assert!(timeout.is_err(), "no change expected for an unrelated scope");
    }
}
