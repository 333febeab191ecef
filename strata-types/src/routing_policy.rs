//! Connector ordering rules keyed by historian service.
//!
//! A rule lists connectors in preference order for one `Site.Service`, or
//! globally. The most specific rule wins: a service rule overrides the global
//! rule. Listed connectors are tried first in list order; unlisted connectors
//! follow in registration order unless the rule is `strict`, in which case
//! they are excluded.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::connector::ConnectorKey;

/// De-duplicated ordered list with cached positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
struct RankedNames {
    names: Vec<String>,
    ranks: HashMap<String, usize>,
}

impl From<Vec<String>> for RankedNames {
    fn from(list: Vec<String>) -> Self {
        let mut names = Vec::with_capacity(list.len());
        let mut ranks = HashMap::with_capacity(list.len());
        for name in list {
            if !ranks.contains_key(&name) {
                ranks.insert(name.clone(), names.len());
                names.push(name);
            }
        }
        Self { names, ranks }
    }
}

impl From<RankedNames> for Vec<String> {
    fn from(r: RankedNames) -> Self {
        r.names
    }
}

/// Ordered connector preference for one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRule {
    providers: RankedNames,
    /// Exclude connectors that are not listed.
    pub strict: bool,
}

impl ProviderRule {
    fn new(keys: &[ConnectorKey], strict: bool) -> Self {
        let names: Vec<String> = keys.iter().map(|k| k.as_str().to_string()).collect();
        Self {
            providers: RankedNames::from(names),
            strict,
        }
    }

    /// Connector names in preference order.
    #[must_use]
    pub fn providers(&self) -> &[String] {
        &self.providers.names
    }

    /// Position of `connector` in this rule, if listed.
    #[must_use]
    pub fn rank(&self, connector: &str) -> Option<usize> {
        self.providers.ranks.get(connector).copied()
    }
}

/// Routing policy consulted when ordering connectors for a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingPolicy {
    global: Option<ProviderRule>,
    #[serde(default)]
    by_service: HashMap<String, ProviderRule>,
}

impl RoutingPolicy {
    /// Start building a policy.
    #[must_use]
    pub fn builder() -> RoutingPolicyBuilder {
        RoutingPolicyBuilder::new()
    }

    /// Rule that applies to `site_service`, if any.
    #[must_use]
    pub fn rule_for(&self, site_service: &str) -> Option<&ProviderRule> {
        self.by_service
            .get(site_service)
            .or(self.global.as_ref())
    }

    /// Sort key for `connector` under `site_service`.
    ///
    /// Returns `None` when a strict rule excludes the connector. Unlisted
    /// connectors under a non-strict rule sort after every listed one.
    #[must_use]
    pub fn sort_key(&self, site_service: &str, connector: &str) -> Option<usize> {
        match self.rule_for(site_service) {
            None => Some(usize::MAX),
            Some(rule) => match rule.rank(connector) {
                Some(r) => Some(r),
                None if rule.strict => None,
                None => Some(usize::MAX),
            },
        }
    }

    /// Every connector name referenced by any rule.
    pub fn referenced_connectors(&self) -> impl Iterator<Item = &str> + '_ {
        self.global
            .iter()
            .chain(self.by_service.values())
            .flat_map(|r| r.providers().iter().map(String::as_str))
    }

    /// True when no rule is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.global.is_none() && self.by_service.is_empty()
    }
}

/// Builder for [`RoutingPolicy`].
#[derive(Debug, Clone, Default)]
pub struct RoutingPolicyBuilder {
    policy: RoutingPolicy,
}

impl RoutingPolicyBuilder {
    /// Empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Preference applied to every service without its own rule.
    #[must_use]
    pub fn providers_global(mut self, keys: &[ConnectorKey]) -> Self {
        self.policy.global = Some(ProviderRule::new(keys, false));
        self
    }

    /// Preference for one `Site.Service`.
    #[must_use]
    pub fn providers_for_service(mut self, site_service: &str, keys: &[ConnectorKey]) -> Self {
        self.policy
            .by_service
            .insert(site_service.to_string(), ProviderRule::new(keys, false));
        self
    }

    /// Restrict one `Site.Service` to exactly the listed connectors, in order.
    #[must_use]
    pub fn strict_for_service(mut self, site_service: &str, keys: &[ConnectorKey]) -> Self {
        self.policy
            .by_service
            .insert(site_service.to_string(), ProviderRule::new(keys, true));
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> RoutingPolicy {
        self.policy
    }
}
