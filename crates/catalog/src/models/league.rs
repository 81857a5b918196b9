use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Item categories requested from the upstream on every refresh.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "UniqueWeapon",
    "UniqueArmour",
    "UniqueAccessory",
    "Flask",
    "DivinationCard",
    "SkillGem",
    "BaseType",
    "UniqueMap",
    "Map",
    "Oil",
    "Incubator",
    "Scarab",
    "Fossil",
    "Resonator",
    "Essence",
    "Currency",
    "Vial",
    "DeliriumOrb",
    "Invitation",
    "ClusterJewel",
    "Beast",
    "Fragment",
];

/// Leagues recognized when nothing else is configured. The first one is the default.
pub const DEFAULT_LEAGUES: &[&str] = &["Mercenaries", "Hardcore Mercenaries", "Standard", "Hardcore"];

/// Upstream category identifier (e.g. `UniqueWeapon`).
pub type Category = String;

/// A recognized catalog partition, spelled the way the upstream expects it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct League(String);

impl League {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File-system friendly form, e.g. `hardcore-mercenaries`.
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.0.len());
        for c in self.0.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.ends_with('-') && !slug.is_empty() {
                slug.push('-');
            }
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        if slug.is_empty() {
            slug.push_str("league");
        }
        slug
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed set of leagues this deployment serves.
///
/// Lookups naming a league outside this set are rejected before any fetch.
#[derive(Clone, Debug)]
pub struct LeagueRegistry {
    leagues: Vec<League>,
    default: League,
}

impl LeagueRegistry {
    /// Build a registry from configured names. Blank and duplicate names are
    /// dropped; an empty list falls back to [`DEFAULT_LEAGUES`]. The default
    /// league is `default` when it is recognized, otherwise the first league.
    pub fn new<I, S>(names: I, default: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut leagues: Vec<League> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || leagues.iter().any(|l| l.0.eq_ignore_ascii_case(name)) {
                continue;
            }
            leagues.push(League::new(name));
        }
        if leagues.is_empty() {
            leagues = DEFAULT_LEAGUES.iter().map(|l| League::new(*l)).collect();
        }

        let default = default
            .and_then(|d| leagues.iter().find(|l| l.0.eq_ignore_ascii_case(d.trim())))
            .unwrap_or(&leagues[0])
            .clone();

        Self { leagues, default }
    }

    pub fn leagues(&self) -> &[League] {
        &self.leagues
    }

    pub fn default_league(&self) -> &League {
        &self.default
    }

    /// Map user input to a recognized league (case-insensitive).
    ///
    /// `None` or blank input selects the default league.
    pub fn resolve(&self, input: Option<&str>) -> Result<League, ValidationError> {
        let name = match input.map(str::trim) {
            None | Some("") => return Ok(self.default.clone()),
            Some(name) => name,
        };
        self.leagues
            .iter()
            .find(|l| l.0.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| ValidationError::UnknownLeague(name.to_string()))
    }
}

impl Default for LeagueRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_LEAGUES.iter().copied(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_uses_first_league() {
        let registry = LeagueRegistry::default();
        assert_eq!(registry.default_league().as_str(), "Mercenaries");
        assert_eq!(registry.leagues().len(), DEFAULT_LEAGUES.len());
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = LeagueRegistry::default();
        let league = registry.resolve(Some("hardcore mercenaries")).unwrap();
        assert_eq!(league.as_str(), "Hardcore Mercenaries");
    }

    #[test]
    fn test_resolve_missing_selects_default() {
        let registry = LeagueRegistry::default();
        assert_eq!(registry.resolve(None).unwrap().as_str(), "Mercenaries");
        assert_eq!(registry.resolve(Some("  ")).unwrap().as_str(), "Mercenaries");
    }

    #[test]
    fn test_resolve_rejects_unknown() {
        let registry = LeagueRegistry::default();
        assert_eq!(
            registry.resolve(Some("Necropolis")),
            Err(ValidationError::UnknownLeague("Necropolis".to_string()))
        );
    }

    #[test]
    fn test_configured_default_and_dedup() {
        let registry = LeagueRegistry::new(["Standard", "standard", "", "Hardcore"], Some("hardcore"));
        assert_eq!(registry.leagues().len(), 2);
        assert_eq!(registry.default_league().as_str(), "Hardcore");
    }

    #[test]
    fn test_empty_configuration_falls_back() {
        let registry = LeagueRegistry::new(Vec::<String>::new(), Some("Standard"));
        assert_eq!(registry.leagues().len(), DEFAULT_LEAGUES.len());
        assert_eq!(registry.default_league().as_str(), "Standard");
    }

    #[test]
    fn test_slug() {
        assert_eq!(League::new("Hardcore Mercenaries").slug(), "hardcore-mercenaries");
        assert_eq!(League::new("SSF (Standard)").slug(), "ssf-standard");
        assert_eq!(League::new("!!!").slug(), "league");
    }
}
