//! Typed reasoner settings read from `REASONABLE_*` environment variables.

use serde::{Deserialize, Serialize};

use crate::LoadError;

pub const ENV_MAX_STEPS: &str = "REASONABLE_MAX_STEPS";
pub const ENV_MAX_DEPTH: &str = "REASONABLE_MAX_DEPTH";
pub const ENV_BRANCH_FACTOR: &str = "REASONABLE_BRANCH_FACTOR";
pub const ENV_NUM_RUNS: &str = "REASONABLE_NUM_RUNS";
pub const ENV_STEP_DELAY_MS: &str = "REASONABLE_STEP_DELAY_MS";

/// Budgets and pacing shared by the reasoning strategies.
///
/// Values are taken as given; the reasoners clamp `max_steps`, `max_depth` and
/// `branch_factor` to at least 1 when they are built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasonerSettings {
    /// Iterative step budget of the chain strategy.
    pub max_steps: u32,
    /// Depth bound of the tree strategy.
    pub max_depth: u32,
    /// Candidate continuations per tree node.
    pub branch_factor: u32,
    /// Independent runs of the consistency aggregator.
    pub num_runs: u32,
    /// Pause between chain steps, in milliseconds. Zero disables pacing.
    pub step_delay_ms: u64,
}

impl Default for ReasonerSettings {
    fn default() -> Self {
        Self {
            max_steps: 10,
            max_depth: 5,
            branch_factor: 3,
            num_runs: 5,
            step_delay_ms: 0,
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, slot: &mut T) -> Result<(), LoadError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(());
    };
    *slot = raw.trim().parse().map_err(|e: T::Err| LoadError::InvalidValue {
        key: key.to_string(),
        value: raw.clone(),
        reason: e.to_string(),
    })?;
    Ok(())
}

impl ReasonerSettings {
    /// Reads settings from the process environment; unset keys keep their defaults.
    pub fn from_env() -> Result<Self, LoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup` (key → value), starting from defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoadError> {
        let mut s = Self::default();
        parse_var(&lookup, ENV_MAX_STEPS, &mut s.max_steps)?;
        parse_var(&lookup, ENV_MAX_DEPTH, &mut s.max_depth)?;
        parse_var(&lookup, ENV_BRANCH_FACTOR, &mut s.branch_factor)?;
        parse_var(&lookup, ENV_NUM_RUNS, &mut s.num_runs)?;
        parse_var(&lookup, ENV_STEP_DELAY_MS, &mut s.step_delay_ms)?;
        Ok(s)
    }

    pub fn step_delay(&self) -> Option<std::time::Duration> {
        (self.step_delay_ms > 0).then(|| std::time::Duration::from_millis(self.step_delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let s = ReasonerSettings::from_lookup(|_| None).unwrap();
        assert_eq!(s, ReasonerSettings::default());
        assert_eq!(s.max_steps, 10);
        assert_eq!(s.branch_factor, 3);
        assert!(s.step_delay().is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let s = ReasonerSettings::from_lookup(lookup_from(&[
            (ENV_MAX_STEPS, "4"),
            (ENV_MAX_DEPTH, " 2 "),
            (ENV_NUM_RUNS, "0"),
            (ENV_STEP_DELAY_MS, "150"),
        ]))
        .unwrap();
        assert_eq!(s.max_steps, 4);
        assert_eq!(s.max_depth, 2);
        assert_eq!(s.branch_factor, 3);
        assert_eq!(s.num_runs, 0);
        assert_eq!(s.step_delay(), Some(std::time::Duration::from_millis(150)));
    }

    #[test]
    fn invalid_value_names_the_key() {
        let err = ReasonerSettings::from_lookup(lookup_from(&[(ENV_BRANCH_FACTOR, "many")]))
            .unwrap_err();
        match err {
            LoadError::InvalidValue { key, value, .. } => {
                assert_eq!(key, ENV_BRANCH_FACTOR);
                assert_eq!(value, "many");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn deserializes_partial_toml() {
        let s: ReasonerSettings = toml::from_str("max_depth = 2\nbranch_factor = 2\n").unwrap();
        assert_eq!(s.max_depth, 2);
        assert_eq!(s.branch_factor, 2);
        assert_eq!(s.max_steps, 10);
    }
}
