use super::failure::{MAX_BUSINESS_RETRY, MAX_SYSTEM_RETRY, Tier};
use crate::error::{ConfigError, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::str::FromStr;

/// Keys every configuration source must provide as non-negative integers.
pub const REQUIRED_KEYS: [&str; 2] = [MAX_SYSTEM_RETRY, MAX_BUSINESS_RETRY];

/// A single configuration value, typed when the source is loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Integer(i64),
    Decimal(Decimal),
    Text(String),
}

impl ConfigValue {
    /// Types a raw cell: integer first, then decimal, otherwise text.
    ///
    /// A number is only typed when it prints back as the same literal, so
    /// `00123` or `+44` stay text.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(n) if n.to_string() == raw => ConfigValue::Integer(n),
            _ => match Decimal::from_str(raw) {
                Ok(d) if d.to_string() == raw => ConfigValue::Decimal(d),
                _ => ConfigValue::Text(raw.to_string()),
            },
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Integer(n) => write!(f, "{n}"),
            ConfigValue::Decimal(d) => write!(f, "{d}"),
            ConfigValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Text(value.to_string())
    }
}

/// The configuration map produced by Initialize.
///
/// Built once and validated on construction; it exposes no mutators, so every
/// later phase sees exactly what was loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigMap {
    entries: BTreeMap<String, ConfigValue>,
}

impl ConfigMap {
    /// Builds a map from key/value pairs, rejecting duplicate keys and
    /// missing or non-numeric retry budgets.
    pub fn from_entries<K, V, I>(entries: I) -> Result<Self>
    where
        K: Into<String>,
        V: Into<ConfigValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = BTreeMap::new();
        for (key, value) in entries {
            match map.entry(key.into()) {
                Entry::Occupied(slot) => {
                    return Err(ConfigError::DuplicateKey(slot.key().clone()));
                }
                Entry::Vacant(slot) => {
                    slot.insert(value.into());
                }
            }
        }

        let config = Self { entries: map };
        for key in REQUIRED_KEYS {
            config.budget(key)?;
        }
        Ok(config)
    }

    pub fn get(&self, key: &str) -> Result<&ConfigValue> {
        self.entries
            .get(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    /// Like [`ConfigMap::get`], for keys that are optional.
    pub fn find(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// The number of re-invocations allowed for a tier before escalation.
    pub fn retry_budget(&self, tier: Tier) -> Result<u32> {
        self.budget(tier.budget_key())
    }

    fn budget(&self, key: &str) -> Result<u32> {
        let value = self.get(key)?;
        value
            .as_integer()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| ConfigError::NotANumber {
                key: key.to_string(),
                value: value.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
