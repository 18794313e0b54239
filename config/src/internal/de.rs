// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Deserialization helpers. Leaves of a normalized tree are always strings, so
//! typed leaves are parsed from their string form.

use serde::Deserialize;
use serde::de::{self, Deserializer, IgnoredAny};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// A valueless node: it is either configured or not
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flag;

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer).map(|_| Flag)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

pub fn from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(de::Error::custom)
}

pub fn opt_from_str<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| s.parse().map_err(de::Error::custom))
        .transpose()
}

/// Multi-valued leaves: a single value is accepted in place of a list
pub fn vec_from_str<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let items = match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    };
    items
        .iter()
        .map(|s| s.parse().map_err(de::Error::custom))
        .collect()
}

/// Tag nodes whose entries are numbered (e.g. rules): entries are sorted numerically
pub fn numbered<'de, D, T>(deserializer: D) -> Result<BTreeMap<u32, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    BTreeMap::<String, T>::deserialize(deserializer)?
        .into_iter()
        .map(|(key, value)| {
            key.parse::<u32>()
                .map(|num| (num, value))
                .map_err(|e| de::Error::custom(format!("invalid number '{key}': {e}")))
        })
        .collect()
}
