// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Line-oriented builder of the configuration text fed to frr-reload.py

use std::fmt::Display;
use std::ops::AddAssign;

/// Stanza separator. Consecutive separators collapse into one.
pub const MARKER: &str = "!";

#[derive(Debug, Default)]
pub struct ConfigBuilder(Vec<String>);

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// A builder holding nothing but separators is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|line| line == MARKER)
    }
    fn push(&mut self, line: &str) {
        if line == MARKER && self.0.last().is_some_and(|last| last == MARKER) {
            return;
        }
        self.0.push(line.to_owned());
    }
}

impl Display for ConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.iter().try_for_each(|line| writeln!(f, "{line}"))
    }
}

impl AddAssign<Self> for ConfigBuilder {
    fn add_assign(&mut self, rhs: Self) {
        rhs.0.iter().for_each(|line| self.push(line));
    }
}
impl AddAssign<String> for ConfigBuilder {
    fn add_assign(&mut self, rhs: String) {
        self.push(&rhs);
    }
}
impl AddAssign<&str> for ConfigBuilder {
    fn add_assign(&mut self, rhs: &str) {
        self.push(rhs);
    }
}

/// Rendering of a configuration object, given some context (e.g. its name)
pub trait Render {
    type Context;
    type Output;
    fn render(&self, ctx: &Self::Context) -> Self::Output;
}

/// Keywords of configuration values, as FRR spells them
pub(crate) trait Rendered {
    fn rendered(&self) -> &'static str;
}
